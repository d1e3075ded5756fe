use anyhow::{Context, Result};
use clap::Parser;
use planar_arm_recorder::{
    config::DEFAULT_CONFIG_PATH, logging, publisher::random_joint_state, transport, Settings,
};
use scheduled_thread_pool::ScheduledThreadPool;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "publisher")]
#[command(about = "Publishes random joint states at a fixed rate")]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = Settings::load(&cli.config)
        .with_context(|| format!("loading settings from {}", cli.config.display()))?;
    let (conn, channel) = transport::connect(&settings.broker)
        .await
        .context("connecting to broker")?;

    let (tx, rx) = mpsc::channel(settings.broker.buffer);
    let queue = settings.broker.queue.clone();
    let publisher_handle =
        tokio::spawn(async move { transport::publish_joint_states(channel, &queue, rx).await });

    let pool = ScheduledThreadPool::new(1);
    let period = settings.publisher.period()?;
    let max_angle_centi = settings.publisher.max_angle_centi;

    let _job = pool.execute_at_fixed_rate(Duration::ZERO, period, move || {
        let msg = random_joint_state(&mut rand::rng(), max_angle_centi);
        if let Err(e) = tx.try_send(msg) {
            warn!(error = %e, "failed to queue joint state");
        }
    });

    info!(
        rate_hz = settings.publisher.rate_hz,
        "publishing joint states, Ctrl-C to stop"
    );
    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;

    // dropping the pool drops the job and with it the last sender
    drop(pool);
    match tokio::time::timeout(Duration::from_secs(2), publisher_handle).await {
        Ok(Ok(Ok(published))) => info!(published, "publisher drained"),
        Ok(Ok(Err(e))) => warn!(error = %e, "publisher stopped with an error"),
        Ok(Err(e)) => warn!(error = %e, "publisher task panicked"),
        Err(_) => warn!("publisher did not drain in time"),
    }
    conn.close(200, "publisher finished").await.ok();
    Ok(())
}
