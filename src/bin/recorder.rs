use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use planar_arm_recorder::{
    config::DEFAULT_CONFIG_PATH, ingestion, logging, output::prepare_output_path, transport,
    SampleRecorder, Settings, ShutdownSignal,
};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "recorder")]
#[command(about = "Records end-effector positions for incoming joint states")]
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
    let output_path = prepare_output_path(&settings.output.directory, Utc::now())?;

    let shutdown = ShutdownSignal::new();
    let mut recorder = SampleRecorder::new(
        settings.recorder_config(output_path.clone()),
        shutdown.clone(),
    );

    let (conn, channel) = transport::connect(&settings.broker)
        .await
        .context("connecting to broker")?;

    let (tx, rx) = mpsc::channel(settings.broker.buffer);
    let queue = settings.broker.queue.clone();
    let consumer_shutdown = shutdown.clone();
    let consumer_handle = tokio::spawn(async move {
        tokio::select! {
            res = transport::consume_joint_states(channel, &queue, tx) => res,
            _ = consumer_shutdown.wait() => Ok(()),
        }
    });

    info!(
        path = %output_path.display(),
        quota = settings.data_point_count,
        "recorder is ready to receive joint states"
    );

    let summary = tokio::select! {
        summary = ingestion::run(rx, &mut recorder) => Some(summary),
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted before the sample quota was reached");
            None
        }
    };

    if summary.is_some_and(|s| s.write_failures > 0) {
        if let Err(e) = recorder.flush() {
            error!(error = %e, "final rewrite of the output file failed");
        }
    }

    shutdown.request();
    match consumer_handle.await {
        Ok(Err(e)) => error!(error = %e, "consumer stopped with an error"),
        Err(e) => error!(error = %e, "consumer task panicked"),
        Ok(Ok(())) => {}
    }
    if let Err(e) = conn.close(200, "recorder finished").await {
        warn!(error = %e, "failed to close broker connection cleanly");
    }

    info!(
        samples = recorder.received_count(),
        path = %output_path.display(),
        "shutdown complete"
    );
    Ok(())
}
