//! Loopback run: the random joint-state generator feeds the recorder
//! directly through the in-process queue, no broker required.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use planar_arm_recorder::{
    config::DEFAULT_CONFIG_PATH,
    ingestion, logging,
    output::prepare_output_path,
    publisher::random_joint_state,
    JointStateMessage, SampleRecorder, Settings, ShutdownSignal,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser)]
#[command(name = "planar-arm-recorder")]
#[command(about = "Generate and record joint states in a single process")]
struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

async fn generate(
    tx: mpsc::Sender<JointStateMessage>,
    period: Duration,
    max_angle_centi: u32,
    shutdown: ShutdownSignal,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = ticker.tick() => {
                let msg = random_joint_state(&mut rand::rng(), max_angle_centi);
                if tx.send(msg).await.is_err() {
                    break;
                }
            }
        }
    }
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

    let (tx, rx) = mpsc::channel(settings.broker.buffer);
    let period = settings.publisher.period()?;
    let generator = tokio::spawn(generate(
        tx,
        period,
        settings.publisher.max_angle_centi,
        shutdown.clone(),
    ));

    let summary = ingestion::run(rx, &mut recorder).await;
    shutdown.request();
    generator.await.context("generator task panicked")?;

    if summary.write_failures > 0 {
        recorder.flush().context("final rewrite of the output file")?;
    }

    info!(
        samples = recorder.received_count(),
        path = %output_path.display(),
        "all samples recorded"
    );
    Ok(())
}
