use crate::data_structure::JointStateMessage;
use crate::error::{IngestionError, RecorderError};
use crate::recorder::SampleRecorder;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Translates joint-state messages into recorder calls.
pub struct IngestionAdapter<'a> {
    recorder: &'a mut SampleRecorder,
}

impl<'a> IngestionAdapter<'a> {
    pub fn new(recorder: &'a mut SampleRecorder) -> Self {
        Self { recorder }
    }

    /// Forwards `position[0]` and `position[1]` (joint1, joint2). Extra
    /// positions are ignored.
    pub fn handle(&mut self, msg: &JointStateMessage) -> Result<(), IngestionError> {
        let (angle1, angle2) = match msg.position.as_slice() {
            [a, b, ..] => (*a, *b),
            other => {
                return Err(IngestionError::MalformedMessage {
                    positions: other.len(),
                })
            }
        };
        self.recorder.on_sample(angle1, angle2)?;
        Ok(())
    }

    pub fn recorder(&self) -> &SampleRecorder {
        self.recorder
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: u64,
    pub rejected: u64,
    pub write_failures: u64,
}

/// Single consumer of the ingestion queue. Every recorder call happens
/// here, one message at a time.
///
/// Returns when the recorder turns terminal or every sender is dropped.
pub async fn run(
    mut rx: mpsc::Receiver<JointStateMessage>,
    recorder: &mut SampleRecorder,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut adapter = IngestionAdapter::new(recorder);

    while !adapter.recorder().is_terminal() {
        let Some(msg) = rx.recv().await else {
            info!("ingestion channel closed");
            break;
        };

        match adapter.handle(&msg) {
            Ok(()) => summary.processed += 1,
            Err(IngestionError::MalformedMessage { positions }) => {
                summary.rejected += 1;
                warn!(
                    positions,
                    stamp_us = %msg.header.stamp_us,
                    "dropping malformed joint-state message"
                );
            }
            Err(IngestionError::Recorder(RecorderError::WriteFailure { path, source })) => {
                // sample is kept in memory, the next rewrite retries
                summary.processed += 1;
                summary.write_failures += 1;
                error!(path = %path.display(), error = %source, "write failed, continuing");
            }
            Err(IngestionError::Recorder(e)) => {
                error!(error = %e, "recorder rejected sample");
                break;
            }
        }
    }

    rx.close();
    info!(
        processed = summary.processed,
        rejected = summary.rejected,
        write_failures = summary.write_failures,
        "ingestion finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecorderConfig;
    use crate::data_structure::ArmGeometry;
    use crate::shutdown::ShutdownSignal;

    fn recorder(dir: &tempfile::TempDir, quota: u64) -> SampleRecorder {
        SampleRecorder::new(
            RecorderConfig {
                geometry: ArmGeometry::from_degree_offsets(1.0, 1.0, 0.0, 0.0),
                sample_quota: quota,
                output_path: dir.path().join("out.yaml"),
            },
            ShutdownSignal::new(),
        )
    }

    fn message(position: &[f64]) -> JointStateMessage {
        JointStateMessage {
            name: vec!["joint1".into(), "joint2".into()],
            position: position.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn single_position_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder(&dir, 3);
        let mut adapter = IngestionAdapter::new(&mut recorder);

        let err = adapter.handle(&message(&[0.5])).unwrap_err();

        assert!(matches!(err, IngestionError::MalformedMessage { positions: 1 }));
        assert_eq!(recorder.received_count(), 0);
        assert!(!dir.path().join("out.yaml").exists());
    }

    #[test]
    fn extra_positions_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder(&dir, 3);
        IngestionAdapter::new(&mut recorder)
            .handle(&message(&[0.1, 0.2, 9.0]))
            .unwrap();
        assert_eq!(recorder.received_count(), 1);
        assert_eq!(recorder.document().matches("- joint angles").count(), 1);
    }

    #[tokio::test]
    async fn run_stops_at_quota_and_leaves_rest_queued() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder(&dir, 2);
        let (tx, rx) = mpsc::channel(8);
        for i in 0..5 {
            tx.send(message(&[i as f64, 0.0])).await.unwrap();
        }

        let summary = run(rx, &mut recorder).await;

        assert_eq!(summary.processed, 2);
        assert!(recorder.is_terminal());
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn run_skips_malformed_messages() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = recorder(&dir, 10);
        let (tx, rx) = mpsc::channel(8);
        tx.send(message(&[0.1, 0.2])).await.unwrap();
        tx.send(message(&[])).await.unwrap();
        tx.send(message(&[0.3, 0.4])).await.unwrap();
        drop(tx);

        let summary = run(rx, &mut recorder).await;

        assert_eq!(
            summary,
            RunSummary {
                processed: 2,
                rejected: 1,
                write_failures: 0
            }
        );
        assert_eq!(recorder.received_count(), 2);
    }
}
