//! Sample recorder: accumulates one YAML record per joint sample and keeps
//! the output file in sync with the whole history.
//!
//! The output file is truncated and rewritten in full on every sample. That
//! costs O(history) per sample, but the file on disk is always a complete
//! document and a failed write is repaired by the next one.

use crate::config::RecorderConfig;
use crate::data_structure::{JointSample, OutputRecord};
use crate::error::RecorderError;
use crate::kinematics::compute_for_sample;
use crate::shutdown::ShutdownSignal;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Active,
    /// Quota reached. No further samples are accepted.
    Terminal,
}

#[derive(Debug)]
pub struct SampleRecorder {
    config: RecorderConfig,
    document: String,
    received_count: u64,
    state: RecorderState,
    shutdown: ShutdownSignal,
}

impl SampleRecorder {
    pub fn new(config: RecorderConfig, shutdown: ShutdownSignal) -> Self {
        Self {
            config,
            document: String::new(),
            received_count: 0,
            state: RecorderState::Active,
            shutdown,
        }
    }

    /// Processes one sample. Must be called sequentially.
    ///
    /// A [`RecorderError::WriteFailure`] still leaves the sample recorded in
    /// memory; the counter advances and the quota check runs regardless.
    pub fn on_sample(&mut self, angle1: f64, angle2: f64) -> Result<(), RecorderError> {
        if self.state == RecorderState::Terminal {
            return Err(RecorderError::Terminal {
                quota: self.config.sample_quota,
            });
        }

        let sample = JointSample::new(angle1, angle2);
        let position = compute_for_sample(sample, &self.config.geometry);
        let entry = OutputRecord::new(sample, position).to_yaml_entry()?;

        self.document.push_str(&entry);
        self.received_count += 1;
        debug!(
            count = self.received_count,
            angle1,
            angle2,
            x = position.x,
            y = position.y,
            "sample recorded"
        );

        let written = self.flush();

        if self.received_count >= self.config.sample_quota {
            self.state = RecorderState::Terminal;
            info!(
                quota = self.config.sample_quota,
                path = %self.config.output_path.display(),
                "sample quota reached, requesting shutdown"
            );
            self.shutdown.request();
        }

        written
    }

    /// Rewrites the output file with everything recorded so far. Also valid
    /// in the terminal state, to retry a failed final write.
    pub fn flush(&self) -> Result<(), RecorderError> {
        let path = &self.config.output_path;
        let write_failure = |source| RecorderError::WriteFailure {
            path: path.clone(),
            source,
        };

        let result = File::create(path).map_err(write_failure).and_then(|file| {
            let mut writer = BufWriter::new(file);
            writer
                .write_all(self.document.as_bytes())
                .and_then(|_| writer.flush())
                .map_err(write_failure)
        });

        if let Err(e) = &result {
            error!(path = %path.display(), error = ?e, "failed to write output file");
        }
        result
    }

    pub fn received_count(&self) -> u64 {
        self.received_count
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state == RecorderState::Terminal
    }

    /// Everything recorded so far, exactly as written to the output file.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structure::ArmGeometry;
    use std::path::Path;

    fn config(path: &Path, quota: u64) -> RecorderConfig {
        RecorderConfig {
            geometry: ArmGeometry::from_degree_offsets(1.0, 1.0, 0.0, 0.0),
            sample_quota: quota,
            output_path: path.to_path_buf(),
        }
    }

    fn read_records(path: &Path) -> Vec<OutputRecord> {
        let text = std::fs::read_to_string(path).unwrap();
        OutputRecord::parse_document(&text).unwrap()
    }

    #[test]
    fn counter_matches_record_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        let mut recorder = SampleRecorder::new(config(&path, 10), ShutdownSignal::new());

        for i in 0..4 {
            recorder.on_sample(i as f64 * 0.1, 0.0).unwrap();
            assert_eq!(read_records(&path).len() as u64, recorder.received_count());
        }
        assert_eq!(recorder.state(), RecorderState::Active);
    }

    #[test]
    fn quota_of_one_terminates_after_first_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        let shutdown = ShutdownSignal::new();
        let mut recorder = SampleRecorder::new(config(&path, 1), shutdown.clone());

        recorder.on_sample(0.0, 0.0).unwrap();

        assert!(recorder.is_terminal());
        assert!(shutdown.is_requested());
        assert_eq!(read_records(&path).len(), 1);
    }

    #[test]
    fn terminal_recorder_rejects_samples_without_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        let mut recorder = SampleRecorder::new(config(&path, 2), ShutdownSignal::new());
        recorder.on_sample(0.0, 0.0).unwrap();
        recorder.on_sample(0.5, 0.5).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let err = recorder.on_sample(1.0, 1.0).unwrap_err();

        assert!(matches!(err, RecorderError::Terminal { quota: 2 }));
        assert_eq!(recorder.received_count(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn write_failure_keeps_sample_for_next_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-yet");
        let path = missing.join("out.yaml");
        let mut recorder = SampleRecorder::new(config(&path, 5), ShutdownSignal::new());

        let err = recorder.on_sample(0.25, 0.5).unwrap_err();
        assert!(matches!(err, RecorderError::WriteFailure { .. }), "{err}");
        assert_eq!(recorder.received_count(), 1);
        assert_eq!(recorder.state(), RecorderState::Active);

        std::fs::create_dir(&missing).unwrap();
        recorder.on_sample(0.75, 1.0).unwrap();

        let records = read_records(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].joint_angles, [0.25, 0.5]);
        assert_eq!(records[1].joint_angles, [0.75, 1.0]);
    }

    #[test]
    fn failed_final_write_can_be_flushed_later() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("later");
        let path = missing.join("out.yaml");
        let shutdown = ShutdownSignal::new();
        let mut recorder = SampleRecorder::new(config(&path, 1), shutdown.clone());

        assert!(recorder.on_sample(0.0, 0.0).is_err());
        assert!(recorder.is_terminal());
        assert!(shutdown.is_requested());

        std::fs::create_dir(&missing).unwrap();
        recorder.flush().unwrap();
        assert_eq!(read_records(&path).len(), 1);
    }

    #[test]
    fn document_matches_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        let mut recorder = SampleRecorder::new(config(&path, 3), ShutdownSignal::new());
        recorder.on_sample(0.1, 0.2).unwrap();
        recorder.on_sample(0.3, 0.4).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), recorder.document());
    }
}
