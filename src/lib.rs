pub mod config;
pub mod data_structure;
pub mod error;
pub mod ingestion;
pub mod kinematics;
pub mod logging;
pub mod output;
pub mod publisher;
pub mod recorder;
pub mod shutdown;
pub mod transport;

pub use config::{RecorderConfig, Settings};
pub use data_structure::*;
pub use error::{ConfigurationError, IngestionError, RecorderError, TransportError};
pub use ingestion::{IngestionAdapter, RunSummary};
pub use kinematics::compute_end_effector;
pub use recorder::{RecorderState, SampleRecorder};
pub use shutdown::ShutdownSignal;

use std::time::{SystemTime, UNIX_EPOCH};

pub fn now_micros() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or_default()
}
