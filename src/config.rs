//! Settings file loading.
//!
//! Top-level keys keep the external parameter names (`link_1`,
//! `Theta1_offset`, `data_point_count`, ...). Offsets are given in degrees.

use crate::data_structure::ArmGeometry;
use crate::error::ConfigurationError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/recorder.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub link_1: f64,
    pub link_2: f64,
    #[serde(rename = "Theta1_offset")]
    pub theta1_offset: f64,
    #[serde(rename = "Theta2_offset")]
    pub theta2_offset: f64,
    pub data_point_count: u64,

    #[serde(default)]
    pub broker: BrokerSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub publisher: PublisherSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerSettings {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_queue")]
    pub queue: String,
    /// AMQP prefetch count.
    #[serde(default = "default_prefetch")]
    pub prefetch: u16,
    /// Depth of the in-process queue between the consumer and the recorder.
    #[serde(default = "default_buffer")]
    pub buffer: usize,
}

fn default_uri() -> String {
    "amqp://127.0.0.1:5672/%2f".to_string()
}

fn default_queue() -> String {
    "joint_states".to_string()
}

fn default_prefetch() -> u16 {
    1
}

fn default_buffer() -> usize {
    1000
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            queue: default_queue(),
            prefetch: default_prefetch(),
            buffer: default_buffer(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_directory() -> PathBuf {
    PathBuf::from("Output_yaml")
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublisherSettings {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,
    /// Upper bound of generated angles, in hundredths of a radian.
    #[serde(default = "default_max_angle_centi")]
    pub max_angle_centi: u32,
}

fn default_rate_hz() -> f64 {
    30.0
}

fn default_max_angle_centi() -> u32 {
    315
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
            max_angle_centi: default_max_angle_centi(),
        }
    }
}

impl PublisherSettings {
    /// Tick period for `rate_hz`. Must be representable and non-zero.
    pub fn period(&self) -> Result<Duration, ConfigurationError> {
        if !(self.rate_hz.is_finite() && self.rate_hz > 0.0) {
            return Err(invalid("publisher.rate_hz", "must be a positive number"));
        }
        match Duration::try_from_secs_f64(1.0 / self.rate_hz) {
            Ok(period) if !period.is_zero() => Ok(period),
            Ok(_) => Err(invalid(
                "publisher.rate_hz",
                "rate is too high, tick period rounds to zero",
            )),
            Err(_) => Err(invalid(
                "publisher.rate_hz",
                "rate is too low, tick period does not fit a duration",
            )),
        }
    }
}

/// Immutable configuration handed to the recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfig {
    pub geometry: ArmGeometry,
    pub sample_quota: u64,
    pub output_path: PathBuf,
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigurationError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        positive_length("link_1", self.link_1)?;
        positive_length("link_2", self.link_2)?;
        finite("Theta1_offset", self.theta1_offset)?;
        finite("Theta2_offset", self.theta2_offset)?;

        if self.data_point_count == 0 {
            return Err(invalid("data_point_count", "must be at least 1"));
        }
        if self.broker.buffer == 0 {
            return Err(invalid("broker.buffer", "must be at least 1"));
        }
        self.publisher.period()?;
        Ok(())
    }

    pub fn geometry(&self) -> ArmGeometry {
        ArmGeometry::from_degree_offsets(
            self.link_1,
            self.link_2,
            self.theta1_offset,
            self.theta2_offset,
        )
    }

    pub fn recorder_config(&self, output_path: PathBuf) -> RecorderConfig {
        RecorderConfig {
            geometry: self.geometry(),
            sample_quota: self.data_point_count,
            output_path,
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigurationError {
    ConfigurationError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite number"))
    }
}

fn positive_length(field: &'static str, value: f64) -> Result<(), ConfigurationError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(invalid(field, "link length must be greater than zero"));
    }
    Ok(())
}
