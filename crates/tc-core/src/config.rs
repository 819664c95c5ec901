//! Pipeline configuration.
//!
//! Typically loaded from a JSON file by the application crate (enable the
//! `serde` feature) and passed down to the loaders and the KPI stage.  Every
//! field has a default, so a config file only needs the keys it overrides.

use crate::{TcError, TcResult};

/// One KPI category: the vehicle types that belong to it and its label.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategorySpec {
    pub vehicle_types: Vec<String>,
    pub label:         String,
}

impl CategorySpec {
    pub fn new<S: Into<String>>(vehicle_types: impl IntoIterator<Item = S>, label: impl Into<String>) -> Self {
        Self {
            vehicle_types: vehicle_types.into_iter().map(Into::into).collect(),
            label:         label.into(),
        }
    }
}

/// Top-level pipeline configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// Field separator of the sensor measurement and metadata exports.
    pub delimiter: char,

    /// Width in seconds of the calibration window ending at each measurement.
    pub calibrator_period_secs: f64,

    /// Radius in metres used to snap a sensor site onto the network.
    pub snap_radius_m: f64,

    /// KPI categories, in display order.  Unlisted vehicle types are
    /// reported under `"Other"`.
    pub categories: Vec<CategorySpec>,

    /// Maximum rows per Arrow record batch when materializing streams.
    pub chunk_size: usize,

    /// Columns converted from m/s to km/h before export.
    pub speed_columns: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter:              ';',
            calibrator_period_secs: 300.0,
            snap_radius_m:          5.0,
            categories:             Vec::new(),
            chunk_size:             10_000,
            speed_columns:          vec!["speed".to_owned(), "harmonic_speed".to_owned()],
        }
    }
}

impl PipelineConfig {
    /// Check the values that the loaders cannot work with.
    pub fn validate(&self) -> TcResult<()> {
        if self.calibrator_period_secs.is_nan() || self.calibrator_period_secs <= 0.0 {
            return Err(TcError::Config(format!(
                "calibrator_period_secs must be positive, got {}",
                self.calibrator_period_secs
            )));
        }
        if self.chunk_size == 0 {
            return Err(TcError::Config("chunk_size must be at least 1".to_owned()));
        }
        if !self.delimiter.is_ascii() {
            return Err(TcError::Config(format!(
                "delimiter {:?} must be a single ASCII character",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// The delimiter as the single byte expected by the `csv` crate.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}
