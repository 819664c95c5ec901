//! The shared measurement capability.

use chrono::{Duration, NaiveDateTime};

use tc_core::{RawTimestamp, TcError, TcResult};

/// Validated `{timestamp, sensor_id}` pair embedded in every measurement.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeasurementHeader {
    timestamp: NaiveDateTime,
    sensor_id: String,
}

impl MeasurementHeader {
    /// Fails with `InvariantViolation` when `sensor_id` is blank or the
    /// timestamp is zone-aware.
    pub fn new(timestamp: impl Into<RawTimestamp>, sensor_id: impl Into<String>) -> TcResult<Self> {
        let sensor_id = sensor_id.into();
        if sensor_id.trim().is_empty() {
            return Err(TcError::InvariantViolation("sensor id cannot be empty".to_owned()));
        }
        let timestamp = timestamp.into().into_naive()?;
        Ok(Self { timestamp, sensor_id })
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }
}

/// A dated observation attributed to one sensor.
pub trait Measurement {
    fn header(&self) -> &MeasurementHeader;

    fn timestamp(&self) -> NaiveDateTime {
        self.header().timestamp
    }

    fn sensor_id(&self) -> &str {
        &self.header().sensor_id
    }

    /// Absolute time between two observations.
    fn time_diff(&self, other: &dyn Measurement) -> Duration {
        let d = self.timestamp() - other.timestamp();
        if d < Duration::zero() { -d } else { d }
    }
}

impl Measurement for MeasurementHeader {
    fn header(&self) -> &MeasurementHeader {
        self
    }
}
