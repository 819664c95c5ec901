//! Time primitives.
//!
//! # Design
//!
//! Measurements are compared against each other and against simulation
//! offsets, so every stored timestamp is a zone-less [`NaiveDateTime`] in
//! UTC.  Zone-aware input is normalized once with [`naive_utc`] and the zone
//! marker is dropped; a zone-aware value is never stored.
//!
//! Simulation time is plain `f64` seconds since the start of the simulated
//! day, the unit used by the simulator's own documents.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::{TcError, TcResult};

// ── RawTimestamp ──────────────────────────────────────────────────────────────

/// A timestamp as it arrives from an input source, before validation.
///
/// Measurement constructors take a `RawTimestamp` and reject the `Aware`
/// variant: zone handling must happen explicitly, through [`naive_utc`] or
/// [`RawTimestamp::normalized`], before a measurement can exist.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RawTimestamp {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl RawTimestamp {
    /// Return the zone-less value, failing if a zone is attached.
    pub fn into_naive(self) -> TcResult<NaiveDateTime> {
        match self {
            RawTimestamp::Naive(t) => Ok(t),
            RawTimestamp::Aware(t) => Err(TcError::InvariantViolation(format!(
                "timestamp {t} is timezone-aware; normalize it with naive_utc first"
            ))),
        }
    }

    /// Convert to UTC and drop the zone.  Naive values pass through unchanged.
    pub fn normalized(self) -> RawTimestamp {
        match self {
            RawTimestamp::Naive(_) => self,
            RawTimestamp::Aware(t) => RawTimestamp::Naive(naive_utc(&t)),
        }
    }
}

impl From<NaiveDateTime> for RawTimestamp {
    fn from(t: NaiveDateTime) -> Self {
        RawTimestamp::Naive(t)
    }
}

impl From<DateTime<FixedOffset>> for RawTimestamp {
    fn from(t: DateTime<FixedOffset>) -> Self {
        RawTimestamp::Aware(t)
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(t: DateTime<Utc>) -> Self {
        RawTimestamp::Aware(t.into())
    }
}

// ── Conversions ───────────────────────────────────────────────────────────────

/// Convert `dt` to UTC and strip the zone marker.
///
/// The result is only comparable with other values produced the same way.
#[inline]
pub fn naive_utc<Tz: TimeZone>(dt: &DateTime<Tz>) -> NaiveDateTime {
    dt.naive_utc()
}

/// `hour * 3600 + minute * 60 + second`; the date is discarded.
#[inline]
pub fn seconds_of_day(t: &NaiveDateTime) -> u32 {
    t.hour() * 3_600 + t.minute() * 60 + t.second()
}

/// Fractional seconds as a `chrono::Duration`, at nanosecond resolution.
pub fn seconds_to_duration(secs: f64) -> Duration {
    Duration::nanoseconds((secs * 1e9) as i64)
}

// ── Formatting ────────────────────────────────────────────────────────────────

/// Render a number of seconds as `"<d>d <h>h <m>m <s>s"`.
///
/// Each component is truncated toward zero and omitted when zero; when every
/// component is zero (including negative or non-finite input) the result is
/// `"0s"`.
///
/// ```
/// use tc_core::format_duration;
///
/// assert_eq!(format_duration(30.0), "30s");
/// assert_eq!(format_duration(93_784.9), "1d 2h 3m 4s");
/// assert_eq!(format_duration(3_600.0), "1h");
/// assert_eq!(format_duration(0.4), "0s");
/// ```
pub fn format_duration(secs: f64) -> String {
    if !secs.is_finite() || secs < 1.0 {
        return "0s".to_owned();
    }
    // Whole seconds; the cast saturates only past ~5.8e11 years.
    let total = secs.trunc() as u64;

    let components = [
        (total / 86_400, "d"),
        (total / 3_600 % 24, "h"),
        (total / 60 % 60, "m"),
        (total % 60, "s"),
    ];

    components
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}
