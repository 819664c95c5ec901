//! `tc-core` — foundational types for the traffic calibration pipeline.
//!
//! This crate is a dependency of every other `tc-*` crate.  It has no `tc-*`
//! dependencies and minimal external ones (`chrono` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`units`]   | `kph_to_mps`, `mps_to_kph` and their constants            |
//! | [`time`]    | `RawTimestamp`, `naive_utc`, duration formatting          |
//! | [`geo`]     | `GeoPoint`, haversine distance                            |
//! | [`config`]  | `PipelineConfig`, `CategorySpec`                          |
//! | [`error`]   | `TcError`, `TcResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to configuration types.     |

pub mod config;
pub mod error;
pub mod geo;
pub mod time;
pub mod units;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CategorySpec, PipelineConfig};
pub use error::{TcError, TcResult};
pub use geo::GeoPoint;
pub use time::{RawTimestamp, format_duration, naive_utc, seconds_of_day, seconds_to_duration};
pub use units::{KPH_TO_MPS, MPS_TO_KPH, kph_to_mps, mps_to_kph};
