//! `tc-parse` — incremental readers for the simulator's result documents.
//!
//! Result files grow to gigabytes on city-scale runs, so nothing here builds
//! a document tree.  A [`RecordStream`] walks a `quick_xml` event stream and
//! assembles one repeated element (an `<interval>`, a `<tripinfo>`) at a
//! time; the finished record is moved out to the caller and the event buffer
//! is reused, so memory stays proportional to the largest single record.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`stream`]   | `RecordShape` trait, `RecordStream` cursor                  |
//! | [`meandata`] | `Interval`, `TrafficStats`, the `MeanData` shape            |
//! | [`tripinfo`] | `TripRecord`, the `TripInfo` shape                          |
//! | [`detector`] | `InductionLoopOutput` shape → `InductionLoopMeasurement`    |
//!
//! Each shape has the same five entry points: `parse_*_str`, `parse_*_reader`
//! and `parse_*_file` collect the whole document, `stream_*_reader` and
//! `stream_*_file` return the lazy iterator.
//!
//! # Failure
//!
//! Ill-formed XML, a mismatched end tag, a truncated document or an
//! unparsable numeric attribute all surface as
//! [`TcError::MalformedDocument`](tc_core::TcError::MalformedDocument).  A
//! stream yields that error once and then ends.

mod attrs;
pub mod detector;
pub mod meandata;
pub mod stream;
pub mod tripinfo;

#[cfg(test)]
mod tests;

pub use detector::{
    InductionLoopOutput, parse_detector_file, parse_detector_reader, parse_detector_str,
    stream_detector_file, stream_detector_reader,
};
pub use meandata::{
    Interval, MeanData, TrafficStats, parse_meandata_file, parse_meandata_reader, parse_meandata_str,
    stream_meandata_file, stream_meandata_reader,
};
pub use attrs::Attrs;
pub use stream::{RecordShape, RecordStream};
pub use tripinfo::{
    TripInfo, TripRecord, parse_tripinfo_file, parse_tripinfo_reader, parse_tripinfo_str,
    stream_tripinfo_file, stream_tripinfo_reader,
};
