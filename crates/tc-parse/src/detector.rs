//! Induction-loop detector result documents.
//!
//! ```text
//! <detector>
//!   <interval begin="0.00" end="300.00" id="SiteA_e1_0" nVehContrib="5"
//!             flow="60.00" occupancy="1.20" speed="12.9" harmonicMeanSpeed="12.4" .../>
//! </detector>
//! ```
//!
//! Each interval becomes an [`InductionLoopMeasurement`] dated
//! `reference + end`.  Absent attributes read as zero.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::NaiveDateTime;

use tc_core::{RawTimestamp, TcResult};
use tc_measure::InductionLoopMeasurement;

use crate::attrs::Attrs;
use crate::stream::{RecordShape, RecordStream};

/// Shape of a detector result file.  `reference` is the wall-clock instant of
/// simulation time zero, already normalized to UTC.
#[derive(Clone, Copy, Debug)]
pub struct InductionLoopOutput {
    reference: NaiveDateTime,
}

impl InductionLoopOutput {
    pub fn new(reference: impl Into<RawTimestamp>) -> TcResult<Self> {
        let reference = reference.into().normalized().into_naive()?;
        Ok(Self { reference })
    }

    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }
}

impl RecordShape for InductionLoopOutput {
    type Partial = InductionLoopMeasurement;
    type Record = InductionLoopMeasurement;

    const TAG: &'static [u8] = b"interval";

    fn open(&self, a: &Attrs) -> TcResult<InductionLoopMeasurement> {
        InductionLoopMeasurement::from_attributes(
            a.get("id").unwrap_or_default(),
            a.float("end")?,
            [
                a.float("flow")?,
                a.float("speed")?,
                a.float("occupancy")?,
                a.float("harmonicMeanSpeed")?,
            ],
            self.reference,
        )
    }

    fn finish(&self, partial: InductionLoopMeasurement) -> TcResult<InductionLoopMeasurement> {
        Ok(partial)
    }
}

pub fn stream_detector_reader<R: BufRead>(
    reader:    R,
    reference: impl Into<RawTimestamp>,
) -> TcResult<RecordStream<R, InductionLoopOutput>> {
    Ok(RecordStream::new(reader, InductionLoopOutput::new(reference)?))
}

pub fn stream_detector_file(
    path:      &Path,
    reference: impl Into<RawTimestamp>,
) -> TcResult<RecordStream<BufReader<File>, InductionLoopOutput>> {
    RecordStream::from_file(path, InductionLoopOutput::new(reference)?)
}

pub fn parse_detector_reader<R: BufRead>(
    reader:    R,
    reference: impl Into<RawTimestamp>,
) -> TcResult<Vec<InductionLoopMeasurement>> {
    stream_detector_reader(reader, reference)?.collect()
}

pub fn parse_detector_str(xml: &str, reference: impl Into<RawTimestamp>) -> TcResult<Vec<InductionLoopMeasurement>> {
    parse_detector_reader(xml.as_bytes(), reference)
}

pub fn parse_detector_file(path: &Path, reference: impl Into<RawTimestamp>) -> TcResult<Vec<InductionLoopMeasurement>> {
    stream_detector_file(path, reference)?.collect()
}
