//! The closed set of input shapes and their loaded payloads.
//!
//! | Source                   | File                           | Record                     |
//! |--------------------------|--------------------------------|----------------------------|
//! | `RoadwaySensorRows`      | `;`-delimited measurement rows | `RoadwaySensorMeasurement` |
//! | `InductionLoopDocument`  | detector result XML            | `InductionLoopMeasurement` |
//! | `MeanDataDocument`       | edge/lane mean-data XML        | `Interval`                 |
//! | `TripSummaryDocument`    | trip summary XML               | `TripRecord`               |
//!
//! Every operation dispatches with one exhaustive `match`, so adding a shape
//! is a compile error until each operation handles it.

use std::path::{Path, PathBuf};

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use tracing::debug;

use tc_core::PipelineConfig;
use tc_measure::{InductionLoopMeasurement, RoadwaySensorMeasurement, load_measurements_csv};
use tc_parse::{
    Interval, TripRecord, parse_detector_file, parse_meandata_file, parse_tripinfo_file,
    stream_detector_file, stream_meandata_file, stream_tripinfo_file,
};
use tc_table::{RecordBatchChunks, TableResult, TableRow, to_record_batch};

use crate::PipelineResult;

/// Boxed stream of bounded record batches.
pub type BatchStream = Box<dyn Iterator<Item = TableResult<RecordBatch>> + Send>;

#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    RoadwaySensorRows { path: PathBuf },
    /// `reference` is the wall-clock instant of simulation time zero.
    InductionLoopDocument { path: PathBuf, reference: NaiveDateTime },
    MeanDataDocument { path: PathBuf },
    TripSummaryDocument { path: PathBuf },
}

impl Source {
    pub fn path(&self) -> &Path {
        match self {
            Source::RoadwaySensorRows { path }
            | Source::InductionLoopDocument { path, .. }
            | Source::MeanDataDocument { path }
            | Source::TripSummaryDocument { path } => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Source::RoadwaySensorRows { .. } => "roadway sensor rows",
            Source::InductionLoopDocument { .. } => "induction loop document",
            Source::MeanDataDocument { .. } => "mean data document",
            Source::TripSummaryDocument { .. } => "trip summary document",
        }
    }

    /// Arrow layout of this source's records.
    pub fn schema(&self) -> SchemaRef {
        match self {
            Source::RoadwaySensorRows { .. } => RoadwaySensorMeasurement::schema(),
            Source::InductionLoopDocument { .. } => InductionLoopMeasurement::schema(),
            Source::MeanDataDocument { .. } => Interval::schema(),
            Source::TripSummaryDocument { .. } => TripRecord::schema(),
        }
    }

    /// Read every record into memory.
    pub fn load(&self, config: &PipelineConfig) -> PipelineResult<Loaded> {
        debug!(kind = self.kind(), path = %self.path().display(), "loading source");
        let loaded = match self {
            Source::RoadwaySensorRows { path } => {
                Loaded::RoadwaySensorRows(load_measurements_csv(path, config.delimiter_byte())?)
            }
            Source::InductionLoopDocument { path, reference } => {
                Loaded::InductionLoopDocument(parse_detector_file(path, *reference)?)
            }
            Source::MeanDataDocument { path } => Loaded::MeanDataDocument(parse_meandata_file(path)?),
            Source::TripSummaryDocument { path } => {
                Loaded::TripSummaryDocument(parse_tripinfo_file(path)?)
            }
        };
        Ok(loaded)
    }

    /// Stream the source as record batches of at most `config.chunk_size`
    /// rows.  Documents are parsed incrementally; delimited rows are small
    /// enough to load first.
    pub fn batches(&self, config: &PipelineConfig) -> PipelineResult<BatchStream> {
        debug!(kind = self.kind(), path = %self.path().display(), "streaming source");
        let chunk = config.chunk_size;
        let stream: BatchStream = match self {
            Source::RoadwaySensorRows { path } => {
                let rows = load_measurements_csv(path, config.delimiter_byte())?;
                Box::new(RecordBatchChunks::new(rows.into_iter().map(Ok), chunk))
            }
            Source::InductionLoopDocument { path, reference } => {
                Box::new(RecordBatchChunks::new(stream_detector_file(path, *reference)?, chunk))
            }
            Source::MeanDataDocument { path } => {
                Box::new(RecordBatchChunks::new(stream_meandata_file(path)?, chunk))
            }
            Source::TripSummaryDocument { path } => {
                Box::new(RecordBatchChunks::new(stream_tripinfo_file(path)?, chunk))
            }
        };
        Ok(stream)
    }
}

/// Records of one source, held in memory.
#[derive(Clone, Debug, PartialEq)]
pub enum Loaded {
    RoadwaySensorRows(Vec<RoadwaySensorMeasurement>),
    InductionLoopDocument(Vec<InductionLoopMeasurement>),
    MeanDataDocument(Vec<Interval>),
    TripSummaryDocument(Vec<TripRecord>),
}

impl Loaded {
    /// Records loaded (intervals count once, however many lanes they hold).
    pub fn len(&self) -> usize {
        match self {
            Loaded::RoadwaySensorRows(v) => v.len(),
            Loaded::InductionLoopDocument(v) => v.len(),
            Loaded::MeanDataDocument(v) => v.len(),
            Loaded::TripSummaryDocument(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_record_batch(&self) -> TableResult<RecordBatch> {
        match self {
            Loaded::RoadwaySensorRows(v) => to_record_batch(v),
            Loaded::InductionLoopDocument(v) => to_record_batch(v),
            Loaded::MeanDataDocument(v) => to_record_batch(v),
            Loaded::TripSummaryDocument(v) => to_record_batch(v),
        }
    }
}
