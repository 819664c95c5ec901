//! `tc-table` — columnar views of pipeline records and the tables built on
//! top of them.
//!
//! Everything tabular is an Arrow [`RecordBatch`](arrow::record_batch::RecordBatch):
//! records become batches through [`TableRow`], long streams are cut into
//! bounded batches by [`RecordBatchChunks`], and batches leave the process
//! through a [`TableWriter`].
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`row`]       | `TableRow` schemas for measurements, intervals, trips, flows |
//! | [`chunks`]    | `RecordBatchChunks` streaming materialization              |
//! | [`aggregate`] | `aggregate_by_edge`, `aggregate_by_sensor`, `convert_speed_to_kph` |
//! | [`kpi`]       | `KpiAccumulator`, `KpiTable`                               |
//! | [`writer`]    | `TableWriter` trait                                        |
//! | [`csv`]       | `CsvTableWriter`                                           |
//! | [`parquet`]   | `ParquetTableWriter` (feature `parquet`)                   |
//!
//! # Feature flags
//!
//! | Feature   | Backend  | Extra dependency |
//! |-----------|----------|------------------|
//! | *(none)*  | CSV      | —                |
//! | `parquet` | Parquet  | `parquet`        |

pub mod aggregate;
pub mod chunks;
pub mod csv;
pub mod error;
pub mod kpi;
pub mod row;
pub mod writer;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use aggregate::{
    Aggregator, ConvertMode, aggregate_by_edge, aggregate_by_sensor, convert_speed_to_kph,
    edge_of_lane_sensor,
};
pub use chunks::RecordBatchChunks;
pub use csv::CsvTableWriter;
pub use error::{TableError, TableResult};
pub use kpi::{KPI_METRICS, KpiAccumulator, KpiTable, OTHER_CATEGORY, TOTAL_CATEGORY};
pub use row::{TableRow, to_record_batch};
pub use writer::{TableWriter, write_all};

#[cfg(feature = "parquet")]
pub use parquet::ParquetTableWriter;
