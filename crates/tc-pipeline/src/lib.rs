//! `tc-pipeline` — wires loaders, calibration and tables into batch jobs.
//!
//! # Jobs
//!
//! ```text
//! Calibration : sites.csv + measurements.csv ─snap─▶ <additional> calibrators (+ detectors)
//! Export      : Source ─stream─▶ RecordBatchChunks ─(m/s→km/h)─▶ CSV | Parquet
//! Kpi         : tripinfo.xml ─stream─▶ KpiAccumulator ─pivot─▶ CSV
//! ```
//!
//! Jobs are independent; [`run_jobs`] returns one result per job so a
//! failing job never hides the others.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs independent jobs on Rayon's thread pool.          |
//! | `parquet`  | Enables `TableFormat::Parquet` for export jobs.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tc_core::PipelineConfig;
//! use tc_pipeline::{ExportJob, Job, Source, TableFormat, run_jobs};
//!
//! let job = Job::Export(ExportJob {
//!     source:        Source::MeanDataDocument { path: "edgedata.xml".into() },
//!     output:        "edgedata.csv".into(),
//!     format:        TableFormat::Csv,
//!     speeds_to_kph: true,
//! });
//! for report in run_jobs(&[job], &PipelineConfig::default())? {
//!     println!("{:?}", report?);
//! }
//! ```

pub mod calibration;
pub mod error;
pub mod job;
pub mod source;


pub use calibration::{CalibrationSettings, additional_document, build_calibrators, build_detectors};
pub use error::{PipelineError, PipelineResult};
pub use job::{CalibrationJob, ExportJob, Job, JobReport, KpiJob, SharedLocator, TableFormat, run_jobs};
pub use source::{BatchStream, Loaded, Source};
