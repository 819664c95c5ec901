//! Independent batch jobs and the runner.
//!
//! Jobs share nothing mutable: each reads its own inputs and writes its own
//! output file, so running them concurrently (feature `parallel`) changes
//! only wall-clock time, never results.  Reports come back in input order.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use tc_core::{PipelineConfig, TcError};
use tc_measure::{load_measurements_csv, parse_sensor_sites};
use tc_model::FlowTemplate;
use tc_network::NetworkLocator;
use tc_parse::stream_tripinfo_file;
use tc_table::{
    ConvertMode, CsvTableWriter, KpiAccumulator, TableWriter, convert_speed_to_kph, write_all,
};

use crate::calibration::{CalibrationSettings, additional_document, build_calibrators, build_detectors};
use crate::source::{BatchStream, Source};
use crate::{PipelineError, PipelineResult};

/// Shared, thread-safe network handle.
pub type SharedLocator = Arc<dyn NetworkLocator + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableFormat {
    #[default]
    Csv,
    #[cfg(feature = "parquet")]
    Parquet,
}

/// Sites + measurements → `<additional>` file with calibrators (and,
/// optionally, per-lane detectors).
#[derive(Clone)]
pub struct CalibrationJob {
    pub sites:          PathBuf,
    pub measurements:   PathBuf,
    pub output:         PathBuf,
    pub locator:        SharedLocator,
    pub template:       FlowTemplate,
    /// When set, detectors for every snapped site write to this file.
    pub detector_file:  Option<PathBuf>,
}

/// Any source → table file, optionally with speeds converted to km/h.
#[derive(Clone, Debug)]
pub struct ExportJob {
    pub source:         Source,
    pub output:         PathBuf,
    pub format:         TableFormat,
    pub speeds_to_kph:  bool,
}

/// Trip summary → pivoted KPI table (CSV).
#[derive(Clone, Debug)]
pub struct KpiJob {
    pub trips:  PathBuf,
    pub output: PathBuf,
}

#[derive(Clone)]
pub enum Job {
    Calibration(CalibrationJob),
    Export(ExportJob),
    Kpi(KpiJob),
}

/// Outcome of one successful job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobReport {
    pub name:    String,
    /// Calibrators + detectors, table rows, or trips, depending on the job.
    pub records: usize,
    pub output:  PathBuf,
}

impl Job {
    pub fn name(&self) -> String {
        match self {
            Job::Calibration(j) => format!("calibration:{}", j.output.display()),
            Job::Export(j) => format!("export:{}", j.output.display()),
            Job::Kpi(j) => format!("kpi:{}", j.output.display()),
        }
    }

    pub fn run(&self, config: &PipelineConfig) -> PipelineResult<JobReport> {
        let name = self.name();
        let result = match self {
            Job::Calibration(j) => run_calibration(j, config),
            Job::Export(j) => run_export(j, config),
            Job::Kpi(j) => run_kpi(j, config),
        };
        match result {
            Ok(records) => {
                info!(job = %name, records, "job finished");
                Ok(JobReport { name, records, output: self.output().clone() })
            }
            Err(e) => {
                warn!(job = %name, error = %e, "job failed");
                Err(PipelineError::Job { job: name, source: Box::new(e) })
            }
        }
    }

    fn output(&self) -> &PathBuf {
        match self {
            Job::Calibration(j) => &j.output,
            Job::Export(j) => &j.output,
            Job::Kpi(j) => &j.output,
        }
    }
}

/// Run every job; one result per job, in input order.  The configuration is
/// validated once up front.
pub fn run_jobs(jobs: &[Job], config: &PipelineConfig) -> PipelineResult<Vec<PipelineResult<JobReport>>> {
    config.validate()?;

    #[cfg(not(feature = "parallel"))]
    {
        Ok(jobs.iter().map(|job| job.run(config)).collect())
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        Ok(jobs.par_iter().map(|job| job.run(config)).collect())
    }
}

// ── Job bodies ────────────────────────────────────────────────────────────────

fn run_calibration(job: &CalibrationJob, config: &PipelineConfig) -> PipelineResult<usize> {
    let content = std::fs::read_to_string(&job.sites).map_err(TcError::from)?;
    let sites = parse_sensor_sites(&content, config.delimiter_byte())?;
    let measurements = load_measurements_csv(&job.measurements, config.delimiter_byte())?;

    let settings = CalibrationSettings {
        flow_period:   config.calibrator_period_secs,
        snap_radius_m: config.snap_radius_m,
        template:      job.template.clone(),
        ..CalibrationSettings::default()
    };
    let locator = job.locator.as_ref();
    let calibrators = build_calibrators(&sites, measurements, locator, &settings);
    let detectors = match &job.detector_file {
        Some(file) => build_detectors(&sites, locator, config.snap_radius_m, file),
        None => Vec::new(),
    };

    additional_document(&calibrators, &detectors).write_file(&job.output)?;
    Ok(calibrators.len() + detectors.len())
}

fn run_export(job: &ExportJob, config: &PipelineConfig) -> PipelineResult<usize> {
    let schema = job.source.schema();
    let speed_columns: Vec<&str> = if job.speeds_to_kph {
        config
            .speed_columns
            .iter()
            .map(String::as_str)
            .filter(|c| schema.column_with_name(c).is_some())
            .collect()
    } else {
        Vec::new()
    };

    let batches = job.source.batches(config)?;
    let batches: BatchStream = if speed_columns.is_empty() {
        batches
    } else {
        let columns: Vec<String> = speed_columns.iter().map(|c| (*c).to_owned()).collect();
        Box::new(batches.map(move |b| b.and_then(|b| convert_speed_to_kph(&b, &columns, &ConvertMode::Replace))))
    };

    let rows = match job.format {
        TableFormat::Csv => {
            let mut writer = CsvTableWriter::new(&job.output, schema)?;
            write_all(&mut writer, batches)?
        }
        #[cfg(feature = "parquet")]
        TableFormat::Parquet => {
            let mut writer = tc_table::ParquetTableWriter::new(&job.output, schema)?;
            write_all(&mut writer, batches)?
        }
    };
    Ok(rows)
}

fn run_kpi(job: &KpiJob, config: &PipelineConfig) -> PipelineResult<usize> {
    let mut acc = KpiAccumulator::new(&config.categories);
    for trip in stream_tripinfo_file(&job.trips)? {
        acc.push(&trip?);
    }
    let trips = acc.trip_count();
    let table = acc.finish().to_record_batch()?;

    let mut writer = CsvTableWriter::new(&job.output, table.schema())?;
    writer.write_batch(&table)?;
    writer.finish()?;
    Ok(trips)
}
