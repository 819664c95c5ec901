//! kpi-report — runs the export and KPI jobs listed in a JSON job file.
//!
//! ```text
//! RUST_LOG=info kpi-report jobs.json
//! ```
//!
//! ```json
//! {
//!   "config":  { "categories": [{ "vehicle_types": ["car"], "label": "Light" }] },
//!   "exports": [
//!     { "source": "meandata", "input": "edgedata.xml", "output": "edgedata.csv", "kph": true },
//!     { "source": "detectors", "input": "det.xml", "output": "det.csv",
//!       "reference": "2024-05-01T00:00:00" }
//!   ],
//!   "kpis":    [{ "trips": "tripinfo.xml", "output": "kpi.csv" }]
//! }
//! ```
//!
//! Calibration jobs need a road network and are driven from library code.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tc_core::PipelineConfig;
use tc_pipeline::{ExportJob, Job, KpiJob, Source, TableFormat, run_jobs};


// ── Job file ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct JobFile {
    #[serde(default)]
    config:  PipelineConfig,
    #[serde(default)]
    exports: Vec<ExportEntry>,
    #[serde(default)]
    kpis:    Vec<KpiEntry>,
}

/// Simulation time zero of a detector document.
const REFERENCE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
struct ExportEntry {
    #[serde(flatten)]
    source:  ExportSource,
    output:  PathBuf,
    #[serde(default)]
    kph:     bool,
    #[serde(default)]
    parquet: bool,
}

/// Input shape, selected by the `source` key.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
enum ExportSource {
    Sensors {
        input: PathBuf,
    },
    Detectors {
        input:     PathBuf,
        #[serde(deserialize_with = "reference_time")]
        reference: NaiveDateTime,
    },
    MeanData {
        input: PathBuf,
    },
    TripInfo {
        input: PathBuf,
    },
}

fn reference_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, REFERENCE_FORMAT)
        .map_err(|e| de::Error::custom(format!("invalid reference {raw:?}: {e}")))
}

#[derive(Deserialize)]
struct KpiEntry {
    trips:  PathBuf,
    output: PathBuf,
}

impl From<ExportSource> for Source {
    fn from(source: ExportSource) -> Self {
        match source {
            ExportSource::Sensors { input } => Source::RoadwaySensorRows { path: input },
            ExportSource::Detectors { input, reference } => {
                Source::InductionLoopDocument { path: input, reference }
            }
            ExportSource::MeanData { input } => Source::MeanDataDocument { path: input },
            ExportSource::TripInfo { input } => Source::TripSummaryDocument { path: input },
        }
    }
}

impl ExportEntry {
    fn into_job(self) -> Result<Job> {
        Ok(Job::Export(ExportJob {
            source:        self.source.into(),
            output:        self.output,
            format:        table_format(self.parquet)?,
            speeds_to_kph: self.kph,
        }))
    }
}

#[cfg(feature = "parquet")]
fn table_format(parquet: bool) -> Result<TableFormat> {
    Ok(if parquet { TableFormat::Parquet } else { TableFormat::Csv })
}

#[cfg(not(feature = "parquet"))]
fn table_format(parquet: bool) -> Result<TableFormat> {
    if parquet {
        bail!("Parquet output needs the `parquet` feature");
    }
    Ok(TableFormat::Csv)
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: kpi-report <jobs.json>");
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let file: JobFile = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;

    let mut jobs = Vec::with_capacity(file.exports.len() + file.kpis.len());
    for entry in file.exports {
        jobs.push(entry.into_job()?);
    }
    jobs.extend(file.kpis.into_iter().map(|k| Job::Kpi(KpiJob { trips: k.trips, output: k.output })));
    info!(jobs = jobs.len(), "job file loaded");

    let t0 = Instant::now();
    let reports = run_jobs(&jobs, &file.config)?;

    let mut failed = 0usize;
    for report in &reports {
        match report {
            Ok(r) => info!(job = %r.name, records = r.records, output = %r.output.display(), "done"),
            Err(e) => {
                failed += 1;
                error!(error = %e, "job failed");
            }
        }
    }
    info!(elapsed = ?t0.elapsed(), ok = reports.len() - failed, failed, "all jobs finished");

    if failed > 0 {
        bail!("{failed} of {} jobs failed", reports.len());
    }
    Ok(())
}
