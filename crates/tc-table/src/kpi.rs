//! Trip KPIs per vehicle category.
//!
//! Trips are folded one at a time into running sums, so a trip-summary stream
//! of any length is aggregated in memory proportional to the number of
//! categories.  The finished [`KpiTable`] has one row per metric statistic
//! and one column per category:
//!
//! ```text
//! metrics                      | Light   | Heavy   | Total
//! time_loss_sum                | 10s     | 20s     | 30s
//! ...
//! waiting_time_mean            | 5s      | 10s     | 7s
//! ```

use std::sync::Arc;

use arrow::array::{ArrayRef, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;
use tracing::debug;

use tc_core::{CategorySpec, format_duration};
use tc_parse::TripRecord;

use crate::TableResult;

/// Aggregated trip metrics, in table order.
pub const KPI_METRICS: [&str; 5] = [
    "time_loss",
    "depart_delay",
    "duration",
    "time_loss_depart_delay",
    "waiting_time",
];

/// Category of trips whose vehicle type is not mapped.
pub const OTHER_CATEGORY: &str = "Other";

/// Synthetic category covering every trip.
pub const TOTAL_CATEGORY: &str = "Total";

fn metric_values(t: &TripRecord) -> [f64; 5] {
    [
        t.time_loss,
        t.depart_delay,
        t.duration,
        t.time_loss + t.depart_delay,
        t.waiting_time,
    ]
}

#[derive(Clone, Copy, Debug, Default)]
struct Sums {
    totals: [f64; 5],
    count:  usize,
}

impl Sums {
    fn add(&mut self, values: [f64; 5]) {
        for (acc, v) in self.totals.iter_mut().zip(values) {
            *acc += v;
        }
        self.count += 1;
    }

    /// `NaN` for an empty group.
    fn means(&self) -> [f64; 5] {
        self.totals.map(|s| s / self.count as f64)
    }
}

// ── KpiAccumulator ────────────────────────────────────────────────────────────

/// Streaming category aggregation.
///
/// A vehicle type listed under several categories counts toward the first.
/// Categories sharing a label are merged.
#[derive(Clone, Debug)]
pub struct KpiAccumulator {
    /// vehicle type → index into `labels`.
    lookup: FxHashMap<String, usize>,
    labels: Vec<String>,
    groups: Vec<Sums>,
    /// Index of `Other` in `labels`; shared with a mapped `"Other"` label.
    other:  usize,
    total:  Sums,
}

impl KpiAccumulator {
    pub fn new(categories: &[CategorySpec]) -> Self {
        let mut lookup = FxHashMap::default();
        let mut labels: Vec<String> = Vec::new();
        for spec in categories {
            let idx = match labels.iter().position(|l| *l == spec.label) {
                Some(idx) => idx,
                None => {
                    labels.push(spec.label.clone());
                    labels.len() - 1
                }
            };
            for vtype in &spec.vehicle_types {
                lookup.entry(vtype.clone()).or_insert(idx);
            }
        }
        let other = match labels.iter().position(|l| l == OTHER_CATEGORY) {
            Some(idx) => idx,
            None => {
                labels.push(OTHER_CATEGORY.to_owned());
                labels.len() - 1
            }
        };
        let groups = vec![Sums::default(); labels.len()];
        Self { lookup, labels, groups, other, total: Sums::default() }
    }

    pub fn push(&mut self, trip: &TripRecord) {
        let values = metric_values(trip);
        let idx = self.lookup.get(trip.v_type.as_str()).copied().unwrap_or(self.other);
        self.groups[idx].add(values);
        self.total.add(values);
    }

    /// Trips folded in so far.
    pub fn trip_count(&self) -> usize {
        self.total.count
    }

    /// Columns: categories with at least one trip in mapping order, then
    /// `Total`.  Unmapped trips land in `Other`, which sits after the mapped
    /// labels unless the mapping names it itself.
    pub fn finish(self) -> KpiTable {
        let mut columns: Vec<(String, Sums)> = self
            .labels
            .into_iter()
            .zip(self.groups)
            .filter(|(_, sums)| sums.count > 0)
            .collect();
        columns.push((TOTAL_CATEGORY.to_owned(), self.total));
        debug!(trips = self.total.count, categories = columns.len() - 1, "trip KPIs aggregated");

        let metrics = KPI_METRICS
            .iter()
            .map(|m| format!("{m}_sum"))
            .chain(KPI_METRICS.iter().map(|m| format!("{m}_mean")))
            .collect();
        let values = columns
            .iter()
            .map(|(_, sums)| {
                let mut v = sums.totals.to_vec();
                v.extend(sums.means());
                v
            })
            .collect();
        KpiTable {
            metrics,
            categories: columns.into_iter().map(|(label, _)| label).collect(),
            values,
        }
    }
}

impl<'a> Extend<&'a TripRecord> for KpiAccumulator {
    fn extend<T: IntoIterator<Item = &'a TripRecord>>(&mut self, iter: T) {
        for trip in iter {
            self.push(trip);
        }
    }
}

impl Extend<TripRecord> for KpiAccumulator {
    fn extend<T: IntoIterator<Item = TripRecord>>(&mut self, iter: T) {
        for trip in iter {
            self.push(&trip);
        }
    }
}

// ── KpiTable ──────────────────────────────────────────────────────────────────

/// Pivoted KPI table: metric rows × category columns, values in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct KpiTable {
    metrics:    Vec<String>,
    categories: Vec<String>,
    /// `values[category][metric]`.
    values:     Vec<Vec<f64>>,
}

impl KpiTable {
    /// Row labels: `<metric>_sum` for every metric, then `<metric>_mean`.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Raw value in seconds.
    pub fn value(&self, metric: &str, category: &str) -> Option<f64> {
        let m = self.metrics.iter().position(|x| x == metric)?;
        let c = self.categories.iter().position(|x| x == category)?;
        Some(self.values[c][m])
    }

    /// Value rendered as `"<d>d <h>h <m>m <s>s"`.
    pub fn formatted(&self, metric: &str, category: &str) -> Option<String> {
        self.value(metric, category).map(format_duration)
    }

    /// String table with a leading `metrics` column and one formatted-duration
    /// column per category.
    pub fn to_record_batch(&self) -> TableResult<RecordBatch> {
        let mut fields = vec![Field::new("metrics", DataType::Utf8, false)];
        fields.extend(self.categories.iter().map(|c| Field::new(c, DataType::Utf8, false)));

        let mut metric_col = StringBuilder::new();
        for m in &self.metrics {
            metric_col.append_value(m);
        }
        let mut columns: Vec<ArrayRef> = vec![Arc::new(metric_col.finish())];
        for per_category in &self.values {
            let mut col = StringBuilder::new();
            for &v in per_category {
                col.append_value(format_duration(v));
            }
            columns.push(Arc::new(col.finish()));
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }
}
