//! Table-level reshaping of measurement tables.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, Float64Builder, StringBuilder, TimestampSecondBuilder,
};
use arrow::datatypes::{DataType, Field, FieldRef, Float64Type, Schema, TimestampSecondType};
use arrow::compute::cast;
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;
use tracing::debug;

use tc_core::MPS_TO_KPH;

use crate::row::timestamp_type;
use crate::{TableError, TableResult};

// ── aggregate_by_edge ─────────────────────────────────────────────────────────

/// Parent edge of a per-lane detector id: `"<edge>_<digits>"` → `"<edge>"`.
/// Ids without a numeric suffix have no edge.
pub fn edge_of_lane_sensor(sensor_id: &str) -> Option<&str> {
    let (edge, index) = sensor_id.rsplit_once('_')?;
    (!index.is_empty() && index.bytes().all(|b| b.is_ascii_digit())).then_some(edge)
}

#[derive(Default)]
struct EdgeGroup {
    flow:        f64,
    speed_sum:   f64,
    speed_count: usize,
}

/// Collapse per-lane detector rows into per-edge rows.
///
/// Input needs `sensor_id` (Utf8), `timestamp` (Timestamp(Second)), `flow`
/// and `speed` (Float64).  Output columns are `edge_id`, `timestamp`, `flow`
/// (sum over lanes) and `speed` (mean over lanes, null when no lane reported
/// one), sorted by timestamp then edge id.  Rows whose sensor id has no lane
/// suffix are grouped under a null edge id.
pub fn aggregate_by_edge(batch: &RecordBatch) -> TableResult<RecordBatch> {
    let sensor_ids = column(batch, "sensor_id")?
        .as_string_opt::<i32>()
        .ok_or_else(|| wrong_type("sensor_id", "Utf8"))?;
    let timestamps = column(batch, "timestamp")?
        .as_primitive_opt::<TimestampSecondType>()
        .ok_or_else(|| wrong_type("timestamp", "Timestamp(Second)"))?;
    let flows = float_column(batch, "flow")?;
    let speeds = float_column(batch, "speed")?;

    let mut groups: FxHashMap<(Option<&str>, Option<i64>), EdgeGroup> = FxHashMap::default();
    for row in 0..batch.num_rows() {
        let edge = sensor_ids.is_valid(row).then(|| sensor_ids.value(row)).and_then(edge_of_lane_sensor);
        let ts = timestamps.is_valid(row).then(|| timestamps.value(row));
        let group = groups.entry((edge, ts)).or_default();
        if flows.is_valid(row) {
            group.flow += flows.value(row);
        }
        if speeds.is_valid(row) {
            group.speed_sum += speeds.value(row);
            group.speed_count += 1;
        }
    }

    let mut keys: Vec<_> = groups.keys().copied().collect();
    keys.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut edge_ids  = StringBuilder::new();
    let mut ts_out    = TimestampSecondBuilder::new();
    let mut flow_out  = Float64Builder::new();
    let mut speed_out = Float64Builder::new();
    for key in &keys {
        let g = &groups[key];
        edge_ids.append_option(key.0);
        ts_out.append_option(key.1);
        flow_out.append_value(g.flow);
        speed_out.append_option((g.speed_count > 0).then(|| g.speed_sum / g.speed_count as f64));
    }
    debug!(rows_in = batch.num_rows(), rows_out = keys.len(), "aggregated detectors by edge");

    let schema = Arc::new(Schema::new(vec![
        Field::new("edge_id",   DataType::Utf8,    true),
        Field::new("timestamp", timestamp_type(),  true),
        Field::new("flow",      DataType::Float64, false),
        Field::new("speed",     DataType::Float64, true),
    ]));
    Ok(RecordBatch::try_new(schema, vec![
        Arc::new(edge_ids.finish()),
        Arc::new(ts_out.finish()),
        Arc::new(flow_out.finish()),
        Arc::new(speed_out.finish()),
    ])?)
}

// ── aggregate_by_sensor ───────────────────────────────────────────────────────

/// Reduction applied to every numeric column by [`aggregate_by_sensor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Aggregator {
    Sum,
    Mean,
    Min,
    Max,
    /// Number of non-null values.
    Count,
}

#[derive(Clone, Copy)]
struct Reduction {
    sum:   f64,
    min:   f64,
    max:   f64,
    count: usize,
}

impl Default for Reduction {
    fn default() -> Self {
        Self { sum: 0.0, min: f64::INFINITY, max: f64::NEG_INFINITY, count: 0 }
    }
}

impl Reduction {
    fn add(&mut self, v: f64) {
        self.sum += v;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self.count += 1;
    }

    fn value(&self, aggregator: Aggregator) -> Option<f64> {
        match aggregator {
            Aggregator::Sum => Some(self.sum),
            Aggregator::Count => Some(self.count as f64),
            _ if self.count == 0 => None,
            Aggregator::Mean => Some(self.sum / self.count as f64),
            Aggregator::Min => Some(self.min),
            Aggregator::Max => Some(self.max),
        }
    }
}

/// One row per `sensor_id` with every numeric column reduced by `aggregator`.
///
/// `timestamp` and non-numeric columns are dropped; reduced columns come out
/// as nullable Float64 in input order.  Nulls are skipped, so `Mean`, `Min`
/// and `Max` of an all-null group are null.  Rows are sorted by sensor id.
pub fn aggregate_by_sensor(batch: &RecordBatch, aggregator: Aggregator) -> TableResult<RecordBatch> {
    let sensor_ids = column(batch, "sensor_id")?
        .as_string_opt::<i32>()
        .ok_or_else(|| wrong_type("sensor_id", "Utf8"))?;

    let schema = batch.schema();
    let mut names: Vec<&str> = Vec::new();
    let mut values: Vec<ArrayRef> = Vec::new();
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let name = field.name().as_str();
        if name == "sensor_id" || name == "timestamp" || !field.data_type().is_numeric() {
            continue;
        }
        names.push(name);
        values.push(cast(array.as_ref(), &DataType::Float64)?);
    }
    let columns: Vec<&Float64Array> = values.iter().map(|a| a.as_primitive::<Float64Type>()).collect();

    let mut groups: FxHashMap<Option<&str>, Vec<Reduction>> = FxHashMap::default();
    for row in 0..batch.num_rows() {
        let id = sensor_ids.is_valid(row).then(|| sensor_ids.value(row));
        let group = groups
            .entry(id)
            .or_insert_with(|| vec![Reduction::default(); columns.len()]);
        for (acc, col) in group.iter_mut().zip(&columns) {
            if col.is_valid(row) {
                acc.add(col.value(row));
            }
        }
    }

    let mut keys: Vec<_> = groups.keys().copied().collect();
    keys.sort();

    let mut ids = StringBuilder::new();
    let mut builders: Vec<Float64Builder> = columns.iter().map(|_| Float64Builder::new()).collect();
    for key in &keys {
        ids.append_option(*key);
        for (builder, acc) in builders.iter_mut().zip(&groups[key]) {
            builder.append_option(acc.value(aggregator));
        }
    }
    debug!(rows_in = batch.num_rows(), sensors = keys.len(), ?aggregator, "aggregated by sensor");

    let mut fields = vec![Field::new("sensor_id", DataType::Utf8, true)];
    fields.extend(names.iter().map(|n| Field::new(*n, DataType::Float64, true)));
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(ids.finish())];
    arrays.extend(builders.iter_mut().map(|b| Arc::new(b.finish()) as ArrayRef));
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

// ── convert_speed_to_kph ──────────────────────────────────────────────────────

/// Where converted speed columns go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConvertMode {
    /// Keep the m/s column and add `<name><suffix>` next to the end of the table.
    Append { suffix: String },
    /// Overwrite the m/s column in place.
    Replace,
}

impl Default for ConvertMode {
    fn default() -> Self {
        ConvertMode::Append { suffix: "_kph".to_owned() }
    }
}

/// Multiply each named Float64 column by 3.6 (m/s → km/h).
///
/// A named column that is missing or not Float64 is an `InvalidTable` error.
pub fn convert_speed_to_kph<S: AsRef<str>>(
    batch:   &RecordBatch,
    columns: &[S],
    mode:    &ConvertMode,
) -> TableResult<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    let mut arrays: Vec<ArrayRef> = batch.columns().to_vec();

    for name in columns {
        let name = name.as_ref();
        let (idx, field) = schema
            .column_with_name(name)
            .ok_or_else(|| TableError::InvalidTable(format!("missing column {name:?}")))?;
        let converted: Float64Array = float_column(batch, name)?.unary(|v| v * MPS_TO_KPH);
        let converted: ArrayRef = Arc::new(converted);
        match mode {
            ConvertMode::Replace => arrays[idx] = converted,
            ConvertMode::Append { suffix } => {
                fields.push(Arc::new(Field::new(
                    format!("{name}{suffix}"),
                    DataType::Float64,
                    field.is_nullable(),
                )));
                arrays.push(converted);
            }
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn column<'a>(batch: &'a RecordBatch, name: &str) -> TableResult<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| TableError::InvalidTable(format!("missing column {name:?}")))
}

fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> TableResult<&'a Float64Array> {
    column(batch, name)?
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| wrong_type(name, "Float64"))
}

fn wrong_type(name: &str, expected: &str) -> TableError {
    TableError::InvalidTable(format!("column {name:?} must be {expected}"))
}
