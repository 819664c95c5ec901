//! Columnar layouts of the pipeline's record types.
//!
//! | Record                      | Rows per record        | Key columns                     |
//! |-----------------------------|------------------------|---------------------------------|
//! | `RoadwaySensorMeasurement`  | 1                      | `timestamp`, `sensor_id`        |
//! | `InductionLoopMeasurement`  | 1                      | `timestamp`, `sensor_id`        |
//! | `Interval`                  | one per `TrafficStats` | `begin`, `end`, `edge_id`, `lane_id` |
//! | `TripRecord`                | 1                      | `id`, `v_type`                  |
//! | `Flow`                      | 1                      | `begin`, `end`                  |
//!
//! Timestamps are `Timestamp(Second, None)`: zone-less, like the values they
//! come from.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int32Builder, Int64Builder, StringBuilder, TimestampSecondBuilder};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;

use tc_measure::{InductionLoopMeasurement, Measurement, RoadwaySensorMeasurement};
use tc_model::Flow;
use tc_parse::{Interval, TripRecord};

use crate::TableResult;

/// A record type with a fixed Arrow layout.
pub trait TableRow: Sized {
    fn schema() -> SchemaRef;

    /// Number of table rows this record expands to.
    fn row_count(&self) -> usize {
        1
    }

    fn to_record_batch(rows: &[Self]) -> TableResult<RecordBatch>;
}

/// Shorthand for `T::to_record_batch(rows)`.
pub fn to_record_batch<T: TableRow>(rows: &[T]) -> TableResult<RecordBatch> {
    T::to_record_batch(rows)
}

pub(crate) fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Second, None)
}

pub(crate) fn epoch_secs(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp()
}

fn batch(schema: SchemaRef, columns: Vec<ArrayRef>) -> TableResult<RecordBatch> {
    Ok(RecordBatch::try_new(schema, columns)?)
}

// ── Measurements ──────────────────────────────────────────────────────────────

impl TableRow for RoadwaySensorMeasurement {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("timestamp",            timestamp_type(), false),
            Field::new("sensor_id",            DataType::Utf8,   false),
            Field::new("count_point_id",       DataType::Int64,  false),
            Field::new("count_point_name",     DataType::Utf8,   false),
            Field::new("flow",                 DataType::Float64, true),
            Field::new("occupancy",            DataType::Float64, true),
            Field::new("speed",                DataType::Float64, true),
            Field::new("flow_confidence",      DataType::Utf8,   false),
            Field::new("occupancy_confidence", DataType::Utf8,   false),
            Field::new("speed_confidence",     DataType::Utf8,   false),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> TableResult<RecordBatch> {
        let mut timestamps = TimestampSecondBuilder::new();
        let mut sensor_ids = StringBuilder::new();
        let mut point_ids  = Int64Builder::new();
        let mut names      = StringBuilder::new();
        let mut flows      = Float64Builder::new();
        let mut occupancy  = Float64Builder::new();
        let mut speeds     = Float64Builder::new();
        let mut flow_conf  = StringBuilder::new();
        let mut occ_conf   = StringBuilder::new();
        let mut speed_conf = StringBuilder::new();

        for m in rows {
            timestamps.append_value(epoch_secs(m.timestamp()));
            sensor_ids.append_value(m.sensor_id());
            point_ids.append_value(m.count_point_id());
            names.append_value(m.count_point_name());
            flows.append_option(m.flow());
            occupancy.append_option(m.occupancy());
            speeds.append_option(m.speed());
            flow_conf.append_value(m.flow_confidence());
            occ_conf.append_value(m.occupancy_confidence());
            speed_conf.append_value(m.speed_confidence());
        }

        batch(Self::schema(), vec![
            Arc::new(timestamps.finish()),
            Arc::new(sensor_ids.finish()),
            Arc::new(point_ids.finish()),
            Arc::new(names.finish()),
            Arc::new(flows.finish()),
            Arc::new(occupancy.finish()),
            Arc::new(speeds.finish()),
            Arc::new(flow_conf.finish()),
            Arc::new(occ_conf.finish()),
            Arc::new(speed_conf.finish()),
        ])
    }
}

impl TableRow for InductionLoopMeasurement {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("timestamp",      timestamp_type(),  false),
            Field::new("sensor_id",      DataType::Utf8,    false),
            Field::new("flow",           DataType::Float64, false),
            Field::new("speed",          DataType::Float64, false),
            Field::new("occupancy",      DataType::Float64, false),
            Field::new("harmonic_speed", DataType::Float64, false),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> TableResult<RecordBatch> {
        let mut timestamps = TimestampSecondBuilder::new();
        let mut sensor_ids = StringBuilder::new();
        let mut flows      = Float64Builder::new();
        let mut speeds     = Float64Builder::new();
        let mut occupancy  = Float64Builder::new();
        let mut harmonic   = Float64Builder::new();

        for m in rows {
            timestamps.append_value(epoch_secs(m.timestamp()));
            sensor_ids.append_value(m.sensor_id());
            flows.append_value(m.flow);
            speeds.append_value(m.speed);
            occupancy.append_value(m.occupancy);
            harmonic.append_value(m.harmonic_speed);
        }

        batch(Self::schema(), vec![
            Arc::new(timestamps.finish()),
            Arc::new(sensor_ids.finish()),
            Arc::new(flows.finish()),
            Arc::new(speeds.finish()),
            Arc::new(occupancy.finish()),
            Arc::new(harmonic.finish()),
        ])
    }
}

// ── Simulation output ─────────────────────────────────────────────────────────

impl TableRow for Interval {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("begin",             DataType::Float64, false),
            Field::new("end",               DataType::Float64, false),
            Field::new("id",                DataType::Utf8,    false),
            Field::new("edge_id",           DataType::Utf8,    false),
            Field::new("lane_id",           DataType::Utf8,    false),
            Field::new("sampled_seconds",   DataType::Float64, false),
            Field::new("travel_time",       DataType::Float64, false),
            Field::new("density",           DataType::Float64, false),
            Field::new("occupancy",         DataType::Float64, false),
            Field::new("waiting_time",      DataType::Float64, false),
            Field::new("speed",             DataType::Float64, false),
            Field::new("departed",          DataType::Int32,   false),
            Field::new("arrived",           DataType::Int32,   false),
            Field::new("entered",           DataType::Int32,   false),
            Field::new("left",              DataType::Int32,   false),
            Field::new("lane_changed_from", DataType::Int32,   false),
            Field::new("lane_changed_to",   DataType::Int32,   false),
            Field::new("speed_relative",    DataType::Float64, true),
        ]))
    }

    fn row_count(&self) -> usize {
        self.data.values().map(Vec::len).sum()
    }

    fn to_record_batch(rows: &[Self]) -> TableResult<RecordBatch> {
        let mut begin        = Float64Builder::new();
        let mut end          = Float64Builder::new();
        let mut ids          = StringBuilder::new();
        let mut edge_ids     = StringBuilder::new();
        let mut lane_ids     = StringBuilder::new();
        let mut sampled      = Float64Builder::new();
        let mut travel       = Float64Builder::new();
        let mut density      = Float64Builder::new();
        let mut occupancy    = Float64Builder::new();
        let mut waiting      = Float64Builder::new();
        let mut speed        = Float64Builder::new();
        let mut departed     = Int32Builder::new();
        let mut arrived      = Int32Builder::new();
        let mut entered      = Int32Builder::new();
        let mut left         = Int32Builder::new();
        let mut changed_from = Int32Builder::new();
        let mut changed_to   = Int32Builder::new();
        let mut relative     = Float64Builder::new();

        for interval in rows {
            for (edge_id, s) in interval.stats() {
                begin.append_value(interval.begin);
                end.append_value(interval.end);
                ids.append_value(&interval.id);
                edge_ids.append_value(edge_id);
                lane_ids.append_value(&s.id);
                sampled.append_value(s.sampled_seconds);
                travel.append_value(s.travel_time);
                density.append_value(s.density);
                occupancy.append_value(s.occupancy);
                waiting.append_value(s.waiting_time);
                speed.append_value(s.speed);
                departed.append_value(s.departed);
                arrived.append_value(s.arrived);
                entered.append_value(s.entered);
                left.append_value(s.left);
                changed_from.append_value(s.lane_changed_from);
                changed_to.append_value(s.lane_changed_to);
                relative.append_option(s.speed_relative);
            }
        }

        batch(Self::schema(), vec![
            Arc::new(begin.finish()),
            Arc::new(end.finish()),
            Arc::new(ids.finish()),
            Arc::new(edge_ids.finish()),
            Arc::new(lane_ids.finish()),
            Arc::new(sampled.finish()),
            Arc::new(travel.finish()),
            Arc::new(density.finish()),
            Arc::new(occupancy.finish()),
            Arc::new(waiting.finish()),
            Arc::new(speed.finish()),
            Arc::new(departed.finish()),
            Arc::new(arrived.finish()),
            Arc::new(entered.finish()),
            Arc::new(left.finish()),
            Arc::new(changed_from.finish()),
            Arc::new(changed_to.finish()),
            Arc::new(relative.finish()),
        ])
    }
}

impl TableRow for TripRecord {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("id",            DataType::Utf8,    false),
            Field::new("depart",        DataType::Float64, false),
            Field::new("depart_lane",   DataType::Utf8,    false),
            Field::new("depart_pos",    DataType::Float64, false),
            Field::new("depart_speed",  DataType::Float64, false),
            Field::new("depart_delay",  DataType::Float64, false),
            Field::new("arrival",       DataType::Float64, false),
            Field::new("arrival_lane",  DataType::Utf8,    false),
            Field::new("arrival_pos",   DataType::Float64, false),
            Field::new("arrival_speed", DataType::Float64, false),
            Field::new("duration",      DataType::Float64, false),
            Field::new("route_length",  DataType::Float64, false),
            Field::new("waiting_time",  DataType::Float64, false),
            Field::new("waiting_count", DataType::Int32,   false),
            Field::new("stop_time",     DataType::Float64, false),
            Field::new("time_loss",     DataType::Float64, false),
            Field::new("reroute_no",    DataType::Int32,   false),
            Field::new("devices",       DataType::Utf8,    false),
            Field::new("v_type",        DataType::Utf8,    false),
            Field::new("speed_factor",  DataType::Float64, false),
            Field::new("vaporized",     DataType::Utf8,    false),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> TableResult<RecordBatch> {
        // Builders grouped by value type, each group in schema order.
        let mut strings: [StringBuilder; 6] = Default::default();
        let mut floats: [Float64Builder; 13] = Default::default();
        let mut ints: [Int32Builder; 2] = Default::default();

        for t in rows {
            for (b, v) in strings.iter_mut().zip([
                &t.id, &t.depart_lane, &t.arrival_lane, &t.devices, &t.v_type, &t.vaporized,
            ]) {
                b.append_value(v);
            }
            for (b, v) in floats.iter_mut().zip([
                t.depart, t.depart_pos, t.depart_speed, t.depart_delay, t.arrival, t.arrival_pos,
                t.arrival_speed, t.duration, t.route_length, t.waiting_time, t.stop_time,
                t.time_loss, t.speed_factor,
            ]) {
                b.append_value(v);
            }
            ints[0].append_value(t.waiting_count);
            ints[1].append_value(t.reroute_no);
        }

        let [id, depart_lane, arrival_lane, devices, v_type, vaporized] = strings.map(|mut b| b.finish());
        let [
            depart, depart_pos, depart_speed, depart_delay, arrival, arrival_pos, arrival_speed,
            duration, route_length, waiting_time, stop_time, time_loss, speed_factor,
        ] = floats.map(|mut b| b.finish());
        let [waiting_count, reroute_no] = ints.map(|mut b| b.finish());

        batch(Self::schema(), vec![
            Arc::new(id),
            Arc::new(depart),
            Arc::new(depart_lane),
            Arc::new(depart_pos),
            Arc::new(depart_speed),
            Arc::new(depart_delay),
            Arc::new(arrival),
            Arc::new(arrival_lane),
            Arc::new(arrival_pos),
            Arc::new(arrival_speed),
            Arc::new(duration),
            Arc::new(route_length),
            Arc::new(waiting_time),
            Arc::new(waiting_count),
            Arc::new(stop_time),
            Arc::new(time_loss),
            Arc::new(reroute_no),
            Arc::new(devices),
            Arc::new(v_type),
            Arc::new(speed_factor),
            Arc::new(vaporized),
        ])
    }
}

// ── Calibration flows ─────────────────────────────────────────────────────────

impl TableRow for Flow {
    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("begin",         DataType::Float64, false),
            Field::new("end",           DataType::Float64, false),
            Field::new("route",         DataType::Utf8,    true),
            Field::new("vehs_per_hour", DataType::Float64, true),
            Field::new("speed",         DataType::Float64, true),
            Field::new("type",          DataType::Utf8,    true),
            Field::new("depart_pos",    DataType::Utf8,    true),
            Field::new("depart_speed",  DataType::Utf8,    true),
            Field::new("arrival_pos",   DataType::Utf8,    true),
            Field::new("arrival_speed", DataType::Utf8,    true),
        ]))
    }

    fn to_record_batch(rows: &[Self]) -> TableResult<RecordBatch> {
        let mut begin    = Float64Builder::new();
        let mut end      = Float64Builder::new();
        let mut vph      = Float64Builder::new();
        let mut speed    = Float64Builder::new();
        let mut strings: [StringBuilder; 6] = Default::default();

        for f in rows {
            begin.append_value(f.begin());
            end.append_value(f.end());
            vph.append_option(f.vehs_per_hour());
            speed.append_option(f.speed());
            for (b, v) in strings.iter_mut().zip([
                f.route(), f.vehicle_type(), f.depart_pos(), f.depart_speed(), f.arrival_pos(),
                f.arrival_speed(),
            ]) {
                b.append_option(v);
            }
        }

        let [route, vtype, depart_pos, depart_speed, arrival_pos, arrival_speed] =
            strings.map(|mut b| b.finish());

        batch(Self::schema(), vec![
            Arc::new(begin.finish()),
            Arc::new(end.finish()),
            Arc::new(route),
            Arc::new(vph.finish()),
            Arc::new(speed.finish()),
            Arc::new(vtype),
            Arc::new(depart_pos),
            Arc::new(depart_speed),
            Arc::new(arrival_pos),
            Arc::new(arrival_speed),
        ])
    }
}
