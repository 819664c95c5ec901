//! Time-window filtering and as-of alignment of two measurement series.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};

use crate::measurement::Measurement;

/// Measurements with `start <= timestamp <= end`, in input order.
pub fn filter_by_time<M: Measurement>(
    measurements: &[M],
    start:        NaiveDateTime,
    end:          NaiveDateTime,
) -> Vec<&M> {
    measurements
        .iter()
        .filter(|m| (start..=end).contains(&m.timestamp()))
        .collect()
}

/// A left measurement and its nearest right-hand partner, if one was found
/// within tolerance.
#[derive(Debug)]
pub struct Alignment<'a, L, R> {
    pub left:  &'a L,
    pub right: Option<&'a R>,
}

impl<L, R> Clone for Alignment<'_, L, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L, R> Copy for Alignment<'_, L, R> {}

/// As-of join with the nearest strategy.
///
/// Every left measurement appears exactly once, ordered by
/// `(sensor_id, timestamp)`.  Its partner is the right measurement of the same
/// sensor whose timestamp is closest, provided the gap is at most `tolerance`.
/// On an exact tie the earlier right measurement wins.
pub fn align_measurements<'a, L: Measurement, R: Measurement>(
    left:      &'a [L],
    right:     &'a [R],
    tolerance: Duration,
) -> Vec<Alignment<'a, L, R>> {
    let mut by_sensor: BTreeMap<&str, Vec<&R>> = BTreeMap::new();
    for r in right {
        by_sensor.entry(r.sensor_id()).or_default().push(r);
    }
    for series in by_sensor.values_mut() {
        series.sort_by_key(|r| r.timestamp());
    }

    let mut ordered: Vec<&L> = left.iter().collect();
    ordered.sort_by(|a, b| {
        a.sensor_id()
            .cmp(b.sensor_id())
            .then_with(|| a.timestamp().cmp(&b.timestamp()))
    });

    ordered
        .into_iter()
        .map(|l| {
            let right = by_sensor
                .get(l.sensor_id())
                .and_then(|series| nearest(series, l.timestamp()))
                .filter(|r| l.time_diff(*r) <= tolerance);
            Alignment { left: l, right }
        })
        .collect()
}

fn nearest<'a, R: Measurement>(series: &[&'a R], at: NaiveDateTime) -> Option<&'a R> {
    let idx = series.partition_point(|r| r.timestamp() < at);
    let before = idx.checked_sub(1).and_then(|i| series.get(i)).copied();
    let after = series.get(idx).copied();
    match (before, after) {
        (Some(b), Some(a)) => {
            if at - b.timestamp() <= a.timestamp() - at { Some(b) } else { Some(a) }
        }
        (b, a) => b.or(a),
    }
}
