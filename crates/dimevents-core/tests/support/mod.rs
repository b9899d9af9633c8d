//! Shared fixtures for the integration tests and benches.
#![allow(dead_code)]

use dimevents_core::{Dataset, DimensionMapping, EventTable, Value, values};

/// `n` points of an exponential ball trajectory in the `x`/`y` plane: the
/// logs of the two components run linearly from `(-6, -8)` to `(3, 2)`.
#[allow(clippy::cast_precision_loss)]
pub fn trajectory(n: usize) -> Vec<Value> {
    let last = n.saturating_sub(1).max(1) as f64;
    (0..n)
        .flat_map(|i| {
            let t = i as f64 / last;
            [(-6.0 + 9.0 * t).exp(), (-8.0 + 10.0 * t).exp()]
        })
        .map(Value::Float)
        .collect()
}

/// A match recording over the given frame labels.
pub fn tracking(frames: Vec<Value>) -> Dataset {
    let n = frames.len();
    Dataset::new()
        .with_coord("frame", frames)
        .and_then(|ds| ds.with_coord("cartesian_coords", values(["x", "y"])))
        .and_then(|ds| ds.with_data_var("ball_trajectory", &["frame", "cartesian_coords"], trajectory(n)))
        .expect("valid tracking dataset")
        .with_attr("match_id", serde_json::json!(12))
        .with_attr("resolution_fps", serde_json::json!(25))
}

pub fn frames(range: std::ops::RangeInclusive<i64>) -> Vec<Value> {
    range.map(Value::Int).collect()
}

/// `pass`/`goal`-style events with the given bounds.
pub fn events(types: &[&str], starts: Vec<Value>, ends: Vec<Value>) -> EventTable {
    EventTable::from_columns([
        ("event_type", values(types.iter().copied())),
        ("start_frame", starts),
        ("end_frame", ends),
    ])
    .expect("valid event table")
}

pub fn frame_duration() -> DimensionMapping {
    DimensionMapping::new().with_duration("frame", "start_frame", "end_frame")
}

/// Tracking data with `events` attached under [`frame_duration`].
pub fn loaded(frames: Vec<Value>, events: EventTable) -> Dataset {
    let mut ds = tracking(frames);
    ds.events()
        .load(events, Some(frame_duration()))
        .expect("load events");
    ds
}

pub fn floats(array: &[Value]) -> Vec<f64> {
    array
        .iter()
        .map(|v| v.as_f64().expect("numeric value"))
        .collect()
}

pub fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() <= 1e-9 * e.abs().max(1.0), "{actual:?} vs {expected:?}");
    }
}
