#![allow(dead_code)]

use dimevents_core::{Dataset, DimensionMapping, EventTable, Value, values};

#[derive(Clone, Copy, Debug)]
pub struct BenchmarkTier {
    pub name: &'static str,
    pub frames: usize,
    pub events: usize,
}

pub const TIER_S: BenchmarkTier = BenchmarkTier {
    name: "S",
    frames: 2_500,
    events: 50,
};

pub const TIER_M: BenchmarkTier = BenchmarkTier {
    name: "M",
    frames: 25_000,
    events: 500,
};

pub const TIER_L: BenchmarkTier = BenchmarkTier {
    name: "L",
    frames: 250_000,
    events: 5_000,
};

pub const TIERS: [BenchmarkTier; 3] = [TIER_S, TIER_M, TIER_L];

/// A tracking dataset with `tier.events` passes spread over `tier.frames`
/// frames. Every third pass leaves a short gap after it and every fifth
/// overlaps the next one.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub fn synthetic_match(tier: BenchmarkTier) -> Dataset {
    let frames: Vec<Value> = (0..tier.frames as i64).map(Value::Int).collect();
    let trajectory: Vec<Value> = (0..tier.frames * 2)
        .map(|i| Value::Float((i as f64 * 0.01).sin()))
        .collect();

    let width = (tier.frames / tier.events) as i64;
    let mut starts = Vec::with_capacity(tier.events);
    let mut ends = Vec::with_capacity(tier.events);
    for i in 0..tier.events as i64 {
        let start = i * width;
        let end = match i {
            i if i % 5 == 4 => start + width + width / 4,
            i if i % 3 == 2 => start + width - width / 4,
            _ => start + width - 1,
        };
        starts.push(Value::Int(start));
        ends.push(Value::Int(end.min(tier.frames as i64 - 1)));
    }

    let mut ds = Dataset::new()
        .with_coord("frame", frames)
        .and_then(|ds| ds.with_coord("cartesian_coords", values(["x", "y"])))
        .and_then(|ds| ds.with_data_var("ball_trajectory", &["frame", "cartesian_coords"], trajectory))
        .expect("synthetic dataset");
    let table = EventTable::from_columns([
        ("event_type", vec![Value::from("pass"); tier.events]),
        ("start_frame", starts),
        ("end_frame", ends),
    ])
    .expect("synthetic events");
    let mapping = DimensionMapping::new().with_duration("frame", "start_frame", "end_frame");
    ds.events().load(table, Some(mapping)).expect("load synthetic events");
    ds
}
