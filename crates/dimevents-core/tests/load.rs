mod support;

use dimevents_core::{DimensionMapping, ErrorCode, EventsError, MappingEntry, values};
use support::{events, frame_duration, frames, tracking};

fn overlapping() -> dimevents_core::EventTable {
    events(&["pass", "goal"], values([1, 100]), values([200, 250]))
}

#[test]
fn table_is_attached_unchanged() {
    let mut ds = tracking(frames(1..=250));
    let table = events(&["pass", "goal"], values([1, 175]), values([174, 250]));
    let loaded = ds.events().load(table.clone(), None).expect("load");
    assert_eq!(loaded.events().table(), Some(&table));
    assert!(loaded.events().mapping().is_none());
}

#[test]
fn unknown_columns_are_rejected() {
    let mut ds = tracking(frames(1..=250));
    let mapping = DimensionMapping::new().with_duration("frame", "starting_frame", "finishing_frame");
    let err = ds
        .events()
        .load(overlapping(), Some(mapping))
        .expect_err("unknown columns");
    assert_eq!(
        err,
        EventsError::InvalidMapping {
            unknown_columns: vec!["finishing_frame".into(), "starting_frame".into()],
            unknown_dimensions: vec![],
        }
    );
    assert_eq!(err.code(), ErrorCode::InvalidMapping);
    assert!(ds.events().table().is_none());
}

#[test]
fn unknown_dimensions_are_rejected() {
    let mut ds = tracking(frames(1..=250));
    let mapping = DimensionMapping::new().with_duration("f", "start_frame", "end_frame");
    assert_eq!(
        ds.events().load(overlapping(), Some(mapping)).err(),
        Some(EventsError::InvalidMapping {
            unknown_columns: vec![],
            unknown_dimensions: vec!["f".into()],
        })
    );
}

#[test]
fn valid_mapping_is_stored_and_dataset_is_otherwise_untouched() {
    let mut ds = tracking(frames(1..=250));
    let before = ds.clone();
    let loaded = ds
        .events()
        .load(overlapping(), Some(frame_duration()))
        .expect("load");
    assert!(loaded.equals(&before));
    assert_eq!(loaded.attrs().get("resolution_fps"), Some(&serde_json::json!(25)));
    assert_eq!(loaded.events().mapping(), Some(&frame_duration()));
}

#[test]
fn mappings_deserialize_from_json() {
    let mapping: DimensionMapping =
        serde_json::from_str(r#"{"frame": [["start_frame", "end_frame"], "peak_frame"]}"#)
            .expect("parse mapping");
    assert_eq!(
        mapping.get("frame"),
        Some(&MappingEntry::Multiple(vec![
            MappingEntry::duration("start_frame", "end_frame"),
            MappingEntry::column("peak_frame"),
        ]))
    );

    let pair: DimensionMapping =
        serde_json::from_str(r#"{"frame": ["start_frame", "end_frame"]}"#).expect("parse pair");
    assert_eq!(pair, frame_duration());
}

#[test]
fn set_mapping_replaces_the_stored_one() {
    let mut ds = tracking(frames(1..=250));
    ds.events()
        .load(overlapping(), Some(DimensionMapping::new().with_column("frame", "end_frame")))
        .expect("load");

    let mut events = ds.events();
    events.set_mapping(frame_duration()).expect("set mapping");
    assert_eq!(events.mapping(), Some(&frame_duration()));
    assert!(events.duration_mapping().expect("duration").is_some());
}
