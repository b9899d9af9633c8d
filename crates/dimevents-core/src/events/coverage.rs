//! Event coverage of the duration dimension: spans, gaps and overlaps.
//!
//! An event's span is an inclusive run of *positions* along the duration
//! dimension's coordinate, found by looking its bounds up in that
//! coordinate. Coordinates need not be sorted or numeric. A bound that is not
//! itself a coordinate value snaps outward: a start to the largest coordinate
//! below it, an end to the smallest coordinate above it. A span lying wholly
//! beyond one end of the coordinate covers nothing.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use super::{Duration, Events, EventsError};
use crate::dataset::DatasetError;
use crate::table::EventTable;
use crate::value::Value;

/// Position lookup over one coordinate, built once per operation.
pub(crate) struct PositionLookup<'a> {
    coords: &'a [Value],
    first: HashMap<&'a Value, usize>,
}

impl<'a> PositionLookup<'a> {
    pub(crate) fn new(coords: &'a [Value]) -> Self {
        let mut first = HashMap::with_capacity(coords.len());
        for (pos, value) in coords.iter().enumerate() {
            first.entry(value).or_insert(pos);
        }
        Self { coords, first }
    }

    /// Position of the extreme coordinate selected by `better` among those
    /// `admissible`, first occurrence on ties.
    fn extreme(
        &self,
        admissible: impl Fn(&Value) -> bool,
        better: impl Fn(&Value, &Value) -> bool,
    ) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (pos, value) in self.coords.iter().enumerate() {
            if value.is_missing() || !admissible(value) {
                continue;
            }
            if best.is_none_or(|b| better(value, &self.coords[b])) {
                best = Some(pos);
            }
        }
        best
    }

    fn any(&self, admissible: impl Fn(&Value) -> bool) -> bool {
        self.coords
            .iter()
            .any(|v| !v.is_missing() && admissible(v))
    }

    /// `None` when `start` lies above every coordinate.
    fn start_position(&self, start: &Value) -> Option<usize> {
        if let Some(&pos) = self.first.get(start) {
            return Some(pos);
        }
        if !self.any(|v| v >= start) {
            return None;
        }
        self.extreme(|v| v <= start, |v, b| v > b)
            .or_else(|| self.extreme(|_| true, |v, b| v < b))
    }

    /// `None` when `end` lies below every coordinate.
    fn end_position(&self, end: &Value) -> Option<usize> {
        if let Some(&pos) = self.first.get(end) {
            return Some(pos);
        }
        if !self.any(|v| v <= end) {
            return None;
        }
        self.extreme(|v| v >= end, |v, b| v < b)
            .or_else(|| self.extreme(|_| true, |v, b| v > b))
    }

    /// Inclusive positional span from `start` to `end`, empty when either
    /// bound is missing, the end falls before the start, or the span misses
    /// the coordinate entirely.
    pub(crate) fn span(&self, start: &Value, end: &Value) -> Range<usize> {
        if start.is_missing() || end.is_missing() {
            return 0..0;
        }
        match (self.start_position(start), self.end_position(end)) {
            (Some(first), Some(last)) if first <= last => first..last + 1,
            _ => 0..0,
        }
    }

    /// One span per event row.
    pub(crate) fn spans(
        &self,
        table: &EventTable,
        duration: &Duration,
    ) -> Result<Vec<Range<usize>>, EventsError> {
        let starts = table.try_column(&duration.start)?;
        let ends = table.try_column(&duration.end)?;
        Ok(starts
            .iter()
            .zip(ends)
            .map(|(start, end)| self.span(start, end))
            .collect())
    }

    /// Per-position flag: does the position's value fall inside some span?
    ///
    /// Coverage is by value, so a value repeated in the coordinate counts as
    /// covered everywhere once any of its positions is.
    pub(crate) fn uncovered(&self, spans: &[Range<usize>]) -> Vec<bool> {
        let covered: HashSet<&Value> = spans
            .iter()
            .flat_map(|span| &self.coords[span.clone()])
            .collect();
        self.coords.iter().map(|v| !covered.contains(v)).collect()
    }
}

impl Events<'_> {
    /// The duration, the event table and the coordinate the duration runs
    /// along.
    pub(crate) fn coverage_inputs(
        &self,
    ) -> Result<(Duration, &EventTable, std::borrow::Cow<'_, [Value]>), EventsError> {
        let table = self.try_table()?;
        let duration = self.require_duration()?;
        let coords = self
            .ds
            .coordinate_values(&duration.dim)
            .ok_or_else(|| DatasetError::UnknownDimension(duration.dim.clone()))?;
        Ok((duration, table, coords))
    }

    /// Whether some coordinate value of the duration dimension is covered by
    /// no event.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::EventsNotLoaded`] or
    /// [`EventsError::NoDurationMapping`] when their prerequisites are
    /// missing.
    pub fn has_gaps(&self) -> Result<bool, EventsError> {
        let (duration, table, coords) = self.coverage_inputs()?;
        let lookup = PositionLookup::new(&coords);
        let spans = lookup.spans(table, &duration)?;
        Ok(lookup.uncovered(&spans).into_iter().any(|gap| gap))
    }

    /// Whether two events overlap or touch: after sorting by start, some
    /// event starts less than one unit after the previous one ends.
    ///
    /// # Errors
    ///
    /// As [`Self::has_gaps`], plus [`EventsError::NonNumericDuration`] when a
    /// compared bound is not a number.
    pub fn has_overlaps(&self) -> Result<bool, EventsError> {
        let table = self.try_table()?;
        let duration = self.require_duration()?;
        let sorted = table.sort_by(&duration.start)?;
        let starts = sorted.try_column(&duration.start)?;
        let ends = sorted.try_column(&duration.end)?;

        let numeric = |column: &str, value: &Value| {
            value.as_f64().ok_or_else(|| EventsError::NonNumericDuration {
                column: column.to_string(),
                value: value.clone(),
            })
        };
        for (end, next_start) in ends.iter().zip(starts.iter().skip(1)) {
            let gap = numeric(&duration.start, next_start)? - numeric(&duration.end, end)?;
            if gap < 1.0 {
                tracing::debug!(%next_start, %end, "found overlapping events");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::events::{DimensionMapping, Gap};
    use crate::value::values;

    fn loaded(coords: Vec<Value>, starts: Vec<Value>, ends: Vec<Value>) -> Dataset {
        let mut ds = Dataset::new().with_coord("frame", coords).expect("dataset");
        let table = EventTable::from_columns([("start_frame", starts), ("end_frame", ends)])
            .expect("table");
        let mapping = DimensionMapping::new().with_duration("frame", "start_frame", "end_frame");
        ds.events().load(table, Some(mapping)).expect("load");
        ds
    }

    #[test]
    fn exact_bounds_slice_by_position() {
        let coords = values(["c", "a", "d", "b"]);
        let lookup = PositionLookup::new(&coords);
        assert_eq!(lookup.span(&Value::from("a"), &Value::from("b")), 1..4);
        assert_eq!(lookup.span(&Value::from("b"), &Value::from("a")), 0..0);
    }

    #[test]
    fn off_grid_bounds_snap_outward() {
        let coords = values([0, 2, 4, 6, 8, 10]);
        let lookup = PositionLookup::new(&coords);
        assert_eq!(lookup.span(&Value::Int(1), &Value::Int(2)), 0..2);
        assert_eq!(lookup.span(&Value::Int(3), &Value::Int(5)), 1..4);
        assert_eq!(lookup.span(&Value::Int(-5), &Value::Int(50)), 0..6);
        assert_eq!(lookup.span(&Value::Null, &Value::Int(4)), 0..0);
    }

    #[test]
    fn spans_beyond_the_coordinate_cover_nothing() {
        let coords = values([0, 2, 4, 6, 8, 10]);
        let lookup = PositionLookup::new(&coords);
        assert_eq!(lookup.span(&Value::Int(50), &Value::Int(60)), 0..0);
        assert_eq!(lookup.span(&Value::Int(-5), &Value::Int(-1)), 0..0);
        assert_eq!(lookup.span(&Value::Int(9), &Value::Int(60)), 4..6);
        assert_eq!(lookup.span(&Value::Int(-5), &Value::Int(1)), 0..2);
    }

    #[test]
    fn events_past_the_last_frame_leave_it_uncovered() {
        let ds = &mut loaded(values(1..=10), values([1, 50]), values([9, 60]));
        assert_eq!(ds.events().has_gaps(), Ok(true));
        assert_eq!(
            ds.events().gaps(),
            Ok(vec![Gap {
                start: Value::Int(10),
                end: Value::Int(10)
            }])
        );
    }

    #[test]
    fn events_before_the_first_frame_leave_it_uncovered() {
        let ds = &mut loaded(values(1..=10), values([-5, 2]), values([-1, 10]));
        assert_eq!(ds.events().has_gaps(), Ok(true));
        assert_eq!(
            ds.events().gaps(),
            Ok(vec![Gap {
                start: Value::Int(1),
                end: Value::Int(1)
            }])
        );
    }

    #[test]
    fn full_coverage_has_no_gaps() {
        let ds = &mut loaded(values(1..=250), values([1, 175]), values([174, 250]));
        assert_eq!(ds.events().has_gaps(), Ok(false));
    }

    #[test]
    fn partial_coverage_has_gaps() {
        let ds = &mut loaded(values(1..=300), values([50]), values([299]));
        assert_eq!(ds.events().has_gaps(), Ok(true));
    }

    #[test]
    fn overlap_threshold_is_one_unit() {
        let touching = &mut loaded(values(1..=10), values([1, 5]), values([5, 10]));
        assert_eq!(touching.events().has_overlaps(), Ok(true));

        let adjacent = &mut loaded(values(1..=10), values([6, 1]), values([10, 5]));
        assert_eq!(adjacent.events().has_overlaps(), Ok(false));

        let nested = &mut loaded(values(1..=10), values([1, 2]), values([10, 3]));
        assert_eq!(nested.events().has_overlaps(), Ok(true));
    }

    #[test]
    fn single_event_never_overlaps() {
        let ds = &mut loaded(values(1..=10), values([3]), values([4]));
        assert_eq!(ds.events().has_overlaps(), Ok(false));
    }

    #[test]
    fn coverage_requires_a_duration() {
        let mut ds = Dataset::new().with_coord("frame", values(1..=5)).expect("dataset");
        let table = EventTable::from_columns([("start_frame", values([1]))]).expect("table");
        let mapping = DimensionMapping::new().with_column("frame", "start_frame");
        ds.events().load(table, Some(mapping)).expect("load");
        assert_eq!(ds.events().has_gaps(), Err(EventsError::NoDurationMapping));
        assert_eq!(ds.events().has_overlaps(), Err(EventsError::NoDurationMapping));
    }

    #[test]
    fn string_bounds_cannot_be_compared_for_overlap() {
        let ds = &mut loaded(
            values(["a", "b", "c"]),
            values(["a", "b"]),
            values(["b", "c"]),
        );
        assert_eq!(ds.events().has_gaps(), Ok(false));
        assert!(matches!(
            ds.events().has_overlaps(),
            Err(EventsError::NonNumericDuration { .. })
        ));
    }
}
