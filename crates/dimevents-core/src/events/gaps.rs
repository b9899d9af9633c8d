//! Gap detection and filling.

use super::coverage::PositionLookup;
use super::{Events, EventsError};
use crate::dataset::Dataset;
use crate::value::Value;

/// A maximal run of uncovered coordinate values, by its first and last value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gap {
    pub start: Value,
    pub end: Value,
}

/// How synthetic gap events are labelled.
///
/// Unset fields fall back to the accessor's
/// [`GapConfig`](crate::config::GapConfig).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GapFill {
    pub event_type_column: Option<String>,
    pub event_type_value: Option<Value>,
    /// Extra `(column, value)` pairs set on every synthetic event, applied
    /// after the event type so they may override it.
    pub extra: Vec<(String, Value)>,
}

impl GapFill {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn event_type(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.event_type_column = Some(column.into());
        self.event_type_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.push((column.into(), value.into()));
        self
    }
}

impl<'a> Events<'a> {
    /// The uncovered runs of the duration dimension, in coordinate order.
    ///
    /// # Errors
    ///
    /// Same prerequisites as [`Self::has_gaps`].
    pub fn gaps(&self) -> Result<Vec<Gap>, EventsError> {
        let (duration, table, coords) = self.coverage_inputs()?;
        let lookup = PositionLookup::new(&coords);
        let spans = lookup.spans(table, &duration)?;
        let uncovered = lookup.uncovered(&spans);

        let mut gaps = Vec::new();
        let mut run: Option<(usize, usize)> = None;
        for (pos, &is_gap) in uncovered.iter().enumerate() {
            match (is_gap, run) {
                (true, None) => run = Some((pos, pos)),
                (true, Some((first, _))) => run = Some((first, pos)),
                (false, Some((first, last))) => {
                    gaps.push((first, last));
                    run = None;
                }
                (false, None) => {}
            }
        }
        gaps.extend(run);

        Ok(gaps
            .into_iter()
            .map(|(first, last)| Gap {
                start: coords[first].clone(),
                end: coords[last].clone(),
            })
            .collect())
    }

    /// Append one synthetic event per gap, so that afterwards
    /// [`Self::has_gaps`] is `false`.
    ///
    /// Each new row carries the gap bounds in the duration columns, the event
    /// type column and value from `options` (or the configuration) and the
    /// extra pairs. Columns a row introduces are `Null` for the existing
    /// rows. The row index is renumbered after every append.
    ///
    /// # Errors
    ///
    /// Same prerequisites as [`Self::has_gaps`]. On error nothing changes.
    pub fn fill_gaps(self, options: &GapFill) -> Result<&'a mut Dataset, EventsError> {
        let gaps = self.gaps()?;
        let duration = self.require_duration()?;
        let mut table = self.try_table()?.clone();

        let type_column = options
            .event_type_column
            .clone()
            .unwrap_or_else(|| self.config.gaps.event_type_column.clone());
        let type_value = options
            .event_type_value
            .clone()
            .unwrap_or_else(|| Value::from(self.config.gaps.event_type_value.as_str()));

        for gap in &gaps {
            let mut row = vec![
                (duration.start.clone(), gap.start.clone()),
                (duration.end.clone(), gap.end.clone()),
                (type_column.clone(), type_value.clone()),
            ];
            row.extend(options.extra.iter().cloned());
            table.append_row(row);
            table.reset_index();
            tracing::trace!(start = %gap.start, end = %gap.end, "filled gap");
        }
        tracing::debug!(gaps = gaps.len(), rows = table.len(), "filled event gaps");

        self.ds.attrs.events = Some(table);
        Ok(self.ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DimensionMapping;
    use crate::table::EventTable;
    use crate::value::values;

    fn loaded(coords: Vec<Value>, starts: Vec<Value>, ends: Vec<Value>) -> Dataset {
        let mut ds = Dataset::new().with_coord("frame", coords).expect("dataset");
        let table = EventTable::from_columns([
            ("event_type", vec![Value::from("pass"); starts.len()]),
            ("start_frame", starts),
            ("end_frame", ends),
        ])
        .expect("table");
        let mapping = DimensionMapping::new().with_duration("frame", "start_frame", "end_frame");
        ds.events().load(table, Some(mapping)).expect("load");
        ds
    }

    #[test]
    fn gaps_at_both_ends() {
        let mut ds = loaded(values(1..=300), values([50]), values([299]));
        assert_eq!(
            ds.events().gaps(),
            Ok(vec![
                Gap {
                    start: Value::Int(1),
                    end: Value::Int(49)
                },
                Gap {
                    start: Value::Int(300),
                    end: Value::Int(300)
                },
            ])
        );
    }

    #[test]
    fn fill_gaps_on_sparse_grid() {
        let mut ds = loaded(values([0, 2, 4, 6, 8, 10]), values([1, 8]), values([2, 10]));
        let filled = ds.events().fill_gaps(&GapFill::new()).expect("fill");
        let table = filled.events().table().cloned().expect("table");
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2, "start_frame"), Some(&Value::Int(4)));
        assert_eq!(table.get(2, "end_frame"), Some(&Value::Int(6)));
        assert_eq!(table.get(2, "event_type"), Some(&Value::from("default")));
        assert_eq!(table.index(), &values([0, 1, 2])[..]);
        assert_eq!(filled.events().has_gaps(), Ok(false));
    }

    #[test]
    fn custom_type_and_extra_columns() {
        let mut ds = loaded(values(1..=10), values([3]), values([8]));
        let options = GapFill::new()
            .event_type("kind", "filler")
            .with_column("source", "synthetic");
        let filled = ds.events().fill_gaps(&options).expect("fill");
        let table = filled.events().table().cloned().expect("table");
        assert_eq!(table.column("kind"), Some(&[Value::Null, "filler".into(), "filler".into()][..]));
        assert_eq!(table.column("source").map(<[Value]>::len), Some(3));
        assert_eq!(table.get(0, "source"), Some(&Value::Null));
        assert_eq!(table.get(1, "event_type"), Some(&Value::Null));
    }

    #[test]
    fn no_gaps_is_a_no_op() {
        let mut ds = loaded(values(1..=4), values([1, 3]), values([2, 4]));
        let before = ds.events().table().cloned();
        let filled = ds.events().fill_gaps(&GapFill::new()).expect("fill");
        assert_eq!(filled.events().table().cloned(), before);
    }
}
