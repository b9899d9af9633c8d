use std::collections::BTreeMap;

use super::{Events, EventsError};
use crate::dataset::{DataArray, DatasetError, Variable};
use crate::table::{FillMethod, reindex};
use crate::value::Value;

impl Events<'_> {
    /// Spread an event column over the full coordinate of a dataset dimension.
    ///
    /// `match_column` holds labels of the dimension it is mapped to (via the
    /// dimension mapping). Events are sorted by it, their `value_column`
    /// values (the row index under the reserved index name by default) are
    /// keyed by it, and the keys are reindexed against the dimension's full
    /// coordinate, filling unmatched positions per `method` (`None` leaves
    /// them `Null`).
    ///
    /// The row index is addressable as a column under its own name or the
    /// reserved index name. The result is a 1-D array over the mapped
    /// dimension named after `value_column`.
    ///
    /// # Errors
    ///
    /// - [`EventsError::UnrecognizedColumn`] if either column is not
    ///   addressable, naming both requested columns and the unmatched ones.
    /// - [`EventsError::MappingNotLoaded`] / [`EventsError::NoMappingMatch`]
    ///   if `match_column` is not mapped to a dimension.
    /// - [`EventsError::Reindex`] for duplicate or unordered match values.
    pub fn expand_to_match_ds(
        &self,
        match_column: &str,
        method: Option<FillMethod>,
        value_column: Option<&str>,
    ) -> Result<DataArray, EventsError> {
        let table = self.try_table()?;
        let reserved = self.config.index.name.as_str();
        let value_column = value_column.unwrap_or(reserved);

        let index_label = table.index_label(reserved);
        let addressable = |name: &str| {
            table
                .column(name)
                .or_else(|| (name == index_label || name == reserved).then_some(table.index()))
        };
        let (Some(keys), Some(values)) = (addressable(match_column), addressable(value_column))
        else {
            let mut unmatched: Vec<String> = [match_column, value_column]
                .into_iter()
                .filter(|c| addressable(*c).is_none())
                .map(str::to_string)
                .collect();
            unmatched.dedup();
            return Err(EventsError::UnrecognizedColumn {
                requested: vec![match_column.to_string(), value_column.to_string()],
                unmatched,
            });
        };

        let key = self
            .try_mapping()?
            .dimension_for_column(match_column)
            .ok_or_else(|| EventsError::NoMappingMatch {
                column: match_column.to_string(),
            })?;
        let target = self
            .ds
            .coordinate_values(key)
            .ok_or_else(|| DatasetError::UnknownDimension(key.to_string()))?;
        let dim = self
            .ds
            .dimension_of(key)
            .ok_or_else(|| DatasetError::UnknownDimension(key.to_string()))?;

        let mut order: Vec<usize> = (0..table.len()).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
        let sorted_keys: Vec<Value> = order.iter().map(|&i| keys[i].clone()).collect();
        let sorted_values: Vec<Value> = order.iter().map(|&i| values[i].clone()).collect();

        let data = reindex(&sorted_keys, &sorted_values, &target, method, None)?;
        tracing::debug!(
            match_column,
            value_column,
            dim,
            method = method.map(FillMethod::as_str),
            "expanded event column"
        );

        let mut coords = BTreeMap::new();
        coords.insert(
            key.to_string(),
            Variable::from_1d(dim, target.into_owned()),
        );
        if key != dim {
            if let Some(dim_coord) = self.ds.coord(dim) {
                coords.insert(dim.to_string(), dim_coord.clone());
            }
        }
        Ok(DataArray::new(
            Some(value_column.to_string()),
            Variable::from_1d(dim, data),
            coords,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::dataset::tests::tracking;
    use crate::events::DimensionMapping;
    use crate::table::{EventTable, ReindexError};
    use crate::value::values;

    fn loaded(starts: Vec<Value>, ends: Vec<Value>) -> Dataset {
        let mut ds = tracking(1..=250);
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
    fn no_fill_leaves_nulls() {
        let mut ds = loaded(values([1, 175]), values([174, 250]));
        let dense = ds
            .events()
            .expand_to_match_ds("start_frame", None, None)
            .expect("expand");
        assert_eq!(dense.name(), Some("event_index"));
        assert_eq!(dense.dims(), &["frame".to_string()]);
        assert_eq!(dense.len(), 250);
        let present: Vec<(usize, &Value)> = dense
            .values()
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .collect();
        assert_eq!(present, vec![(0, &Value::Int(0)), (174, &Value::Int(1))]);
    }

    #[test]
    fn ffill_assigns_every_frame() {
        let mut ds = loaded(values([175, 1]), values([250, 174]));
        let dense = ds
            .events()
            .expand_to_match_ds("start_frame", Some(FillMethod::Pad), None)
            .expect("expand");
        // Row 1 starts first, so it owns frames 1..=174.
        assert_eq!(dense.values()[0], Value::Int(1));
        assert_eq!(dense.values()[173], Value::Int(1));
        assert_eq!(dense.values()[174], Value::Int(0));
        assert_eq!(dense.values()[249], Value::Int(0));
    }

    #[test]
    fn value_column_names_the_result() {
        let mut ds = loaded(values([1, 175]), values([174, 250]));
        let dense = ds
            .events()
            .expand_to_match_ds("end_frame", Some(FillMethod::Backfill), Some("event_type"))
            .expect("expand");
        assert_eq!(dense.name(), Some("event_type"));
        assert!(dense.values().iter().all(|v| *v == Value::from("pass")));
    }

    #[test]
    fn unknown_columns_are_reported_together() {
        let mut ds = loaded(values([1]), values([250]));
        let err = ds
            .events()
            .expand_to_match_ds("kickoff", None, Some("player"))
            .expect_err("unknown");
        assert_eq!(
            err,
            EventsError::UnrecognizedColumn {
                requested: vec!["kickoff".into(), "player".into()],
                unmatched: vec!["kickoff".into(), "player".into()],
            }
        );
    }

    #[test]
    fn unmapped_column_has_no_match() {
        let mut ds = loaded(values([1]), values([250]));
        assert_eq!(
            ds.events().expand_to_match_ds("event_type", None, None),
            Err(EventsError::NoMappingMatch {
                column: "event_type".into()
            })
        );
    }

    #[test]
    fn duplicate_match_values_cannot_be_reindexed() {
        let mut ds = loaded(values([1, 1]), values([100, 250]));
        assert_eq!(
            ds.events().expand_to_match_ds("start_frame", None, None),
            Err(EventsError::Reindex(ReindexError::DuplicateLabels(Value::Int(1))))
        );
    }
}
