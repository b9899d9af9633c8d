//! Grouping dataset values by event.
//!
//! Every event becomes one group, keyed by its row label. The default
//! assignment comes from expanding `match_column` over the dimension, which
//! gives each position to exactly one event. When events overlap or leave
//! gaps that assignment is wrong, so each event's group is replaced by its
//! full duration span; positions may then belong to several events or none.

use super::coverage::PositionLookup;
use super::{Events, EventsError};
use crate::dataset::{DatasetError, GroupBy, group_indices};
use crate::table::FillMethod;

impl Events<'_> {
    /// Group the data variable (or coordinate) `array` by event.
    ///
    /// With neither `match_column` nor `method`, the duration's start column
    /// is matched with the configured grouping fill (`ffill`). The groups are
    /// named after the table's index name, or the reserved index name when
    /// the index is unnamed.
    ///
    /// # Errors
    ///
    /// - [`EventsError::MatchColumnRequired`] when `method` is given without
    ///   a `match_column`.
    /// - [`EventsError::NoDurationMapping`] when both are omitted and there
    ///   is no duration.
    /// - [`EventsError::NoMappingMatch`] when `match_column` is not mapped.
    /// - Errors of [`Self::expand_to_match_ds`] and of dataset grouping.
    pub fn groupby_events(
        &self,
        array: &str,
        match_column: Option<&str>,
        method: Option<FillMethod>,
    ) -> Result<GroupBy, EventsError> {
        let table = self.try_table()?;
        let duration = self.duration_mapping()?;

        let (match_column, method) = match (match_column, method, &duration) {
            (Some(column), method, _) => (column.to_string(), method),
            (None, Some(method), _) => return Err(EventsError::MatchColumnRequired { method }),
            (None, None, Some(duration)) => (
                duration.start.clone(),
                Some(self.config.grouping.default_fill),
            ),
            (None, None, None) => return Err(EventsError::NoDurationMapping),
        };
        if self.try_mapping()?.dimension_for_column(&match_column).is_none() {
            return Err(EventsError::NoMappingMatch {
                column: match_column,
            });
        }

        let group_name = table.index_label(&self.config.index.name);
        let key = self.expand_to_match_ds(&match_column, method, Some(group_name))?;
        let [dim] = key.dims() else {
            return Err(DatasetError::KeyNotOneDimensional(key.dims().len()).into());
        };
        let mut groups = group_indices(key.values());

        let along_key = duration.filter(|d| self.ds.dimension_of(&d.dim) == Some(dim.as_str()));
        if let Some(duration) = along_key {
            if self.has_overlaps()? || self.has_gaps()? {
                let coords = self
                    .ds
                    .coordinate_values(&duration.dim)
                    .ok_or_else(|| DatasetError::UnknownDimension(duration.dim.clone()))?;
                let lookup = PositionLookup::new(&coords);
                let spans = lookup.spans(table, &duration)?;
                for (label, span) in table.index().iter().zip(spans) {
                    tracing::trace!(%label, start = span.start, end = span.end, "patched group");
                    groups.insert(label.clone(), span.collect());
                }
                tracing::debug!(events = table.len(), "replaced groups with event spans");
            }
        }

        Ok(self.ds.groupby_indices(array, dim, group_name, groups)?)
    }
}
