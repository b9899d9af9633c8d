//! Correspondence between event-table columns and dataset dimensions.
//!
//! A [`DimensionMapping`] maps a dataset dimension or coordinate name to a
//! [`MappingEntry`]:
//!
//! - `Column("start_frame")`: the column's values are labels of that
//!   dimension.
//! - `Duration("start_frame", "end_frame")`: the two columns bound an
//!   inclusive span along that dimension.
//! - `Multiple([...])`: several of the above for the same dimension.
//!
//! In JSON/TOML the forms are a string, a two-element array and a longer (or
//! nested) array respectively, so `{"frame": ["start_frame", "end_frame"]}`
//! declares a duration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::EventsError;
use crate::dataset::Dataset;
use crate::table::EventTable;

/// What a dimension maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MappingEntry {
    Column(String),
    Duration(String, String),
    Multiple(Vec<MappingEntry>),
}

impl MappingEntry {
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    #[must_use]
    pub fn duration(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Duration(start.into(), end.into())
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Column(c) => out.push(c),
            Self::Duration(start, end) => {
                out.push(start);
                out.push(end);
            }
            Self::Multiple(entries) => {
                for entry in entries {
                    entry.collect_columns(out);
                }
            }
        }
    }

    fn collect_durations<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Self::Column(_) => {}
            Self::Duration(start, end) => out.push((start, end)),
            Self::Multiple(entries) => {
                for entry in entries {
                    entry.collect_durations(out);
                }
            }
        }
    }

    fn references(&self, column: &str) -> bool {
        let mut columns = Vec::new();
        self.collect_columns(&mut columns);
        columns.contains(&column)
    }
}

/// The single start/end column pair spanning a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Duration {
    /// Dimension or coordinate the span runs along.
    pub dim: String,
    pub start: String,
    pub end: String,
}

/// Dimension or coordinate name → [`MappingEntry`], iterated in name order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionMapping {
    entries: BTreeMap<String, MappingEntry>,
}

impl DimensionMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_column(mut self, dim: impl Into<String>, column: impl Into<String>) -> Self {
        self.insert(dim, MappingEntry::column(column));
        self
    }

    #[must_use]
    pub fn with_duration(
        mut self,
        dim: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        self.insert(dim, MappingEntry::duration(start, end));
        self
    }

    /// Add or replace the entry for `dim`.
    pub fn insert(&mut self, dim: impl Into<String>, entry: MappingEntry) -> Option<MappingEntry> {
        self.entries.insert(dim.into(), entry)
    }

    #[must_use]
    pub fn get(&self, dim: &str) -> Option<&MappingEntry> {
        self.entries.get(dim)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every column named anywhere in the mapping, flattened, in entry order.
    #[must_use]
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        for entry in self.entries.values() {
            entry.collect_columns(&mut columns);
        }
        columns
    }

    /// Check that every referenced column exists in `table` and every key is
    /// a dimension or coordinate of `ds`.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::InvalidMapping`] naming all offending
    /// identifiers, sorted and deduplicated.
    pub fn validate(&self, table: &EventTable, ds: &Dataset) -> Result<(), EventsError> {
        let mut unknown_columns: Vec<String> = self
            .referenced_columns()
            .into_iter()
            .filter(|c| !table.has_column(c))
            .map(str::to_string)
            .collect();
        unknown_columns.sort();
        unknown_columns.dedup();

        let unknown_dimensions: Vec<String> = self
            .entries
            .keys()
            .filter(|k| !ds.has_dim_or_coord(k))
            .cloned()
            .collect();

        if unknown_columns.is_empty() && unknown_dimensions.is_empty() {
            return Ok(());
        }
        Err(EventsError::InvalidMapping {
            unknown_columns,
            unknown_dimensions,
        })
    }

    /// The duration pair, if the mapping declares exactly one.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::MultipleDurations`] if more than one pair is
    /// declared, counting pairs nested in `Multiple` entries.
    pub fn duration(&self) -> Result<Option<Duration>, EventsError> {
        let mut found = Vec::new();
        for (dim, entry) in &self.entries {
            let mut pairs = Vec::new();
            entry.collect_durations(&mut pairs);
            found.extend(pairs.into_iter().map(|(start, end)| (dim, start, end)));
        }
        match found.as_slice() {
            [] => Ok(None),
            [(dim, start, end)] => Ok(Some(Duration {
                dim: (*dim).clone(),
                start: (*start).to_string(),
                end: (*end).to_string(),
            })),
            _ => Err(EventsError::MultipleDurations(
                found.iter().map(|(dim, _, _)| (*dim).clone()).collect(),
            )),
        }
    }

    /// The first dimension (in name order) whose entry references `column`.
    #[must_use]
    pub fn dimension_for_column(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.references(column))
            .map(|(dim, _)| dim.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, MappingEntry)> for DimensionMapping {
    fn from_iter<I: IntoIterator<Item = (K, MappingEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
