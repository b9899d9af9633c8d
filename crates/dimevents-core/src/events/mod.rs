//! The events extension of [`Dataset`].
//!
//! [`Dataset::events`] borrows a dataset and returns an [`Events`] accessor
//! that owns nothing but the borrow and an [`EventsConfig`]. The event table
//! and the dimension mapping live in the dataset's [`Attrs`](crate::dataset::Attrs),
//! so they travel with the dataset through selection and cloning.
//!
//! Operations that transform the dataset (`load`, `sel`, `fill_gaps`)
//! consume the accessor and hand the dataset back, which keeps calls
//! chainable:
//!
//! ```
//! use dimevents_core::{Dataset, DimensionMapping, EventTable, values};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ds = Dataset::new().with_coord("frame", values(1..=300))?;
//! let events = EventTable::from_columns([
//!     ("start_frame", values([50])),
//!     ("end_frame", values([299])),
//! ])?;
//! let mapping = DimensionMapping::new().with_duration("frame", "start_frame", "end_frame");
//!
//! let filled = ds.events().load(events, Some(mapping))?.events().fill_gaps(&Default::default())?;
//! assert!(!filled.events().has_gaps()?);
//! # Ok(())
//! # }
//! ```

pub mod constraint;
pub mod coverage;
pub mod expand;
pub mod gaps;
pub mod group;
pub mod mapping;

pub use constraint::{Constraint, EventFilter, Predicate};
pub use gaps::{Gap, GapFill};
pub use mapping::{DimensionMapping, Duration, MappingEntry};

use std::path::PathBuf;

use crate::config::EventsConfig;
use crate::dataset::{Dataset, DatasetError};
use crate::error::ErrorCode;
use crate::table::{EventTable, FillMethod, ReindexError, TableError};
use crate::value::Value;

/// Errors from the events extension.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventsError {
    #[error("events not yet loaded")]
    EventsNotLoaded,

    #[error("dimension mapping not yet loaded")]
    MappingNotLoaded,

    #[error(
        "invalid mapping: unknown event columns {unknown_columns:?}, unknown dataset dimensions or coordinates {unknown_dimensions:?}"
    )]
    InvalidMapping {
        unknown_columns: Vec<String>,
        unknown_dimensions: Vec<String>,
    },

    #[error("more than one duration column pair given (for {0:?})")]
    MultipleDurations(Vec<String>),

    #[error("no duration column pair in the dimension mapping")]
    NoDurationMapping,

    #[error("unrecognizable constraints: {keys:?}")]
    UnknownConstraint { keys: Vec<String> },

    #[error("none of {requested:?} are columns of the event table (unmatched: {unmatched:?})")]
    UnrecognizedColumn {
        requested: Vec<String>,
        unmatched: Vec<String>,
    },

    #[error("no match found for column '{column}' in the dimension mapping")]
    NoMappingMatch { column: String },

    #[error("fill method '{method}' given without a match column")]
    MatchColumnRequired { method: FillMethod },

    #[error("loading events from {} is not supported", path.display())]
    UnsupportedSource { path: PathBuf },

    #[error("predicate on column '{column}' returned {actual} flags for {expected} rows")]
    InvalidMask {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duration column '{column}' holds non-numeric value {value}")]
    NonNumericDuration { column: String, value: Value },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Reindex(#[from] ReindexError),
}

impl EventsError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EventsNotLoaded => ErrorCode::EventsNotLoaded,
            Self::MappingNotLoaded => ErrorCode::MappingNotLoaded,
            Self::InvalidMapping { .. } => ErrorCode::InvalidMapping,
            Self::MultipleDurations(_) => ErrorCode::MultipleDurations,
            Self::NoDurationMapping => ErrorCode::NoDurationMapping,
            Self::UnknownConstraint { .. } => ErrorCode::UnknownConstraint,
            Self::UnrecognizedColumn { .. } => ErrorCode::UnrecognizedColumn,
            Self::NoMappingMatch { .. } | Self::MatchColumnRequired { .. } => {
                ErrorCode::NoMappingMatch
            }
            Self::UnsupportedSource { .. } => ErrorCode::UnsupportedSource,
            Self::InvalidMask { .. } => ErrorCode::InvalidMask,
            Self::NonNumericDuration { .. } => ErrorCode::NonNumericDuration,
            Self::Table(_) => ErrorCode::TableOperation,
            Self::Dataset(_) => ErrorCode::DatasetOperation,
            Self::Reindex(_) => ErrorCode::ReindexFailed,
        }
    }
}

/// Where events are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    Table(EventTable),
    /// A file on disk. No file format is supported yet.
    Path(PathBuf),
}

impl From<EventTable> for EventSource {
    fn from(table: EventTable) -> Self {
        Self::Table(table)
    }
}

impl From<PathBuf> for EventSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Events accessor over a mutably borrowed [`Dataset`].
#[derive(Debug)]
pub struct Events<'a> {
    ds: &'a mut Dataset,
    config: EventsConfig,
}

impl Dataset {
    /// Events accessor with the default configuration.
    pub fn events(&mut self) -> Events<'_> {
        Events::with_config(self, EventsConfig::default())
    }
}

impl<'a> Events<'a> {
    pub const fn with_config(ds: &'a mut Dataset, config: EventsConfig) -> Self {
        Self { ds, config }
    }

    #[must_use]
    pub const fn config(&self) -> &EventsConfig {
        &self.config
    }

    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        self.ds
    }

    /// Hand the dataset back, ending the borrow.
    #[must_use]
    pub fn into_dataset(self) -> &'a mut Dataset {
        self.ds
    }

    /// The attached event table, if any.
    #[must_use]
    pub const fn table(&self) -> Option<&EventTable> {
        self.ds.attrs.events.as_ref()
    }

    /// # Errors
    ///
    /// Returns [`EventsError::EventsNotLoaded`] if no table is attached.
    pub fn try_table(&self) -> Result<&EventTable, EventsError> {
        self.table().ok_or(EventsError::EventsNotLoaded)
    }

    /// Attach `table`, replacing (with a warning) any table already attached.
    pub fn set_table(&mut self, table: EventTable) {
        if self.ds.attrs.events.is_some() {
            tracing::warn!("replacing the event table already attached to the dataset");
        }
        tracing::debug!(rows = table.len(), "attached event table");
        self.ds.attrs.events = Some(table);
    }

    #[must_use]
    pub const fn mapping(&self) -> Option<&DimensionMapping> {
        self.ds.attrs.mapping.as_ref()
    }

    /// # Errors
    ///
    /// Returns [`EventsError::MappingNotLoaded`] if no mapping is stored.
    pub fn try_mapping(&self) -> Result<&DimensionMapping, EventsError> {
        self.mapping().ok_or(EventsError::MappingNotLoaded)
    }

    /// Validate `mapping` against the attached table and the dataset, then
    /// store it, replacing (with a warning) any stored mapping.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::EventsNotLoaded`] without a table, or
    /// [`EventsError::InvalidMapping`]; nothing is stored on failure.
    pub fn set_mapping(&mut self, mapping: DimensionMapping) -> Result<(), EventsError> {
        mapping.validate(self.try_table()?, self.ds)?;
        self.store_mapping(mapping);
        Ok(())
    }

    fn store_mapping(&mut self, mapping: DimensionMapping) {
        if self.ds.attrs.mapping.is_some() {
            tracing::warn!("replacing the dimension mapping already attached to the dataset");
        }
        tracing::debug!(entries = mapping.len(), "stored dimension mapping");
        self.ds.attrs.mapping = Some(mapping);
    }

    /// The mapping's duration pair. `None` when there is no mapping or it
    /// declares no pair.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::MultipleDurations`] if the mapping declares
    /// more than one pair.
    pub fn duration_mapping(&self) -> Result<Option<Duration>, EventsError> {
        self.mapping().map_or(Ok(None), DimensionMapping::duration)
    }

    fn require_duration(&self) -> Result<Duration, EventsError> {
        self.duration_mapping()?
            .ok_or(EventsError::NoDurationMapping)
    }

    /// Attach events from `source` and, optionally, a dimension mapping.
    ///
    /// The mapping is validated against the incoming table before anything
    /// is stored.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::UnsupportedSource`] for [`EventSource::Path`]
    /// and [`EventsError::InvalidMapping`] for a mapping that does not
    /// resolve.
    pub fn load(
        mut self,
        source: impl Into<EventSource>,
        mapping: Option<DimensionMapping>,
    ) -> Result<&'a mut Dataset, EventsError> {
        let table = match source.into() {
            EventSource::Table(table) => table,
            EventSource::Path(path) => return Err(EventsError::UnsupportedSource { path }),
        };
        if let Some(mapping) = &mapping {
            mapping.validate(&table, self.ds)?;
        }

        self.set_table(table);
        if let Some(mapping) = mapping {
            self.store_mapping(mapping);
        }
        Ok(self.ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::tracking;
    use crate::value::values;

    fn events() -> EventTable {
        EventTable::from_columns([
            ("event_type", values(["pass", "goal"])),
            ("start_frame", values([1, 175])),
            ("end_frame", values([174, 250])),
        ])
        .expect("valid table")
    }

    fn frame_duration() -> DimensionMapping {
        DimensionMapping::new().with_duration("frame", "start_frame", "end_frame")
    }

    #[test]
    fn accessors_report_absence() {
        let mut ds = tracking(1..=250);
        let events = ds.events();
        assert!(events.table().is_none());
        assert_eq!(events.try_table(), Err(EventsError::EventsNotLoaded));
        assert_eq!(events.try_mapping(), Err(EventsError::MappingNotLoaded));
        assert_eq!(events.duration_mapping(), Ok(None));
    }

    #[test]
    fn load_attaches_table_and_mapping() {
        let mut ds = tracking(1..=250);
        let loaded = ds.events().load(events(), Some(frame_duration())).expect("load");
        assert_eq!(loaded.events().table(), Some(&events()));
        assert_eq!(loaded.events().mapping(), Some(&frame_duration()));
        assert_eq!(loaded.attrs().get("match_id"), Some(&serde_json::json!(12)));
    }

    #[test]
    fn invalid_mapping_on_load_stores_nothing() {
        let mut ds = tracking(1..=250);
        let bad = DimensionMapping::new().with_column("frame", "kickoff");
        let err = ds.events().load(events(), Some(bad)).expect_err("invalid");
        assert!(matches!(err, EventsError::InvalidMapping { .. }));
        assert!(ds.events().table().is_none());
        assert!(ds.events().mapping().is_none());
    }

    #[test]
    fn set_mapping_requires_a_table() {
        let mut ds = tracking(1..=250);
        let mut events = ds.events();
        assert_eq!(
            events.set_mapping(frame_duration()),
            Err(EventsError::EventsNotLoaded)
        );
    }

    #[test]
    fn reloading_overwrites() {
        let mut ds = tracking(1..=250);
        ds.events().load(events(), None).expect("first load");
        let second = events().filter_eq("event_type", &Value::from("goal")).expect("filter");
        ds.events().load(second.clone(), None).expect("second load");
        assert_eq!(ds.events().table(), Some(&second));
    }

    #[test]
    fn path_sources_are_unsupported() {
        let mut ds = tracking(1..=3);
        let err = ds
            .events()
            .load(PathBuf::from("events.csv"), None)
            .expect_err("path");
        assert_eq!(err.code(), ErrorCode::UnsupportedSource);
    }
}
