//! Event tables aligned to labeled multi-dimensional datasets.
//!
//! A [`Dataset`] holds array data over named dimensions. Discrete episodes
//! recorded elsewhere (passes in a match, storms in a weather series) arrive
//! as an [`EventTable`]. The [`events`] extension attaches the table to the
//! dataset, maps its columns to dimensions through a [`DimensionMapping`],
//! and then:
//!
//! - filters dataset and events together ([`Events::sel`]),
//! - checks and repairs coverage of a duration dimension
//!   ([`Events::has_gaps`], [`Events::has_overlaps`], [`Events::fill_gaps`]),
//! - spreads an event column over a dimension ([`Events::expand_to_match_ds`]),
//! - groups data variables by event, overlapping spans included
//!   ([`Events::groupby_events`]).
//!
//! # Conventions
//!
//! - **Errors**: each module has its own `thiserror` enum; [`EventsError`]
//!   wraps the collaborators' errors and maps every variant to an
//!   [`ErrorCode`]. Configuration loading returns `anyhow::Result`.
//! - **Logging**: `tracing` macros only; the library installs no subscriber.

pub mod config;
pub mod dataset;
pub mod error;
pub mod events;
pub mod table;
pub mod value;

pub use config::{EventsConfig, load_config};
pub use dataset::{DataArray, Dataset, DatasetError, GroupBy, Indexer, Reduction, SelectOptions};
pub use error::ErrorCode;
pub use events::{
    Constraint, DimensionMapping, Duration, EventSource, Events, EventsError, Gap, GapFill,
    MappingEntry,
};
pub use table::{EventTable, FillMethod, TableError};
pub use value::{Value, values};
