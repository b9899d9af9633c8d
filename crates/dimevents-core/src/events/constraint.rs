//! `sel`: route constraints to dataset dimensions and event columns.

use std::fmt;
use std::sync::Arc;

use super::{Events, EventsError};
use crate::dataset::{Dataset, DatasetError, Indexer, SelectOptions};
use crate::table::EventTable;
use crate::value::Value;

/// Function from a column's values to a keep/drop flag per row.
pub type Predicate = Arc<dyn Fn(&[Value]) -> Vec<bool> + Send + Sync>;

/// A single `sel` constraint, as supplied by the caller.
#[derive(Clone)]
pub enum Constraint {
    /// Exact equality.
    Value(Value),
    /// Membership, or a boolean mask when it holds one `Bool` per row.
    Values(Vec<Value>),
    /// Boolean mask; treated as membership in `{true, false}` when its length
    /// does not match the row count.
    Mask(Vec<bool>),
    Predicate(Predicate),
    /// Inclusive range.
    Range { start: Value, stop: Value },
}

impl Constraint {
    #[must_use]
    pub fn predicate(f: impl Fn(&[Value]) -> Vec<bool> + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    #[must_use]
    pub fn range(start: impl Into<Value>, stop: impl Into<Value>) -> Self {
        Self::Range {
            start: start.into(),
            stop: stop.into(),
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Values(_) => "values",
            Self::Mask(_) => "mask",
            Self::Predicate(_) => "predicate",
            Self::Range { .. } => "range",
        }
    }

    /// Whether the constraint can select along a dataset dimension.
    const fn indexes_dimensions(&self) -> bool {
        !matches!(self, Self::Mask(_) | Self::Predicate(_))
    }

    /// The dataset indexer for this constraint on dimension `dim`.
    fn to_indexer(&self, dim: &str) -> Result<Indexer, DatasetError> {
        match self {
            Self::Value(v) => Ok(Indexer::Label(v.clone())),
            Self::Values(vs) => Ok(Indexer::Labels(vs.clone())),
            Self::Range { start, stop } => Ok(Indexer::Range {
                start: start.clone(),
                stop: stop.clone(),
            }),
            Self::Mask(_) | Self::Predicate(_) => Err(DatasetError::UnsupportedIndexer {
                dim: dim.to_string(),
                kind: self.kind(),
            }),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Values(vs) => f.debug_tuple("Values").field(vs).finish(),
            Self::Mask(m) => f.debug_tuple("Mask").field(m).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Range { start, stop } => f
                .debug_struct("Range")
                .field("start", start)
                .field("stop", stop)
                .finish(),
        }
    }
}

impl From<Value> for Constraint {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl From<Vec<Value>> for Constraint {
    fn from(vs: Vec<Value>) -> Self {
        Self::Values(vs)
    }
}

impl From<Vec<bool>> for Constraint {
    fn from(mask: Vec<bool>) -> Self {
        Self::Mask(mask)
    }
}

/// A column filter, resolved from a [`Constraint`] against the current table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    Equals(Value),
    IsIn(Vec<Value>),
    Mask(Vec<bool>),
    Between { lo: Value, hi: Value },
}

fn as_mask(values: &[Value], rows: usize) -> Option<Vec<bool>> {
    if values.len() != rows {
        return None;
    }
    values.iter().map(Value::as_bool).collect()
}

impl EventFilter {
    /// Decide how `constraint` filters `column` (the values of the column it
    /// names, one per row).
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::InvalidMask`] when a predicate does not return
    /// one flag per row.
    pub fn classify(
        name: &str,
        constraint: &Constraint,
        column: &[Value],
    ) -> Result<Self, EventsError> {
        let rows = column.len();
        Ok(match constraint {
            Constraint::Value(v) => Self::Equals(v.clone()),
            Constraint::Values(vs) => {
                as_mask(vs, rows).map_or_else(|| Self::IsIn(vs.clone()), Self::Mask)
            }
            Constraint::Mask(mask) if mask.len() == rows => Self::Mask(mask.clone()),
            Constraint::Mask(mask) => Self::IsIn(mask.iter().copied().map(Value::Bool).collect()),
            Constraint::Predicate(f) => {
                let mask = f(column);
                if mask.len() != rows {
                    return Err(EventsError::InvalidMask {
                        column: name.to_string(),
                        expected: rows,
                        actual: mask.len(),
                    });
                }
                Self::Mask(mask)
            }
            Constraint::Range { start, stop } => Self::Between {
                lo: start.clone(),
                hi: stop.clone(),
            },
        })
    }

    /// # Errors
    ///
    /// Returns a [`TableError`](crate::table::TableError) for an unknown
    /// column or a mask of the wrong length.
    pub fn apply(&self, table: &EventTable, column: &str) -> Result<EventTable, EventsError> {
        let filtered = match self {
            Self::Equals(v) => table.filter_eq(column, v),
            Self::IsIn(vs) => table.filter_isin(column, vs),
            Self::Mask(mask) => table.filter_mask(mask),
            Self::Between { lo, hi } => table.filter_between(column, lo, hi),
        }?;
        Ok(filtered)
    }
}

impl<'a> Events<'a> {
    /// Select on dataset dimensions and filter events in one call.
    ///
    /// Each key is routed by name: dimension and coordinate names go to
    /// [`Dataset::select`] together with `options`, event-table column names
    /// filter the events, and a key naming both does both. A `Mask` or
    /// `Predicate` cannot select a dimension, so on a key naming both it only
    /// filters the events; on a dimension alone it is an error. Event filters
    /// apply in the given order, each to the result of the previous one.
    /// The selected dataset and the filtered table are computed first and
    /// committed together.
    ///
    /// # Errors
    ///
    /// Returns [`EventsError::UnknownConstraint`] listing every key that
    /// matches neither, and otherwise any selection or filter error. On error
    /// the dataset is left untouched.
    pub fn sel<I, K>(
        self,
        constraints: I,
        options: &SelectOptions,
    ) -> Result<&'a mut Dataset, EventsError>
    where
        I: IntoIterator<Item = (K, Constraint)>,
        K: Into<String>,
    {
        let constraints: Vec<(String, Constraint)> =
            constraints.into_iter().map(|(k, c)| (k.into(), c)).collect();

        let mut dimension_constraints = Vec::new();
        let mut column_filters = Vec::new();
        let mut unknown = Vec::new();
        for (key, constraint) in &constraints {
            let on_dataset = self.ds.has_dim_or_coord(key);
            let on_events = self.table().is_some_and(|t| t.has_column(key));
            if on_dataset && on_events && !constraint.indexes_dimensions() {
                tracing::debug!(
                    key = key.as_str(),
                    kind = constraint.kind(),
                    "constraint applies to events only"
                );
            } else if on_dataset {
                dimension_constraints.push((key, constraint));
            }
            if on_events {
                column_filters.push((key.as_str(), constraint));
            }
            if !on_dataset && !on_events {
                unknown.push(key.clone());
            }
        }
        if !unknown.is_empty() {
            return Err(EventsError::UnknownConstraint { keys: unknown });
        }
        let indexers = dimension_constraints
            .into_iter()
            .map(|(key, constraint)| Ok((key.clone(), constraint.to_indexer(key)?)))
            .collect::<Result<Vec<_>, DatasetError>>()?;
        tracing::debug!(
            dataset = indexers.len(),
            events = column_filters.len(),
            "routed constraints"
        );

        let selected = if indexers.is_empty() {
            None
        } else {
            Some(self.ds.select(&indexers, options)?)
        };

        let filtered = match self.table() {
            Some(table) if !column_filters.is_empty() => {
                let mut current = table.clone();
                for (column, constraint) in column_filters {
                    let filter =
                        EventFilter::classify(column, constraint, current.try_column(column)?)?;
                    current = filter.apply(&current, column)?;
                    tracing::trace!(column, rows = current.len(), ?filter, "filtered events");
                }
                Some(current)
            }
            _ => None,
        };

        if let Some(ds) = selected {
            *self.ds = ds;
        }
        if let Some(table) = filtered {
            self.ds.attrs.events = Some(table);
        }
        Ok(self.ds)
    }
}
