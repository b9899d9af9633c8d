//! Column-oriented event table.
//!
//! An [`EventTable`] is the record set describing event occurrences: one row
//! per event, one named [`Column`] per attribute. Rows carry an index label
//! (default `0..n`) that survives filtering and sorting, so a filtered table
//! still identifies its events by their original labels until
//! [`EventTable::reset_index`] renumbers them.
//!
//! All filtering operations return a new table; only [`EventTable::append_row`]
//! and the index setters mutate in place.

pub mod reindex;

pub use reindex::{FillMethod, Locator, ReindexError, UnknownFillMethod, reindex};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::value::Value;

/// Errors from event table construction and column operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("boolean mask has {actual} entries but the table has {expected} rows")]
    MaskLength { expected: usize, actual: usize },
}

/// A single named column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// Tabular record set of event occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventTable {
    columns: Vec<Column>,
    index: Vec<Value>,
    #[serde(default)]
    index_name: Option<String>,
}

fn range_index(n: usize) -> Vec<Value> {
    (0..n).map(Value::from).collect()
}

impl EventTable {
    /// An empty table with no columns and no rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs with a default `0..n` index.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::DuplicateColumn`] if a name repeats, or
    /// [`TableError::LengthMismatch`] if the columns differ in length.
    pub fn from_columns<I, N>(columns: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (N, Vec<Value>)>,
        N: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out: Vec<Column> = Vec::new();
        for (name, values) in columns {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(TableError::DuplicateColumn(name));
            }
            if let Some(first) = out.first() {
                if first.values.len() != values.len() {
                    return Err(TableError::LengthMismatch {
                        column: name,
                        expected: first.values.len(),
                        actual: values.len(),
                    });
                }
            }
            out.push(Column { name, values });
        }

        let rows = out.first().map_or(0, |c| c.values.len());
        Ok(Self {
            columns: out,
            index: range_index(rows),
            index_name: None,
        })
    }

    /// Replace the row labels.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::LengthMismatch`] if `labels` does not have one
    /// entry per row.
    pub fn with_index(mut self, labels: Vec<Value>) -> Result<Self, TableError> {
        if labels.len() != self.len() {
            return Err(TableError::LengthMismatch {
                column: self.index_name.clone().unwrap_or_else(|| "<index>".into()),
                expected: self.len(),
                actual: labels.len(),
            });
        }
        self.index = labels;
        Ok(self)
    }

    #[must_use]
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn set_index_name(&mut self, name: Option<String>) {
        self.index_name = name;
    }

    #[must_use]
    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    /// Row labels, one per row.
    #[must_use]
    pub fn index(&self) -> &[Value] {
        &self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    /// Like [`Self::column`] but failing with [`TableError::UnknownColumn`].
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] if no column has that name.
    pub fn try_column(&self, name: &str) -> Result<&[Value], TableError> {
        self.column(name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Cell at (`row`, `column`).
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|values| values.get(row))
    }

    /// New table holding the rows at `positions`, in that order.
    ///
    /// Positions out of range are skipped.
    #[must_use]
    pub fn take(&self, positions: &[usize]) -> Self {
        let positions: Vec<usize> = positions
            .iter()
            .copied()
            .filter(|&p| p < self.len())
            .collect();
        Self {
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    values: positions.iter().map(|&p| c.values[p].clone()).collect(),
                })
                .collect(),
            index: positions.iter().map(|&p| self.index[p].clone()).collect(),
            index_name: self.index_name.clone(),
        }
    }

    /// Keep the rows where `mask` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MaskLength`] unless the mask has one entry per row.
    pub fn filter_mask(&self, mask: &[bool]) -> Result<Self, TableError> {
        if mask.len() != self.len() {
            return Err(TableError::MaskLength {
                expected: self.len(),
                actual: mask.len(),
            });
        }
        let positions: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect();
        Ok(self.take(&positions))
    }

    fn filter_column(
        &self,
        column: &str,
        keep: impl Fn(&Value) -> bool,
    ) -> Result<Self, TableError> {
        let values = self.try_column(column)?;
        let mask: Vec<bool> = values.iter().map(keep).collect();
        self.filter_mask(&mask)
    }

    /// Keep rows where `column == value`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] if the column does not exist.
    pub fn filter_eq(&self, column: &str, value: &Value) -> Result<Self, TableError> {
        self.filter_column(column, |v| v == value)
    }

    /// Keep rows whose `column` value is a member of `values`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] if the column does not exist.
    pub fn filter_isin(&self, column: &str, values: &[Value]) -> Result<Self, TableError> {
        let members: HashSet<&Value> = values.iter().collect();
        self.filter_column(column, |v| members.contains(v))
    }

    /// Keep rows where `lo <= column <= hi`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] if the column does not exist.
    pub fn filter_between(&self, column: &str, lo: &Value, hi: &Value) -> Result<Self, TableError> {
        self.filter_column(column, |v| !v.is_null() && v >= lo && v <= hi)
    }

    /// Rows stably sorted by `column`, carrying their labels along.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] if the column does not exist.
    pub fn sort_by(&self, column: &str) -> Result<Self, TableError> {
        let values = self.try_column(column)?;
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| values[a].cmp(&values[b]));
        Ok(self.take(&order))
    }

    /// Append one row given as `(column, value)` pairs.
    ///
    /// Columns named in the row but absent from the table are created and
    /// back-filled with `Null`; existing columns absent from the row get
    /// `Null`. The new row's label is one past the largest integer label.
    pub fn append_row<I, N>(&mut self, row: I)
    where
        I: IntoIterator<Item = (N, Value)>,
        N: Into<String>,
    {
        let rows = self.len();
        for column in &mut self.columns {
            column.values.push(Value::Null);
        }

        for (name, value) in row {
            let name = name.into();
            if let Some(column) = self.columns.iter_mut().find(|c| c.name == name) {
                if let Some(slot) = column.values.last_mut() {
                    *slot = value;
                }
            } else {
                let mut values = vec![Value::Null; rows];
                values.push(value);
                self.columns.push(Column { name, values });
            }
        }

        let next = self
            .index
            .iter()
            .filter_map(|label| match label {
                Value::Int(i) => Some(*i),
                _ => None,
            })
            .max()
            .map_or(0, |max| max + 1);
        self.index.push(Value::Int(next));
    }

    /// Renumber the row labels as `0..n`. The index name is kept.
    pub fn reset_index(&mut self) {
        self.index = range_index(self.len());
    }

    /// Name under which the row labels are addressed as a column: the index
    /// name if set, else `default`.
    #[must_use]
    pub fn index_label<'a>(&'a self, default: &'a str) -> &'a str {
        self.index_name.as_deref().unwrap_or(default)
    }
}
