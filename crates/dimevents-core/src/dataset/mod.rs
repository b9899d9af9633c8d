//! Labeled multi-dimensional dataset.
//!
//! A [`Dataset`] holds named dimensions (with sizes), coordinates labelling
//! those dimensions, data variables laid out over them, and an [`Attrs`] bag.
//! It is deliberately small: dimension-based selection ([`Dataset::select`])
//! and grouping ([`Dataset::groupby`]) are the only derived operations, and
//! they are what the events extension builds on.
//!
//! Dimensions without a coordinate are labelled positionally (`0..n`).

pub mod groupby;
pub mod select;
pub mod variable;

pub use groupby::{GroupBy, GroupIndices, Reduction, group_indices};
pub use select::{Indexer, SelectOptions};
pub use variable::{DataArray, Variable};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::events::DimensionMapping;
use crate::table::{EventTable, ReindexError};
use crate::value::Value;

/// Errors from dataset construction, selection and grouping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("dimension '{dim}' has size {expected}, got {actual}")]
    SizeMismatch {
        dim: String,
        expected: usize,
        actual: usize,
    },

    #[error("variable '{name}' expects {expected} values, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("coordinate '{0}' must be 0- or 1-dimensional")]
    InvalidCoordinate(String),

    /// Only dimensions can be selected on; a non-dimension coordinate is not
    /// an index.
    #[error("'{0}' is a coordinate but not a dimension, so it cannot be selected on")]
    NotSelectable(String),

    #[error("label {label} not found along dimension '{dim}'")]
    LabelNotFound { dim: String, label: Value },

    #[error("{kind} indexers are not supported on dimension '{dim}'")]
    UnsupportedIndexer { dim: String, kind: &'static str },

    #[error("variable '{variable}' has no dimension '{dim}'")]
    MissingDimension { variable: String, dim: String },

    #[error("group key must be 1-dimensional, got {0} dimensions")]
    KeyNotOneDimensional(usize),

    #[error(transparent)]
    Reindex(#[from] ReindexError),
}

/// Open-ended attribute bag plus the typed extension slots the events
/// accessor manages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attrs {
    #[serde(default)]
    values: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) events: Option<EventTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) mapping: Option<DimensionMapping>,
}

impl Attrs {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.values.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Named dimensions, coordinates, data variables and attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    dims: Vec<(String, usize)>,
    coords: BTreeMap<String, Variable>,
    data_vars: BTreeMap<String, Variable>,
    #[serde(default)]
    pub(crate) attrs: Attrs,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dimension, or confirm the size of an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::SizeMismatch`] if the dimension already exists
    /// with a different size.
    pub fn add_dim(&mut self, name: impl Into<String>, size: usize) -> Result<(), DatasetError> {
        let name = name.into();
        match self.dim_size(&name) {
            Some(existing) if existing != size => Err(DatasetError::SizeMismatch {
                dim: name,
                expected: existing,
                actual: size,
            }),
            Some(_) => Ok(()),
            None => {
                self.dims.push((name, size));
                Ok(())
            }
        }
    }

    fn register_dims(&mut self, variable: &Variable) -> Result<(), DatasetError> {
        for (dim, &size) in variable.dims().iter().zip(variable.shape()) {
            if let Some(existing) = self.dim_size(dim) {
                if existing != size {
                    return Err(DatasetError::SizeMismatch {
                        dim: dim.clone(),
                        expected: existing,
                        actual: size,
                    });
                }
            }
        }
        for (dim, &size) in variable.dims().iter().zip(variable.shape()) {
            self.add_dim(dim.clone(), size)?;
        }
        Ok(())
    }

    /// Add (or replace) a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidCoordinate`] for coordinates of more than
    /// one dimension, or [`DatasetError::SizeMismatch`] if its length
    /// disagrees with a known dimension.
    pub fn add_coord(
        &mut self,
        name: impl Into<String>,
        variable: Variable,
    ) -> Result<(), DatasetError> {
        let name = name.into();
        if variable.ndim() > 1 {
            return Err(DatasetError::InvalidCoordinate(name));
        }
        self.register_dims(&variable)?;
        self.coords.insert(name, variable);
        Ok(())
    }

    /// Add (or replace) a data variable.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::SizeMismatch`] if a dimension length disagrees
    /// with a known dimension.
    pub fn add_data_var(
        &mut self,
        name: impl Into<String>,
        variable: Variable,
    ) -> Result<(), DatasetError> {
        self.register_dims(&variable)?;
        self.data_vars.insert(name.into(), variable);
        Ok(())
    }

    /// Builder form of [`Self::add_coord`] for a dimension coordinate: a 1-D
    /// coordinate named after the dimension it labels.
    ///
    /// # Errors
    ///
    /// See [`Self::add_coord`].
    pub fn with_coord(mut self, dim: &str, values: Vec<Value>) -> Result<Self, DatasetError> {
        self.add_coord(dim, Variable::from_1d(dim, values))?;
        Ok(self)
    }

    /// Builder form of [`Self::add_data_var`]. The shape is taken from the
    /// already known dimensions; a 1-D variable over a new dimension takes
    /// its length from `data`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::UnknownDimension`] if a multi-dimensional
    /// variable names an unknown dimension, or a shape error if `data` does
    /// not fill the shape.
    pub fn with_data_var(
        mut self,
        name: &str,
        dims: &[&str],
        data: Vec<Value>,
    ) -> Result<Self, DatasetError> {
        let shape = match dims {
            [only] if !self.has_dim(only) => vec![data.len()],
            _ => dims
                .iter()
                .map(|d| {
                    self.dim_size(d)
                        .ok_or_else(|| DatasetError::UnknownDimension((*d).to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        let dims = dims.iter().map(|d| (*d).to_string()).collect();
        let variable = Variable::new(name, dims, shape, data)?;
        self.add_data_var(name, variable)?;
        Ok(self)
    }

    /// Builder form of [`Attrs::insert`].
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: serde_json::Value) -> Self {
        self.attrs.insert(key, value);
        self
    }

    pub fn dims(&self) -> impl Iterator<Item = (&str, usize)> {
        self.dims.iter().map(|(name, size)| (name.as_str(), *size))
    }

    pub fn dim_names(&self) -> impl Iterator<Item = &str> {
        self.dims.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn has_dim(&self, name: &str) -> bool {
        self.dims.iter().any(|(d, _)| d == name)
    }

    #[must_use]
    pub fn dim_size(&self, name: &str) -> Option<usize> {
        self.dims
            .iter()
            .find(|(d, _)| d == name)
            .map(|(_, size)| *size)
    }

    #[must_use]
    pub const fn coords(&self) -> &BTreeMap<String, Variable> {
        &self.coords
    }

    #[must_use]
    pub fn coord(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name)
    }

    #[must_use]
    pub const fn data_vars(&self) -> &BTreeMap<String, Variable> {
        &self.data_vars
    }

    #[must_use]
    pub fn data_var(&self, name: &str) -> Option<&Variable> {
        self.data_vars.get(name)
    }

    /// A data variable or, failing that, a coordinate.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.data_vars.get(name).or_else(|| self.coords.get(name))
    }

    /// Whether `name` is a dimension or a coordinate.
    #[must_use]
    pub fn has_dim_or_coord(&self, name: &str) -> bool {
        self.has_dim(name) || self.coords.contains_key(name)
    }

    /// Labels of a 1-D coordinate, or positional labels `0..n` for a
    /// dimension that has no coordinate.
    #[must_use]
    pub fn coordinate_values(&self, name: &str) -> Option<Cow<'_, [Value]>> {
        if let Some(coord) = self.coords.get(name) {
            return (coord.ndim() == 1).then(|| Cow::Borrowed(coord.data()));
        }
        self.dim_size(name)
            .map(|n| Cow::Owned((0..n).map(Value::from).collect()))
    }

    /// The dimension a name runs along: itself for a dimension, the single
    /// dimension of a 1-D coordinate.
    #[must_use]
    pub fn dimension_of(&self, name: &str) -> Option<&str> {
        if let Some((dim, _)) = self.dims.iter().find(|(d, _)| d == name) {
            return Some(dim.as_str());
        }
        self.coords
            .get(name)
            .and_then(|c| c.dims().first())
            .map(String::as_str)
    }

    #[must_use]
    pub const fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub const fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// Structural equality ignoring attributes.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.dims == other.dims && self.coords == other.coords && self.data_vars == other.data_vars
    }

    fn remove_dim(&mut self, name: &str) {
        self.dims.retain(|(d, _)| d != name);
    }

    fn resize_dim(&mut self, name: &str, size: usize) {
        if let Some(entry) = self.dims.iter_mut().find(|(d, _)| d == name) {
            entry.1 = size;
        }
    }
}
