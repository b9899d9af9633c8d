//! N-dimensional labeled storage: [`Variable`] and [`DataArray`].
//!
//! Data is stored row-major as a flat `Vec<Value>`. Axis operations view the
//! buffer as `(outer, axis, inner)` lanes: for a shape `[a, b, c]` and axis 1,
//! `outer = a`, `len = b`, `inner = c`, and element `(o, p, i)` lives at
//! `(o * len + p) * inner + i`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::DatasetError;
use crate::value::Value;

/// Dimension names, shape and row-major data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    dims: Vec<String>,
    shape: Vec<usize>,
    data: Vec<Value>,
}

impl Variable {
    /// # Errors
    ///
    /// Returns [`DatasetError::ShapeMismatch`] if `dims` and `shape` differ in
    /// rank, a dimension repeats, or the data length is not the product of
    /// the shape.
    pub fn new(
        name: &str,
        dims: Vec<String>,
        shape: Vec<usize>,
        data: Vec<Value>,
    ) -> Result<Self, DatasetError> {
        let expected: usize = shape.iter().product();
        let unique: HashSet<&String> = dims.iter().collect();
        if dims.len() != shape.len() || unique.len() != dims.len() || data.len() != expected {
            return Err(DatasetError::ShapeMismatch {
                name: name.to_string(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { dims, shape, data })
    }

    /// A 0-dimensional variable.
    #[must_use]
    pub fn scalar(value: Value) -> Self {
        Self {
            dims: Vec::new(),
            shape: Vec::new(),
            data: vec![value],
        }
    }

    /// A 1-dimensional variable along `dim`.
    #[must_use]
    pub fn from_1d(dim: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            dims: vec![dim.into()],
            shape: vec![values.len()],
            data: values,
        }
    }

    /// Assemble without checks; callers guarantee the shape invariants.
    pub(crate) const fn from_parts(dims: Vec<String>, shape: Vec<usize>, data: Vec<Value>) -> Self {
        Self { dims, shape, data }
    }

    #[must_use]
    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[must_use]
    pub fn data(&self) -> &[Value] {
        &self.data
    }

    #[must_use]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[must_use]
    pub fn axis(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    #[must_use]
    pub fn size_of(&self, dim: &str) -> Option<usize> {
        self.axis(dim).map(|axis| self.shape[axis])
    }

    /// `(outer, len, inner)` lane decomposition around `axis`.
    pub(crate) fn lanes(&self, axis: usize) -> (usize, usize, usize) {
        let outer = self.shape[..axis].iter().product();
        let inner = self.shape[axis + 1..].iter().product();
        (outer, self.shape[axis], inner)
    }

    /// Keep only `positions` along `axis`, in that order.
    #[must_use]
    pub fn take(&self, axis: usize, positions: &[usize]) -> Self {
        let (outer, len, inner) = self.lanes(axis);
        let mut data = Vec::with_capacity(outer * positions.len() * inner);
        for o in 0..outer {
            for &p in positions {
                let base = (o * len + p) * inner;
                data.extend_from_slice(&self.data[base..base + inner]);
            }
        }
        let mut shape = self.shape.clone();
        shape[axis] = positions.len();
        Self {
            dims: self.dims.clone(),
            shape,
            data,
        }
    }

    /// Select a single `position` along `axis` and drop that axis.
    #[must_use]
    pub fn squeeze(&self, axis: usize, position: usize) -> Self {
        let mut out = self.take(axis, &[position]);
        out.dims.remove(axis);
        out.shape.remove(axis);
        out
    }
}

/// A named variable together with the coordinates that label it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataArray {
    name: Option<String>,
    variable: Variable,
    coords: BTreeMap<String, Variable>,
}

impl DataArray {
    #[must_use]
    pub const fn new(
        name: Option<String>,
        variable: Variable,
        coords: BTreeMap<String, Variable>,
    ) -> Self {
        Self {
            name,
            variable,
            coords,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn dims(&self) -> &[String] {
        self.variable.dims()
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.variable.shape()
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        self.variable.data()
    }

    #[must_use]
    pub const fn variable(&self) -> &Variable {
        &self.variable
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
    pub fn len(&self) -> usize {
        self.variable.data().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variable.data().is_empty()
    }
}
