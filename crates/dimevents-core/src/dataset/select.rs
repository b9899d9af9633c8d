//! Label-based selection along dimensions.
//!
//! Each indexer names a dimension and selects labels on it:
//!
//! - [`Indexer::Label`] picks one position and drops the dimension. Its
//!   coordinates survive as 0-D scalars unless [`SelectOptions::drop`] is set.
//! - [`Indexer::Labels`] picks positions in the given order and keeps the
//!   dimension.
//! - [`Indexer::Range`] keeps the inclusive positional run from the `start`
//!   label to the `stop` label.
//!
//! Label lookup goes through [`Locator`], so [`SelectOptions::method`] and
//! [`SelectOptions::tolerance`] allow inexact matches.

use super::{Dataset, DatasetError};
use crate::table::{FillMethod, Locator};
use crate::value::Value;

/// A selection on one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indexer {
    Label(Value),
    Labels(Vec<Value>),
    Range { start: Value, stop: Value },
}

/// Options applied to every label lookup of a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectOptions {
    /// Inexact matching strategy; `None` means exact labels only.
    pub method: Option<FillMethod>,
    /// Largest accepted numeric distance for inexact matches.
    pub tolerance: Option<f64>,
    /// Drop coordinates that become scalar instead of keeping them.
    pub drop: bool,
}

enum Positions {
    Single(usize),
    Many(Vec<usize>),
}

impl Dataset {
    /// Select along dimensions by label, returning a new dataset.
    ///
    /// Attributes, including any attached events, are carried over unchanged.
    ///
    /// # Errors
    ///
    /// Fails with [`DatasetError::NotSelectable`] for a non-dimension
    /// coordinate, [`DatasetError::UnknownDimension`] for anything else that
    /// is not a dimension, [`DatasetError::LabelNotFound`] when a label has
    /// no match, or a reindex error from the lookup itself.
    pub fn select(
        &self,
        indexers: &[(String, Indexer)],
        options: &SelectOptions,
    ) -> Result<Self, DatasetError> {
        let mut out = self.clone();
        for (dim, indexer) in indexers {
            if !out.has_dim(dim) {
                return Err(if out.coords.contains_key(dim.as_str()) {
                    DatasetError::NotSelectable(dim.clone())
                } else {
                    DatasetError::UnknownDimension(dim.clone())
                });
            }
            let positions = out.resolve(dim, indexer, options)?;
            match positions {
                Positions::Single(pos) => out.squeeze_dim(dim, pos, options.drop),
                Positions::Many(positions) => out.take_dim(dim, &positions),
            }
        }
        Ok(out)
    }

    fn resolve(
        &self,
        dim: &str,
        indexer: &Indexer,
        options: &SelectOptions,
    ) -> Result<Positions, DatasetError> {
        let labels = self
            .coordinate_values(dim)
            .ok_or_else(|| DatasetError::UnknownDimension(dim.to_string()))?;
        let locator = Locator::new(&labels, options.method, options.tolerance)?;
        let find = |label: &Value| -> Result<usize, DatasetError> {
            locator
                .locate(label)?
                .ok_or_else(|| DatasetError::LabelNotFound {
                    dim: dim.to_string(),
                    label: label.clone(),
                })
        };

        Ok(match indexer {
            Indexer::Label(label) => Positions::Single(find(label)?),
            Indexer::Labels(wanted) => {
                Positions::Many(wanted.iter().map(find).collect::<Result<_, _>>()?)
            }
            Indexer::Range { start, stop } => {
                let first = find(start)?;
                let last = find(stop)?;
                Positions::Many((first..=last).collect())
            }
        })
    }

    fn squeeze_dim(&mut self, dim: &str, position: usize, drop: bool) {
        for variable in self.data_vars.values_mut() {
            if let Some(axis) = variable.axis(dim) {
                *variable = variable.squeeze(axis, position);
            }
        }
        let mut scalar_coords = Vec::new();
        for (name, coord) in &mut self.coords {
            if let Some(axis) = coord.axis(dim) {
                *coord = coord.squeeze(axis, position);
                scalar_coords.push(name.clone());
            }
        }
        if drop {
            for name in scalar_coords {
                self.coords.remove(&name);
            }
        }
        self.remove_dim(dim);
    }

    fn take_dim(&mut self, dim: &str, positions: &[usize]) {
        for variable in self.coords.values_mut().chain(self.data_vars.values_mut()) {
            if let Some(axis) = variable.axis(dim) {
                *variable = variable.take(axis, positions);
            }
        }
        self.resize_dim(dim, positions.len());
    }
}
