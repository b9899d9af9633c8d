//! Grouping along one dimension, split into assignment and reduction.
//!
//! Grouping is two explicit layers:
//!
//! 1. **Assignment**: a [`GroupIndices`] map from group key to the positions
//!    (along the grouped dimension) that belong to it. [`group_indices`]
//!    derives one from a key array, but callers may build or adjust the map
//!    themselves, e.g. to let a position belong to several groups.
//! 2. **Reduction**: [`GroupBy::reduce`] folds each group's positions with a
//!    [`Reduction`] and stacks the results along a new group dimension.

use std::collections::BTreeMap;

use super::{DataArray, Dataset, DatasetError, Variable};
use crate::value::Value;

/// Group key → positions along the grouped dimension, in key order.
pub type GroupIndices = BTreeMap<Value, Vec<usize>>;

/// Build the default assignment from a key array: each position joins the
/// group of its key. Missing keys (`Null`/`NaN`) join no group.
#[must_use]
pub fn group_indices(keys: &[Value]) -> GroupIndices {
    let mut groups = GroupIndices::new();
    for (pos, key) in keys.iter().enumerate() {
        if key.is_missing() {
            continue;
        }
        groups.entry(key.clone()).or_default().push(pos);
    }
    groups
}

/// Aggregation applied to each group. All of them skip missing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reduction {
    Mean,
    Sum,
    Min,
    Max,
    /// Population standard deviation.
    Std,
    Count,
    First,
    Last,
}

impl Reduction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Std => "std",
            Self::Count => "count",
            Self::First => "first",
            Self::Last => "last",
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn apply<'a>(self, lane: impl Iterator<Item = &'a Value>) -> Value {
        let present: Vec<&Value> = lane.filter(|v| !v.is_missing()).collect();
        match self {
            Self::Count => Value::from(present.len()),
            Self::First => present.first().map_or(Value::Null, |v| (*v).clone()),
            Self::Last => present.last().map_or(Value::Null, |v| (*v).clone()),
            Self::Min => present.iter().min().map_or(Value::Null, |v| (**v).clone()),
            Self::Max => present.iter().max().map_or(Value::Null, |v| (**v).clone()),
            Self::Sum | Self::Mean | Self::Std => {
                let numbers: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
                let sum: f64 = numbers.iter().sum();
                if self == Self::Sum {
                    return Value::Float(sum);
                }
                if numbers.is_empty() {
                    return Value::Null;
                }
                let n = numbers.len() as f64;
                let mean = sum / n;
                if self == Self::Mean {
                    return Value::Float(mean);
                }
                let var = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                Value::Float(var.sqrt())
            }
        }
    }
}

/// A variable split into groups along one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    name: String,
    group_name: String,
    dim: String,
    variable: Variable,
    coords: BTreeMap<String, Variable>,
    groups: GroupIndices,
}

impl Dataset {
    /// Group `array` along `dim` using an explicit assignment.
    ///
    /// # Errors
    ///
    /// Fails with [`DatasetError::UnknownVariable`] if `array` is neither a
    /// data variable nor a coordinate, [`DatasetError::MissingDimension`] if
    /// it does not run along `dim`, or [`DatasetError::SizeMismatch`] if an
    /// assigned position is out of range.
    pub fn groupby_indices(
        &self,
        array: &str,
        dim: &str,
        group_name: &str,
        groups: GroupIndices,
    ) -> Result<GroupBy, DatasetError> {
        let variable = self
            .variable(array)
            .ok_or_else(|| DatasetError::UnknownVariable(array.to_string()))?;
        let size = variable
            .size_of(dim)
            .ok_or_else(|| DatasetError::MissingDimension {
                variable: array.to_string(),
                dim: dim.to_string(),
            })?;
        if let Some(&beyond) = groups.values().flatten().find(|&&p| p >= size) {
            return Err(DatasetError::SizeMismatch {
                dim: dim.to_string(),
                expected: size,
                actual: beyond + 1,
            });
        }

        // Coordinates that do not run along the grouped dimension stay valid
        // for every group.
        let coords = self
            .coords
            .iter()
            .filter(|(name, coord)| {
                name.as_str() != group_name && coord.dims().iter().all(|d| d != dim)
            })
            .map(|(name, coord)| (name.clone(), coord.clone()))
            .collect();

        tracing::debug!(array, dim, groups = groups.len(), "grouping variable");
        Ok(GroupBy {
            name: array.to_string(),
            group_name: group_name.to_string(),
            dim: dim.to_string(),
            variable: variable.clone(),
            coords,
            groups,
        })
    }

    /// Group `array` by the values of a 1-D `key` array.
    ///
    /// The key's dimension is the grouped dimension and its name becomes the
    /// group dimension of reductions.
    ///
    /// # Errors
    ///
    /// Fails with [`DatasetError::KeyNotOneDimensional`] for a key of any other
    /// rank, [`DatasetError::SizeMismatch`] if the key length differs from the
    /// dimension, plus the errors of [`Self::groupby_indices`].
    pub fn groupby(&self, array: &str, key: &DataArray) -> Result<GroupBy, DatasetError> {
        let [dim] = key.dims() else {
            return Err(DatasetError::KeyNotOneDimensional(key.dims().len()));
        };
        let expected = self
            .dim_size(dim)
            .ok_or_else(|| DatasetError::UnknownDimension(dim.clone()))?;
        if key.len() != expected {
            return Err(DatasetError::SizeMismatch {
                dim: dim.clone(),
                expected,
                actual: key.len(),
            });
        }
        let group_name = key.name().unwrap_or("group");
        self.groupby_indices(array, dim, group_name, group_indices(key.values()))
    }
}

impl GroupBy {
    /// Name of the grouped variable.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the group dimension in reductions.
    #[must_use]
    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    /// The dimension being split.
    #[must_use]
    pub fn dim(&self) -> &str {
        &self.dim
    }

    #[must_use]
    pub const fn groups(&self) -> &GroupIndices {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, key: &Value) -> Option<&[usize]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn axis(&self) -> usize {
        // Checked in `groupby_indices`.
        self.variable.axis(&self.dim).unwrap_or_default()
    }

    /// Fold every group with `reduction`.
    ///
    /// The result runs over `[group_name, remaining dims…]`, with the group
    /// keys as the `group_name` coordinate.
    #[must_use]
    pub fn reduce(&self, reduction: Reduction) -> DataArray {
        let axis = self.axis();
        let (outer, len, inner) = self.variable.lanes(axis);
        let data = self.variable.data();

        let mut out = Vec::with_capacity(self.groups.len() * outer * inner);
        for positions in self.groups.values() {
            for o in 0..outer {
                for i in 0..inner {
                    let lane = positions.iter().map(|&p| &data[(o * len + p) * inner + i]);
                    out.push(reduction.apply(lane));
                }
            }
        }

        let mut dims = vec![self.group_name.clone()];
        let mut shape = vec![self.groups.len()];
        for (d, &s) in self.variable.dims().iter().zip(self.variable.shape()) {
            if *d != self.dim {
                dims.push(d.clone());
                shape.push(s);
            }
        }

        let mut coords = self.coords.clone();
        coords.insert(
            self.group_name.clone(),
            Variable::from_1d(self.group_name.clone(), self.groups.keys().cloned().collect()),
        );

        tracing::trace!(reduction = reduction.as_str(), groups = self.groups.len(), "reduced groups");
        DataArray::new(
            Some(self.name.clone()),
            Variable::from_parts(dims, shape, out),
            coords,
        )
    }

    #[must_use]
    pub fn mean(&self) -> DataArray {
        self.reduce(Reduction::Mean)
    }

    #[must_use]
    pub fn sum(&self) -> DataArray {
        self.reduce(Reduction::Sum)
    }

    #[must_use]
    pub fn min(&self) -> DataArray {
        self.reduce(Reduction::Min)
    }

    #[must_use]
    pub fn max(&self) -> DataArray {
        self.reduce(Reduction::Max)
    }

    #[must_use]
    pub fn std(&self) -> DataArray {
        self.reduce(Reduction::Std)
    }

    #[must_use]
    pub fn count(&self) -> DataArray {
        self.reduce(Reduction::Count)
    }

    #[must_use]
    pub fn first(&self) -> DataArray {
        self.reduce(Reduction::First)
    }

    #[must_use]
    pub fn last(&self) -> DataArray {
        self.reduce(Reduction::Last)
    }
}
