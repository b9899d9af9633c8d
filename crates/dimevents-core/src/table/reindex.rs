//! Reindex-with-fill: align a sparse keyed column onto a dense target axis.
//!
//! This is the primitive behind expanding an event column to the length of a
//! dataset dimension, and behind label lookup in dataset selection. Given a
//! set of unique keys, each target label is resolved to the position of
//! either the exactly-equal key or, when a [`FillMethod`] is given, a
//! neighbouring key:
//!
//! | method     | resolves to                                   |
//! |------------|-----------------------------------------------|
//! | none       | exact match only                              |
//! | `pad`      | last key `<=` target                          |
//! | `backfill` | first key `>=` target                         |
//! | `nearest`  | numerically closest key, ties to larger key   |
//!
//! Fill methods need keys in ascending order; `nearest` and any `tolerance`
//! additionally need numeric keys and targets. `Null` keys never match.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::value::Value;

/// Strategy for resolving a target label that has no exactly-equal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMethod {
    /// Propagate the previous key's value forward (`pad` / `ffill`).
    Pad,
    /// Use the next key's value (`backfill` / `bfill`).
    Backfill,
    /// Use the numerically closest key's value.
    Nearest,
}

/// Error returned when parsing an unknown fill method string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFillMethod {
    pub raw: String,
}

impl fmt::Display for UnknownFillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown fill method '{}': expected one of pad, ffill, backfill, bfill, nearest",
            self.raw
        )
    }
}

impl std::error::Error for UnknownFillMethod {}

impl FillMethod {
    pub const ALL: [Self; 3] = [Self::Pad, Self::Backfill, Self::Nearest];

    /// Canonical short name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pad => "ffill",
            Self::Backfill => "bfill",
            Self::Nearest => "nearest",
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillMethod {
    type Err = UnknownFillMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pad" | "ffill" => Ok(Self::Pad),
            "backfill" | "bfill" => Ok(Self::Backfill),
            "nearest" => Ok(Self::Nearest),
            _ => Err(UnknownFillMethod { raw: s.to_string() }),
        }
    }
}

impl Serialize for FillMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FillMethod {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors from building a [`Locator`] or reindexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReindexError {
    /// Keys must be unique to define a single value per label.
    #[error("cannot reindex on an axis with duplicate labels: {0}")]
    DuplicateLabels(Value),

    /// `pad`, `backfill` and `nearest` need ascending keys.
    #[error("fill method '{0}' requires keys in ascending order")]
    NotMonotonic(FillMethod),

    /// `nearest` and `tolerance` measure numeric distance.
    #[error("value {0} is not numeric; nearest matching and tolerance need numbers")]
    NonNumeric(Value),

    #[error("reindex got {keys} keys but {values} values")]
    LengthMismatch { keys: usize, values: usize },
}

/// Label-to-position resolver over a fixed set of unique keys.
///
/// Built once per key axis, then queried per target label.
#[derive(Debug)]
pub struct Locator<'a> {
    exact: HashMap<&'a Value, usize>,
    /// Non-null keys with their original positions, in key order.
    ordered: Vec<(&'a Value, usize)>,
    method: Option<FillMethod>,
    tolerance: Option<f64>,
}

impl<'a> Locator<'a> {
    /// Index `keys` for lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ReindexError::DuplicateLabels`] if a non-null key repeats, or
    /// [`ReindexError::NotMonotonic`] if a fill method is requested and the
    /// keys are not strictly ascending.
    pub fn new(
        keys: &'a [Value],
        method: Option<FillMethod>,
        tolerance: Option<f64>,
    ) -> Result<Self, ReindexError> {
        let mut exact = HashMap::with_capacity(keys.len());
        let mut ordered = Vec::with_capacity(keys.len());
        for (pos, key) in keys.iter().enumerate() {
            if key.is_null() {
                continue;
            }
            if exact.insert(key, pos).is_some() {
                return Err(ReindexError::DuplicateLabels(key.clone()));
            }
            ordered.push((key, pos));
        }

        if let Some(method) = method {
            if ordered.windows(2).any(|w| w[0].0 >= w[1].0) {
                return Err(ReindexError::NotMonotonic(method));
            }
        }

        Ok(Self {
            exact,
            ordered,
            method,
            tolerance,
        })
    }

    /// Resolve `target` to a key position, or `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`ReindexError::NonNumeric`] if `nearest` or a tolerance is in
    /// play and either the target or a candidate key is not numeric.
    pub fn locate(&self, target: &Value) -> Result<Option<usize>, ReindexError> {
        if target.is_null() {
            return Ok(None);
        }
        if let Some(&pos) = self.exact.get(target) {
            return Ok(Some(pos));
        }
        let Some(method) = self.method else {
            return Ok(None);
        };

        let candidate = match method {
            FillMethod::Pad => {
                let upper = self.ordered.partition_point(|(k, _)| *k <= target);
                upper.checked_sub(1).map(|i| self.ordered[i])
            }
            FillMethod::Backfill => {
                let lower = self.ordered.partition_point(|(k, _)| *k < target);
                self.ordered.get(lower).copied()
            }
            FillMethod::Nearest => self.nearest(target)?,
        };

        let Some((key, pos)) = candidate else {
            return Ok(None);
        };

        if let Some(tolerance) = self.tolerance {
            if distance(key, target)? > tolerance {
                return Ok(None);
            }
        }

        Ok(Some(pos))
    }

    fn nearest(&self, target: &Value) -> Result<Option<(&'a Value, usize)>, ReindexError> {
        let split = self.ordered.partition_point(|(k, _)| *k < target);
        let below = split.checked_sub(1).map(|i| self.ordered[i]);
        let above = self.ordered.get(split).copied();

        match (below, above) {
            (None, None) => Ok(None),
            (Some(only), None) | (None, Some(only)) => {
                distance(only.0, target)?;
                Ok(Some(only))
            }
            (Some(lo), Some(hi)) => {
                let d_lo = distance(lo.0, target)?;
                let d_hi = distance(hi.0, target)?;
                Ok(Some(if d_hi <= d_lo { hi } else { lo }))
            }
        }
    }
}

fn distance(a: &Value, b: &Value) -> Result<f64, ReindexError> {
    let x = a
        .as_f64()
        .ok_or_else(|| ReindexError::NonNumeric(a.clone()))?;
    let y = b
        .as_f64()
        .ok_or_else(|| ReindexError::NonNumeric(b.clone()))?;
    Ok((x - y).abs())
}

/// Conform `values` (keyed by `keys`) to `target`, filling per `method`.
///
/// The output has one entry per target label; labels that resolve to no key
/// yield [`Value::Null`].
///
/// # Errors
///
/// See [`Locator::new`] and [`Locator::locate`]. Also fails with
/// [`ReindexError::LengthMismatch`] if `keys` and `values` differ in length.
pub fn reindex(
    keys: &[Value],
    values: &[Value],
    target: &[Value],
    method: Option<FillMethod>,
    tolerance: Option<f64>,
) -> Result<Vec<Value>, ReindexError> {
    if keys.len() != values.len() {
        return Err(ReindexError::LengthMismatch {
            keys: keys.len(),
            values: values.len(),
        });
    }

    let locator = Locator::new(keys, method, tolerance)?;
    let mut out = Vec::with_capacity(target.len());
    for label in target {
        let value = locator
            .locate(label)?
            .map_or(Value::Null, |pos| values[pos].clone());
        out.push(value);
    }
    tracing::trace!(
        keys = keys.len(),
        target = target.len(),
        method = ?method,
        "reindexed sparse column"
    );
    Ok(out)
}
