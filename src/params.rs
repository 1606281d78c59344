//! Named parameter sets.
//!
//! A [`ParamSet`] is the owned, explicit replacement for a framework's
//! implicit parameter registry: an ordered map from parameter name to
//! tensor. Layers hand out snapshots through
//! [`Layer::parameters`](crate::layers::Layer::parameters) and accept
//! replacements through
//! [`Layer::set_parameters`](crate::layers::Layer::set_parameters).
//!
//! Composite layers namespace their children as `"<scope>.<name>"`.

use std::collections::BTreeMap;

use crate::error::{LayerError, Result};
use crate::tensors::Ten64;

/// Ordered mapping from parameter name to tensor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSet {
    entries: BTreeMap<String, Ten64>,
}

impl ParamSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tensor` under `name`, returning the tensor it replaced.
    pub fn insert(&mut self, name: impl Into<String>, tensor: Ten64) -> Option<Ten64> {
        self.entries.insert(name.into(), tensor)
    }

    pub fn get(&self, name: &str) -> Option<&Ten64> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Ten64> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of named tensors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of scalar values across all tensors.
    pub fn num_elements(&self) -> usize {
        self.entries.values().map(Ten64::numel).sum()
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Ten64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Moves every entry of `child` into `self` under `"<scope>.<name>"`.
    pub fn extend_scoped(&mut self, scope: &str, child: ParamSet) {
        for (name, tensor) in child.entries {
            self.entries.insert(format!("{scope}.{name}"), tensor);
        }
    }

    /// Splits `"<index>.<name>"` entries into per-index sets, stripping the
    /// prefix.
    ///
    /// # Errors
    /// [`LayerError::UnknownParameter`] for a name without a canonical
    /// numeric prefix (`"00"` and `"+0"` are rejected) or whose index is not
    /// below `count`.
    pub fn split_indexed(self, count: usize) -> Result<Vec<ParamSet>> {
        let mut parts = vec![ParamSet::new(); count];
        for (name, tensor) in self.entries {
            let index = name
                .split_once('.')
                .and_then(|(head, rest)| {
                    let i = head.parse::<usize>().ok()?;
                    (i.to_string() == head).then_some((i, rest))
                })
                .filter(|(i, rest)| *i < count && !rest.is_empty());
            match index {
                Some((i, rest)) => {
                    parts[i].entries.insert(rest.to_string(), tensor);
                }
                None => return Err(LayerError::UnknownParameter(name)),
            }
        }
        Ok(parts)
    }
}

impl FromIterator<(String, Ten64)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (String, Ten64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ParamSet {
    type Item = (String, Ten64);
    type IntoIter = std::collections::btree_map::IntoIter<String, Ten64>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
