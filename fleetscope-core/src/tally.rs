//! Ordered occurrence counting.
//!
//! A [`ValueTally`] is an explicit accumulator owned by whoever needs the
//! counts. The sweep keeps one per device for command outcomes and merges
//! them; the view builder uses one to count vendors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Counts how often each key was seen, iterating in key order.
///
/// # Example
///
/// ```rust
/// use fleetscope_core::tally::ValueTally;
///
/// let tally: ValueTally<&str> = ["cisco", "arista", "cisco"].into_iter().collect();
/// assert_eq!(tally.count(&"cisco"), 2);
/// assert_eq!(tally.distinct(), 2);
/// assert_eq!(tally.total(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueTally<K: Ord> {
    counts: BTreeMap<K, usize>,
}

impl<K: Ord> Default for ValueTally<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K: Ord> ValueTally<K> {
    /// Creates an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one occurrence of `key`
    pub fn record(&mut self, key: K) {
        self.record_n(key, 1);
    }

    /// Counts `n` occurrences of `key`
    pub fn record_n(&mut self, key: K, n: usize) {
        if n == 0 {
            return;
        }
        *self.counts.entry(key).or_insert(0) += n;
    }

    /// Adds every count from `other`
    pub fn merge(&mut self, other: ValueTally<K>) {
        for (key, n) in other.counts {
            self.record_n(key, n);
        }
    }

    /// Occurrences of `key`, zero if never seen
    pub fn count(&self, key: &K) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct keys
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Keys with their counts, in key order
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.counts.iter().map(|(key, n)| (key, *n))
    }

    /// Keys with their counts, highest count first; ties keep key order
    pub fn most_common(&self) -> Vec<(&K, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

impl<K: Ord> FromIterator<K> for ValueTally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Self::new();
        tally.extend(iter);
        tally
    }
}

impl<K: Ord> Extend<K> for ValueTally<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.record(key);
        }
    }
}

impl<K: Ord> IntoIterator for ValueTally<K> {
    type Item = (K, usize);
    type IntoIter = btree_map::IntoIter<K, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}
