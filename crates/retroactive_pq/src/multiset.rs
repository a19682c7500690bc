use std::fmt;

use rand::RngCore;
use rand::rngs::StdRng;

use crate::error::{Result, RetroError};
use crate::policy::Plain;
use crate::traits::OrderedMap;
use crate::treap::Treap;

/// Sorted bag of values; each distinct value is stored once with its count.
pub struct OrderedMultiset<V: Ord, R = StdRng> {
    counts: Treap<Plain<V, usize>, R>,
    len: usize,
}

impl<V: Ord> OrderedMultiset<V> {
    pub fn new() -> Self {
        Self {
            counts: Treap::new(),
            len: 0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            counts: Treap::with_seed(seed),
            len: 0,
        }
    }
}

impl<V: Ord, R: RngCore> OrderedMultiset<V, R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            counts: Treap::with_rng(rng),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, value: &V) -> bool {
        self.counts.contains_key(value)
    }

    pub fn count(&self, value: &V) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    pub fn add(&mut self, value: V) {
        let count = self.count(&value);
        self.counts.set(value, count + 1);
        self.len += 1;
    }

    /// Removes one copy of `value`, dropping the entry with its last copy.
    pub fn remove(&mut self, value: &V) -> Result<()>
    where
        V: Clone,
    {
        match self.count(value) {
            0 => return Err(RetroError::NotFound),
            1 => {
                self.counts.remove(value);
            }
            count => {
                self.counts.set(value.clone(), count - 1);
            }
        }
        self.len -= 1;
        Ok(())
    }

    /// Smallest stored value.
    pub fn first(&self) -> Option<&V> {
        self.counts.first().map(|(value, _)| value)
    }

    /// Ascending values, each repeated once per stored copy.
    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.counts
            .iter()
            .flat_map(|(value, &count)| std::iter::repeat_n(value, count))
    }
}

impl<V: Ord> Default for OrderedMultiset<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Ord + Clone, R: Clone> Clone for OrderedMultiset<V, R> {
    fn clone(&self) -> Self {
        Self {
            counts: self.counts.clone(),
            len: self.len,
        }
    }
}

impl<V: Ord + fmt::Debug, R: RngCore> fmt::Debug for OrderedMultiset<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<V: Ord> FromIterator<V> for OrderedMultiset<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut multiset = Self::new();
        for value in iter {
            multiset.add(value);
        }
        multiset
    }
}

/// Sorted set of distinct values.
pub struct OrderedSet<V: Ord, R = StdRng> {
    members: Treap<Plain<V, ()>, R>,
}

impl<V: Ord> OrderedSet<V> {
    pub fn new() -> Self {
        Self {
            members: Treap::new(),
        }
    }
}

impl<V: Ord, R: RngCore> OrderedSet<V, R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            members: Treap::with_rng(rng),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `false` if `value` was already present.
    pub fn insert(&mut self, value: V) -> bool {
        self.members.set(value, ()).is_none()
    }

    /// Returns `false` if `value` was absent.
    pub fn remove(&mut self, value: &V) -> bool {
        self.members.remove(value).is_some()
    }

    pub fn contains(&self, value: &V) -> bool {
        self.members.contains_key(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.members.iter().map(|(value, _)| value)
    }
}

impl<V: Ord> Default for OrderedSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Ord + fmt::Debug, R: RngCore> fmt::Debug for OrderedSet<V, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
