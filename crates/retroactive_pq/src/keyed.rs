use rand::RngCore;
use rand::rngs::StdRng;

use crate::policy::{Keyed, MaxKeyed, MinKeyed};
use crate::traits::RangeAggregate;
use crate::treap::Treap;

/// Key → value map answering "largest `(value, key)` from here on".
pub type MaxKeyedTree<K, V, R = StdRng> = Treap<MaxKeyed<K, V>, R>;

/// Key → value map answering "smallest `(value, key)` up to here".
pub type MinKeyedTree<K, V, R = StdRng> = Treap<MinKeyed<K, V>, R>;

impl<K, V, R> Treap<MaxKeyed<K, V>, R>
where
    K: Ord + Clone,
    V: Ord + Clone,
    R: RngCore,
{
    pub fn max_at_or_after(&self, key: &K) -> Option<Keyed<V, K>> {
        self.aggregate_after(key, true)
    }
}

impl<K, V, R> Treap<MinKeyed<K, V>, R>
where
    K: Ord + Clone,
    V: Ord + Clone,
    R: RngCore,
{
    pub fn min_at_or_before(&self, key: &K) -> Option<Keyed<V, K>> {
        self.aggregate_before(key, true)
    }
}
