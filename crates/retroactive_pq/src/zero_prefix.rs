use std::cmp::{max, min};

use rand::RngCore;
use rand::rngs::StdRng;

use crate::policy::ZeroPrefixSum;
use crate::traits::RangeAggregate;
use crate::treap::Treap;

/// Time → signed step map that finds where the running sum returns to zero.
///
/// The queries below assume the running sum over keys never drops below
/// zero, which holds for every timeline the queue keeps.
pub type ZeroPrefixTree<K, R = StdRng> = Treap<ZeroPrefixSum<K>, R>;

impl<K, R> Treap<ZeroPrefixSum<K>, R>
where
    K: Ord + Clone,
    R: RngCore,
{
    /// Latest position `<= key` at which the running sum over everything
    /// before it is zero.
    ///
    /// Returns `key` itself when the keys below it sum to zero, and otherwise
    /// the last stored key that brings the running sum back to zero (or the
    /// first stored key when the sum never returns there).
    pub fn zero_prefix_before(&self, key: &K) -> K {
        let Some(before) = self.aggregate_before(key, false) else {
            return key.clone();
        };
        if before.min_prefix_sum > 0 {
            min(before.min_key, key.clone())
        } else if before.sum == 0 {
            max(before.min_prefix_last_key, key.clone())
        } else {
            before.min_prefix_last_key
        }
    }

    /// Earliest position `>= key` at which the running sum through it is
    /// zero, or `None` if the sum never gets back to zero.
    pub fn zero_prefix_after(&self, key: &K) -> Option<K> {
        let Some(after) = self.aggregate_after(key, false) else {
            return Some(key.clone());
        };
        let total = self.aggregate_all().map_or(0, |all| all.sum);
        let before_sum = total - after.sum;

        if before_sum == 0 {
            Some(key.clone())
        } else if before_sum + after.min_prefix_sum == 0 {
            Some(after.min_prefix_first_key)
        } else {
            None
        }
    }

    /// Whether the running sum is zero at `key` (counting keys `<= key`) or
    /// at any stored key after it.
    ///
    /// The step stored at `key` itself is counted. When `key` holds an
    /// insert about to be removed, its own `+1` is part of what the later
    /// running sums lose, so the sum strictly before `key` is the wrong
    /// test: it reports zero for the first insert of every timeline even
    /// when later inserts cover all the delete-mins.
    pub fn touches_zero_from(&self, key: &K) -> bool {
        let through_key = self.aggregate_before(key, true).map_or(0, |s| s.sum);
        if through_key <= 0 {
            return true;
        }
        self.aggregate_all()
            .is_some_and(|all| all.min_prefix_sum <= 0 && all.min_prefix_last_key >= *key)
    }
}
