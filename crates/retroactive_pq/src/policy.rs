use std::cmp::{max, min};
use std::marker::PhantomData;

/// Subtree summary maintained by a [`Treap`](crate::Treap).
///
/// `agg_merge` must be associative but need not be commutative: the tree
/// always combines `left` before `right` in key order.
pub trait Aggregate {
    type Key: Ord;
    type Value;
    type Agg: Clone;

    fn agg_from_leaf(key: &Self::Key, value: &Self::Value) -> Self::Agg;
    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg;
}

/// A `(value, key)` pair ordered by value first, then by key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Keyed<V, K> {
    pub value: V,
    pub key: K,
}

impl<V, K> Keyed<V, K> {
    pub fn new(value: V, key: K) -> Self {
        Self { value, key }
    }

    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// Range maximum of [`Keyed`] pairs; equal values prefer the larger key.
pub struct MaxKeyed<K, V>(PhantomData<fn() -> (K, V)>);

impl<K: Ord + Clone, V: Ord + Clone> Aggregate for MaxKeyed<K, V> {
    type Key = K;
    type Value = V;
    type Agg = Keyed<V, K>;

    fn agg_from_leaf(key: &K, value: &V) -> Self::Agg {
        Keyed::new(value.clone(), key.clone())
    }

    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        max(left, right).clone()
    }
}

/// Range minimum of [`Keyed`] pairs; equal values prefer the smaller key.
pub struct MinKeyed<K, V>(PhantomData<fn() -> (K, V)>);

impl<K: Ord + Clone, V: Ord + Clone> Aggregate for MinKeyed<K, V> {
    type Key = K;
    type Value = V;
    type Agg = Keyed<V, K>;

    fn agg_from_leaf(key: &K, value: &V) -> Self::Agg {
        Keyed::new(value.clone(), key.clone())
    }

    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        min(left, right).clone()
    }
}

/// Summary of a key-ordered run of signed values.
///
/// `min_prefix_sum` is the smallest running sum over the run (each prefix
/// ends at a stored key, the empty prefix is not counted).
/// `min_prefix_first_key` and `min_prefix_last_key` are the earliest and
/// latest keys at which that minimum is reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrefixSummary<K> {
    pub sum: i64,
    pub min_key: K,
    pub max_key: K,
    pub min_prefix_sum: i64,
    pub min_prefix_first_key: K,
    pub min_prefix_last_key: K,
}

impl<K: Clone> PrefixSummary<K> {
    pub fn leaf(key: &K, value: i64) -> Self {
        Self {
            sum: value,
            min_key: key.clone(),
            max_key: key.clone(),
            min_prefix_sum: value,
            min_prefix_first_key: key.clone(),
            min_prefix_last_key: key.clone(),
        }
    }

    /// Summary of `self` followed by `next`.
    pub fn then(&self, next: &Self) -> Self {
        let bridged = self.sum + next.min_prefix_sum;
        let min_prefix_sum = self.min_prefix_sum.min(bridged);
        let min_prefix_first_key = if self.min_prefix_sum <= min_prefix_sum {
            self.min_prefix_first_key.clone()
        } else {
            next.min_prefix_first_key.clone()
        };
        let min_prefix_last_key = if bridged <= min_prefix_sum {
            next.min_prefix_last_key.clone()
        } else {
            self.min_prefix_last_key.clone()
        };

        Self {
            sum: self.sum + next.sum,
            min_key: self.min_key.clone(),
            max_key: next.max_key.clone(),
            min_prefix_sum,
            min_prefix_first_key,
            min_prefix_last_key,
        }
    }
}

/// Signed running sums over time keys, used to locate zero crossings.
pub struct ZeroPrefixSum<K>(PhantomData<fn() -> K>);

impl<K: Ord + Clone> Aggregate for ZeroPrefixSum<K> {
    type Key = K;
    type Value = i64;
    type Agg = PrefixSummary<K>;

    fn agg_from_leaf(key: &K, value: &i64) -> Self::Agg {
        PrefixSummary::leaf(key, *value)
    }

    fn agg_merge(left: &Self::Agg, right: &Self::Agg) -> Self::Agg {
        left.then(right)
    }
}

/// No aggregate at all; turns the tree into a plain ordered map.
pub struct Plain<K, V>(PhantomData<fn() -> (K, V)>);

impl<K: Ord, V> Aggregate for Plain<K, V> {
    type Key = K;
    type Value = V;
    type Agg = ();

    fn agg_from_leaf(_key: &K, _value: &V) -> Self::Agg {}

    fn agg_merge(_left: &Self::Agg, _right: &Self::Agg) -> Self::Agg {}
}

#[cfg(test)]
mod tests {
    use super::{Aggregate, Keyed, MaxKeyed, MinKeyed, PrefixSummary, ZeroPrefixSum};
    use proptest::prelude::*;

    fn summarize(start: i64, values: &[i64]) -> PrefixSummary<i64> {
        let mut iter = values.iter().enumerate();
        let (i, &v) = iter.next().expect("non-empty run");
        let mut acc = PrefixSummary::leaf(&(start + i as i64), v);
        for (i, &v) in iter {
            let leaf = PrefixSummary::leaf(&(start + i as i64), v);
            acc = ZeroPrefixSum::<i64>::agg_merge(&acc, &leaf);
        }
        acc
    }

    fn brute_force(start: i64, values: &[i64]) -> PrefixSummary<i64> {
        let mut running = 0;
        let mut prefixes = Vec::new();
        for &v in values {
            running += v;
            prefixes.push(running);
        }
        let lowest = *prefixes.iter().min().unwrap();
        let first = prefixes.iter().position(|&p| p == lowest).unwrap();
        let last = prefixes.iter().rposition(|&p| p == lowest).unwrap();
        PrefixSummary {
            sum: running,
            min_key: start,
            max_key: start + values.len() as i64 - 1,
            min_prefix_sum: lowest,
            min_prefix_first_key: start + first as i64,
            min_prefix_last_key: start + last as i64,
        }
    }

    #[test]
    fn keyed_ties_break_on_key() {
        let a = Keyed::new(5, 1);
        let b = Keyed::new(5, 3);
        assert_eq!(MaxKeyed::<i32, i32>::agg_merge(&a, &b), b);
        assert_eq!(MaxKeyed::<i32, i32>::agg_merge(&b, &a), b);
        assert_eq!(MinKeyed::<i32, i32>::agg_merge(&a, &b), a);
        assert_eq!(MinKeyed::<i32, i32>::agg_merge(&b, &a), a);

        let c = Keyed::new(7, 0);
        assert_eq!(MaxKeyed::<i32, i32>::agg_merge(&a, &c), c);
        assert_eq!(MinKeyed::<i32, i32>::agg_merge(&a, &c), a);
        assert_eq!(c.into_pair(), (0, 7));
    }

    #[test]
    fn prefix_summary_tracks_widest_minimum() {
        // running sums: 1 0 1 0 -1 0 -1
        let summary = summarize(10, &[1, -1, 1, -1, -1, 1, -1]);
        assert_eq!(summary.sum, -1);
        assert_eq!(summary.min_prefix_sum, -1);
        assert_eq!(summary.min_prefix_first_key, 14);
        assert_eq!(summary.min_prefix_last_key, 16);
        assert_eq!(summary.min_key, 10);
        assert_eq!(summary.max_key, 16);
    }

    fn signed_run() -> impl Strategy<Value = Vec<i64>> {
        prop::collection::vec(-1i64..=1, 1..24)
    }

    proptest! {
        #[test]
        fn merge_is_associative(a in signed_run(), b in signed_run(), c in signed_run()) {
            let sa = summarize(0, &a);
            let sb = summarize(a.len() as i64, &b);
            let sc = summarize((a.len() + b.len()) as i64, &c);

            let left = sa.then(&sb).then(&sc);
            let right = sa.then(&sb.then(&sc));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn merge_matches_brute_force(values in signed_run()) {
            prop_assert_eq!(summarize(3, &values), brute_force(3, &values));
        }
    }
}
