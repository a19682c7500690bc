use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::policy::Aggregate;
use crate::traits::{OrderedMap, RangeAggregate};

const DEFAULT_SEED: u64 = 0x5EED_7EA9_2026;

/// Ordered map balanced by random heap priorities, with subtree aggregates.
///
/// Every node keeps `agg = left.agg ++ leaf(key, value) ++ right.agg`, so the
/// aggregate of any key range costs one root-to-leaf walk. Priorities come
/// from `R`, which is only drawn from when a new key is stored.
pub struct Treap<P: Aggregate, R = StdRng> {
    root: Link<P>,
    rng: R,
}

type Link<P> = Option<Box<Node<P>>>;

struct Node<P: Aggregate> {
    key: P::Key,
    value: P::Value,
    agg: P::Agg,
    size: usize,
    prio: u64,
    left: Link<P>,
    right: Link<P>,
}

impl<P> Clone for Node<P>
where
    P: Aggregate,
    P::Key: Clone,
    P::Value: Clone,
{
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            agg: self.agg.clone(),
            size: self.size,
            prio: self.prio,
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }
}

impl<P: Aggregate> Node<P> {
    fn new(key: P::Key, value: P::Value, prio: u64) -> Self {
        let agg = P::agg_from_leaf(&key, &value);
        Self {
            key,
            value,
            agg,
            size: 1,
            prio,
            left: None,
            right: None,
        }
    }

    fn size(node: &Link<P>) -> usize {
        node.as_ref().map_or(0, |n| n.size)
    }

    fn leaf(&self) -> P::Agg {
        P::agg_from_leaf(&self.key, &self.value)
    }

    fn recalc(&mut self) {
        let mut agg = self.leaf();
        if let Some(left) = self.left.as_deref() {
            agg = P::agg_merge(&left.agg, &agg);
        }
        if let Some(right) = self.right.as_deref() {
            agg = P::agg_merge(&agg, &right.agg);
        }
        self.agg = agg;
        self.size = 1 + Self::size(&self.left) + Self::size(&self.right);
    }
}

fn append_agg<P: Aggregate>(acc: Option<P::Agg>, piece: &P::Agg) -> P::Agg {
    match acc {
        Some(acc) => P::agg_merge(&acc, piece),
        None => piece.clone(),
    }
}

fn prepend_agg<P: Aggregate>(piece: &P::Agg, acc: Option<P::Agg>) -> P::Agg {
    match acc {
        Some(acc) => P::agg_merge(piece, &acc),
        None => piece.clone(),
    }
}

impl<P: Aggregate> Treap<P> {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<P: Aggregate, R> Treap<P, R> {
    pub fn with_rng(rng: R) -> Self {
        Self { root: None, rng }
    }

    /// Ascending `(key, value)` pairs.
    pub fn iter(&self) -> Iter<'_, P> {
        Iter::new(self.root.as_deref(), Node::size(&self.root))
    }

    pub fn first(&self) -> Option<(&P::Key, &P::Value)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some((&node.key, &node.value))
    }

    pub fn last(&self) -> Option<(&P::Key, &P::Value)> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some((&node.key, &node.value))
    }

    /// Splits along the search path for `key`; equal keys go left iff `eq_left`.
    fn split(root: Link<P>, key: &P::Key, eq_left: bool) -> (Link<P>, Link<P>) {
        let Some(mut node) = root else {
            return (None, None);
        };
        let goes_left = match node.key.cmp(key) {
            Ordering::Less => true,
            Ordering::Equal => eq_left,
            Ordering::Greater => false,
        };
        if goes_left {
            let (left, right) = Self::split(node.right.take(), key, eq_left);
            node.right = left;
            node.recalc();
            (Some(node), right)
        } else {
            let (left, right) = Self::split(node.left.take(), key, eq_left);
            node.left = right;
            node.recalc();
            (left, Some(node))
        }
    }

    /// Joins two trees where every key of `left` precedes every key of `right`.
    fn merge(left: Link<P>, right: Link<P>) -> Link<P> {
        match (left, right) {
            (None, right) => right,
            (left, None) => left,
            (Some(mut left), Some(mut right)) => {
                if left.prio <= right.prio {
                    left.right = Self::merge(left.right.take(), Some(right));
                    left.recalc();
                    Some(left)
                } else {
                    right.left = Self::merge(Some(left), right.left.take());
                    right.recalc();
                    Some(right)
                }
            }
        }
    }

    /// Moves every key `>= key` into a new tree.
    pub fn split_off(&mut self, key: &P::Key) -> Self
    where
        R: SeedableRng + RngCore,
    {
        let (left, right) = Self::split(self.root.take(), key, false);
        self.root = left;
        Self {
            root: right,
            rng: R::from_rng(&mut self.rng),
        }
    }

    /// Moves all of `other` into `self`.
    ///
    /// # Panics
    ///
    /// Panics if some key of `other` does not follow every key of `self`.
    pub fn append(&mut self, other: Self) {
        if let (Some((last, _)), Some((first, _))) = (self.last(), other.first()) {
            assert!(
                last < first,
                "appended tree must hold only keys greater than the receiver's"
            );
        }
        self.root = Self::merge(self.root.take(), other.root);
    }
}

impl<P: Aggregate, R: RngCore> OrderedMap for Treap<P, R> {
    type Key = P::Key;
    type Value = P::Value;

    fn len(&self) -> usize {
        Node::size(&self.root)
    }

    fn get(&self, key: &P::Key) -> Option<&P::Value> {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match key.cmp(&node.key) {
                Ordering::Less => cur = node.left.as_deref(),
                Ordering::Greater => cur = node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    fn set(&mut self, key: P::Key, value: P::Value) -> Option<P::Value> {
        let (lt, ge) = Self::split(self.root.take(), &key, false);
        let (eq, gt) = Self::split(ge, &key, true);

        let (mid, old) = match eq {
            Some(mut node) => {
                let old = std::mem::replace(&mut node.value, value);
                node.recalc();
                (Some(node), Some(old))
            }
            None => {
                let prio = self.rng.next_u64();
                (Some(Box::new(Node::new(key, value, prio))), None)
            }
        };
        self.root = Self::merge(Self::merge(lt, mid), gt);
        old
    }

    fn remove(&mut self, key: &P::Key) -> Option<P::Value> {
        let (lt, ge) = Self::split(self.root.take(), key, false);
        let (eq, gt) = Self::split(ge, key, true);
        self.root = Self::merge(lt, gt);
        eq.map(|node| node.value)
    }
}

impl<P: Aggregate, R: RngCore> RangeAggregate for Treap<P, R> {
    type Agg = P::Agg;

    fn aggregate_before(&self, key: &P::Key, inclusive: bool) -> Option<P::Agg> {
        let mut acc = None;
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match node.key.cmp(key) {
                Ordering::Less => {
                    if let Some(left) = node.left.as_deref() {
                        acc = Some(append_agg::<P>(acc, &left.agg));
                    }
                    acc = Some(append_agg::<P>(acc, &node.leaf()));
                    cur = node.right.as_deref();
                }
                Ordering::Equal => {
                    if let Some(left) = node.left.as_deref() {
                        acc = Some(append_agg::<P>(acc, &left.agg));
                    }
                    if inclusive {
                        acc = Some(append_agg::<P>(acc, &node.leaf()));
                    }
                    break;
                }
                Ordering::Greater => cur = node.left.as_deref(),
            }
        }
        acc
    }

    fn aggregate_after(&self, key: &P::Key, inclusive: bool) -> Option<P::Agg> {
        let mut acc = None;
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            match node.key.cmp(key) {
                Ordering::Greater => {
                    if let Some(right) = node.right.as_deref() {
                        acc = Some(prepend_agg::<P>(&right.agg, acc));
                    }
                    acc = Some(prepend_agg::<P>(&node.leaf(), acc));
                    cur = node.left.as_deref();
                }
                Ordering::Equal => {
                    if let Some(right) = node.right.as_deref() {
                        acc = Some(prepend_agg::<P>(&right.agg, acc));
                    }
                    if inclusive {
                        acc = Some(prepend_agg::<P>(&node.leaf(), acc));
                    }
                    break;
                }
                Ordering::Less => cur = node.right.as_deref(),
            }
        }
        acc
    }

    fn aggregate_all(&self) -> Option<P::Agg> {
        self.root.as_ref().map(|node| node.agg.clone())
    }
}

impl<P: Aggregate> Default for Treap<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, R> Clone for Treap<P, R>
where
    P: Aggregate,
    P::Key: Clone,
    P::Value: Clone,
    R: Clone,
{
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            rng: self.rng.clone(),
        }
    }
}

impl<P, R> fmt::Debug for Treap<P, R>
where
    P: Aggregate,
    P::Key: fmt::Debug,
    P::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<P: Aggregate, R: RngCore> Extend<(P::Key, P::Value)> for Treap<P, R> {
    fn extend<I: IntoIterator<Item = (P::Key, P::Value)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<P: Aggregate> FromIterator<(P::Key, P::Value)> for Treap<P> {
    fn from_iter<I: IntoIterator<Item = (P::Key, P::Value)>>(iter: I) -> Self {
        let mut treap = Self::new();
        treap.extend(iter);
        treap
    }
}

impl<'a, P: Aggregate, R> IntoIterator for &'a Treap<P, R> {
    type Item = (&'a P::Key, &'a P::Value);
    type IntoIter = Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over a [`Treap`].
pub struct Iter<'a, P: Aggregate> {
    stack: Vec<&'a Node<P>>,
    remaining: usize,
}

impl<'a, P: Aggregate> Iter<'a, P> {
    fn new(root: Option<&'a Node<P>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut cur: Option<&'a Node<P>>) {
        while let Some(node) = cur {
            self.stack.push(node);
            cur = node.left.as_deref();
        }
    }
}

impl<'a, P: Aggregate> Iterator for Iter<'a, P> {
    type Item = (&'a P::Key, &'a P::Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<P: Aggregate> ExactSizeIterator for Iter<'_, P> {}

impl<P: Aggregate> FusedIterator for Iter<'_, P> {}
