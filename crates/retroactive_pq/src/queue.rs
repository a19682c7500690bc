use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::error::{Result, RetroError};
use crate::keyed::{MaxKeyedTree, MinKeyedTree};
use crate::multiset::OrderedMultiset;
use crate::traits::OrderedMap;
use crate::treap::Treap;
use crate::zero_prefix::ZeroPrefixTree;

const DEFAULT_SEED: u64 = 0x5EED_0917_2026;

// Tags stored in `tags`: their running sum at any time counts the elements
// present then that are gone from the present-day queue.
const INACTIVE_INSERT: i64 = 1;
const ACTIVE_INSERT: i64 = 0;
const DELETE_MIN: i64 = -1;

/// A recorded operation, as reported by [`RetroactivePriorityQueue::operations`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation<V> {
    Insert(V),
    DeleteMin,
}

/// Min-priority queue whose history of inserts and delete-mins can be edited
/// at any time, not only at the end.
///
/// The queue always holds what replaying every recorded operation in time
/// order, starting from empty, would leave behind. Each edit costs expected
/// `O(log n)`.
///
/// Equal values are told apart by insertion time: among equal values, the
/// earliest insert is treated as the smallest.
pub struct RetroactivePriorityQueue<K: Ord + Clone, V: Ord + Clone> {
    /// Values in the present-day queue.
    now: OrderedMultiset<V>,
    /// Inserts whose value is still in `now`.
    active: MinKeyedTree<K, V>,
    /// Inserts whose value was taken by some delete-min.
    inactive: MaxKeyedTree<K, V>,
    /// Every recorded time, tagged `INACTIVE_INSERT`, `ACTIVE_INSERT` or `DELETE_MIN`.
    tags: ZeroPrefixTree<K>,
    /// Every recorded time, `+1` for inserts and `-1` for delete-mins.
    sizes: ZeroPrefixTree<K>,
}

impl<K, V> RetroactivePriorityQueue<K, V>
where
    K: Ord + Clone + fmt::Debug,
    V: Ord + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Seeds the tree priorities; contents never depend on the seed.
    pub fn with_seed(seed: u64) -> Self {
        let mut seeds = StdRng::seed_from_u64(seed);
        Self {
            now: OrderedMultiset::with_rng(StdRng::from_rng(&mut seeds)),
            active: Treap::with_rng(StdRng::from_rng(&mut seeds)),
            inactive: Treap::with_rng(StdRng::from_rng(&mut seeds)),
            tags: Treap::with_rng(StdRng::from_rng(&mut seeds)),
            sizes: Treap::with_rng(StdRng::from_rng(&mut seeds)),
        }
    }

    /// Records `insert(value)` at `time`.
    pub fn add_insert(&mut self, time: K, value: V) -> Result<()> {
        if self.tags.contains_key(&time) {
            debug!(?time, "insert rejected: time already recorded");
            return Err(RetroError::AlreadyExists);
        }

        self.inactive.set(time.clone(), value);
        self.tags.set(time.clone(), INACTIVE_INSERT);
        self.sizes.set(time.clone(), 1);

        let (promoted, value) = self.insert_for(&time);
        trace!(?time, ?promoted, ?value, "recorded insert");
        self.promote(promoted, value);
        Ok(())
    }

    /// Records `delete-min` at `time`.
    pub fn add_delete_min(&mut self, time: K) -> Result<()> {
        if self.tags.contains_key(&time) {
            debug!(?time, "delete-min rejected: time already recorded");
            return Err(RetroError::AlreadyExists);
        }
        if self.sizes.touches_zero_from(&time) {
            debug!(?time, "delete-min rejected: queue would underflow");
            return Err(RetroError::WouldUnderflow);
        }

        let (evicted, value) = self.delete_for(&time);
        trace!(?time, ?evicted, ?value, "recorded delete-min");
        self.evict(evicted, value);
        self.tags.set(time.clone(), DELETE_MIN);
        self.sizes.set(time, -1);
        Ok(())
    }

    /// Erases whatever operation is recorded at `time`.
    pub fn remove(&mut self, time: &K) -> Result<()> {
        let Some(&tag) = self.tags.get(time) else {
            debug!(?time, "remove rejected: nothing recorded");
            return Err(RetroError::NotFound);
        };

        match tag {
            DELETE_MIN => {
                let (promoted, value) = self.insert_for(time);
                trace!(?time, ?promoted, ?value, "removed delete-min");
                self.promote(promoted, value);
            }
            ACTIVE_INSERT => {
                let value = self
                    .active
                    .remove(time)
                    .unwrap_or_else(|| panic!("active insert at {time:?} is not tracked"));
                trace!(?time, ?value, "removed present insert");
                if self.now.remove(&value).is_err() {
                    panic!("value {value:?} of active insert at {time:?} is not queued");
                }
            }
            INACTIVE_INSERT => {
                if self.sizes.touches_zero_from(time) {
                    debug!(?time, "remove rejected: queue would underflow");
                    return Err(RetroError::WouldUnderflow);
                }
                let (evicted, value) = self.delete_for(time);
                trace!(?time, ?evicted, ?value, "removed deleted insert");
                self.evict(evicted, value);
                self.inactive
                    .remove(time)
                    .unwrap_or_else(|| panic!("deleted insert at {time:?} is not tracked"));
            }
            other => unreachable!("unknown operation tag {other} at {time:?}"),
        }

        self.tags.remove(time);
        self.sizes.remove(time);
        Ok(())
    }

    /// Values of the present-day queue in ascending order.
    pub fn contents(&self) -> impl Iterator<Item = &V> + '_ {
        self.now.iter()
    }

    pub fn len(&self) -> usize {
        self.now.len()
    }

    pub fn is_empty(&self) -> bool {
        self.now.is_empty()
    }

    pub fn contains(&self, value: &V) -> bool {
        self.now.contains(value)
    }

    /// Smallest value in the present-day queue, i.e. the first of [`Self::contents`].
    pub fn min(&self) -> Option<&V> {
        self.now.first()
    }

    pub fn contains_time(&self, time: &K) -> bool {
        self.tags.contains_key(time)
    }

    pub fn operation_count(&self) -> usize {
        self.tags.len()
    }

    /// Recorded operations in time order.
    pub fn operations(&self) -> impl Iterator<Item = (&K, Operation<&V>)> + '_ {
        self.tags.iter().map(|(time, &tag)| {
            let op = if tag == DELETE_MIN {
                Operation::DeleteMin
            } else {
                Operation::Insert(self.inserted_value(time))
            };
            (time, op)
        })
    }

    fn inserted_value(&self, time: &K) -> &V {
        self.active
            .get(time)
            .or_else(|| self.inactive.get(time))
            .unwrap_or_else(|| panic!("insert at {time:?} is not tracked"))
    }

    /// The deleted insert that re-enters the queue after an edit at `time`:
    /// the largest one recorded at or after the last bridge before `time`.
    fn insert_for(&self, time: &K) -> (K, V) {
        let bridge = self.tags.zero_prefix_before(time);
        self.inactive
            .max_at_or_after(&bridge)
            .unwrap_or_else(|| panic!("no deleted insert after bridge {bridge:?} for {time:?}"))
            .into_pair()
    }

    /// The present insert that leaves the queue after an edit at `time`:
    /// the smallest one recorded at or before the first bridge after `time`.
    fn delete_for(&self, time: &K) -> (K, V) {
        let bridge = self
            .tags
            .zero_prefix_after(time)
            .unwrap_or_else(|| panic!("no bridge at or after {time:?}"));
        self.active
            .min_at_or_before(&bridge)
            .unwrap_or_else(|| panic!("no present insert before bridge {bridge:?} for {time:?}"))
            .into_pair()
    }

    fn promote(&mut self, time: K, value: V) {
        self.inactive
            .remove(&time)
            .unwrap_or_else(|| panic!("promoted insert at {time:?} is not tracked as deleted"));
        self.now.add(value.clone());
        self.active.set(time.clone(), value);
        self.tags.set(time, ACTIVE_INSERT);
    }

    fn evict(&mut self, time: K, value: V) {
        self.active
            .remove(&time)
            .unwrap_or_else(|| panic!("evicted insert at {time:?} is not tracked as present"));
        if self.now.remove(&value).is_err() {
            panic!("evicted value {value:?} of insert at {time:?} is not queued");
        }
        self.inactive.set(time.clone(), value);
        self.tags.set(time, INACTIVE_INSERT);
    }
}

impl<K, V> Default for RetroactivePriorityQueue<K, V>
where
    K: Ord + Clone + fmt::Debug,
    V: Ord + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for RetroactivePriorityQueue<K, V>
where
    K: Ord + Clone + fmt::Debug,
    V: Ord + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetroactivePriorityQueue")
            .field("contents", &self.now)
            .field("operations", &self.tags.len())
            .finish()
    }
}
