/// Ordered map interface.
///
/// - Keys are unique.
/// - `set` overwrites the existing value and returns the old one.
pub trait OrderedMap {
    type Key: Ord;
    type Value;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &Self::Key) -> Option<&Self::Value>;

    fn contains_key(&self, key: &Self::Key) -> bool {
        self.get(key).is_some()
    }

    fn set(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;
}

/// Range summaries over an [`OrderedMap`].
///
/// Every query returns `None` when the requested range holds no keys.
pub trait RangeAggregate: OrderedMap {
    type Agg;

    /// Aggregate of keys `< key`, or `<= key` when `inclusive`.
    fn aggregate_before(&self, key: &Self::Key, inclusive: bool) -> Option<Self::Agg>;

    /// Aggregate of keys `> key`, or `>= key` when `inclusive`.
    fn aggregate_after(&self, key: &Self::Key, inclusive: bool) -> Option<Self::Agg>;

    fn aggregate_all(&self) -> Option<Self::Agg>;
}
