mod error;
mod keyed;
mod multiset;
mod policy;
mod queue;
mod traits;
mod treap;
mod zero_prefix;

pub use error::{Result, RetroError};
pub use keyed::{MaxKeyedTree, MinKeyedTree};
pub use multiset::{OrderedMultiset, OrderedSet};
pub use policy::{Aggregate, Keyed, MaxKeyed, MinKeyed, Plain, PrefixSummary, ZeroPrefixSum};
pub use queue::{Operation, RetroactivePriorityQueue};
pub use traits::{OrderedMap, RangeAggregate};
pub use treap::{Iter, Treap};
pub use zero_prefix::ZeroPrefixTree;
