//! Query/mutation cache.
//!
//! Read results are cached per structured key with in-flight de-duplication
//! and stale-while-revalidate invalidation. Writes go through a tracker that
//! exposes a pending flag and runs side effects on completion.

pub mod mutation;
pub mod query_cache;
pub mod query_key;

pub use mutation::MutationTracker;
pub use query_cache::{QueryCache, QueryError, QueryState, QueryStatus};
pub use query_key::{QueryKey, QueryScope};
