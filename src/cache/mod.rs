//! In-memory query cache keyed by collection name.
//!
//! - Results live for the lifetime of the process, never on disk
//! - Reads are served from cache until stale or invalidated
//! - Invalidation bumps a per-key generation; results fetched under an older
//!   generation are stored already invalid

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::MemoryStorage;
pub use traits::QueryKey;
