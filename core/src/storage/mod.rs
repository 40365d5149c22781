mod memory;

pub use memory::{CacheConfig, MemoryCachedTransaction, MemoryTangle};
