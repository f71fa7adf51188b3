// 缓存模块
// 包含存储抽象、缓存键以及限流和旁路缓存逻辑

pub mod clock;
pub mod keys;
pub mod operations;
pub mod store;

// 重新导出常用类型，方便其他模块使用
pub use clock::{Clock, ManualClock, SystemClock};
pub use operations::{CacheAside, Fetched, RateLimitDecision, SlidingWindowRateLimiter};
pub use store::{KeyValueStore, MemoryStore, RedisStore, StoreError, StoreResult, TimeOrderedStore};
