/// 缓存操作
/// 滑动窗口限流和旁路缓存

// 旁路缓存
pub mod aside;

// 滑动窗口限流
pub mod rate_limit;

// 重新导出常用操作
pub use aside::{CacheAside, Fetched};
pub use rate_limit::{RateLimitDecision, SlidingWindowRateLimiter};
