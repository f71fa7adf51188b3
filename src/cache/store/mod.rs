//! 存储层抽象
//! 限流器和缓存只依赖这里的 trait，具体实现可以是 Redis 或内存

use std::time::Duration;

use async_trait::async_trait;

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 一次滑动窗口记录请求
#[derive(Debug, Clone)]
pub struct WindowEntry<'a> {
    /// 本次事件的唯一成员名
    pub member: &'a str,
    /// 事件时间（Unix 秒）
    pub score: i64,
    /// 分数 <= window_start 的事件会先被清理
    pub window_start: i64,
    /// 窗口内允许的最大事件数
    pub limit: u64,
    /// 键在空闲多久后整体过期
    pub expiry: Duration,
}

/// 窗口检查结果，count 是检查结束时窗口内的事件数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { count: u64 },
    Rejected { count: u64 },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }

    pub fn count(&self) -> u64 {
        match *self {
            Admission::Admitted { count } | Admission::Rejected { count } => count,
        }
    }
}

/// 有序时间序列存储（Redis 有序集合语义）
#[async_trait]
pub trait TimeOrderedStore: Send + Sync {
    /// 原子地完成：清理过期事件、计数、未超限时记录新事件并刷新键过期时间。
    /// 被拒绝的请求不会被记录。
    async fn record_in_window(&self, key: &str, entry: WindowEntry<'_>)
    -> StoreResult<Admission>;
}

/// 字符串键值缓存
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_string(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    async fn delete(&self, keys: &[String]) -> StoreResult<()>;
}
