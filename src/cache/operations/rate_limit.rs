use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::keys::rate_limit_key;
use crate::cache::store::{Admission, StoreResult, TimeOrderedStore, WindowEntry};

/// 一次限流判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub limited: bool,
    pub limit: u64,
    /// 本次判定之后窗口内还剩余的请求数
    pub remaining: u64,
}

/// 滑动窗口日志限流器
///
/// 每个身份在存储中对应一个有序集合，成员是请求事件，分数是请求时间（Unix 秒）。
/// 窗口是半开区间 `(now - window, now]`：恰好 `window` 秒前的事件不再计数。
/// 清理、计数、记录由存储原子完成，同一身份的并发请求不会重复占用最后一个名额。
///
/// 存储不可用时直接返回错误，由调用方决定放行还是拒绝。
#[derive(Clone)]
pub struct SlidingWindowRateLimiter {
    store: Arc<dyn TimeOrderedStore>,
    clock: Arc<dyn Clock>,
    limit: u64,
    window: Duration,
}

impl SlidingWindowRateLimiter {
    pub fn new(store: Arc<dyn TimeOrderedStore>, limit: u64, window: Duration) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), limit, window)
    }

    pub fn with_clock(
        store: Arc<dyn TimeOrderedStore>,
        clock: Arc<dyn Clock>,
        limit: u64,
        window: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            limit,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// 是否超过限额；未超限时本次请求会被记录
    pub async fn is_rate_limited(&self, identity: &str) -> StoreResult<bool> {
        Ok(self.check(identity).await?.limited)
    }

    pub async fn check(&self, identity: &str) -> StoreResult<RateLimitDecision> {
        let now = self.clock.now();
        let window_start = now - self.window.as_secs() as i64;
        // 同一秒内的多个请求需要各自计数，成员名必须唯一
        let member = format!("{}-{}", now, Uuid::new_v4());

        let admission = self
            .store
            .record_in_window(
                &rate_limit_key(identity),
                WindowEntry {
                    member: &member,
                    score: now,
                    window_start,
                    limit: self.limit,
                    expiry: self.window,
                },
            )
            .await?;

        let decision = RateLimitDecision {
            limited: !admission.is_admitted(),
            limit: self.limit,
            remaining: self.limit.saturating_sub(admission.count()),
        };

        if let Admission::Rejected { count } = admission {
            tracing::debug!(identity, count, "Rate limit exceeded");
        }

        Ok(decision)
    }
}
