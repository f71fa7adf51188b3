use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, Script};

use super::{Admission, KeyValueStore, StoreResult, TimeOrderedStore, WindowEntry};

/// 清理、计数、记录、续期在一个脚本内完成，Redis 单线程执行保证原子性。
/// 返回 {是否放行, 窗口内事件数}
const SLIDING_WINDOW_SCRIPT: &str = r#"
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', ARGV[2])
local count = redis.call('ZCARD', KEYS[1])
if count >= tonumber(ARGV[3]) then
    return {0, count}
end
redis.call('ZADD', KEYS[1], ARGV[1], ARGV[4])
redis.call('EXPIRE', KEYS[1], ARGV[5])
return {1, count + 1}
"#;

/// 基于 Redis 的存储实现
#[derive(Clone)]
pub struct RedisStore {
    redis: Arc<RedisClient>,
    window_script: Arc<Script>,
}

impl RedisStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self {
            redis,
            window_script: Arc::new(Script::new(SLIDING_WINDOW_SCRIPT)),
        }
    }

    /// 健康检查
    pub async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Redis 的过期时间最小为 1 秒
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl TimeOrderedStore for RedisStore {
    async fn record_in_window(
        &self,
        key: &str,
        entry: WindowEntry<'_>,
    ) -> StoreResult<Admission> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let (admitted, count): (i64, i64) = self
            .window_script
            .key(key)
            .arg(entry.score)
            .arg(entry.window_start)
            .arg(entry.limit)
            .arg(entry.member)
            .arg(ttl_secs(entry.expiry))
            .invoke_async(&mut conn)
            .await?;

        let count = count.max(0) as u64;
        Ok(if admitted == 1 {
            Admission::Admitted { count }
        } else {
            Admission::Rejected { count }
        })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(key, value, ttl_secs(ttl)).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> StoreResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.redis.get_multiplexed_async_connection().await?;
        let _: () = conn.del(keys).await?;
        Ok(())
    }
}
