use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use crate::cache::store::KeyValueStore;

/// 旁路缓存读取结果
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub from_cache: bool,
}

/// 旁路缓存
///
/// 命中则直接返回，未命中则调用 loader 从数据源加载并回填。
/// 缓存层的任何错误（连接失败、数据损坏）都按未命中处理，数据源永远是兜底。
/// 空结果不缓存。
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl CacheAside {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn get_or_load<T, E, F, Fut>(
        &self,
        key: &str,
        loader: F,
    ) -> Result<Fetched<Vec<T>>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        if let Some(value) = self.get::<Vec<T>>(key).await {
            tracing::debug!("Get from cache: {}", key);
            return Ok(Fetched {
                value,
                from_cache: true,
            });
        }

        let value = loader().await?;

        if !value.is_empty() {
            self.put(key, &value).await;
        }

        Ok(Fetched {
            value,
            from_cache: false,
        })
    }

    /// 无条件写入缓存并刷新 TTL，失败只记录日志
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize cache entry {}: {}", key, e);
                return;
            }
        };

        match self.store.set_string(key, &json, self.ttl).await {
            Ok(()) => tracing::debug!("Set to cache: {}", key),
            Err(e) => tracing::warn!("Failed to write cache entry {}: {}", key, e),
        }
    }

    /// 删除缓存项，失败只记录日志
    pub async fn invalidate(&self, keys: &[String]) {
        if let Err(e) = self.store.delete(keys).await {
            tracing::warn!("Failed to invalidate cache entries {:?}: {}", keys, e);
        }
    }

    async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = match self.store.get_string(key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding corrupt cache entry {}: {}", key, e);
                None
            }
        }
    }
}
