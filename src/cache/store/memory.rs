use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::{
    Admission, KeyValueStore, StoreError, StoreResult, TimeOrderedStore, WindowEntry,
};
use crate::cache::clock::{Clock, SystemClock};

#[derive(Default)]
struct SortedSet {
    // (score, member)
    entries: Vec<(i64, String)>,
    expires_at: Option<i64>,
}

struct Entry {
    value: String,
    expires_at: i64,
}

#[derive(Default)]
struct State {
    sorted_sets: HashMap<String, SortedSet>,
    strings: HashMap<String, Entry>,
}

/// 进程内存储，所有操作在同一把锁内完成，语义与 Redis 实现一致。
/// 过期时间按注入的时钟计算。
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
    unavailable: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 模拟后端不可用，之后的所有操作都返回 `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 有序集合中当前未过期的事件数
    pub fn window_len(&self, key: &str) -> usize {
        let now = self.clock.now();
        let Ok(mut state) = self.lock() else {
            return 0;
        };
        Self::purge_expired(&mut state, now);
        state
            .sorted_sets
            .get(key)
            .map(|set| set.entries.len())
            .unwrap_or(0)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    fn purge_expired(state: &mut State, now: i64) {
        state
            .sorted_sets
            .retain(|_, set| set.expires_at.is_none_or(|at| at > now));
        state.strings.retain(|_, entry| entry.expires_at > now);
    }
}

fn ttl_secs(ttl: Duration) -> i64 {
    ttl.as_secs().max(1) as i64
}

#[async_trait]
impl TimeOrderedStore for MemoryStore {
    async fn record_in_window(
        &self,
        key: &str,
        entry: WindowEntry<'_>,
    ) -> StoreResult<Admission> {
        let now = self.clock.now();
        let mut state = self.lock()?;
        Self::purge_expired(&mut state, now);

        let set = state.sorted_sets.entry(key.to_string()).or_default();
        set.entries.retain(|(score, _)| *score > entry.window_start);

        let count = set.entries.len() as u64;
        if count >= entry.limit {
            if set.entries.is_empty() {
                state.sorted_sets.remove(key);
            }
            return Ok(Admission::Rejected { count });
        }

        set.entries.retain(|(_, member)| member != entry.member);
        set.entries.push((entry.score, entry.member.to_string()));
        set.entries.sort_by_key(|(score, _)| *score);
        set.expires_at = Some(now + ttl_secs(entry.expiry));

        Ok(Admission::Admitted {
            count: set.entries.len() as u64,
        })
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        let now = self.clock.now();
        let mut state = self.lock()?;
        Self::purge_expired(&mut state, now);
        Ok(state.strings.get(key).map(|entry| entry.value.clone()))
    }

    async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let now = self.clock.now();
        let mut state = self.lock()?;
        state.strings.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl_secs(ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> StoreResult<()> {
        let mut state = self.lock()?;
        for key in keys {
            state.strings.remove(key);
            state.sorted_sets.remove(key);
        }
        Ok(())
    }
}
