//! 按资源位置共享的解析结果缓存
//!
//! 同一位置的资源只解析一次，多个模型 / 动画实例共享同一份原始数据。
//! `invalidate_caches` 整体作废所有缓存（资源包重载时调用），不做增量失效。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{Resource, ResourceLocation};
use crate::config;
use crate::FormatResult;

/// 全局缓存代数，每次作废加一
static CACHE_EPOCH: AtomicU64 = AtomicU64::new(0);

/// 作废所有缓存
pub fn invalidate_caches() {
    let epoch = CACHE_EPOCH.fetch_add(1, Ordering::SeqCst) + 1;
    log::info!("资源缓存已作废 (epoch {})", epoch);
}

struct CacheState<D> {
    epoch: u64,
    entries: HashMap<ResourceLocation, Arc<D>>,
}

pub struct ResourceCache<D> {
    kind: &'static str,
    epoch_source: &'static AtomicU64,
    /// 为 false 时此缓存始终旁路，不论全局配置
    enabled: bool,
    state: Mutex<CacheState<D>>,
}

impl<D> ResourceCache<D> {
    /// 跟随全局作废的缓存
    pub fn new(kind: &'static str) -> Self {
        Self::with_epoch_source(kind, &CACHE_EPOCH)
    }

    /// 使用独立的代数计数器
    pub fn with_epoch_source(kind: &'static str, epoch_source: &'static AtomicU64) -> Self {
        Self {
            kind,
            epoch_source,
            enabled: true,
            state: Mutex::new(CacheState {
                epoch: epoch_source.load(Ordering::SeqCst),
                entries: HashMap::new(),
            }),
        }
    }

    /// 始终旁路的缓存
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// 本缓存是否生效（同时受 `resource_cache_enabled` 控制）
    pub fn is_enabled(&self) -> bool {
        self.enabled && config::get_config().resource_cache_enabled
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut CacheState<D>) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let epoch = self.epoch_source.load(Ordering::SeqCst);
        if state.epoch != epoch {
            state.entries.clear();
            state.epoch = epoch;
        }
        f(&mut state)
    }

    pub fn get(&self, location: &ResourceLocation) -> Option<Arc<D>> {
        self.with_state(|s| s.entries.get(location).cloned())
    }

    pub fn insert(&self, location: ResourceLocation, data: Arc<D>) {
        self.with_state(|s| {
            s.entries.insert(location, data);
        })
    }

    /// 缓存生效时写入，否则忽略（重载成功后刷新共享数据）
    pub fn store(&self, location: ResourceLocation, data: Arc<D>) {
        if self.is_enabled() {
            self.insert(location, data);
        }
    }

    pub fn len(&self) -> usize {
        self.with_state(|s| s.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.with_state(|s| s.entries.clear())
    }

    /// 命中则返回缓存，否则解析并缓存
    ///
    /// 无来源的资源以及关闭缓存时总是直接解析。解析失败不缓存。
    pub fn get_or_parse<F>(&self, resource: &Resource, parse: F) -> FormatResult<Arc<D>>
    where
        F: FnOnce(&Resource) -> FormatResult<D>,
    {
        let location = match resource.origin() {
            Some(loc) if self.is_enabled() => loc,
            _ => return parse(resource).map(Arc::new),
        };

        if let Some(hit) = self.get(location) {
            log::debug!("{} 缓存命中: {}", self.kind, location);
            return Ok(hit);
        }

        let data = Arc::new(parse(resource)?);
        self.insert(location.clone(), Arc::clone(&data));
        Ok(data)
    }
}
