//! 引擎配置
//!
//! 所有参数扁平化，默认值写在 `Default` 中，运行时可通过 `set_config` 覆盖。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 引擎配置（扁平化，不嵌套）
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    // ========== 资源 ==========
    /// 是否使用原始数据缓存（按资源位置共享），默认 true
    /// 关闭后每个实例都会重新解析自己的资源
    pub resource_cache_enabled: bool,

    // ========== 动画 ==========
    /// 默认交叉淡化窗口（帧），默认 10.0
    pub crossfade_frames: f32,

    // ========== 调试 ==========
    /// 是否输出额外的加载日志（骨骼顺序、部件数量），默认 false
    pub debug_log: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resource_cache_enabled: true,

            // 半秒左右（20 tps）
            crossfade_frames: 10.0,

            debug_log: false,
        }
    }
}

/// 全局配置实例
static ENGINE_CONFIG: Lazy<RwLock<EngineConfig>> =
    Lazy::new(|| RwLock::new(EngineConfig::default()));

/// 获取当前配置（只读）
pub fn get_config() -> EngineConfig {
    ENGINE_CONFIG
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// 手动设置配置
pub fn set_config(config: EngineConfig) {
    *ENGINE_CONFIG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(EngineConfig::default());
}
