//! 可重载的数据持有者
//!
//! 首次加载失败时使用占位数据；重载失败时保留上一次成功的数据。
//! 替换只在完整解析成功后进行，读取方看不到半更新的状态。

use std::sync::Arc;

use super::{Resource, ResourceCache, ResourceLocation, ResourceManager};
use crate::{FormatResult, McAnmError, Result};

/// 可从资源解析、可缓存的数据
pub trait LoadableData: Sized + Send + Sync + 'static {
    /// 日志中使用的种类名
    const KIND: &'static str;

    fn cache() -> &'static ResourceCache<Self>;

    fn decode(resource: &Resource) -> FormatResult<Self>;

    /// 加载失败时使用的空数据
    fn placeholder() -> Self;
}

pub struct Reloadable<D> {
    location: Option<ResourceLocation>,
    data: Arc<D>,
    loaded: bool,
}

impl<D: LoadableData> Reloadable<D> {
    /// 直接持有已构造的数据（无来源，不可重载）
    pub fn from_data(data: D) -> Self {
        Self {
            location: None,
            data: Arc::new(data),
            loaded: true,
        }
    }

    /// 解析资源，失败则返回错误
    pub fn try_from_resource(resource: &Resource) -> Result<Self> {
        let data = D::cache()
            .get_or_parse(resource, D::decode)
            .map_err(|e| McAnmError::format(resource.name(), e))?;
        Ok(Self {
            location: resource.origin().cloned(),
            data,
            loaded: true,
        })
    }

    /// 解析资源，失败时记录错误并使用占位数据
    pub fn from_resource(resource: &Resource) -> Self {
        match Self::try_from_resource(resource) {
            Ok(r) => r,
            Err(e) => {
                log::error!("加载 {} 失败: {}", D::KIND, e);
                Self::placeholder(resource.origin().cloned())
            }
        }
    }

    /// 通过资源管理器加载；失败时使用占位数据，但保留位置以便之后重载
    pub fn load(manager: &dyn ResourceManager, location: &ResourceLocation) -> Self {
        match manager.open(location) {
            Ok(resource) => Self::from_resource(&resource),
            Err(e) => {
                log::error!("打开 {} {} 失败: {}", D::KIND, location, e);
                Self::placeholder(Some(location.clone()))
            }
        }
    }

    fn placeholder(location: Option<ResourceLocation>) -> Self {
        Self {
            location,
            data: Arc::new(D::placeholder()),
            loaded: false,
        }
    }

    /// 重新打开并解析；成功才替换数据，失败时保留原数据并返回错误
    ///
    /// 无来源的数据不可重载，直接返回 `Ok`。
    pub fn reload(&mut self, manager: &dyn ResourceManager) -> Result<()> {
        let location = match &self.location {
            Some(loc) => loc.clone(),
            None => return Ok(()),
        };
        let result = manager.open(&location).and_then(|resource| {
            D::decode(&resource).map_err(|e| McAnmError::format(resource.name(), e))
        });
        match result {
            Ok(data) => {
                let data = Arc::new(data);
                D::cache().store(location, Arc::clone(&data));
                self.data = data;
                self.loaded = true;
                Ok(())
            }
            Err(e) => {
                log::error!("重载 {} {} 失败，保留原数据: {}", D::KIND, location, e);
                Err(e)
            }
        }
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn location(&self) -> Option<&ResourceLocation> {
        self.location.as_ref()
    }

    /// 当前数据是否来自一次成功的解析（而不是占位数据）
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}
