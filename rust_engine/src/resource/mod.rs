//! 资源定位、读取、缓存与重载

mod cache;
mod reloadable;

pub use cache::{invalidate_caches, ResourceCache};
pub use reloadable::{LoadableData, Reloadable};

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::format::BinaryReader;
use crate::{McAnmError, Result};

/// 默认命名空间
pub const DEFAULT_DOMAIN: &str = "minecraft";

/// 资源位置 `domain:path`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceLocation {
    domain: String,
    path: String,
}

impl ResourceLocation {
    pub fn new(domain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            path: path.into(),
        }
    }

    /// 解析 `domain:path`，省略命名空间时使用 `minecraft`
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((domain, path)) => Self::new(domain, path),
            None => Self::new(DEFAULT_DOMAIN, s),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.domain, self.path)
    }
}

/// 一份已读入内存的资源
#[derive(Clone, Debug)]
pub struct Resource {
    origin: Option<ResourceLocation>,
    data: Vec<u8>,
}

impl Resource {
    /// 无来源的原始字节（不参与缓存，不能重载）
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: None,
            data: data.into(),
        }
    }

    pub fn with_origin(origin: ResourceLocation, data: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: Some(origin),
            data: data.into(),
        }
    }

    pub fn origin(&self) -> Option<&ResourceLocation> {
        self.origin.as_ref()
    }

    /// 日志与错误中使用的名称
    pub fn name(&self) -> String {
        match &self.origin {
            Some(loc) => loc.to_string(),
            None => "<unknown resource>".to_string(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn reader(&self) -> BinaryReader<&[u8]> {
        BinaryReader::new(&self.data[..])
    }
}

/// 按位置提供字节流
pub trait ResourceManager {
    fn open(&self, location: &ResourceLocation) -> Result<Resource>;
}

/// 从目录读取：`<root>/assets/<domain>/<path>`
pub struct DirectoryResourceManager {
    root: PathBuf,
}

impl DirectoryResourceManager {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn resolve(&self, location: &ResourceLocation) -> PathBuf {
        self.root
            .join("assets")
            .join(location.domain())
            .join(location.path())
    }
}

impl ResourceManager for DirectoryResourceManager {
    fn open(&self, location: &ResourceLocation) -> Result<Resource> {
        let path = self.resolve(location);
        match fs::read(&path) {
            Ok(data) => Ok(Resource::with_origin(location.clone(), data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(McAnmError::ResourceNotFound(location.to_string()))
            }
            Err(e) => Err(McAnmError::Io {
                resource: location.to_string(),
                source: e,
            }),
        }
    }
}

/// 内存资源表（测试和程序化资源）
#[derive(Default)]
pub struct MemoryResourceManager {
    entries: HashMap<ResourceLocation, Vec<u8>>,
}

impl MemoryResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: ResourceLocation, data: impl Into<Vec<u8>>) {
        self.entries.insert(location, data.into());
    }

    pub fn remove(&mut self, location: &ResourceLocation) -> Option<Vec<u8>> {
        self.entries.remove(location)
    }
}

impl ResourceManager for MemoryResourceManager {
    fn open(&self, location: &ResourceLocation) -> Result<Resource> {
        self.entries
            .get(location)
            .map(|data| Resource::with_origin(location.clone(), data.clone()))
            .ok_or_else(|| McAnmError::ResourceNotFound(location.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let loc = ResourceLocation::parse("mhfc:models/rathalos.mcmd");
        assert_eq!(loc.domain(), "mhfc");
        assert_eq!(loc.path(), "models/rathalos.mcmd");
        assert_eq!(loc.to_string(), "mhfc:models/rathalos.mcmd");

        let loc = ResourceLocation::parse("textures/a.png");
        assert_eq!(loc.domain(), DEFAULT_DOMAIN);
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(Resource::from_bytes(vec![1]).name(), "<unknown resource>");
        let res = Resource::with_origin(ResourceLocation::new("a", "b"), vec![1]);
        assert_eq!(res.name(), "a:b");
    }

    #[test]
    fn test_memory_manager() {
        let mut manager = MemoryResourceManager::new();
        let loc = ResourceLocation::new("test", "x.bin");
        manager.insert(loc.clone(), vec![1, 2, 3]);
        let res = manager.open(&loc).unwrap();
        assert_eq!(res.bytes(), &[1, 2, 3]);
        assert_eq!(res.origin(), Some(&loc));

        manager.remove(&loc);
        assert!(matches!(
            manager.open(&loc),
            Err(McAnmError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_directory_manager() {
        let root = std::env::temp_dir().join(format!("mcanm_res_{}", std::process::id()));
        let manager = DirectoryResourceManager::new(&root);
        let loc = ResourceLocation::new("test", "models/a.mcmd");
        let path = manager.resolve(&loc);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, [9u8, 8, 7]).unwrap();

        let res = manager.open(&loc).unwrap();
        assert_eq!(res.bytes(), &[9, 8, 7]);
        assert!(matches!(
            manager.open(&ResourceLocation::new("test", "missing")),
            Err(McAnmError::ResourceNotFound(_))
        ));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_directory_read_error_carries_location() {
        let root = std::env::temp_dir().join(format!("mcanm_res_dir_{}", std::process::id()));
        let manager = DirectoryResourceManager::new(&root);
        let loc = ResourceLocation::new("test", "models");
        // 路径是目录，读取失败但不是 NotFound
        fs::create_dir_all(manager.resolve(&loc)).unwrap();

        match manager.open(&loc) {
            Err(McAnmError::Io { resource, source }) => {
                assert_eq!(resource, "test:models");
                assert_ne!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("unexpected: {:?}", other.map(|r| r.bytes().len())),
        }

        let _ = fs::remove_dir_all(&root);
    }
}
