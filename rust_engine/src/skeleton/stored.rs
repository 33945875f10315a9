//! 骨骼原始数据与独立骨架文件（MHFC SKL）

use std::collections::HashSet;
use std::io::Read;

use glam::{Quat, Vec3};
use once_cell::sync::Lazy;
use uuid::Uuid;

use super::hierarchy::breadth_first_order;
use super::Skeleton;
use crate::format::{self, BinaryReader, SKELETON_MAGIC};
use crate::resource::{LoadableData, Reloadable, Resource, ResourceCache, ResourceLocation, ResourceManager};
use crate::{FormatError, FormatResult, Result};

/// 父骨骼字节中的 "无父骨骼"
pub const NO_PARENT: u8 = 0xFF;

/// 文件中的一根骨骼
#[derive(Clone, Debug, PartialEq)]
pub struct RawBone {
    pub name: String,
    pub rotation: Quat,
    pub offset: Vec3,
    pub parent: Option<u8>,
}

impl RawBone {
    /// 读取名称、旋转、偏移；父骨骼在骨骼列表之后单独读取
    pub fn read<R: Read>(reader: &mut BinaryReader<R>) -> FormatResult<Self> {
        let name = reader.read_string()?;
        let rotation = reader.read_quat()?;
        let offset = reader.read_vec3()?;
        Ok(Self {
            name,
            rotation,
            offset,
            parent: None,
        })
    }
}

/// 校验过的骨骼列表：名称唯一、父骨骼下标有效、无环
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSkeleton {
    bones: Vec<RawBone>,
    order: Vec<usize>,
}

impl RawSkeleton {
    pub fn new(bones: Vec<RawBone>) -> FormatResult<Self> {
        let mut names = HashSet::with_capacity(bones.len());
        for bone in &bones {
            if !names.insert(bone.name.as_str()) {
                return Err(FormatError::DuplicateName {
                    kind: "bone",
                    name: bone.name.clone(),
                });
            }
        }
        let parents: Vec<Option<usize>> = bones
            .iter()
            .map(|b| b.parent.map(usize::from))
            .collect();
        let order = breadth_first_order(&parents)?;
        Ok(Self { bones, order })
    }

    pub fn bones(&self) -> &[RawBone] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// 广度优先求值顺序（原始下标）
    pub fn breadth_first_order(&self) -> &[usize] {
        &self.order
    }
}

/// 读取骨骼列表
///
/// ```text
/// u8 bone_count
/// bone_count × (string name, quat rotation, vec3 offset)
/// bone_count × u8 parent (0xFF = 无)
/// ```
pub fn read_bone_list<R: Read>(reader: &mut BinaryReader<R>) -> FormatResult<RawSkeleton> {
    let count = reader.read_u8()? as usize;
    read_bones(reader, count)
}

/// 读取骨骼数已知（由外层头部给出）的骨骼列表
pub fn read_bones<R: Read>(reader: &mut BinaryReader<R>, count: usize) -> FormatResult<RawSkeleton> {
    let mut bones = Vec::with_capacity(count);
    for _ in 0..count {
        bones.push(RawBone::read(reader)?);
    }
    read_parents(reader, &mut bones)?;
    RawSkeleton::new(bones)
}

fn read_parents<R: Read>(reader: &mut BinaryReader<R>, bones: &mut [RawBone]) -> FormatResult<()> {
    let count = bones.len();
    for bone in bones.iter_mut() {
        let parent = reader.read_u8()?;
        if parent == NO_PARENT {
            continue;
        }
        if parent as usize >= count {
            return Err(FormatError::IndexOutOfRange {
                kind: "parent",
                index: parent as usize,
                limit: count,
            });
        }
        bone.parent = Some(parent);
    }
    Ok(())
}

/// 独立骨架文件内容
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkeletonData {
    pub uuid: Uuid,
    pub artist: String,
    pub skeleton: RawSkeleton,
}

/// 解析 MHFC SKL 文件
pub fn decode_skeleton<R: Read>(reader: &mut BinaryReader<R>) -> FormatResult<SkeletonData> {
    let header = format::read_artifact_header(reader, SKELETON_MAGIC)?;
    let skeleton = match header.version {
        1 => read_bone_list(reader)?,
        v => return Err(FormatError::UnsupportedVersion(v)),
    };
    log::debug!(
        "骨架解析完成: artist={}, bones={}",
        header.artist,
        skeleton.len()
    );
    Ok(SkeletonData {
        uuid: header.uuid,
        artist: header.artist,
        skeleton,
    })
}

static SKELETON_CACHE: Lazy<ResourceCache<SkeletonData>> =
    Lazy::new(|| ResourceCache::new("skeleton"));

impl LoadableData for SkeletonData {
    const KIND: &'static str = "skeleton";

    fn cache() -> &'static ResourceCache<Self> {
        &SKELETON_CACHE
    }

    fn decode(resource: &Resource) -> FormatResult<Self> {
        decode_skeleton(&mut resource.reader())
    }

    fn placeholder() -> Self {
        SkeletonData::default()
    }
}

/// 可重载的独立骨架
pub struct SkeletonMcskl {
    data: Reloadable<SkeletonData>,
}

impl SkeletonMcskl {
    /// 从资源加载；失败时记录日志并使用空骨架
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            data: Reloadable::from_resource(resource),
        }
    }

    pub fn load(manager: &dyn ResourceManager, location: &ResourceLocation) -> Self {
        Self {
            data: Reloadable::load(manager, location),
        }
    }

    pub fn reload(&mut self, manager: &dyn ResourceManager) -> Result<()> {
        self.data.reload(manager)
    }

    pub fn data(&self) -> &SkeletonData {
        self.data.data()
    }

    pub fn location(&self) -> Option<&ResourceLocation> {
        self.data.location()
    }

    /// 构建一个独立的运行时骨骼（每个实例各自保存姿态）
    pub fn build_skeleton(&self) -> Skeleton {
        Skeleton::new(&self.data().skeleton)
    }
}
