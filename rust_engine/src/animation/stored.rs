//! 动画文件（MHFC ANM）与可重载的动画片段

use std::collections::HashMap;
use std::io::Read;

use once_cell::sync::Lazy;

use super::{AnimatedTransform, Animation};
use crate::format::{self, BinaryReader};
use crate::resource::{LoadableData, Reloadable, Resource, ResourceCache, ResourceLocation, ResourceManager};
use crate::skeleton::BoneTransform;
use crate::{FormatError, FormatResult, Result};

/// 动画文件内容：骨骼名 → 动画通道
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationData {
    pub artist: String,
    pub bones: HashMap<String, AnimatedTransform>,
}

impl Default for AnimationData {
    fn default() -> Self {
        Self {
            artist: "<unknown>".to_string(),
            bones: HashMap::new(),
        }
    }
}

/// 解析 MHFC ANM 文件
///
/// ```text
/// u64 magic, string artist, u8 version
/// v1: u8 bone_count, bone_count × (string name, 10 × AnimatedValue)
/// ```
pub fn decode_animation<R: Read>(reader: &mut BinaryReader<R>) -> FormatResult<AnimationData> {
    let header = format::read_animation_header(reader)?;
    let bones = match header.version {
        1 => read_v1(reader)?,
        v => return Err(FormatError::UnsupportedVersion(v as i32)),
    };
    log::debug!(
        "动画解析完成: artist={}, bones={}",
        header.artist,
        bones.len()
    );
    Ok(AnimationData {
        artist: header.artist,
        bones,
    })
}

fn read_v1<R: Read>(reader: &mut BinaryReader<R>) -> FormatResult<HashMap<String, AnimatedTransform>> {
    let count = reader.read_u8()? as usize;
    let mut bones = HashMap::with_capacity(count);
    for _ in 0..count {
        let name = reader.read_string()?;
        let transform = AnimatedTransform::read(reader)?;
        if bones.contains_key(&name) {
            return Err(FormatError::DuplicateName { kind: "animated bone", name });
        }
        bones.insert(name, transform);
    }
    Ok(bones)
}

static ANIMATION_CACHE: Lazy<ResourceCache<AnimationData>> =
    Lazy::new(|| ResourceCache::new("animation"));

impl LoadableData for AnimationData {
    const KIND: &'static str = "animation";

    fn cache() -> &'static ResourceCache<Self> {
        &ANIMATION_CACHE
    }

    fn decode(resource: &Resource) -> FormatResult<Self> {
        decode_animation(&mut resource.reader())
    }

    fn placeholder() -> Self {
        AnimationData::default()
    }
}

/// 存储的动画片段
///
/// 加载失败时为空片段（所有骨骼保持绑定姿态）。
pub struct StoredAnimation {
    data: Reloadable<AnimationData>,
}

impl StoredAnimation {
    pub fn from_resource(resource: &Resource) -> Self {
        Self {
            data: Reloadable::from_resource(resource),
        }
    }

    pub fn try_from_resource(resource: &Resource) -> Result<Self> {
        Ok(Self {
            data: Reloadable::try_from_resource(resource)?,
        })
    }

    pub fn load(manager: &dyn ResourceManager, location: &ResourceLocation) -> Self {
        Self {
            data: Reloadable::load(manager, location),
        }
    }

    /// 程序化构造，不可重载
    pub fn from_transforms(transforms: impl IntoIterator<Item = (String, AnimatedTransform)>) -> Self {
        Self {
            data: Reloadable::from_data(AnimationData {
                artist: String::new(),
                bones: transforms.into_iter().collect(),
            }),
        }
    }

    pub fn reload(&mut self, manager: &dyn ResourceManager) -> Result<()> {
        self.data.reload(manager)
    }

    pub fn artist(&self) -> &str {
        &self.data.data().artist
    }

    pub fn animated_bones(&self) -> impl Iterator<Item = &str> {
        self.data.data().bones.keys().map(String::as_str)
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_loaded()
    }

    pub fn location(&self) -> Option<&ResourceLocation> {
        self.data.location()
    }
}

impl Animation for StoredAnimation {
    fn get_transform(&self, bone: &str, frame: f32) -> Option<BoneTransform> {
        self.data
            .data()
            .bones
            .get(bone)
            .map(|t| t.transform_at(frame))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::animation::spline::mode;
    use crate::format::writer::BinaryWriter;
    use crate::format::ANIMATION_MAGIC;
    use crate::resource::MemoryResourceManager;
    use glam::{Vec2, Vec3};

    /// 只动 x 平移：帧 from.0 → from.1，帧 to.0 → to.1，线性
    pub(crate) fn write_slide_x(w: &mut BinaryWriter, name: &str, from: (f32, f32), to: (f32, f32)) {
        w.string(name);
        w.u16(2)
            .vec2(Vec2::new(from.0, from.1))
            .u8(mode::EASE_IN_CONST)
            .vec2(Vec2::new(to.0, to.1))
            .u8(mode::INTERPOLATION_LINEAR)
            .u8(mode::EASE_OUT_CONST);
        for _ in 0..9 {
            w.u16(0);
        }
    }

    pub(crate) fn slide_file(bone: &str, to_x: f32) -> Vec<u8> {
        let mut w = BinaryWriter::new();
        w.u64(ANIMATION_MAGIC).string("anm artist").u8(1).u8(1);
        write_slide_x(&mut w, bone, (0.0, 0.0), (10.0, to_x));
        w.into_bytes()
    }

    /// 一段 B 样条：(0,0) → (20,4)，控制点 (5,0)、(15,4)
    fn bezier_file() -> Vec<u8> {
        let mut w = BinaryWriter::new();
        w.u64(ANIMATION_MAGIC).string("anm artist").u8(1).u8(1);
        w.string("tail");
        w.u16(2)
            .vec2(Vec2::new(0.0, 0.0))
            .u8(mode::EASE_IN_CONST)
            .vec2(Vec2::new(20.0, 4.0))
            .u8(mode::INTERPOLATION_BSPLINE)
            .vec2(Vec2::new(5.0, 0.0))
            .vec2(Vec2::new(15.0, 4.0))
            .u8(mode::EASE_OUT_CONST);
        for _ in 0..9 {
            w.u16(0);
        }
        w.into_bytes()
    }

    #[test]
    fn test_decode_and_sample() {
        let bytes = slide_file("child", 10.0);
        let clip = StoredAnimation::from_resource(&Resource::from_bytes(bytes));
        assert!(clip.is_loaded());
        assert_eq!(clip.artist(), "anm artist");

        let t = clip.get_transform("child", 5.0).unwrap();
        assert!((t.translation - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(t.scale, Vec3::ONE);
        assert!(clip.get_transform("root", 5.0).is_none());

        // 范围外保持端点值
        let t = clip.get_transform("child", 50.0).unwrap();
        assert_eq!(t.translation.x, 10.0);
    }

    #[test]
    fn test_duplicate_animated_bone() {
        let mut w = BinaryWriter::new();
        w.u64(ANIMATION_MAGIC).string("").u8(1).u8(2);
        write_slide_x(&mut w, "a", (0.0, 0.0), (1.0, 1.0));
        write_slide_x(&mut w, "a", (0.0, 0.0), (1.0, 1.0));
        let bytes = w.into_bytes();
        assert!(matches!(
            decode_animation(&mut BinaryReader::new(&bytes[..])),
            Err(FormatError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut w = BinaryWriter::new();
        w.u64(ANIMATION_MAGIC).string("").u8(2).u8(0);
        let bytes = w.into_bytes();
        assert!(matches!(
            decode_animation(&mut BinaryReader::new(&bytes[..])),
            Err(FormatError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_truncated_everywhere() {
        let bytes = slide_file("child", 10.0);
        for cut in 0..bytes.len() {
            let result = decode_animation(&mut BinaryReader::new(&bytes[..cut]));
            assert!(
                matches!(result, Err(FormatError::UnexpectedEndOfStream)),
                "cut at {} gave {:?}",
                cut,
                result.map(|d| d.bones.len())
            );
        }
    }

    #[test]
    fn test_broken_file_is_empty_clip() {
        let mut bytes = slide_file("child", 10.0);
        bytes[0] = b'X';
        let clip = StoredAnimation::from_resource(&Resource::from_bytes(bytes));
        assert!(!clip.is_loaded());
        assert!(clip.get_transform("child", 5.0).is_none());
        assert_eq!(clip.animated_bones().count(), 0);
    }

    #[test]
    fn test_reload_swaps_data() {
        let mut manager = MemoryResourceManager::new();
        let loc = ResourceLocation::new("anim_test", "slide.mcanm");
        manager.insert(loc.clone(), slide_file("child", 10.0));
        let mut clip = StoredAnimation::load(&manager, &loc);
        assert!((clip.get_transform("child", 10.0).unwrap().translation.x - 10.0).abs() < 1e-6);

        manager.insert(loc.clone(), slide_file("child", 20.0));
        clip.reload(&manager).unwrap();
        assert!((clip.get_transform("child", 10.0).unwrap().translation.x - 20.0).abs() < 1e-6);

        let mut broken = slide_file("child", 30.0);
        broken.truncate(broken.len() - 3);
        manager.insert(loc.clone(), broken);
        assert!(clip.reload(&manager).is_err());
        assert!((clip.get_transform("child", 10.0).unwrap().translation.x - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_bezier_truncated_everywhere() {
        let bytes = bezier_file();
        let data = decode_animation(&mut BinaryReader::new(&bytes[..])).unwrap();
        let t = data.bones["tail"].transform_at(10.0);
        assert!((t.translation.x - 2.0).abs() < 1e-3);

        for cut in 0..bytes.len() {
            let result = decode_animation(&mut BinaryReader::new(&bytes[..cut]));
            assert!(
                matches!(result, Err(FormatError::UnexpectedEndOfStream)),
                "cut at {} gave {:?}",
                cut,
                result.map(|d| d.bones.len())
            );
        }
    }
}
