//! MHFC 运行时模型

use glam::{Vec2, Vec3};
use once_cell::sync::Lazy;
use uuid::Uuid;

use super::{decode_model, ModelData, Part};
use crate::animation::Animation;
use crate::config;
use crate::resource::{LoadableData, Reloadable, Resource, ResourceCache, ResourceLocation, ResourceManager};
use crate::skeleton::{Skeleton, SkeletonMcskl};
use crate::{FormatResult, Result};

/// 渲染输出
pub trait RenderSink {
    /// 切换到部件的材质（纹理位置字符串）
    fn bind_texture(&mut self, material: &str);

    /// 追加一个三角形顶点，每 3 个为一面
    fn add_vertex(&mut self, position: Vec3, normal: Vec3, uv: Vec2);
}

/// 每帧渲染前由宿主提供的状态
pub struct RenderState<'a> {
    pub animation: &'a dyn Animation,
    pub frame: f32,
    /// 部件可见性；`None` 表示全部可见
    pub part_filter: Option<&'a dyn Fn(&str) -> bool>,
}

impl<'a> RenderState<'a> {
    pub fn new(animation: &'a dyn Animation, frame: f32) -> Self {
        Self {
            animation,
            frame,
            part_filter: None,
        }
    }

    pub fn with_filter(mut self, filter: &'a dyn Fn(&str) -> bool) -> Self {
        self.part_filter = Some(filter);
        self
    }

    pub fn is_visible(&self, part: &str) -> bool {
        self.part_filter.map_or(true, |f| f(part))
    }
}

static MODEL_CACHE: Lazy<ResourceCache<ModelData>> = Lazy::new(|| ResourceCache::new("model"));

impl LoadableData for ModelData {
    const KIND: &'static str = "model";

    fn cache() -> &'static ResourceCache<Self> {
        &MODEL_CACHE
    }

    fn decode(resource: &Resource) -> FormatResult<Self> {
        decode_model(&mut resource.reader())
    }

    fn placeholder() -> Self {
        ModelData::default()
    }
}

/// 运行时模型
///
/// 原始数据可在多个实例间共享；骨骼姿态与部件属于每个实例。
/// 骨架优先使用外部骨架文件，否则使用 v1 模型内嵌的骨骼。
/// 加载失败的模型不渲染任何内容。
pub struct ModelMcmd {
    data: Reloadable<ModelData>,
    skeleton_source: Option<SkeletonMcskl>,
    skeleton: Skeleton,
    parts: Vec<Part>,
}

impl ModelMcmd {
    fn from_data(data: Reloadable<ModelData>, skeleton_source: Option<SkeletonMcskl>) -> Self {
        let mut model = Self {
            data,
            skeleton_source,
            skeleton: Skeleton::empty(),
            parts: Vec::new(),
        };
        model.rebuild();
        model
    }

    /// 从资源加载；失败时记录日志并使用空模型
    pub fn from_resource(resource: &Resource) -> Self {
        Self::from_data(Reloadable::from_resource(resource), None)
    }

    pub fn try_from_resource(resource: &Resource) -> Result<Self> {
        Ok(Self::from_data(Reloadable::try_from_resource(resource)?, None))
    }

    pub fn load(manager: &dyn ResourceManager, location: &ResourceLocation) -> Self {
        Self::from_data(Reloadable::load(manager, location), None)
    }

    /// 加载模型及其独立骨架文件
    pub fn load_with_skeleton(
        manager: &dyn ResourceManager,
        model: &ResourceLocation,
        skeleton: &ResourceLocation,
    ) -> Self {
        Self::from_data(
            Reloadable::load(manager, model),
            Some(SkeletonMcskl::load(manager, skeleton)),
        )
    }

    /// 替换骨架来源
    pub fn with_skeleton(mut self, skeleton: SkeletonMcskl) -> Self {
        self.skeleton_source = Some(skeleton);
        self.rebuild();
        self
    }

    /// 重新加载模型和骨架
    ///
    /// 任一失败时该部分保留原数据，返回第一个错误；成功的部分照常替换。
    pub fn reload(&mut self, manager: &dyn ResourceManager) -> Result<()> {
        let model_result = self.data.reload(manager);
        let skeleton_result = match &mut self.skeleton_source {
            Some(skeleton) => skeleton.reload(manager),
            None => Ok(()),
        };
        self.rebuild();
        model_result.and(skeleton_result)
    }

    fn rebuild(&mut self) {
        let data = self.data.data();
        self.skeleton = match (&self.skeleton_source, &data.skeleton) {
            (Some(source), _) => source.build_skeleton(),
            (None, Some(raw)) => Skeleton::new(raw),
            (None, None) => Skeleton::empty(),
        };
        self.parts = data.parts.iter().map(Part::from_raw).collect();

        if config::get_config().debug_log {
            log::debug!(
                "模型实例重建: parts={}, bones={}, order={:?}",
                self.parts.len(),
                self.skeleton.bone_count(),
                self.skeleton.breadth_first_order()
            );
        }
    }

    pub fn data(&self) -> &ModelData {
        self.data.data()
    }

    pub fn artist(&self) -> &str {
        &self.data().artist
    }

    pub fn uuid(&self) -> Uuid {
        self.data().uuid
    }

    pub fn version(&self) -> i32 {
        self.data().version
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_loaded()
    }

    pub fn location(&self) -> Option<&ResourceLocation> {
        self.data.location()
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name() == name)
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// 按动画片段在 `frame` 处更新骨骼姿态
    pub fn setup(&mut self, animation: &dyn Animation, frame: f32) {
        self.skeleton.setup(animation, frame);
    }

    /// 更新姿态并把所有可见部件的三角形送入 `sink`
    pub fn render(&mut self, state: &RenderState, sink: &mut dyn RenderSink) {
        self.setup(state.animation, state.frame);
        for part in &self.parts {
            if !state.is_visible(part.name()) {
                continue;
            }
            sink.bind_texture(part.material());
            for vertex in part.triangles(&self.skeleton) {
                sink.add_vertex(vertex.position, vertex.normal, vertex.uv);
            }
        }
    }
}
