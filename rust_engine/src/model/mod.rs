//! MHFC 模型：原始数据、版本化解析、运行时模型

mod loader;
mod part;
mod runtime;

pub use loader::decode_model;
pub use part::{Part, Point, Vertex};
pub use runtime::{ModelMcmd, RenderSink, RenderState};

use glam::{Vec2, Vec3};
use uuid::Uuid;

use crate::skeleton::RawSkeleton;

/// 每个顶点最多绑定的骨骼数
pub const MAX_BINDINGS: usize = 4;

/// 顶点的一条骨骼绑定
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneBinding {
    pub bone_index: u8,
    /// 加载后已按正权重之和归一化
    pub weight: f32,
}

/// 文件中的一个顶点
#[derive(Clone, Debug, PartialEq)]
pub struct TesselationPoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub bindings: Vec<BoneBinding>,
}

impl TesselationPoint {
    /// 正权重归一化到和为 1；没有正权重时保持不变
    pub fn normalize_bindings(&mut self) {
        let sum: f32 = self
            .bindings
            .iter()
            .filter(|b| b.weight > 0.0)
            .map(|b| b.weight)
            .sum();
        if sum <= 0.0 {
            return;
        }
        for binding in self.bindings.iter_mut().filter(|b| b.weight > 0.0) {
            binding.weight /= sum;
        }
    }

    /// 是否至少有一条正权重绑定
    pub fn is_bound(&self) -> bool {
        self.bindings.iter().any(|b| b.weight > 0.0)
    }
}

/// 模型部件：一组顶点、三角形索引和材质
#[derive(Clone, Debug, PartialEq)]
pub struct ModelPart {
    pub name: String,
    /// 材质（纹理）资源位置字符串
    pub material: String,
    pub points: Vec<TesselationPoint>,
    /// 三角形列表，每面 3 个下标
    pub indices: Vec<u16>,
}

impl ModelPart {
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// 模型文件内容
#[derive(Clone, Debug, PartialEq)]
pub struct ModelData {
    pub uuid: Uuid,
    pub artist: String,
    pub version: i32,
    pub parts: Vec<ModelPart>,
    /// v1 模型内嵌的骨骼；v2 模型的骨架来自单独的文件
    pub skeleton: Option<RawSkeleton>,
}

impl Default for ModelData {
    fn default() -> Self {
        Self {
            uuid: Uuid::nil(),
            artist: "<unknown>".to_string(),
            version: 0,
            parts: Vec::new(),
            skeleton: None,
        }
    }
}

impl ModelData {
    pub fn part(&self, name: &str) -> Option<&ModelPart> {
        self.parts.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(weights: &[f32]) -> TesselationPoint {
        TesselationPoint {
            position: Vec3::ZERO,
            normal: Vec3::Y,
            uv: Vec2::ZERO,
            bindings: weights
                .iter()
                .enumerate()
                .map(|(i, &weight)| BoneBinding {
                    bone_index: i as u8,
                    weight,
                })
                .collect(),
        }
    }

    #[test]
    fn test_normalize_positive_only() {
        let mut p = point(&[30.0, 0.0, 10.0]);
        p.normalize_bindings();
        assert!((p.bindings[0].weight - 0.75).abs() < 1e-6);
        assert_eq!(p.bindings[1].weight, 0.0);
        assert!((p.bindings[2].weight - 0.25).abs() < 1e-6);
        assert!(p.is_bound());
    }

    #[test]
    fn test_normalize_all_zero() {
        let mut p = point(&[0.0, 0.0]);
        p.normalize_bindings();
        assert!(p.bindings.iter().all(|b| b.weight == 0.0));
        assert!(!p.is_bound());

        let mut empty = point(&[]);
        empty.normalize_bindings();
        assert!(!empty.is_bound());
    }
}
