//! 运行时部件与顶点

use glam::{Vec2, Vec3};

use super::{ModelPart, TesselationPoint};
use crate::skeleton::Skeleton;
use crate::skinning::{skin_point, SkinBinding};

/// 一个蒙皮后的顶点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// 运行时顶点：绑定姿态数据加上正权重的骨骼绑定
#[derive(Clone, Debug)]
pub struct Point {
    pub vertex: Vertex,
    pub bindings: Vec<SkinBinding>,
}

impl Point {
    pub fn from_raw(raw: &TesselationPoint) -> Self {
        Self {
            vertex: Vertex {
                position: raw.position,
                normal: raw.normal,
                uv: raw.uv,
            },
            bindings: SkinBinding::from_raw(&raw.bindings),
        }
    }

    /// 没有正权重绑定的顶点不随骨骼移动
    pub fn is_static(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 按骨骼当前姿态变换
    pub fn transformed(&self, skeleton: &Skeleton) -> Vertex {
        let (position, normal) = skin_point(
            self.vertex.position,
            self.vertex.normal,
            &self.bindings,
            skeleton,
        );
        Vertex {
            position,
            normal,
            uv: self.vertex.uv,
        }
    }
}

/// 运行时部件
#[derive(Clone, Debug)]
pub struct Part {
    name: String,
    material: String,
    points: Vec<Point>,
    indices: Vec<u16>,
}

impl Part {
    pub fn from_raw(raw: &ModelPart) -> Self {
        Self {
            name: raw.name.clone(),
            material: raw.material.clone(),
            points: raw.points.iter().map(Point::from_raw).collect(),
            indices: raw.indices.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// 所有顶点在当前姿态下的位置（与 `points` 平行）
    pub fn transformed_vertices(&self, skeleton: &Skeleton) -> Vec<Vertex> {
        self.points.iter().map(|p| p.transformed(skeleton)).collect()
    }

    /// 按索引缓冲区展开的三角形顶点，每 3 个为一面
    pub fn triangles(&self, skeleton: &Skeleton) -> impl Iterator<Item = Vertex> + '_ {
        let transformed = self.transformed_vertices(skeleton);
        self.indices
            .iter()
            .filter_map(move |&i| transformed.get(i as usize).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoneBinding;

    #[test]
    fn test_zero_weight_bindings_dropped() {
        let raw = TesselationPoint {
            position: Vec3::ONE,
            normal: Vec3::Y,
            uv: Vec2::ZERO,
            bindings: vec![
                BoneBinding { bone_index: 0, weight: 0.0 },
                BoneBinding { bone_index: 3, weight: 1.0 },
            ],
        };
        let point = Point::from_raw(&raw);
        assert_eq!(point.bindings, vec![SkinBinding { bone: 3, weight: 1.0 }]);
        assert!(!point.is_static());

        let raw = TesselationPoint {
            bindings: vec![BoneBinding { bone_index: 0, weight: 0.0 }],
            ..raw
        };
        assert!(Point::from_raw(&raw).is_static());
    }

    #[test]
    fn test_triangles_follow_indices() {
        let raw = ModelPart {
            name: "p".to_string(),
            material: "m".to_string(),
            points: [Vec3::ZERO, Vec3::X, Vec3::Y]
                .into_iter()
                .map(|position| TesselationPoint {
                    position,
                    normal: Vec3::Z,
                    uv: Vec2::ZERO,
                    bindings: Vec::new(),
                })
                .collect(),
            indices: vec![2, 1, 0, 0, 0, 1],
        };
        let part = Part::from_raw(&raw);
        let skeleton = Skeleton::empty();
        let positions: Vec<Vec3> = part.triangles(&skeleton).map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![Vec3::Y, Vec3::X, Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::X]
        );
    }
}
