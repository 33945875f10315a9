//! 顶点蒙皮计算（线性混合蒙皮）

mod skinning;

pub use skinning::{compute_skinning, skin_point};

use glam::Vec3;

use crate::model::BoneBinding;
use crate::skeleton::Skeleton;

/// 运行时的一条绑定：骨骼下标与归一化权重
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkinBinding {
    pub bone: usize,
    pub weight: f32,
}

impl SkinBinding {
    /// 只保留正权重的绑定
    pub fn from_raw(bindings: &[BoneBinding]) -> Vec<SkinBinding> {
        bindings
            .iter()
            .filter(|b| b.weight > 0.0)
            .map(|b| SkinBinding {
                bone: b.bone_index as usize,
                weight: b.weight,
            })
            .collect()
    }
}

/// 蒙皮输入数据
pub struct SkinningInput<'a> {
    /// 绑定姿态下的顶点位置
    pub positions: &'a [Vec3],
    /// 绑定姿态下的顶点法线
    pub normals: &'a [Vec3],
    /// 每个顶点的绑定；空列表表示不受骨骼影响
    pub bindings: &'a [Vec<SkinBinding>],
    /// 已完成本帧 `setup` 的骨骼
    pub skeleton: &'a Skeleton,
}

/// 蒙皮输出数据
pub struct SkinningOutput {
    pub positions: Vec<Vec3>,
    /// 未归一化
    pub normals: Vec<Vec3>,
}
