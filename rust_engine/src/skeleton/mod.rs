//! 骨骼系统：层级构建与逐帧姿态计算

mod bone;
mod hierarchy;
mod manager;
pub(crate) mod stored;

pub use bone::{Bone, BonePose};
pub use hierarchy::breadth_first_order;
pub use manager::Skeleton;
pub use stored::{
    decode_skeleton, read_bone_list, read_bones, RawBone, RawSkeleton, SkeletonData, SkeletonMcskl,
};

use glam::{Mat4, Quat, Vec3};

/// 骨骼变换数据
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for BoneTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BoneTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// 按分量混合：平移、缩放线性插值，旋转球面插值
    pub fn blend(&self, other: &BoneTransform, weight: f32) -> BoneTransform {
        BoneTransform {
            translation: self.translation.lerp(other.translation, weight),
            rotation: self.rotation.slerp(other.rotation, weight),
            scale: self.scale.lerp(other.scale, weight),
        }
    }
}

/// 归一化四元数，长度为 0 或非有限时返回单位四元数
pub(crate) fn normalize_rotation(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if len_sq > 0.0 && len_sq.is_finite() {
        q / len_sq.sqrt()
    } else {
        Quat::IDENTITY
    }
}
