//! 骨骼节点与逐帧姿态

use glam::{Mat3, Mat4, Vec3};

use super::normalize_rotation;
use super::stored::RawBone;

/// 行列式绝对值低于此值时视为退化（例如缩放为 0）
const DEGENERATE_DETERMINANT: f32 = 1e-12;

/// 骨骼节点（绑定姿态，加载后不变）
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    /// 父骨骼在原始数组中的下标
    pub parent: Option<usize>,
    /// 先旋转后平移
    pub local_to_parent: Mat4,
    pub parent_to_local: Mat4,
}

impl Bone {
    pub fn from_raw(raw: &RawBone) -> Self {
        let rotation = normalize_rotation(raw.rotation);
        let local_to_parent = Mat4::from_rotation_translation(rotation, raw.offset);
        Self {
            name: raw.name.clone(),
            parent: raw.parent.map(usize::from),
            local_to_parent,
            parent_to_local: local_to_parent.inverse(),
        }
    }
}

/// 单根骨骼在当前帧的变换
///
/// `global_to_global` 把绑定姿态下的世界坐标变换到当前动画姿态下的世界坐标，
/// 顶点与法线蒙皮都使用它。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BonePose {
    /// 本帧采样得到的局部动画变换
    pub animated_local: Mat4,
    /// 局部 → 全局（动画姿态）
    pub local_to_global: Mat4,
    /// 全局 → 局部（绑定姿态）
    pub global_to_local: Mat4,
    pub global_to_global: Mat4,
    /// 用于法线
    pub global_to_global_inverse_transpose: Mat4,
}

impl Default for BonePose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BonePose {
    pub const IDENTITY: Self = Self {
        animated_local: Mat4::IDENTITY,
        local_to_global: Mat4::IDENTITY,
        global_to_local: Mat4::IDENTITY,
        global_to_global: Mat4::IDENTITY,
        global_to_global_inverse_transpose: Mat4::IDENTITY,
    };

    /// 由父骨骼的姿态和本骨骼的动画变换组合出本帧姿态
    ///
    /// 父骨骼必须已在本帧更新。
    pub fn compose(bone: &Bone, parent: Option<&BonePose>, animated_local: Mat4) -> Self {
        let (parent_l2g, parent_g2l) = match parent {
            Some(p) => (p.local_to_global, p.global_to_local),
            None => (Mat4::IDENTITY, Mat4::IDENTITY),
        };
        let local_to_global = parent_l2g * bone.local_to_parent * animated_local;
        let global_to_local = bone.parent_to_local * parent_g2l;
        let global_to_global = local_to_global * global_to_local;
        Self {
            animated_local,
            local_to_global,
            global_to_local,
            global_to_global,
            global_to_global_inverse_transpose: normal_matrix(&global_to_global),
        }
    }

    /// 骨骼原点在当前姿态下的世界坐标
    pub fn head(&self) -> Vec3 {
        self.local_to_global.transform_point3(Vec3::ZERO)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.global_to_global.transform_point3(point)
    }

    pub fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.global_to_global_inverse_transpose.transform_vector3(normal)
    }
}

/// 法线变换矩阵：可逆时为逆转置
///
/// 退化矩阵使用余子式矩阵（逆转置乘以行列式），保持有限值；
/// 被压扁的方向上法线分量为 0。
fn normal_matrix(m: &Mat4) -> Mat4 {
    if m.determinant().abs() > DEGENERATE_DETERMINANT {
        return m.inverse().transpose();
    }
    let linear = Mat3::from_mat4(*m);
    let cofactor = Mat3::from_cols(
        linear.y_axis.cross(linear.z_axis),
        linear.z_axis.cross(linear.x_axis),
        linear.x_axis.cross(linear.y_axis),
    );
    Mat4::from_mat3(cofactor)
}
