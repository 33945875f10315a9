//! 顶点蒙皮计算

use glam::Vec3;

use super::{SkinBinding, SkinningInput, SkinningOutput};
use crate::skeleton::Skeleton;

/// 计算蒙皮
///
/// 输出长度取 `positions` 与 `normals` 中较短者；缺少绑定的顶点原样输出。
pub fn compute_skinning(input: &SkinningInput) -> SkinningOutput {
    let vertex_count = input.positions.len().min(input.normals.len());
    if input.positions.len() != input.normals.len() {
        log::warn!(
            "蒙皮输入长度不一致: positions={}, normals={}",
            input.positions.len(),
            input.normals.len()
        );
    }
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);

    for (i, (&position, &normal)) in input.positions.iter().zip(input.normals).enumerate() {
        let bindings = input.bindings.get(i).map(Vec::as_slice).unwrap_or(&[]);
        let (pos, norm) = skin_point(position, normal, bindings, input.skeleton);
        positions.push(pos);
        normals.push(norm);
    }

    SkinningOutput { positions, normals }
}

/// 计算单个顶点的蒙皮
///
/// 位置为各骨骼 `global_to_global` 变换的加权和，法线为逆转置矩阵变换的加权和（不归一化）。
/// 没有绑定的顶点原样返回；未知骨骼下标按静态骨骼（单位变换）处理。
pub fn skin_point(
    position: Vec3,
    normal: Vec3,
    bindings: &[SkinBinding],
    skeleton: &Skeleton,
) -> (Vec3, Vec3) {
    if bindings.is_empty() {
        return (position, normal);
    }

    let mut pos = Vec3::ZERO;
    let mut norm = Vec3::ZERO;
    for binding in bindings {
        let pose = skeleton.pose(binding.bone);
        pos += pose.transform_point(position) * binding.weight;
        norm += pose.transform_normal(normal) * binding.weight;
    }
    (pos, norm)
}
