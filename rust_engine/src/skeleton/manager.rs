//! 运行时骨骼

use std::collections::HashMap;

use glam::{Mat4, Vec3};

use super::{Bone, BonePose, RawSkeleton};
use crate::animation::Animation;

/// 未知骨骼（按名称或下标查不到）使用的静态姿态
static STATIC_POSE: BonePose = BonePose::IDENTITY;

/// 运行时骨骼
///
/// 骨骼按原始（文件）顺序保存，另存一份广度优先求值顺序；
/// 姿态数组与骨骼数组平行，每帧由 `setup` 原地更新。
/// `setup` 需要 `&mut self`，同一骨骼不能同时进行两次姿态计算。
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    breadth_first: Vec<usize>,
    name_to_index: HashMap<String, usize>,
    poses: Vec<BonePose>,
}

impl Skeleton {
    pub fn new(raw: &RawSkeleton) -> Self {
        let bones: Vec<Bone> = raw.bones().iter().map(Bone::from_raw).collect();
        let name_to_index = bones
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();
        let poses = vec![BonePose::IDENTITY; bones.len()];
        let mut skeleton = Self {
            bones,
            breadth_first: raw.breadth_first_order().to_vec(),
            name_to_index,
            poses,
        };
        skeleton.reset();
        skeleton
    }

    /// 无骨骼的骨架
    pub fn empty() -> Self {
        Self::default()
    }

    /// 按广度优先顺序对每根骨骼采样动画并组合姿态
    ///
    /// 动画中没有该骨骼时使用单位变换（绑定姿态）。
    pub fn setup<A: Animation + ?Sized>(&mut self, animation: &A, frame: f32) {
        for &index in &self.breadth_first {
            let bone = &self.bones[index];
            let animated = animation
                .get_transform(&bone.name, frame)
                .map(|t| t.to_matrix())
                .unwrap_or(Mat4::IDENTITY);
            let parent = bone.parent.map(|p| self.poses[p]);
            self.poses[index] = BonePose::compose(bone, parent.as_ref(), animated);
        }
    }

    /// 恢复绑定姿态
    pub fn reset(&mut self) {
        for &index in &self.breadth_first {
            let bone = &self.bones[index];
            let parent = bone.parent.map(|p| self.poses[p]);
            self.poses[index] = BonePose::compose(bone, parent.as_ref(), Mat4::IDENTITY);
        }
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn get_bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn breadth_first_order(&self) -> &[usize] {
        &self.breadth_first
    }

    /// 当前姿态，下标对应原始骨骼顺序
    pub fn poses(&self) -> &[BonePose] {
        &self.poses
    }

    /// 按下标取姿态，越界返回静态（单位）姿态
    pub fn pose(&self, index: usize) -> &BonePose {
        self.poses.get(index).unwrap_or(&STATIC_POSE)
    }

    /// 按名称取姿态，未知名称返回静态（单位）姿态
    pub fn pose_by_name(&self, name: &str) -> &BonePose {
        match self.find_bone_by_name(name) {
            Some(index) => self.pose(index),
            None => &STATIC_POSE,
        }
    }

    /// 骨骼原点在当前姿态下的世界坐标（调试绘制用）
    pub fn bone_head(&self, index: usize) -> Option<Vec3> {
        self.poses.get(index).map(BonePose::head)
    }

    /// 所有骨骼的 (头, 父骨骼头) 线段（调试绘制用）
    pub fn debug_segments(&self) -> Vec<(Vec3, Vec3)> {
        self.bones
            .iter()
            .enumerate()
            .filter_map(|(i, bone)| {
                let parent = bone.parent?;
                Some((self.poses[parent].head(), self.poses[i].head()))
            })
            .collect()
    }
}
