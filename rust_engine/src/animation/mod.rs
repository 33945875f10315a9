//! 动画系统
//!
//! 样条曲线 → 单通道 → 骨骼变换（10 个通道）→ 动画片段。
//! 片段之上提供两种组合：首个命中与双片段交叉淡化。

mod animated_transform;
mod animated_value;
mod combinator;
pub mod spline;
pub(crate) mod stored;

pub use animated_transform::{AnimatedTransform, Channel};
pub use animated_value::AnimatedValue;
pub use combinator::{Crossfade, Gathered};
pub use spline::Spline;
pub use stored::{decode_animation, AnimationData, StoredAnimation};

use std::sync::Arc;

use crate::skeleton::BoneTransform;

/// 动画片段：按骨骼名称和帧取变换
pub trait Animation {
    /// 返回 `None` 表示该骨骼不受此片段驱动，调用方使用绑定姿态
    fn get_transform(&self, bone: &str, frame: f32) -> Option<BoneTransform>;
}

/// 空片段：所有骨骼保持绑定姿态
#[derive(Clone, Copy, Debug, Default)]
pub struct BindPose;

impl Animation for BindPose {
    fn get_transform(&self, _bone: &str, _frame: f32) -> Option<BoneTransform> {
        None
    }
}

impl<A: Animation + ?Sized> Animation for &A {
    fn get_transform(&self, bone: &str, frame: f32) -> Option<BoneTransform> {
        (**self).get_transform(bone, frame)
    }
}

impl<A: Animation + ?Sized> Animation for Box<A> {
    fn get_transform(&self, bone: &str, frame: f32) -> Option<BoneTransform> {
        (**self).get_transform(bone, frame)
    }
}

impl<A: Animation + ?Sized> Animation for Arc<A> {
    fn get_transform(&self, bone: &str, frame: f32) -> Option<BoneTransform> {
        (**self).get_transform(bone, frame)
    }
}
