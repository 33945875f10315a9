//! 动画组合：首个命中、双片段交叉淡化

use glam::Vec2;

use super::{Animation, Spline};
use crate::config;
use crate::skeleton::BoneTransform;

/// 按顺序询问各片段，返回第一个驱动该骨骼的片段的变换
#[derive(Default)]
pub struct Gathered<'a> {
    animations: Vec<Box<dyn Animation + 'a>>,
}

impl<'a> Gathered<'a> {
    pub fn new() -> Self {
        Self {
            animations: Vec::new(),
        }
    }

    pub fn with(mut self, animation: impl Animation + 'a) -> Self {
        self.push(animation);
        self
    }

    pub fn push(&mut self, animation: impl Animation + 'a) {
        self.animations.push(Box::new(animation));
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

impl Animation for Gathered<'_> {
    fn get_transform(&self, bone: &str, frame: f32) -> Option<BoneTransform> {
        self.animations
            .iter()
            .find_map(|a| a.get_transform(bone, frame))
    }
}

/// 两个片段之间的平滑过渡
///
/// 过渡窗口为 `[start, start + length]`。权重按缓入缓出的三次贝塞尔从 0 升到 1，
/// 平移、缩放线性混合，旋转球面插值。只有一侧驱动某骨骼时，另一侧按绑定姿态参与混合。
/// 目标片段从过渡开始时的第 0 帧播放。
pub struct Crossfade<F, T> {
    from: F,
    to: T,
    start: f32,
    length: f32,
    curve: Spline,
}

impl<F: Animation, T: Animation> Crossfade<F, T> {
    pub fn new(from: F, to: T, start: f32, length: f32) -> Self {
        Self {
            from,
            to,
            start,
            length,
            curve: Spline::BSplineInterpolation {
                left: Vec2::new(0.0, 0.0),
                left_handle: Vec2::new(0.5, 0.0),
                right_handle: Vec2::new(0.5, 1.0),
                right: Vec2::new(1.0, 1.0),
            },
        }
    }

    /// 使用配置中的默认过渡长度
    pub fn with_default_window(from: F, to: T, start: f32) -> Self {
        Self::new(from, to, start, config::get_config().crossfade_frames)
    }

    /// 目标片段在 `frame` 处的权重，[0, 1]
    pub fn weight(&self, frame: f32) -> f32 {
        if self.length <= 0.0 {
            return if frame >= self.start { 1.0 } else { 0.0 };
        }
        let progress = ((frame - self.start) / self.length).clamp(0.0, 1.0);
        self.curve.value_at(progress).clamp(0.0, 1.0)
    }

    /// 过渡是否已结束（之后只需采样目标片段）
    pub fn is_finished(&self, frame: f32) -> bool {
        frame >= self.start + self.length.max(0.0)
    }

    pub fn into_parts(self) -> (F, T) {
        (self.from, self.to)
    }
}

impl<F: Animation, T: Animation> Animation for Crossfade<F, T> {
    fn get_transform(&self, bone: &str, frame: f32) -> Option<BoneTransform> {
        let weight = self.weight(frame);
        let from = if weight < 1.0 {
            self.from.get_transform(bone, frame)
        } else {
            None
        };
        let to = if weight > 0.0 {
            self.to.get_transform(bone, frame - self.start)
        } else {
            None
        };
        match (from, to) {
            (None, None) => None,
            (Some(a), None) if weight <= 0.0 => Some(a),
            (None, Some(b)) if weight >= 1.0 => Some(b),
            (a, b) => Some(
                a.unwrap_or(BoneTransform::IDENTITY)
                    .blend(&b.unwrap_or(BoneTransform::IDENTITY), weight),
            ),
        }
    }
}
