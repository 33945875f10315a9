//! 单根骨骼的动画（10 个通道）

use std::io::Read;

use glam::{Quat, Vec3};

use super::AnimatedValue;
use crate::format::BinaryReader;
use crate::skeleton::{normalize_rotation, BoneTransform};
use crate::FormatResult;

/// 通道（按文件中的顺序）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    LocX,
    LocY,
    LocZ,
    QuatX,
    QuatY,
    QuatZ,
    QuatW,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl Channel {
    pub const ALL: [Channel; 10] = [
        Channel::LocX,
        Channel::LocY,
        Channel::LocZ,
        Channel::QuatX,
        Channel::QuatY,
        Channel::QuatZ,
        Channel::QuatW,
        Channel::ScaleX,
        Channel::ScaleY,
        Channel::ScaleZ,
    ];

    /// 无关键帧时的取值
    pub fn default_value(self) -> f32 {
        match self {
            Channel::QuatW | Channel::ScaleX | Channel::ScaleY | Channel::ScaleZ => 1.0,
            _ => 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedTransform {
    channels: [AnimatedValue; 10],
}

impl AnimatedTransform {
    /// 所有通道恒为默认值
    pub fn identity() -> Self {
        Self {
            channels: Channel::ALL.map(|c| AnimatedValue::constant(c.default_value())),
        }
    }

    /// 按 loc xyz, quat xyzw, scale xyz 的顺序读取 10 个通道
    pub fn read<R: Read>(reader: &mut BinaryReader<R>) -> FormatResult<Self> {
        let mut transform = Self::identity();
        for channel in Channel::ALL {
            transform.channels[channel as usize] = AnimatedValue::read(reader, channel.default_value())?;
        }
        Ok(transform)
    }

    pub fn channel(&self, channel: Channel) -> &AnimatedValue {
        &self.channels[channel as usize]
    }

    pub fn set_channel(&mut self, channel: Channel, value: AnimatedValue) {
        self.channels[channel as usize] = value;
    }

    /// 在给定帧求值，旋转归一化
    pub fn transform_at(&self, frame: f32) -> BoneTransform {
        let v = |c: Channel| self.channels[c as usize].value_at(frame);
        BoneTransform {
            translation: Vec3::new(v(Channel::LocX), v(Channel::LocY), v(Channel::LocZ)),
            rotation: normalize_rotation(Quat::from_xyzw(
                v(Channel::QuatX),
                v(Channel::QuatY),
                v(Channel::QuatZ),
                v(Channel::QuatW),
            )),
            scale: Vec3::new(v(Channel::ScaleX), v(Channel::ScaleY), v(Channel::ScaleZ)),
        }
    }
}

impl Default for AnimatedTransform {
    fn default() -> Self {
        Self::identity()
    }
}
