//! 单个动画通道

use std::io::Read;

use glam::Vec2;

use super::spline::{mode, Spline};
use crate::format::BinaryReader;
use crate::{FormatError, FormatResult};

/// 一个标量通道：首尾相接的样条段序列
///
/// 段覆盖 (-∞, t1], [t1, t2], …, [tn, +∞)，求值时取第一个包含该帧的段。
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedValue {
    splines: Vec<Spline>,
    default_value: f32,
}

impl AnimatedValue {
    /// 恒定值通道
    pub fn constant(value: f32) -> Self {
        let point = Vec2::new(0.0, value);
        Self {
            splines: vec![
                Spline::ConstantEaseIn { right: point },
                Spline::ConstantEaseOut { left: point },
            ],
            default_value: value,
        }
    }

    /// 由关键帧构造（测试和程序化动画用）
    ///
    /// `modes` 为相邻关键帧之间的插值方式（仅常量与线性），长度须为 `points.len() - 1`。
    pub fn from_keyframes(points: &[Vec2], modes: &[u8], default_value: f32) -> FormatResult<Self> {
        let (first, last) = match (points.first(), points.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Ok(Self::constant(default_value)),
        };
        if modes.len() + 1 != points.len() {
            return Err(FormatError::MalformedData(format!(
                "{} keyframes need {} interpolation modes, got {}",
                points.len(),
                points.len() - 1,
                modes.len()
            )));
        }
        let mut splines = Vec::with_capacity(points.len() + 1);
        splines.push(Spline::ConstantEaseIn { right: first });
        for (i, (pair, &code)) in points.windows(2).zip(modes).enumerate() {
            let (left, right) = (pair[0], pair[1]);
            splines.push(match code {
                mode::INTERPOLATION_CONST => Spline::ConstantInterpolation { left, right },
                mode::INTERPOLATION_LINEAR => Spline::LinearInterpolation { left, right },
                _ => return Err(FormatError::UnknownInterpolationMode { position: i, code }),
            });
        }
        splines.push(Spline::ConstantEaseOut { left: last });
        Ok(Self {
            splines,
            default_value,
        })
    }

    /// 从流中读取
    ///
    /// ```text
    /// u16 frame_count
    /// frame_count == 0: 无后续数据，通道恒为默认值
    /// 否则: point, u8 ease_in, (point, u8 mode, [额外数据]) × (n-1), u8 ease_out
    /// ```
    pub fn read<R: Read>(reader: &mut BinaryReader<R>, default_value: f32) -> FormatResult<Self> {
        let frame_count = reader.read_u16()?;
        if frame_count == 0 {
            return Ok(Self::constant(default_value));
        }

        let mut splines = Vec::with_capacity(frame_count as usize + 1);
        let mut right = read_keyframe(reader, None)?;
        let ease_in = reader.read_u8()?;
        splines.push(Spline::read_ease_in(ease_in, right, reader)?);

        for _ in 1..frame_count {
            let left = right;
            right = read_keyframe(reader, Some(left.x))?;
            let interpolation = reader.read_u8()?;
            splines.push(Spline::read_interpolating(interpolation, left, right, reader)?);
        }

        let ease_out = reader.read_u8()?;
        splines.push(Spline::read_ease_out(ease_out, right, reader)?);

        Ok(Self {
            splines,
            default_value,
        })
    }

    pub fn value_at(&self, frame: f32) -> f32 {
        self.splines
            .iter()
            .find(|s| s.is_in_range(frame))
            .map(|s| s.value_at(frame))
            .unwrap_or(self.default_value)
    }

    pub fn splines(&self) -> &[Spline] {
        &self.splines
    }

    pub fn default_value(&self) -> f32 {
        self.default_value
    }
}

/// 读取关键帧点，要求时间有限且不递减
fn read_keyframe<R: Read>(reader: &mut BinaryReader<R>, previous: Option<f32>) -> FormatResult<Vec2> {
    let point = reader.read_vec2()?;
    if !point.x.is_finite() {
        return Err(FormatError::MalformedData(format!(
            "keyframe time {} is not finite",
            point.x
        )));
    }
    if let Some(prev) = previous {
        if point.x < prev {
            return Err(FormatError::MalformedData(format!(
                "keyframe time {} precedes previous keyframe {}",
                point.x, prev
            )));
        }
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::writer::BinaryWriter;

    fn linear_channel() -> Vec<u8> {
        let mut w = BinaryWriter::new();
        w.u16(3)
            .vec2(Vec2::new(0.0, 0.0))
            .u8(mode::EASE_IN_CONST)
            .vec2(Vec2::new(10.0, 10.0))
            .u8(mode::INTERPOLATION_LINEAR)
            .vec2(Vec2::new(20.0, 0.0))
            .u8(mode::INTERPOLATION_BSPLINE)
            .vec2(Vec2::new(13.0, 10.0))
            .vec2(Vec2::new(17.0, 0.0))
            .u8(mode::EASE_OUT_CONST);
        w.into_bytes()
    }

    #[test]
    fn test_read_keyframes() {
        let bytes = linear_channel();
        let mut reader = BinaryReader::new(&bytes[..]);
        let value = AnimatedValue::read(&mut reader, 0.0).unwrap();
        assert_eq!(reader.position(), bytes.len());
        assert_eq!(value.splines().len(), 4);

        assert_eq!(value.value_at(-5.0), 0.0);
        assert!((value.value_at(5.0) - 5.0).abs() < 1e-6);
        assert_eq!(value.value_at(10.0), 10.0);
        assert_eq!(value.value_at(20.0), 0.0);
        assert_eq!(value.value_at(100.0), 0.0);
        let mid = value.value_at(15.0);
        assert!(mid > 0.0 && mid < 10.0);
    }

    #[test]
    fn test_no_frames_uses_default() {
        let bytes = [0u8, 0u8];
        let mut reader = BinaryReader::new(&bytes[..]);
        let value = AnimatedValue::read(&mut reader, 1.0).unwrap();
        assert_eq!(value.value_at(-1e9), 1.0);
        assert_eq!(value.value_at(0.0), 1.0);
        assert_eq!(value.value_at(1e9), 1.0);
    }

    #[test]
    fn test_every_frame_covered() {
        let bytes = linear_channel();
        let mut reader = BinaryReader::new(&bytes[..]);
        let value = AnimatedValue::read(&mut reader, 0.0).unwrap();
        for i in -40..80 {
            let frame = i as f32 * 0.5;
            assert!(
                value.splines().iter().any(|s| s.is_in_range(frame)),
                "frame {} not covered",
                frame
            );
        }
    }

    #[test]
    fn test_truncated_channel() {
        let bytes = linear_channel();
        let cut = &bytes[..bytes.len() - 5];
        let mut reader = BinaryReader::new(cut);
        assert!(matches!(
            AnimatedValue::read(&mut reader, 0.0),
            Err(FormatError::UnexpectedEndOfStream)
        ));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let mut w = BinaryWriter::new();
        w.u16(2)
            .vec2(Vec2::new(0.0, 0.0))
            .u8(mode::EASE_IN_CONST)
            .vec2(Vec2::new(1.0, 1.0))
            .u8(42)
            .u8(mode::EASE_OUT_CONST);
        let bytes = w.into_bytes();
        let mut reader = BinaryReader::new(&bytes[..]);
        assert!(matches!(
            AnimatedValue::read(&mut reader, 0.0),
            Err(FormatError::UnknownInterpolationMode { code: 42, .. })
        ));
    }

    #[test]
    fn test_decreasing_keyframes_rejected() {
        let mut w = BinaryWriter::new();
        w.u16(2)
            .vec2(Vec2::new(5.0, 0.0))
            .u8(mode::EASE_IN_CONST)
            .vec2(Vec2::new(1.0, 1.0))
            .u8(mode::INTERPOLATION_LINEAR)
            .u8(mode::EASE_OUT_CONST);
        let bytes = w.into_bytes();
        let mut reader = BinaryReader::new(&bytes[..]);
        assert!(matches!(
            AnimatedValue::read(&mut reader, 0.0),
            Err(FormatError::MalformedData(_))
        ));
    }

    #[test]
    fn test_from_keyframes() {
        let value = AnimatedValue::from_keyframes(
            &[Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0)],
            &[mode::INTERPOLATION_LINEAR],
            0.0,
        )
        .unwrap();
        assert!((value.value_at(5.0) - 5.0).abs() < 1e-6);
        assert!(AnimatedValue::from_keyframes(&[Vec2::ZERO, Vec2::ONE], &[], 0.0).is_err());
    }
}
