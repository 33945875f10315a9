//! 样条段
//!
//! 一条样条覆盖两个关键帧之间（或关键帧之外）的一段帧区间。
//! 种类由流中的一个判别字节决定，闭合枚举，按 `match` 分发。

use std::io::Read;

use glam::Vec2;

use crate::format::BinaryReader;
use crate::{FormatError, FormatResult};

/// 判别字节
pub mod mode {
    pub const EASE_IN_CONST: u8 = 0;
    pub const INTERPOLATION_CONST: u8 = 8;
    pub const INTERPOLATION_LINEAR: u8 = 9;
    pub const INTERPOLATION_BSPLINE: u8 = 10;
    pub const EASE_OUT_CONST: u8 = 16;
}

/// 求根允许的 t 范围
const ROOT_LOWER: f64 = -1.0e-10;
const ROOT_UPPER: f64 = 1.000001;

#[derive(Clone, Debug, PartialEq)]
pub enum Spline {
    /// (-∞, right.x]，值恒为 right.y
    ConstantEaseIn { right: Vec2 },
    /// [left.x, +∞)，值恒为 left.y
    ConstantEaseOut { left: Vec2 },
    /// [left.x, right.x]，阶跃：frame < right.x 取 left.y，否则 right.y
    ConstantInterpolation { left: Vec2, right: Vec2 },
    /// [left.x, right.x]，线性插值
    LinearInterpolation { left: Vec2, right: Vec2 },
    /// [left.x, right.x]，x 方向参数化的三次贝塞尔
    BSplineInterpolation {
        left: Vec2,
        left_handle: Vec2,
        right_handle: Vec2,
        right: Vec2,
    },
}

impl Spline {
    /// 根据判别字节构造 ease-in 段
    pub fn read_ease_in<R: Read>(
        code: u8,
        right: Vec2,
        reader: &mut BinaryReader<R>,
    ) -> FormatResult<Self> {
        match code {
            mode::EASE_IN_CONST => Ok(Spline::ConstantEaseIn { right }),
            _ => Err(unknown_mode(code, reader)),
        }
    }

    /// 根据判别字节构造插值段，必要时从流中读取额外控制点
    pub fn read_interpolating<R: Read>(
        code: u8,
        left: Vec2,
        right: Vec2,
        reader: &mut BinaryReader<R>,
    ) -> FormatResult<Self> {
        match code {
            mode::INTERPOLATION_CONST => Ok(Spline::ConstantInterpolation { left, right }),
            mode::INTERPOLATION_LINEAR => Ok(Spline::LinearInterpolation { left, right }),
            mode::INTERPOLATION_BSPLINE => {
                let left_handle = reader.read_vec2()?;
                let right_handle = reader.read_vec2()?;
                Ok(Spline::BSplineInterpolation {
                    left,
                    left_handle,
                    right_handle,
                    right,
                })
            }
            _ => Err(unknown_mode(code, reader)),
        }
    }

    /// 根据判别字节构造 ease-out 段
    pub fn read_ease_out<R: Read>(
        code: u8,
        left: Vec2,
        reader: &mut BinaryReader<R>,
    ) -> FormatResult<Self> {
        match code {
            mode::EASE_OUT_CONST => Ok(Spline::ConstantEaseOut { left }),
            _ => Err(unknown_mode(code, reader)),
        }
    }

    pub fn is_in_range(&self, frame: f32) -> bool {
        match self {
            Spline::ConstantEaseIn { right } => frame <= right.x,
            Spline::ConstantEaseOut { left } => frame >= left.x,
            Spline::ConstantInterpolation { left, right }
            | Spline::LinearInterpolation { left, right }
            | Spline::BSplineInterpolation { left, right, .. } => {
                frame >= left.x && frame <= right.x
            }
        }
    }

    /// 取值。对范围外的帧不报错，结果按各自公式外推
    pub fn value_at(&self, frame: f32) -> f32 {
        match self {
            Spline::ConstantEaseIn { right } => right.y,
            Spline::ConstantEaseOut { left } => left.y,
            Spline::ConstantInterpolation { left, right } => {
                if frame < right.x {
                    left.y
                } else {
                    right.y
                }
            }
            Spline::LinearInterpolation { left, right } => {
                if frame == left.x {
                    return left.y;
                }
                if frame == right.x {
                    return right.y;
                }
                let split = right.x - left.x;
                (right.x - frame) / split * left.y + (frame - left.x) / split * right.y
            }
            Spline::BSplineInterpolation {
                left,
                left_handle,
                right_handle,
                right,
            } => {
                if frame == left.x {
                    return left.y;
                }
                if frame == right.x {
                    return right.y;
                }
                let t = find_zero(left.x, left_handle.x, right_handle.x, right.x, frame);
                calc_value(left.y, left_handle.y, right_handle.y, right.y, t)
            }
        }
    }
}

fn unknown_mode<R: Read>(code: u8, reader: &BinaryReader<R>) -> FormatError {
    FormatError::UnknownInterpolationMode {
        position: reader.position(),
        code,
    }
}

fn in_root_range(t: f64) -> bool {
    (ROOT_LOWER..=ROOT_UPPER).contains(&t)
}

/// 求解 x(t) = x，t ∈ [0, 1]
///
/// x1..x4 为四个控制点的 x 坐标。按次数逐级退化（3 → 2 → 1 → 0）。
/// 多个实根时按固定顺序返回第一个落在范围内的根；均不在范围内时返回 0.0。
pub fn find_zero(x1: f32, x2: f32, x3: f32, x4: f32, x: f32) -> f64 {
    let (x1, x2, x3, x4, x) = (x1 as f64, x2 as f64, x3 as f64, x4 as f64, x as f64);

    let c0 = x1 - x;
    let c1 = 3.0 * (x2 - x1);
    let c2 = 3.0 * (x1 - 2.0 * x2 + x3);
    let c3 = x4 - x1 + 3.0 * (x2 - x3);

    let candidates: Vec<f64> = if c3 != 0.0 {
        let a = c2 / c3 / 3.0;
        let b = c1 / c3;
        let c = c0 / c3;

        let p = b / 3.0 - a * a;
        let q = (2.0 * a * a * a - a * b + c) / 2.0;
        let d = q * q + p * p * p;

        if d > 0.0 {
            let t = d.sqrt();
            vec![(-q + t).cbrt() + (-q - t).cbrt() - a]
        } else if d == 0.0 {
            let t = (-q).cbrt();
            vec![2.0 * t - a, -t - a]
        } else {
            let phi = (-q / (-(p * p * p)).sqrt()).acos();
            let t = (-p).sqrt();
            let cos = (phi / 3.0).cos();
            let sin = (3.0 - 3.0 * cos * cos).sqrt();
            vec![
                2.0 * t * cos - a,
                -t * (cos + sin) - a,
                -t * (cos - sin) - a,
            ]
        }
    } else if c2 != 0.0 {
        let b = c1 / (2.0 * c2);
        let c = c0 / c2;
        let p = b * b - c;
        if p > 0.0 {
            let p = p.sqrt();
            vec![-b - p, -b + p]
        } else if p == 0.0 {
            vec![-b]
        } else {
            Vec::new()
        }
    } else if c1 != 0.0 {
        vec![-c0 / c1]
    } else {
        // 常数多项式
        return c0;
    };

    match candidates.into_iter().find(|&t| in_root_range(t)) {
        Some(t) => t,
        None => {
            log::trace!("no bezier root in range for frame {} in [{}, {}]", x, x1, x4);
            0.0
        }
    }
}

/// 以 t 计算 y 方向三次贝塞尔的值
pub fn calc_value(y1: f32, y2: f32, y3: f32, y4: f32, t: f64) -> f32 {
    let c1 = 3.0 * (y2 - y1);
    let c2 = 3.0 * (y1 - 2.0 * y2 + y3);
    let c3 = y4 - y1 + 3.0 * (y2 - y3);

    let mut value = y1 as f64;
    let mut t_pow = t;
    value += t_pow * c1 as f64;
    t_pow *= t;
    value += t_pow * c2 as f64;
    t_pow *= t;
    value += t_pow * c3 as f64;
    value as f32
}
