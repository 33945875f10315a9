//! 测试用大端写入器（解析器的逆操作）

use byteorder::{BigEndian, WriteBytesExt};
use glam::{Quat, Vec2, Vec3};

#[derive(Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.buf.write_u8(v).unwrap();
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.buf.write_u16::<BigEndian>(v).unwrap();
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.buf.write_i32::<BigEndian>(v).unwrap();
        self
    }

    pub fn u64(&mut self, v: u64) -> &mut Self {
        self.buf.write_u64::<BigEndian>(v).unwrap();
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.buf.write_f32::<BigEndian>(v).unwrap();
        self
    }

    pub fn vec2(&mut self, v: Vec2) -> &mut Self {
        self.f32(v.x).f32(v.y)
    }

    pub fn vec3(&mut self, v: Vec3) -> &mut Self {
        self.f32(v.x).f32(v.y).f32(v.z)
    }

    pub fn quat(&mut self, q: Quat) -> &mut Self {
        self.f32(q.x).f32(q.y).f32(q.z).f32(q.w)
    }

    pub fn string(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self.u8(0)
    }
}
