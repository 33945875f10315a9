//! 大端二进制读取器

use std::io::{ErrorKind, Read};

use byteorder::{BigEndian, ReadBytesExt};
use glam::{Quat, Vec2, Vec3};

use crate::{FormatError, FormatResult};

/// 顺序读取器，只能向前读取
///
/// 所有读取要么返回值，要么返回 `UnexpectedEndOfStream` / `MalformedData`。
pub struct BinaryReader<R: Read> {
    inner: R,
    position: usize,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// 已读取的字节数
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_u8(&mut self) -> FormatResult<u8> {
        let v = self.inner.read_u8()?;
        self.position += 1;
        Ok(v)
    }

    pub fn read_u16(&mut self) -> FormatResult<u16> {
        let v = self.inner.read_u16::<BigEndian>()?;
        self.position += 2;
        Ok(v)
    }

    pub fn read_i32(&mut self) -> FormatResult<i32> {
        let v = self.inner.read_i32::<BigEndian>()?;
        self.position += 4;
        Ok(v)
    }

    pub fn read_u64(&mut self) -> FormatResult<u64> {
        let v = self.inner.read_u64::<BigEndian>()?;
        self.position += 8;
        Ok(v)
    }

    pub fn read_f32(&mut self) -> FormatResult<f32> {
        let v = self.inner.read_f32::<BigEndian>()?;
        self.position += 4;
        Ok(v)
    }

    pub fn read_vec2(&mut self) -> FormatResult<Vec2> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        Ok(Vec2::new(x, y))
    }

    pub fn read_vec3(&mut self) -> FormatResult<Vec3> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        Ok(Vec3::new(x, y, z))
    }

    /// 按 x, y, z, w 顺序读取四元数（不做归一化）
    pub fn read_quat(&mut self) -> FormatResult<Quat> {
        let x = self.read_f32()?;
        let y = self.read_f32()?;
        let z = self.read_f32()?;
        let w = self.read_f32()?;
        Ok(Quat::from_xyzw(x, y, z, w))
    }

    /// 读取字符串：直到 0 字节或流结束，按 UTF-8 严格解码
    pub fn read_string(&mut self) -> FormatResult<String> {
        let mut bytes = Vec::new();
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    self.position += 1;
                    if buf[0] == 0 {
                        break;
                    }
                    bytes.push(buf[0]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        String::from_utf8(bytes)
            .map_err(|e| FormatError::MalformedData(format!("invalid UTF-8 string: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_big_endian() {
        let data = [0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFE, 0x3F, 0x80, 0x00, 0x00];
        let mut reader = BinaryReader::new(&data[..]);
        assert_eq!(reader.read_u16().unwrap(), 0x0102);
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.read_f32().unwrap(), 1.0);
        assert_eq!(reader.position(), 10);
    }

    #[test]
    fn test_read_string_terminators() {
        let data = b"abc\0\0tail";
        let mut reader = BinaryReader::new(&data[..]);
        assert_eq!(reader.read_string().unwrap(), "abc");
        assert_eq!(reader.read_string().unwrap(), "");
        // EOF 也结束字符串
        assert_eq!(reader.read_string().unwrap(), "tail");
        assert_eq!(reader.read_string().unwrap(), "");
    }

    #[test]
    fn test_read_string_invalid_utf8() {
        let data = [0xC3, 0x28, 0x00];
        let mut reader = BinaryReader::new(&data[..]);
        assert!(matches!(
            reader.read_string(),
            Err(FormatError::MalformedData(_))
        ));
    }

    #[test]
    fn test_truncated() {
        let data = [0x00, 0x01, 0x02];
        let mut reader = BinaryReader::new(&data[..]);
        assert!(matches!(
            reader.read_i32(),
            Err(FormatError::UnexpectedEndOfStream)
        ));
        let mut reader = BinaryReader::new(&data[..]);
        assert!(matches!(
            reader.read_vec2(),
            Err(FormatError::UnexpectedEndOfStream)
        ));
    }
}
