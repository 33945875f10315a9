//! MHFC 二进制容器格式
//!
//! 所有整数为大端；字符串以 0 字节或流结束终止。
//!
//! ```text
//! 模型:   u64 magic("MHFC MDL"), u64 uuid_msb, u64 uuid_lsb, string artist, i32 version, body
//! 骨架:   u64 magic("MHFC SKL"), u64 uuid_msb, u64 uuid_lsb, string artist, i32 version, body
//! 动画:   u64 magic("MHFC ANM"), string artist, u8 version, body
//! ```

mod reader;
#[cfg(test)]
pub(crate) mod writer;

pub use reader::BinaryReader;

use std::io::Read;

use uuid::Uuid;

use crate::{FormatError, FormatResult};

/// 将 8 字节 ASCII 标签按大端打包为 u64
pub const fn ascii_magic(tag: &[u8; 8]) -> u64 {
    u64::from_be_bytes(*tag)
}

pub const MODEL_MAGIC: u64 = ascii_magic(b"MHFC MDL");
pub const ANIMATION_MAGIC: u64 = ascii_magic(b"MHFC ANM");
pub const SKELETON_MAGIC: u64 = ascii_magic(b"MHFC SKL");

/// 模型 / 骨架文件头
#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactHeader {
    pub uuid: Uuid,
    pub artist: String,
    pub version: i32,
}

/// 动画文件头
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationHeader {
    pub artist: String,
    pub version: u8,
}

/// 读取并校验魔数
pub fn expect_magic<R: Read>(
    reader: &mut BinaryReader<R>,
    expected: u64,
) -> FormatResult<()> {
    let magic = reader.read_u64()?;
    if magic != expected {
        return Err(FormatError::MalformedData(format!(
            "bad magic {:#018x}, expected {:#018x} ({})",
            magic,
            expected,
            String::from_utf8_lossy(&expected.to_be_bytes())
        )));
    }
    Ok(())
}

/// 读取带 UUID 的文件头（模型、骨架）
pub fn read_artifact_header<R: Read>(
    reader: &mut BinaryReader<R>,
    magic: u64,
) -> FormatResult<ArtifactHeader> {
    expect_magic(reader, magic)?;
    let msb = reader.read_u64()?;
    let lsb = reader.read_u64()?;
    let artist = reader.read_string()?;
    let version = reader.read_i32()?;
    Ok(ArtifactHeader {
        uuid: Uuid::from_u64_pair(msb, lsb),
        artist,
        version,
    })
}

/// 读取动画文件头
pub fn read_animation_header<R: Read>(
    reader: &mut BinaryReader<R>,
) -> FormatResult<AnimationHeader> {
    expect_magic(reader, ANIMATION_MAGIC)?;
    let artist = reader.read_string()?;
    let version = reader.read_u8()?;
    Ok(AnimationHeader { artist, version })
}

#[cfg(test)]
mod tests {
    use super::writer::BinaryWriter;
    use super::*;

    #[test]
    fn test_magic_values() {
        assert_eq!(MODEL_MAGIC, 0x4D48_4643_204D_444C);
        assert_ne!(MODEL_MAGIC, ANIMATION_MAGIC);
        assert_ne!(MODEL_MAGIC, SKELETON_MAGIC);
    }

    #[test]
    fn test_artifact_header() {
        let uuid = Uuid::from_u64_pair(0x1234, 0x5678);
        let mut w = BinaryWriter::new();
        let (msb, lsb) = uuid.as_u64_pair();
        w.u64(MODEL_MAGIC).u64(msb).u64(lsb).string("artist").i32(2);
        let bytes = w.into_bytes();

        let mut reader = BinaryReader::new(&bytes[..]);
        let header = read_artifact_header(&mut reader, MODEL_MAGIC).unwrap();
        assert_eq!(header.uuid, uuid);
        assert_eq!(header.artist, "artist");
        assert_eq!(header.version, 2);
    }

    #[test]
    fn test_bad_magic() {
        let mut w = BinaryWriter::new();
        w.u64(ANIMATION_MAGIC).u64(0).u64(0).string("").i32(1);
        let bytes = w.into_bytes();

        let mut reader = BinaryReader::new(&bytes[..]);
        assert!(matches!(
            read_artifact_header(&mut reader, MODEL_MAGIC),
            Err(FormatError::MalformedData(_))
        ));
    }
}
