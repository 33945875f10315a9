//! MHFC MDL 模型解析器
//!
//! ```text
//! 头部:  u64 magic, u64 uuid_msb, u64 uuid_lsb, string artist, i32 version
//! v1:    u8 part_count, u8 bone_count,
//!        part_count × (u16 point_count, u16 face_count, string name, string material,
//!                      point_count × point, face_count × 3 × u16 index),
//!        bone_count × (string name, quat rotation, vec3 offset),
//!        bone_count × u8 parent
//! v2:    u8 part_count, u8 material_count,
//!        part_count × (u16 point_count, u16 face_count, string name, u8 material_index,
//!                      point_count × point, face_count × 3 × u16 index),
//!        material_count × string material
//! point: vec3 position, vec3 normal, vec2 uv,
//!        最多 4 × (u8 bone_index, f32 weight)，不足 4 条时以 0xFF 结束
//! ```

use std::collections::HashSet;
use std::io::Read;

use crate::format::{self, BinaryReader, MODEL_MAGIC};
use crate::skeleton::read_bones;
use crate::{FormatError, FormatResult};

use super::{BoneBinding, ModelData, ModelPart, TesselationPoint, MAX_BINDINGS};

/// 绑定列表结束标记
const BINDING_END: u8 = 0xFF;

/// 原始权重的合法范围
const MAX_RAW_WEIGHT: f32 = 100.0;

/// 解析 MHFC MDL 文件
pub fn decode_model<R: Read>(reader: &mut BinaryReader<R>) -> FormatResult<ModelData> {
    let header = format::read_artifact_header(reader, MODEL_MAGIC)?;
    let mut data = match header.version {
        1 => read_v1(reader)?,
        2 => read_v2(reader)?,
        v => return Err(FormatError::UnsupportedVersion(v)),
    };
    data.uuid = header.uuid;
    data.artist = header.artist;
    data.version = header.version;

    log::debug!(
        "模型解析完成: artist={}, version={}, parts={}, bones={}",
        data.artist,
        data.version,
        data.parts.len(),
        data.skeleton.as_ref().map_or(0, |s| s.len())
    );
    Ok(data)
}

fn read_v1<R: Read>(reader: &mut BinaryReader<R>) -> FormatResult<ModelData> {
    let part_count = reader.read_u8()? as usize;
    let bone_count = reader.read_u8()? as usize;

    let mut parts = Vec::with_capacity(part_count);
    for _ in 0..part_count {
        let point_count = reader.read_u16()? as usize;
        let index_count = reader.read_u16()? as usize * 3;
        let name = reader.read_string()?;
        let material = reader.read_string()?;
        let points = read_points(reader, point_count, Some(bone_count))?;
        let indices = read_indices(reader, index_count, point_count)?;
        parts.push(ModelPart {
            name,
            material,
            points,
            indices,
        });
    }
    check_unique_parts(&parts)?;

    let skeleton = read_bones(reader, bone_count)?;
    Ok(ModelData {
        parts,
        skeleton: Some(skeleton),
        ..ModelData::default()
    })
}

fn read_v2<R: Read>(reader: &mut BinaryReader<R>) -> FormatResult<ModelData> {
    let part_count = reader.read_u8()? as usize;
    let material_count = reader.read_u8()? as usize;

    let mut parts = Vec::with_capacity(part_count);
    let mut material_indices = Vec::with_capacity(part_count);
    for _ in 0..part_count {
        let point_count = reader.read_u16()? as usize;
        let index_count = reader.read_u16()? as usize * 3;
        let name = reader.read_string()?;
        let material_index = reader.read_u8()? as usize;
        let points = read_points(reader, point_count, None)?;
        let indices = read_indices(reader, index_count, point_count)?;
        material_indices.push(material_index);
        parts.push(ModelPart {
            name,
            material: String::new(),
            points,
            indices,
        });
    }
    check_unique_parts(&parts)?;

    let mut materials = Vec::with_capacity(material_count);
    for _ in 0..material_count {
        materials.push(reader.read_string()?);
    }
    for (part, index) in parts.iter_mut().zip(material_indices) {
        part.material = materials
            .get(index)
            .cloned()
            .ok_or(FormatError::IndexOutOfRange {
                kind: "material",
                index,
                limit: material_count,
            })?;
    }

    Ok(ModelData {
        parts,
        skeleton: None,
        ..ModelData::default()
    })
}

fn check_unique_parts(parts: &[ModelPart]) -> FormatResult<()> {
    let mut names = HashSet::with_capacity(parts.len());
    for part in parts {
        if !names.insert(part.name.as_str()) {
            return Err(FormatError::DuplicateName {
                kind: "part",
                name: part.name.clone(),
            });
        }
    }
    Ok(())
}

fn read_points<R: Read>(
    reader: &mut BinaryReader<R>,
    count: usize,
    bone_count: Option<usize>,
) -> FormatResult<Vec<TesselationPoint>> {
    let mut points = Vec::with_capacity(count);
    for _ in 0..count {
        points.push(read_point(reader, bone_count)?);
    }
    Ok(points)
}

/// `bone_count` 为 `None` 时不检查绑定下标（骨架来自外部）
fn read_point<R: Read>(
    reader: &mut BinaryReader<R>,
    bone_count: Option<usize>,
) -> FormatResult<TesselationPoint> {
    let position = reader.read_vec3()?;
    let normal = reader.read_vec3()?;
    if normal.length() == 0.0 {
        return Err(FormatError::ValueOutOfRange {
            kind: "normal length",
            value: 0.0,
        });
    }
    let uv = reader.read_vec2()?;

    let mut bindings = Vec::with_capacity(MAX_BINDINGS);
    while bindings.len() < MAX_BINDINGS {
        let bone_index = reader.read_u8()?;
        if bone_index == BINDING_END {
            break;
        }
        if let Some(limit) = bone_count {
            if bone_index as usize >= limit {
                return Err(FormatError::IndexOutOfRange {
                    kind: "bone binding",
                    index: bone_index as usize,
                    limit,
                });
            }
        }
        let weight = reader.read_f32()?;
        if !(0.0..=MAX_RAW_WEIGHT).contains(&weight) {
            return Err(FormatError::ValueOutOfRange {
                kind: "binding weight",
                value: weight,
            });
        }
        bindings.push(BoneBinding { bone_index, weight });
    }

    let mut point = TesselationPoint {
        position,
        normal,
        uv,
        bindings,
    };
    point.normalize_bindings();
    Ok(point)
}

fn read_indices<R: Read>(
    reader: &mut BinaryReader<R>,
    count: usize,
    point_count: usize,
) -> FormatResult<Vec<u16>> {
    let mut indices = Vec::with_capacity(count);
    for _ in 0..count {
        let index = reader.read_u16()?;
        if index as usize >= point_count {
            return Err(FormatError::IndexOutOfRange {
                kind: "face index",
                index: index as usize,
                limit: point_count,
            });
        }
        indices.push(index);
    }
    Ok(indices)
}
