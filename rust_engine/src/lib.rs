//! MCAnm Engine - MHFC 模型/动画运行时
//!
//! 提供：
//! - MHFC 二进制模型 / 动画 / 骨架格式解析（大端、带版本）
//! - 样条曲线求值（常量、线性、三次贝塞尔）
//! - 骨骼层级构建与逐帧姿态计算
//! - 线性混合蒙皮
//! - 动画片段运行时（首个命中组合、双片段交叉淡化）
//! - 资源定位、缓存与热重载

pub mod animation;
pub mod config;
pub mod format;
pub mod model;
pub mod resource;
pub mod skeleton;
pub mod skinning;

pub use animation::{Animation, BindPose, Crossfade, Gathered, StoredAnimation};
pub use format::BinaryReader;
pub use model::{ModelMcmd, RenderSink, RenderState};
pub use resource::{Resource, ResourceLocation, ResourceManager};
pub use skeleton::{BoneTransform, Skeleton, SkeletonMcskl};

use thiserror::Error;

/// 二进制格式解析错误
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,

    #[error("malformed data: {0}")]
    MalformedData(String),

    #[error("unsupported version: {0}")]
    UnsupportedVersion(i32),

    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} index {index} out of range (limit {limit})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("{kind} value out of range: {value}")]
    ValueOutOfRange { kind: &'static str, value: f32 },

    #[error("unknown interpolation mode {code} at position {position}")]
    UnknownInterpolationMode { position: usize, code: u8 },

    #[error("cyclic bone hierarchy at bone {bone}")]
    CyclicHierarchy { bone: usize },

    #[error("IO error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FormatError::UnexpectedEndOfStream
        } else {
            FormatError::Io(e)
        }
    }
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;

/// API 边界错误
#[derive(Error, Debug)]
pub enum McAnmError {
    #[error("failed to read {resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load {resource}: {source}")]
    Format {
        resource: String,
        #[source]
        source: FormatError,
    },

    #[error("resource not found: {0}")]
    ResourceNotFound(String),
}

impl McAnmError {
    /// 为格式错误附加资源名
    pub fn format(resource: impl Into<String>, source: FormatError) -> Self {
        McAnmError::Format {
            resource: resource.into(),
            source,
        }
    }

    /// 格式错误的根因（如有）
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            McAnmError::Format { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, McAnmError>;
