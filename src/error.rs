//! Errors produced while decoding a `.vox` buffer.

use thiserror::Error;

use crate::syntax::ChunkTag;

/// Failure of a single decode call. None of these are recoverable; no partial scene is returned.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum VoxError {
    #[error("data ended at byte {offset} while reading {reading}")]
    TruncatedData { offset: usize, reading: &'static str },
    #[error("not a MagicaVoxel file, expected \"VOX \" followed by a MAIN chunk, found {found:?}")]
    InvalidHeader { found: ChunkTag },
    #[error("malformed scene: {0}")]
    MalformedScene(#[from] SceneError),
    #[error("unknown material value {value:?} for {key}")]
    UnknownMaterialType { key: &'static str, value: String },
}

/// Structural invariant violated by the chunk contents.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SceneError {
    #[error("reserved field of transform node is {found}, expected -1")]
    ReservedField { found: i32 },
    #[error("transform node has no frames")]
    NoTransformFrame,
    #[error("shape node references no models")]
    NoShapeModel,
    #[error("invalid value {value:?} for attribute {attribute}")]
    InvalidAttributeValue { attribute: &'static str, value: String },
    #[error("packed rotation {0:#010b} does not describe an axis permutation")]
    InvalidRotation(u8),
    #[error("voxel at {position:?} lies outside model of size {size:?}")]
    VoxelOutOfBounds { position: [u8; 3], size: [u32; 3] },
    #[error("model size {size:?} exceeds the maximum dimension of {max}")]
    ModelSizeInvalid { size: [u32; 3], max: u32 },
    #[error("instance refers to model {index} but only {count} models exist")]
    MissingModel { index: usize, count: usize },
    #[error("expected {expected} chunk in scene graph, found {found:?}")]
    UnexpectedChunk { expected: &'static str, found: ChunkTag },
    #[error("scene graph is nested deeper than {0} nodes")]
    TooDeep(usize),
}
