//! Decodes MagicaVoxel `.vox` files into a [`Scene`]: voxel models, a flattened transform
//! hierarchy with world-space matrices, instances, groups, materials and the color palette.
//!
//! Transforms and voxel data can be converted to another handedness or up axis while decoding,
//! see [`ReaderSettings`].
//!
//! # Reading a scene
//! ```no_run
//! let bytes = std::fs::read("castle.vox").unwrap();
//! let scene = vox_scene::parse_bytes(&bytes).unwrap();
//! for instance in &scene.instances {
//!     let transform = &scene.transforms[instance.transform_index];
//!     println!("{:?} at {:?}", transform.name, transform.position());
//! }
//! ```

pub mod error;
pub mod material;
pub mod math;
pub mod palette;
pub mod semantic;
pub mod settings;
pub mod syntax;

mod fixup;
mod graph;

pub use error::{SceneError, VoxError};
pub use graph::MAX_NODE_DEPTH;
pub use material::{Material, MaterialKind, MediaType};
pub use math::{Matrix, Quaternion, Vector};
pub use palette::Color;
pub use semantic::{Group, Instance, Model, Scene, Size, Transform};
pub use settings::{CoordinateSystem, Handedness, ReaderSettings, UpAxis};

/// Decodes `bytes` with the default [`ReaderSettings`].
pub fn parse_bytes(bytes: &[u8]) -> Result<Scene, VoxError> {
    Scene::from_bytes(bytes, &ReaderSettings::default())
}

pub fn parse_bytes_with(bytes: &[u8], settings: &ReaderSettings) -> Result<Scene, VoxError> {
    Scene::from_bytes(bytes, settings)
}
