//! Semantic representation of a MagicaVoxel file: models, a flattened transform hierarchy,
//! instances, groups, the palette and materials.
//!
//! [`Scene::from_bytes`] makes one forward pass over the chunks. Models are read as their
//! `SIZE`/`XYZI` pair is met, the first transform chunk hands over to the scene graph builder
//! for the whole hierarchy, and palette and materials are picked up afterwards.

use log::{debug, trace, warn};

use crate::error::{SceneError, VoxError};
use crate::fixup;
use crate::graph::SceneBuilder;
use crate::material::Material;
use crate::math::{Matrix, Quaternion, Vector};
use crate::palette::{Color, DEFAULT_PALETTE, PALETTE_LEN};
use crate::settings::{CoordinateSystem, ReaderSettings};
use crate::syntax::{ChunkTag, Cursor, CHUNK_HEADER_LEN, MAGIC_PREFIX};

/// Voxel coordinates are single bytes, so no axis can be longer than this.
pub const MAX_DIMENSION: u32 = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Size {
    pub fn volume(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    fn to_array(self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[u32; 3]> for Size {
    fn from([x, y, z]: [u32; 3]) -> Self {
        Size { x, y, z }
    }
}

/// A dense voxel grid. Each byte is a palette index, 0 meaning empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    pub size: Size,
    /// Row-major, index `x + y * size.x + z * size.x * size.y`.
    pub voxel_data: Vec<u8>,
}

impl Model {
    pub fn index(&self, x: u32, y: u32, z: u32) -> Option<usize> {
        if x >= self.size.x || y >= self.size.y || z >= self.size.z {
            return None;
        }
        let (sx, sy) = (self.size.x as usize, self.size.y as usize);
        Some(x as usize + y as usize * sx + z as usize * sx * sy)
    }

    pub fn voxel(&self, x: u32, y: u32, z: u32) -> Option<u8> {
        self.index(x, y, z).map(|i| self.voxel_data[i])
    }

    /// Same model mirrored along all three axes.
    pub fn mirrored(&self) -> Self {
        let mut voxel_data = self.voxel_data.clone();
        voxel_data.reverse();
        Model { size: self.size, voxel_data }
    }

    /// Reads a `SIZE` chunk's content, the `XYZI` chunk that always follows it, and scatters the
    /// packed voxels into a dense grid in the target coordinate system.
    fn read(
        size_content: &mut Cursor<'_>,
        cursor: &mut Cursor<'_>,
        system: &CoordinateSystem,
    ) -> Result<Self, VoxError> {
        let source_size = [
            size_content.read_u32()?,
            size_content.read_u32()?,
            size_content.read_u32()?,
        ];
        if source_size.iter().any(|&dim| dim > MAX_DIMENSION) {
            return Err(SceneError::ModelSizeInvalid { size: source_size, max: MAX_DIMENSION }.into());
        }
        let size = Size::from(system.convert_size(source_size));
        let mut model = Model { size, voxel_data: vec![0; size.volume()] };

        cursor.skip(CHUNK_HEADER_LEN)?;
        let packed_voxels = cursor.read_u32_array()?;
        for voxel in packed_voxels.iter() {
            let [x, y, z, color_index] = voxel.to_le_bytes();
            let position = [u32::from(x), u32::from(y), u32::from(z)];
            if position.iter().zip(source_size).any(|(&p, dim)| p >= dim) {
                return Err(SceneError::VoxelOutOfBounds { position: [x, y, z], size: source_size }.into());
            }
            let [x, y, z] = system.convert_voxel(position, size.to_array());
            if let Some(index) = model.index(x, y, z) {
                model.voxel_data[index] = color_index;
            }
        }
        Ok(model)
    }
}

/// A node of the scene hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub name: String,
    pub hidden: bool,
    /// World-space matrix: already includes every ancestor's transform.
    pub matrix: Matrix,
    /// This node's own offset from its parent, in the target coordinate system.
    pub local_position: Vector,
    /// This node's own rotation, when it has one and
    /// [`ReaderSettings::calculate_local_rotation`] is enabled.
    pub local_rotation: Option<Quaternion>,
}

impl Transform {
    /// Builds a node's local transform from its `_t` translation and `_r` packed rotation.
    pub fn new(
        translation: Vector,
        rotation: u8,
        settings: &ReaderSettings,
    ) -> Result<Self, SceneError> {
        let mut local = Matrix::from_packed_rotation(rotation)?;
        local.set_translation(translation.scaled(settings.voxel_scale));
        let matrix = settings.coordinate_system().convert(local);

        let local_rotation = (rotation != 0 && settings.calculate_local_rotation)
            .then(|| Quaternion::from_rotation_matrix(&matrix));

        Ok(Transform {
            name: String::new(),
            hidden: false,
            local_position: matrix.translation(),
            local_rotation,
            matrix,
        })
    }

    /// World-space position.
    pub fn position(&self) -> Vector {
        self.matrix.translation()
    }
}

/// Places one model in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instance {
    pub transform_index: usize,
    pub model_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub transform_index: usize,
    /// Child transforms in the order the file declares them.
    pub child_transform_indices: Vec<usize>,
}

/// A decoded `.vox` file.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Version number from the header. Decoding does not depend on it.
    pub version: u32,
    pub models: Vec<Model>,
    pub transforms: Vec<Transform>,
    pub instances: Vec<Instance>,
    pub groups: Vec<Group>,
    /// Packed RGBA colors; index 0 means the voxel is empty.
    pub palette: [u32; PALETTE_LEN],
    /// Indexed by palette slot, not by model.
    pub materials: Box<[Material; PALETTE_LEN]>,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            version: 0,
            models: Vec::new(),
            transforms: Vec::new(),
            instances: Vec::new(),
            groups: Vec::new(),
            palette: [0; PALETTE_LEN],
            materials: Box::new([Material::default(); PALETTE_LEN]),
        }
    }
}

impl Scene {
    /// Decodes a complete `.vox` buffer.
    pub fn from_bytes(bytes: &[u8], settings: &ReaderSettings) -> Result<Self, VoxError> {
        let mut cursor = Cursor::new(bytes);

        let magic = cursor.read_tag()?;
        if magic != MAGIC_PREFIX {
            return Err(VoxError::InvalidHeader { found: magic });
        }
        let mut scene = Scene { version: cursor.read_u32()?, ..Scene::default() };

        let main = cursor.read_chunk_header()?;
        if main.tag != ChunkTag::MAIN {
            return Err(VoxError::InvalidHeader { found: main.tag });
        }
        cursor.skip(main.content_size as usize)?;

        let mut has_palette = false;
        let mut has_scene_graph = false;
        while !cursor.is_at_end() {
            let chunk = cursor.read_chunk_header()?;
            match chunk.tag {
                ChunkTag::SIZE => {
                    let mut content = Cursor::new(cursor.read_bytes(chunk.content_size as usize)?);
                    let model = Model::read(&mut content, &mut cursor, settings.coordinate_system())?;
                    scene.models.push(model);
                }
                ChunkTag::RGBA => {
                    let mut content = Cursor::new(cursor.read_bytes(chunk.content_size as usize)?);
                    for color in &mut scene.palette[1..] {
                        *color = content.read_u32()?;
                    }
                    has_palette = true;
                }
                ChunkTag::MATL => {
                    let mut content = Cursor::new(cursor.read_bytes(chunk.content_size as usize)?);
                    let id = content.read_u32()?;
                    let props = content.read_dict()?;
                    match scene.materials.get_mut(id as usize) {
                        Some(material) => material.apply_properties(&props)?,
                        None => warn!("ignoring material {id}, outside the palette"),
                    }
                }
                ChunkTag::TRANSFORM if !has_scene_graph => {
                    has_scene_graph = true;
                    // The root transform carries nothing of interest.
                    cursor.skip(chunk.content_size as usize)?;
                    SceneBuilder::new(&mut scene, settings).read_root_group(&mut cursor)?;
                }
                ChunkTag::TRANSFORM => {
                    warn!("skipping transform chunk outside the scene graph");
                    cursor.skip(chunk.content_size as usize)?;
                }
                // IMAP, rCAM, rOBJ, NOTE, LAYR, MATT, PACK and anything newer.
                tag => {
                    trace!("skipping {tag:?} chunk of {} bytes", chunk.content_size);
                    cursor.skip(chunk.content_size as usize)?;
                }
            }
        }

        if !has_palette {
            scene.palette = DEFAULT_PALETTE;
        }

        if let Some(instance) = scene.instances.iter().find(|i| i.model_index >= scene.models.len()) {
            return Err(SceneError::MissingModel {
                index: instance.model_index,
                count: scene.models.len(),
            }
            .into());
        }

        if settings.add_voxel_offsets {
            fixup::add_voxel_offsets(&mut scene, settings);
        }
        if settings.avoid_negative_scale {
            fixup::avoid_negative_scale(&mut scene);
        }

        debug!(
            "decoded .vox version {}: {} models, {} transforms, {} instances, {} groups",
            scene.version,
            scene.models.len(),
            scene.transforms.len(),
            scene.instances.len(),
            scene.groups.len(),
        );
        Ok(scene)
    }

    /// Splits a palette entry into its RGBA components.
    pub fn palette_color(&self, index: u8) -> Color {
        Color::from_packed(self.palette[usize::from(index)])
    }
}
