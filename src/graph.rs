//! Rebuilds the transform hierarchy from the depth-first `nTRN`/`nGRP`/`nSHP` chunk sequence.
//!
//! Every transform node is followed directly by either a group node, whose children are the
//! next transform subtrees in order, or a shape node, which is a leaf. Nothing refers back to
//! its parent once built; a parent's matrix is only read while its children are composed.

use crate::error::{SceneError, VoxError};
use crate::math::Vector;
use crate::semantic::{Group, Instance, Scene, Transform};
use crate::settings::ReaderSettings;
use crate::syntax::{ChunkTag, Cursor, Dict};

/// Deepest nesting of transform nodes accepted before giving up.
pub const MAX_NODE_DEPTH: usize = 256;

pub(crate) struct SceneBuilder<'s> {
    scene: &'s mut Scene,
    settings: &'s ReaderSettings,
}

fn expect_chunk(cursor: &mut Cursor<'_>, tag: ChunkTag, expected: &'static str) -> Result<(), VoxError> {
    let header = cursor.read_chunk_header()?;
    if header.tag != tag {
        return Err(SceneError::UnexpectedChunk { expected, found: header.tag }.into());
    }
    Ok(())
}

/// Parses `_t`: three numbers separated by spaces.
fn parse_translation(value: &str) -> Result<Vector, SceneError> {
    let invalid = || SceneError::InvalidAttributeValue { attribute: "_t", value: value.to_owned() };
    let (x, rest) = value.split_once(' ').ok_or_else(invalid)?;
    let (y, z) = rest.rsplit_once(' ').ok_or_else(invalid)?;
    let parse = |s: &str| s.parse::<f32>().map_err(|_| invalid());
    Ok(Vector::new(parse(x)?, parse(y)?, parse(z)?))
}

fn parse_byte(attribute: &'static str, value: &str) -> Result<u8, SceneError> {
    value
        .parse()
        .map_err(|_| SceneError::InvalidAttributeValue { attribute, value: value.to_owned() })
}

impl<'s> SceneBuilder<'s> {
    pub(crate) fn new(scene: &'s mut Scene, settings: &'s ReaderSettings) -> Self {
        SceneBuilder { scene, settings }
    }

    /// Reads the root group, positioned right after the root transform's content, and every
    /// subtree below it. Top-level children have no parent transform.
    pub(crate) fn read_root_group(&mut self, cursor: &mut Cursor<'_>) -> Result<(), VoxError> {
        expect_chunk(cursor, ChunkTag::GROUP, "root nGRP")?;
        cursor.skip(4)?; // node id
        cursor.read_dict()?;
        let children = cursor.read_u32_array()?;
        for _ in 0..children.len() {
            expect_chunk(cursor, ChunkTag::TRANSFORM, "nTRN")?;
            self.read_node(cursor, None, 1)?;
        }
        Ok(())
    }

    /// Consumes one transform node, positioned past its chunk header, and everything below it.
    /// Returns the index of the new transform.
    fn read_node(
        &mut self,
        cursor: &mut Cursor<'_>,
        parent: Option<usize>,
        depth: usize,
    ) -> Result<usize, VoxError> {
        if depth > MAX_NODE_DEPTH {
            return Err(SceneError::TooDeep(MAX_NODE_DEPTH).into());
        }

        cursor.skip(4)?; // node id
        let node_attributes = cursor.read_dict()?;

        cursor.skip(4)?; // child node id
        let reserved = cursor.read_i32()?;
        if reserved != -1 {
            return Err(SceneError::ReservedField { found: reserved }.into());
        }

        cursor.skip(4)?; // layer id
        let frame_count = cursor.read_u32()?;
        if frame_count == 0 {
            return Err(SceneError::NoTransformFrame.into());
        }
        // Only the first frame is kept, animation is not supported.
        let frame = cursor.read_dict()?;
        for _ in 1..frame_count {
            cursor.read_dict()?;
        }

        let transform_index = self.scene.transforms.len();
        let mut transform = self.transform_from_frame(&frame)?;
        if let Some(parent) = parent {
            transform.matrix = transform.matrix * self.scene.transforms[parent].matrix;
        }
        Self::apply_node_attributes(&mut transform, &node_attributes)?;
        self.scene.transforms.push(transform);

        let header = cursor.read_chunk_header()?;
        match header.tag {
            ChunkTag::GROUP => {
                cursor.skip(4)?; // group id
                cursor.read_dict()?;
                let children = cursor.read_u32_array()?;

                let group_index = self.scene.groups.len();
                self.scene.groups.push(Group {
                    transform_index,
                    child_transform_indices: Vec::new(),
                });
                for _ in 0..children.len() {
                    expect_chunk(cursor, ChunkTag::TRANSFORM, "nTRN")?;
                    let child = self.read_node(cursor, Some(transform_index), depth + 1)?;
                    self.scene.groups[group_index].child_transform_indices.push(child);
                }
            }
            ChunkTag::SHAPE => {
                cursor.skip(4)?; // shape id
                cursor.read_dict()?;
                let model_count = cursor.read_u32()?;
                if model_count == 0 {
                    return Err(SceneError::NoShapeModel.into());
                }
                let model_index = cursor.read_u32()? as usize;
                cursor.read_dict()?;
                for _ in 1..model_count {
                    cursor.skip(4)?;
                    cursor.read_dict()?;
                }
                self.scene.instances.push(Instance { transform_index, model_index });
            }
            found => {
                return Err(SceneError::UnexpectedChunk { expected: "nGRP or nSHP", found }.into())
            }
        }

        Ok(transform_index)
    }

    fn transform_from_frame(&self, frame: &Dict) -> Result<Transform, SceneError> {
        let translation = match frame.get("_t") {
            Some(value) => parse_translation(value)?,
            None => Vector::ZERO,
        };
        let rotation = match frame.get("_r") {
            Some(value) => parse_byte("_r", value)?,
            None => 0,
        };
        Transform::new(translation, rotation, self.settings)
    }

    fn apply_node_attributes(transform: &mut Transform, attributes: &Dict) -> Result<(), SceneError> {
        if let Some(name) = attributes.get("_name") {
            transform.name = name.clone();
        }
        if let Some(hidden) = attributes.get("_hidden") {
            transform.hidden = parse_byte("_hidden", hidden)? != 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn translation_splits_on_outer_spaces() {
        assert_eq!(parse_translation("1 -2 30").unwrap(), Vector::new(1.0, -2.0, 30.0));
        assert_eq!(
            parse_translation("12"),
            Err(SceneError::InvalidAttributeValue { attribute: "_t", value: "12".to_owned() })
        );
        assert!(parse_translation("1 x 3").is_err());
    }
}
