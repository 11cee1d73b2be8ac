//! Reader configuration and the coordinate system conversion derived from it.

use crate::math::{Matrix, Vector};

/// MagicaVoxel scenes are right-handed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    #[default]
    Right,
}

/// MagicaVoxel scenes are Z-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UpAxis {
    Y,
    #[default]
    Z,
}

/// Conversion from MagicaVoxel's right-handed Z-up space into a target space.
///
/// Flipping the up axis maps `(x, y, z)` to `(x, z, -y)`; flipping handedness negates `x`.
/// Both are applied to every transform and every voxel index during decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    handedness: Handedness,
    up_axis: UpAxis,
    /// Maps target coordinates back to MagicaVoxel coordinates.
    matrix: Matrix,
    /// Maps MagicaVoxel coordinates to target coordinates.
    inverse_matrix: Matrix,
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        CoordinateSystem::new(Handedness::default(), UpAxis::default())
    }
}

impl CoordinateSystem {
    pub fn new(handedness: Handedness, up_axis: UpAxis) -> Self {
        let x_sign = if handedness == Handedness::Left { -1.0 } else { 1.0 };
        let to_target = match up_axis {
            UpAxis::Z => Matrix::from_basis([[x_sign, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]),
            UpAxis::Y => Matrix::from_basis([[x_sign, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]]),
        };
        CoordinateSystem {
            handedness,
            up_axis,
            // orthonormal, so the inverse is the transpose
            matrix: to_target.transpose(),
            inverse_matrix: to_target,
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn up_axis(&self) -> UpAxis {
        self.up_axis
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn inverse_matrix(&self) -> &Matrix {
        &self.inverse_matrix
    }

    pub fn flipped_handedness(&self) -> bool {
        self.handedness != Handedness::Right
    }

    pub fn flipped_up_axis(&self) -> bool {
        self.up_axis != UpAxis::Z
    }

    /// True when this is MagicaVoxel's own convention and nothing needs converting.
    pub fn is_native(&self) -> bool {
        !self.flipped_handedness() && !self.flipped_up_axis()
    }

    /// Re-expresses a local transform in the target space.
    pub(crate) fn convert(&self, local: Matrix) -> Matrix {
        if self.is_native() {
            return local;
        }
        self.matrix * local * self.inverse_matrix
    }

    /// Model extent in target axis order.
    pub(crate) fn convert_size(&self, [x, y, z]: [u32; 3]) -> [u32; 3] {
        if self.flipped_up_axis() {
            [x, z, y]
        } else {
            [x, y, z]
        }
    }

    /// Moves a MagicaVoxel voxel coordinate into a model of `size` (already converted).
    ///
    /// Flipped axes are traversed in reverse so the grid stays within `0..size`.
    pub(crate) fn convert_voxel(&self, [x, y, z]: [u32; 3], size: [u32; 3]) -> [u32; 3] {
        let [x, y, z] = self.convert_size([x, y, z]);
        let x = if self.flipped_handedness() { size[0] - 1 - x } else { x };
        let z = if self.flipped_up_axis() { size[2] - 1 - z } else { z };
        [x, y, z]
    }
}

/// Options for [`Scene::from_bytes`](crate::Scene::from_bytes).
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderSettings {
    /// Size of one voxel, multiplied into every `_t` translation before conversion.
    pub voxel_scale: Vector,
    /// Derive `Transform::local_rotation` from rotated transforms.
    pub calculate_local_rotation: bool,
    /// Shift instances of models with odd extents by half a voxel so they line up with
    /// even-sized neighbours.
    pub add_voxel_offsets: bool,
    /// Replace instance transforms with negative determinant by a mirrored copy of the model.
    pub avoid_negative_scale: bool,
    coordinate_system: CoordinateSystem,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        ReaderSettings {
            voxel_scale: Vector::ONE,
            calculate_local_rotation: true,
            add_voxel_offsets: true,
            avoid_negative_scale: true,
            coordinate_system: CoordinateSystem::default(),
        }
    }
}

impl ReaderSettings {
    pub fn set_coordinate_system(&mut self, handedness: Handedness, up_axis: UpAxis) {
        self.coordinate_system = CoordinateSystem::new(handedness, up_axis);
    }

    pub fn with_coordinate_system(mut self, handedness: Handedness, up_axis: UpAxis) -> Self {
        self.set_coordinate_system(handedness, up_axis);
        self
    }

    pub fn with_voxel_scale(mut self, voxel_scale: impl Into<Vector>) -> Self {
        self.voxel_scale = voxel_scale.into();
        self
    }

    pub fn with_local_rotation(mut self, calculate: bool) -> Self {
        self.calculate_local_rotation = calculate;
        self
    }

    pub fn with_voxel_offsets(mut self, add: bool) -> Self {
        self.add_voxel_offsets = add;
        self
    }

    pub fn with_negative_scale_avoidance(mut self, avoid: bool) -> Self {
        self.avoid_negative_scale = avoid;
        self
    }

    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.coordinate_system
    }
}
