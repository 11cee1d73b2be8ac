//! Small fixed-size math types used by the scene graph.
//!
//! Matrices follow the row-vector convention: a point is transformed as `p * M`, the
//! translation lives in row 3, and `child * parent` composes a child into its parent's space.

use std::ops::{Add, AddAssign, Mul};

use crate::error::SceneError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    pub const ZERO: Self = Vector { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Vector { x: 1.0, y: 1.0, z: 1.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vector { x, y, z }
    }

    /// Component-wise product.
    pub fn scaled(self, scale: Vector) -> Self {
        Vector::new(self.x * scale.x, self.y * scale.y, self.z * scale.z)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        *self = *self + rhs;
    }
}

impl From<[f32; 3]> for Vector {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Vector { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Quaternion::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Extracts the rotation held in the upper 3x3 block of `matrix`.
    ///
    /// Picks whichever of `w`, `x`, `y`, `z` has the largest magnitude and derives the others
    /// from it, so there is never a division by a value close to zero.
    pub fn from_rotation_matrix(matrix: &Matrix) -> Self {
        let m = &matrix.cells;
        // Terms of the column-vector form of the same rotation (its transpose).
        let (a00, a11, a22) = (m[0][0], m[1][1], m[2][2]);
        let (a01, a02, a10) = (m[1][0], m[2][0], m[0][1]);
        let (a12, a20, a21) = (m[2][1], m[0][2], m[1][2]);

        let four_w_sq = a00 + a11 + a22;
        let four_x_sq = a00 - a11 - a22;
        let four_y_sq = a11 - a00 - a22;
        let four_z_sq = a22 - a00 - a11;

        let mut biggest_index = 0;
        let mut biggest = four_w_sq;
        for (index, candidate) in [four_x_sq, four_y_sq, four_z_sq].into_iter().enumerate() {
            if candidate > biggest {
                biggest = candidate;
                biggest_index = index + 1;
            }
        }

        let biggest_value = (biggest + 1.0).sqrt() * 0.5;
        let mult = 0.25 / biggest_value;

        match biggest_index {
            0 => Quaternion {
                w: biggest_value,
                x: (a21 - a12) * mult,
                y: (a02 - a20) * mult,
                z: (a10 - a01) * mult,
            },
            1 => Quaternion {
                w: (a21 - a12) * mult,
                x: biggest_value,
                y: (a10 + a01) * mult,
                z: (a02 + a20) * mult,
            },
            2 => Quaternion {
                w: (a02 - a20) * mult,
                x: (a10 + a01) * mult,
                y: biggest_value,
                z: (a21 + a12) * mult,
            },
            _ => Quaternion {
                w: (a10 - a01) * mult,
                x: (a02 + a20) * mult,
                y: (a21 + a12) * mult,
                z: biggest_value,
            },
        }
    }
}

/// Homogeneous affine 4x4 matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub cells: [[f32; 4]; 4],
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Self = Matrix {
        cells: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Builds a matrix whose upper 3x3 block is `rows` and whose translation is zero.
    pub const fn from_basis(rows: [[f32; 3]; 3]) -> Self {
        let [r0, r1, r2] = rows;
        Matrix {
            cells: [
                [r0[0], r0[1], r0[2], 0.0],
                [r1[0], r1[1], r1[2], 0.0],
                [r2[0], r2[1], r2[2], 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Decodes MagicaVoxel's packed rotation byte.
    ///
    /// Bits 0-1 give the row of the non-zero entry in column 0, bits 2-3 the row in column 1,
    /// column 2 takes the remaining row. Bits 4, 5 and 6 negate the entry of column 0, 1 and 2.
    /// A zero byte is the identity.
    pub fn from_packed_rotation(rotation: u8) -> Result<Self, SceneError> {
        if rotation == 0 {
            return Ok(Matrix::IDENTITY);
        }

        let index_x = usize::from(rotation & 0b11);
        let index_y = usize::from((rotation >> 2) & 0b11);
        if index_x > 2 || index_y > 2 || index_x == index_y {
            return Err(SceneError::InvalidRotation(rotation));
        }
        let index_z = 3 - (index_x + index_y);

        let sign = |bit: u8| if rotation & (1 << bit) != 0 { -1.0 } else { 1.0 };
        let mut matrix = Matrix::from_basis([[0.0; 3]; 3]);
        matrix.cells[index_x][0] = sign(4);
        matrix.cells[index_y][1] = sign(5);
        matrix.cells[index_z][2] = sign(6);
        Ok(matrix)
    }

    pub fn translation(&self) -> Vector {
        let [x, y, z, _] = self.cells[3];
        Vector { x, y, z }
    }

    pub fn set_translation(&mut self, translation: Vector) {
        self.cells[3][0] = translation.x;
        self.cells[3][1] = translation.y;
        self.cells[3][2] = translation.z;
    }

    /// Transforms a direction by the 3x3 block, ignoring translation.
    pub fn transform_vector(&self, v: Vector) -> Vector {
        let m = &self.cells;
        Vector {
            x: v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0],
            y: v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1],
            z: v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2],
        }
    }

    /// Determinant of the upper 3x3 block. Negative means the transform mirrors.
    pub fn determinant3(&self) -> f32 {
        let m = &self.cells;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// Negates all nine entries of the upper 3x3 block.
    pub fn negate_basis(&mut self) {
        for row in &mut self.cells[..3] {
            for cell in &mut row[..3] {
                *cell = -*cell;
            }
        }
    }

    pub fn transpose(&self) -> Self {
        let mut transposed = Matrix::IDENTITY;
        for (row, cells) in self.cells.iter().enumerate() {
            for (column, &cell) in cells.iter().enumerate() {
                transposed.cells[column][row] = cell;
            }
        }
        transposed
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        let mut product = Matrix { cells: [[0.0; 4]; 4] };
        for row in 0..4 {
            for column in 0..4 {
                product.cells[row][column] = (0..4)
                    .map(|k| self.cells[row][k] * rhs.cells[k][column])
                    .sum();
            }
        }
        product
    }
}

#[cfg(feature = "mint")]
mod mint_conversions {
    use super::{Matrix, Quaternion, Vector};

    impl From<Vector> for mint::Vector3<f32> {
        fn from(v: Vector) -> Self {
            mint::Vector3 { x: v.x, y: v.y, z: v.z }
        }
    }

    impl From<Quaternion> for mint::Quaternion<f32> {
        fn from(q: Quaternion) -> Self {
            mint::Quaternion {
                v: mint::Vector3 { x: q.x, y: q.y, z: q.z },
                s: q.w,
            }
        }
    }

    impl From<Matrix> for mint::RowMatrix4<f32> {
        fn from(m: Matrix) -> Self {
            m.cells.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_close(actual: Quaternion, expected: Quaternion) {
        let pairs = [
            (actual.x, expected.x),
            (actual.y, expected.y),
            (actual.z, expected.z),
            (actual.w, expected.w),
        ];
        assert!(
            pairs.iter().all(|(a, e)| (a - e).abs() < 1e-5),
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn zero_rotation_is_identity() {
        let matrix = Matrix::from_packed_rotation(0).unwrap();
        assert_eq!(matrix, Matrix::IDENTITY);
        assert_close(Quaternion::from_rotation_matrix(&matrix), Quaternion::IDENTITY);
    }

    #[test]
    fn packed_identity_permutation() {
        // x in row 0, y in row 1, no signs
        assert_eq!(Matrix::from_packed_rotation(0b0000_0100).unwrap(), Matrix::IDENTITY);
    }

    #[test]
    fn quarter_turn_about_z() {
        let matrix = Matrix::from_packed_rotation(0b0001_0001).unwrap();
        assert_eq!(
            matrix,
            Matrix::from_basis([[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
        );
        assert_eq!(matrix.determinant3(), 1.0);
        assert_eq!(
            matrix.transform_vector(Vector::new(1.0, 0.0, 0.0)),
            Vector::new(0.0, 1.0, 0.0)
        );
        let half = std::f32::consts::FRAC_1_SQRT_2;
        assert_close(
            Quaternion::from_rotation_matrix(&matrix),
            Quaternion { x: 0.0, y: 0.0, z: half, w: half },
        );
    }

    #[test]
    fn half_turn_about_x_uses_x_term() {
        // y and z negated
        let matrix = Matrix::from_packed_rotation(0b0110_0100).unwrap();
        assert_close(
            Quaternion::from_rotation_matrix(&matrix),
            Quaternion { x: 1.0, y: 0.0, z: 0.0, w: 0.0 },
        );
    }

    #[test]
    fn mirrored_rotation_has_negative_determinant() {
        let mut matrix = Matrix::from_packed_rotation(0b0001_0100).unwrap();
        assert_eq!(matrix.determinant3(), -1.0);
        matrix.negate_basis();
        assert_eq!(matrix.determinant3(), 1.0);
    }

    #[test]
    fn invalid_rotation_rejected() {
        assert_eq!(
            Matrix::from_packed_rotation(0b0000_0011),
            Err(SceneError::InvalidRotation(3))
        );
        assert_eq!(
            Matrix::from_packed_rotation(0b0000_0101),
            Err(SceneError::InvalidRotation(5))
        );
    }

    #[test]
    fn child_composes_into_parent() {
        let mut parent = Matrix::from_packed_rotation(0b0001_0001).unwrap();
        parent.set_translation(Vector::new(10.0, 0.0, 0.0));
        let mut child = Matrix::IDENTITY;
        child.set_translation(Vector::new(1.0, 0.0, 0.0));

        let world = child * parent;
        assert_eq!(world.translation(), Vector::new(10.0, 1.0, 0.0));
        assert_eq!(Matrix::IDENTITY * parent, parent);
    }
}
