//! Scanner geometry: crystals, detector modules and their placement.
//!
//! A scanner is described as a list of replicated detector modules. Each
//! module holds replicated detecting elements (crystals), and each replica is
//! placed with a rigid transformation. World coordinates of a crystal are
//! obtained by applying the element transform first and the module transform
//! second.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in scanner coordinates (mm).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coordinate {
    pub c: [f32; 3],
}

impl Coordinate {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { c: [x, y, z] }
    }
}

/// Rotation plus translation stored as the top three rows of a homogeneous
/// 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidTransformation {
    pub matrix: [[f32; 4]; 3],
}

impl Default for RigidTransformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransformation {
    /// The identity transformation.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            matrix: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        }
    }

    /// Pure translation by `(tx, ty, tz)`.
    #[must_use]
    pub const fn translation(tx: f32, ty: f32, tz: f32) -> Self {
        Self {
            matrix: [
                [1.0, 0.0, 0.0, tx],
                [0.0, 1.0, 0.0, ty],
                [0.0, 0.0, 1.0, tz],
            ],
        }
    }

    /// Rotation by `angle` radians around the z axis.
    #[must_use]
    pub fn rotation_z(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            matrix: [
                [cos, -sin, 0.0, 0.0],
                [sin, cos, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
            ],
        }
    }

    /// Builds a transformation from 12 row-major values.
    ///
    /// # Errors
    /// Returns an error if `values` does not hold exactly 12 elements.
    pub fn from_row_major(values: &[f32]) -> Result<Self> {
        if values.len() != 12 {
            return Err(Error::InvalidGeometry(format!(
                "rigid transformation needs 12 values, got {}",
                values.len()
            )));
        }
        let mut matrix = [[0.0; 4]; 3];
        for (row, chunk) in matrix.iter_mut().zip(values.chunks_exact(4)) {
            row.copy_from_slice(chunk);
        }
        Ok(Self { matrix })
    }

    /// Flattens the matrix into 12 row-major values.
    #[must_use]
    pub fn to_row_major(&self) -> [f32; 12] {
        let mut out = [0.0; 12];
        for (chunk, row) in out.chunks_exact_mut(4).zip(self.matrix.iter()) {
            chunk.copy_from_slice(row);
        }
        out
    }

    /// Returns `self * inner`: applying the result is the same as applying
    /// `inner` and then `self`.
    #[must_use]
    pub fn compose(&self, inner: &Self) -> Self {
        let mut matrix = [[0.0; 4]; 3];
        for (i, row) in matrix.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                let mut sum: f32 = (0..3)
                    .map(|k| self.matrix[i][k] * inner.matrix[k][j])
                    .sum();
                // implicit fourth row of `inner` is (0, 0, 0, 1)
                if j == 3 {
                    sum += self.matrix[i][3];
                }
                *value = sum;
            }
        }
        Self { matrix }
    }

    /// Applies the transformation to a coordinate.
    #[must_use]
    pub fn apply(&self, coord: Coordinate) -> Coordinate {
        let mut c = [0.0; 3];
        for (out, row) in c.iter_mut().zip(self.matrix.iter()) {
            *out = row[0] * coord.c[0] + row[1] * coord.c[1] + row[2] * coord.c[2] + row[3];
        }
        Coordinate { c }
    }
}

/// A box described by its eight corners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxShape {
    pub corners: [Coordinate; 8],
}

impl BoxShape {
    /// Axis-aligned box with its centre at the origin.
    #[must_use]
    pub fn centered(size_x: f32, size_y: f32, size_z: f32) -> Self {
        let (hx, hy, hz) = (size_x / 2.0, size_y / 2.0, size_z / 2.0);
        let mut corners = [Coordinate::default(); 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let x = if i & 1 == 0 { -hx } else { hx };
            let y = if i & 2 == 0 { -hy } else { hy };
            let z = if i & 4 == 0 { -hz } else { hz };
            *corner = Coordinate::new(x, y, z);
        }
        Self { corners }
    }

    /// Returns the box with every corner transformed.
    #[must_use]
    pub fn transformed(&self, transform: &RigidTransformation) -> Self {
        Self {
            corners: self.corners.map(|c| transform.apply(c)),
        }
    }

    /// Mean of the eight corners.
    #[must_use]
    pub fn center(&self) -> Coordinate {
        let mut c = [0.0; 3];
        for corner in &self.corners {
            for (acc, value) in c.iter_mut().zip(corner.c) {
                *acc += value;
            }
        }
        Coordinate {
            c: c.map(|v| v / 8.0),
        }
    }
}

/// An object placed once per transformation.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplicatedObject<T> {
    pub object: T,
    pub transforms: Vec<RigidTransformation>,
}

impl<T> ReplicatedObject<T> {
    #[must_use]
    pub fn new(object: T, transforms: Vec<RigidTransformation>) -> Self {
        Self { object, transforms }
    }

    /// Number of placed copies.
    #[must_use]
    pub fn number_of_objects(&self) -> usize {
        self.transforms.len()
    }
}

/// A detector module made of replicated crystals.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorModule {
    pub detecting_elements: Vec<ReplicatedObject<BoxShape>>,
}

impl DetectorModule {
    /// Number of crystals in one copy of the module.
    #[must_use]
    pub fn number_of_detecting_elements(&self) -> usize {
        self.detecting_elements
            .iter()
            .map(ReplicatedObject::number_of_objects)
            .sum()
    }
}

/// Full scanner geometry.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScannerGeometry {
    pub replicated_modules: Vec<ReplicatedObject<DetectorModule>>,
}

impl ScannerGeometry {
    /// Total number of detecting elements in the scanner.
    #[must_use]
    pub fn number_of_detectors(&self) -> usize {
        self.replicated_modules
            .iter()
            .map(|module| module.number_of_objects() * module.object.number_of_detecting_elements())
            .sum()
    }

    /// Iterates over every crystal in world coordinates, module by module.
    pub fn crystals(&self) -> impl Iterator<Item = BoxShape> + '_ {
        self.replicated_modules.iter().flat_map(|module| {
            module.transforms.iter().flat_map(move |module_transform| {
                module.object.detecting_elements.iter().flat_map(move |element| {
                    element.transforms.iter().map(move |element_transform| {
                        element
                            .object
                            .transformed(&module_transform.compose(element_transform))
                    })
                })
            })
        })
    }

    /// Ring of `modules` identical modules around the z axis, each holding a
    /// row of `crystals_per_module` crystals placed along the module's local
    /// x axis at `radius` mm from the centre.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ring(
        modules: usize,
        crystals_per_module: usize,
        radius: f32,
        crystal: BoxShape,
        pitch: f32,
    ) -> Self {
        let offset = (crystals_per_module as f32 - 1.0) * pitch / 2.0;
        let element_transforms = (0..crystals_per_module)
            .map(|i| RigidTransformation::translation(i as f32 * pitch - offset, radius, 0.0))
            .collect();
        let module = DetectorModule {
            detecting_elements: vec![ReplicatedObject::new(crystal, element_transforms)],
        };
        let module_transforms = (0..modules)
            .map(|i| {
                RigidTransformation::rotation_z(std::f32::consts::TAU * i as f32 / modules as f32)
            })
            .collect();
        Self {
            replicated_modules: vec![ReplicatedObject::new(module, module_transforms)],
        }
    }
}
