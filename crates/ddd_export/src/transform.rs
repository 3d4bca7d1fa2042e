//! Object transform components and Blender's local matrix composition
//!
//! Blender builds an object's `matrix_basis` as
//! `T(loc + dloc) * (R_delta * R) * S(scale * dscale)`. Rotations are
//! evaluated in double precision and the result stored as `f32`, matching
//! the precision of the values Blender keeps on the object.

use glam::{DMat3, DQuat, Mat3, Mat4, Vec3, Vec4};

/// Euler rotation order; the first axis is applied first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EulerOrder {
    #[default]
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
}

impl EulerOrder {
    pub const ALL: [EulerOrder; 6] = [
        EulerOrder::XYZ,
        EulerOrder::XZY,
        EulerOrder::YXZ,
        EulerOrder::YZX,
        EulerOrder::ZXY,
        EulerOrder::ZYX,
    ];

    /// Axis indices in application order
    fn axes(self) -> [usize; 3] {
        match self {
            EulerOrder::XYZ => [0, 1, 2],
            EulerOrder::XZY => [0, 2, 1],
            EulerOrder::YXZ => [1, 0, 2],
            EulerOrder::YZX => [1, 2, 0],
            EulerOrder::ZXY => [2, 0, 1],
            EulerOrder::ZYX => [2, 1, 0],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EulerOrder::XYZ => "XYZ",
            EulerOrder::XZY => "XZY",
            EulerOrder::YXZ => "YXZ",
            EulerOrder::YZX => "YZX",
            EulerOrder::ZXY => "ZXY",
            EulerOrder::ZYX => "ZYX",
        }
    }
}

/// Blender `Object.rotmode` values
pub const ROT_MODE_QUAT: i64 = 0;
pub const ROT_MODE_AXIS_ANGLE: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// Angles in radians about X, Y and Z
    Euler { angles: Vec3, order: EulerOrder },
    /// Quaternion stored as `[w, x, y, z]`, normalized before use
    Quaternion([f32; 4]),
    /// Rotation of `angle` radians about `axis`, normalized before use
    AxisAngle { axis: Vec3, angle: f32 },
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::IDENTITY
    }
}

impl Rotation {
    pub const IDENTITY: Rotation = Rotation::Euler {
        angles: Vec3::ZERO,
        order: EulerOrder::XYZ,
    };

    pub fn euler(x: f32, y: f32, z: f32) -> Self {
        Rotation::Euler {
            angles: Vec3::new(x, y, z),
            order: EulerOrder::XYZ,
        }
    }

    /// Human readable mode name, as Blender shows it
    pub fn mode_name(&self) -> &'static str {
        match self {
            Rotation::Euler { order, .. } => order.as_str(),
            Rotation::Quaternion(_) => "QUATERNION",
            Rotation::AxisAngle { .. } => "AXIS_ANGLE",
        }
    }

    pub fn to_dmat3(&self) -> DMat3 {
        match *self {
            Rotation::Euler { angles, order } => {
                let angles = angles.as_dvec3().to_array();
                order
                    .axes()
                    .iter()
                    .map(|&axis| axis_rotation(axis, angles[axis]))
                    .fold(DMat3::IDENTITY, |acc, r| r * acc)
            }
            Rotation::Quaternion([w, x, y, z]) => {
                let q = DQuat::from_xyzw(x as f64, y as f64, z as f64, w as f64);
                let len = q.length();
                if len == 0.0 {
                    // Blender normalizes a zero quaternion to a half turn about X
                    DMat3::from_quat(DQuat::from_xyzw(1.0, 0.0, 0.0, 0.0))
                } else if !len.is_finite() {
                    DMat3::IDENTITY
                } else {
                    DMat3::from_quat(q / len)
                }
            }
            Rotation::AxisAngle { axis, angle } => {
                let axis = axis.as_dvec3();
                let len = axis.length();
                if len == 0.0 || !len.is_finite() {
                    DMat3::IDENTITY
                } else {
                    DMat3::from_axis_angle(axis / len, angle as f64)
                }
            }
        }
    }

    pub fn to_mat3(&self) -> Mat3 {
        self.to_dmat3().as_mat3()
    }
}

fn axis_rotation(axis: usize, angle: f64) -> DMat3 {
    match axis {
        0 => DMat3::from_rotation_x(angle),
        1 => DMat3::from_rotation_y(angle),
        _ => DMat3::from_rotation_z(angle),
    }
}

/// The components that define an object's local transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub location: Vec3,
    pub delta_location: Vec3,
    pub rotation: Rotation,
    pub delta_rotation: Rotation,
    pub scale: Vec3,
    pub delta_scale: Vec3,
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ObjectTransform {
    pub const IDENTITY: ObjectTransform = ObjectTransform {
        location: Vec3::ZERO,
        delta_location: Vec3::ZERO,
        rotation: Rotation::IDENTITY,
        delta_rotation: Rotation::IDENTITY,
        scale: Vec3::ONE,
        delta_scale: Vec3::ONE,
    };

    pub fn from_location(location: Vec3) -> Self {
        Self {
            location,
            ..Self::IDENTITY
        }
    }

    pub fn with_location(self, location: Vec3) -> Self {
        Self { location, ..self }
    }

    /// Local matrix as Blender's `Object.matrix_basis`
    pub fn basis_matrix(&self) -> Mat4 {
        let rotation = self.delta_rotation.to_dmat3() * self.rotation.to_dmat3();
        let scale = (self.scale * self.delta_scale).as_dvec3();
        let rs = rotation * DMat3::from_diagonal(scale);
        let translation = self.location + self.delta_location;

        compose(rs.as_mat3(), translation)
    }
}

fn compose(rs: Mat3, translation: Vec3) -> Mat4 {
    Mat4::from_cols(
        rs.x_axis.extend(0.0),
        rs.y_axis.extend(0.0),
        rs.z_axis.extend(0.0),
        Vec4::new(translation.x, translation.y, translation.z, 1.0),
    )
}
