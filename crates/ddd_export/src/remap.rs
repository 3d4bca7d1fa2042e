//! Axis remapping applied to object locations before export

use crate::transform::ObjectTransform;
use ddd_error::{DddError, Result};
use glam::{Mat4, Vec3};
use std::fmt;
use std::str::FromStr;

/// One output component: a source axis with a sign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedAxis {
    /// 0 = x, 1 = y, 2 = z
    pub axis: u8,
    pub negate: bool,
}

impl SignedAxis {
    pub const fn pos(axis: u8) -> Self {
        Self {
            axis,
            negate: false,
        }
    }

    pub const fn neg(axis: u8) -> Self {
        Self { axis, negate: true }
    }

    fn pick(self, v: Vec3) -> f32 {
        let value = v[self.axis as usize];
        if self.negate { -value } else { value }
    }
}

/// Maps a location `(x, y, z)` to three signed source components
///
/// `"x,z,-y"` sends `(x, y, z)` to `(x, z, -y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRemap([SignedAxis; 3]);

impl AxisRemap {
    pub const IDENTITY: AxisRemap = AxisRemap([
        SignedAxis::pos(0),
        SignedAxis::pos(1),
        SignedAxis::pos(2),
    ]);

    /// `(x, y, z) -> (x, z, -y)`
    pub const Y_UP_TO_Z_UP: AxisRemap = AxisRemap([
        SignedAxis::pos(0),
        SignedAxis::pos(2),
        SignedAxis::neg(1),
    ]);

    pub fn new(components: [SignedAxis; 3]) -> Result<Self> {
        let mut seen = [false; 3];
        for component in components {
            let slot = seen.get_mut(component.axis as usize).ok_or_else(|| {
                DddError::export_invalid_remap(format!("Axis index {} out of range", component.axis))
            })?;
            if *slot {
                return Err(DddError::export_invalid_remap(format!(
                    "Axis '{}' used more than once",
                    axis_name(component.axis)
                )));
            }
            *slot = true;
        }
        Ok(Self(components))
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        Vec3::new(self.0[0].pick(v), self.0[1].pick(v), self.0[2].pick(v))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for AxisRemap {
    fn default() -> Self {
        Self::Y_UP_TO_Z_UP
    }
}

fn axis_name(axis: u8) -> char {
    match axis {
        0 => 'x',
        1 => 'y',
        _ => 'z',
    }
}

impl fmt::Display for AxisRemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if component.negate {
                f.write_str("-")?;
            }
            write!(f, "{}", axis_name(component.axis))?;
        }
        Ok(())
    }
}

impl FromStr for AxisRemap {
    type Err = DddError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(DddError::export_invalid_remap(format!(
                "Expected three comma-separated axes like \"x,z,-y\", got \"{s}\""
            )));
        }

        let mut components = [SignedAxis::pos(0); 3];
        for (slot, part) in components.iter_mut().zip(parts.iter().copied()) {
            let (negate, name) = match part.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, part.strip_prefix('+').unwrap_or(part)),
            };
            let axis = match name.to_ascii_lowercase().as_str() {
                "x" => 0,
                "y" => 1,
                "z" => 2,
                _ => {
                    return Err(DddError::export_invalid_remap(format!(
                        "Unknown axis \"{part}\" in \"{s}\""
                    )));
                }
            };
            *slot = SignedAxis { axis, negate };
        }
        Self::new(components)
    }
}

/// Local matrix of an object as if its location were remapped
///
/// Only the location is remapped; delta location, rotation and scale are
/// used as stored. The transform itself is left untouched.
pub fn recompute_local_matrix(transform: &ObjectTransform, remap: AxisRemap) -> Mat4 {
    transform
        .with_location(remap.apply(transform.location))
        .basis_matrix()
}
