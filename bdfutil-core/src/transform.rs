/// Rigid-body transforms on grid coordinates
use nalgebra::{Matrix3, Point3, Vector3};

use crate::error::{Error, Result};
use crate::geometry::PointSet;

/// A single geometric operation requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Rotation about an axis through the origin, angle in degrees.
    Rotate { axis: Vector3<f64>, angle_deg: f64 },
    Translate(Vector3<f64>),
    /// Uniform scale about the origin.
    Scale(f64),
}

impl Transform {
    pub fn rotate(vx: f64, vy: f64, vz: f64, angle_deg: f64) -> Self {
        Self::Rotate {
            axis: Vector3::new(vx, vy, vz),
            angle_deg,
        }
    }

    pub fn translate(dx: f64, dy: f64, dz: f64) -> Self {
        Self::Translate(Vector3::new(dx, dy, dz))
    }

    pub fn scale(factor: f64) -> Self {
        Self::Scale(factor)
    }

    /// Build a transform from an operation name and its numeric arguments.
    ///
    /// `rotate` takes `vx vy vz theta`, `translate` takes `dx dy dz` and
    /// `scale` takes a single factor.
    pub fn from_kind(kind: &str, args: &[f64]) -> Result<Self> {
        let arity = |operation: &'static str, expected: usize| -> Result<()> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(Error::ArgumentCount {
                    operation,
                    expected,
                    actual: args.len(),
                })
            }
        };

        match kind.to_ascii_lowercase().as_str() {
            "rotate" => {
                arity("rotate", 4)?;
                Ok(Self::rotate(args[0], args[1], args[2], args[3]))
            }
            "translate" => {
                arity("translate", 3)?;
                Ok(Self::translate(args[0], args[1], args[2]))
            }
            "scale" => {
                arity("scale", 1)?;
                Ok(Self::scale(args[0]))
            }
            _ => Err(Error::UnknownOperation(kind.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rotate { .. } => "rotate",
            Self::Translate(_) => "translate",
            Self::Scale(_) => "scale",
        }
    }

    /// Apply to every point of `points`.
    ///
    /// Preconditions are checked before any point is touched.
    pub fn apply_to(&self, points: &mut PointSet) -> Result<()> {
        match *self {
            Self::Rotate { axis, angle_deg } => {
                let rotation = rotation_matrix(axis.x, axis.y, axis.z, angle_deg)?;
                apply_rotation(points, &rotation);
            }
            Self::Translate(offset) => apply_translation(points, &offset),
            Self::Scale(factor) => apply_scale(points, factor),
        }
        Ok(())
    }
}

/// Rotation matrix for an angle `theta` (degrees) about the axis `(vx, vy, vz)`.
///
/// Built with Rodrigues' formula after normalizing the axis. The axis does
/// not need to be unit length but must be non-zero.
pub fn rotation_matrix(vx: f64, vy: f64, vz: f64, theta: f64) -> Result<Matrix3<f64>> {
    // Scale by the largest component so squaring cannot overflow or underflow.
    let largest = vx.abs().max(vy.abs()).max(vz.abs());
    if largest == 0.0 || !largest.is_finite() {
        return Err(Error::DegenerateAxis { vx, vy, vz });
    }
    let (sx, sy, sz) = (vx / largest, vy / largest, vz / largest);
    let norm = (sx * sx + sy * sy + sz * sz).sqrt();
    let (u, v, w) = (sx / norm, sy / norm, sz / norm);

    let (s, c) = theta.to_radians().sin_cos();
    let t = 1.0 - c;

    Ok(Matrix3::new(
        u * u + (1.0 - u * u) * c,
        u * v * t - w * s,
        u * w * t + v * s,
        u * v * t + w * s,
        v * v + (1.0 - v * v) * c,
        v * w * t - u * s,
        u * w * t - v * s,
        v * w * t + u * s,
        w * w + (1.0 - w * w) * c,
    ))
}

/// `p <- R p` for every point.
pub fn apply_rotation(points: &mut PointSet, rotation: &Matrix3<f64>) {
    points.map_in_place(|p| Point3::from(rotation * p.coords));
}

/// `p <- p + d` for every point.
pub fn apply_translation(points: &mut PointSet, offset: &Vector3<f64>) {
    points.map_in_place(|p| p + offset);
}

/// `p <- s p` for every point.
pub fn apply_scale(points: &mut PointSet, factor: f64) {
    points.map_in_place(|p| Point3::from(p.coords * factor));
}
