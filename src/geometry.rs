//! Pure geometry and kinematics helpers used to lay out galaxy rings.

use std::f64::consts::TAU;

use nalgebra::{Rotation3, Unit, Vector3};

use crate::{Error, Float, Result};

/// `n` equally spaced azimuthal angles in `[0, 2π)`.
#[must_use]
pub fn azimuths(n: usize) -> Vec<Float> {
    let step = TAU / n as Float;
    (0..n).map(|i| i as Float * step).collect()
}

/// Convert cylindrical coordinates with a common radius and height to Cartesian.
#[must_use]
pub fn cylindrical_to_xyz(r: Float, azimuths: &[Float], height: Float) -> Vec<Vector3<Float>> {
    azimuths
        .iter()
        .map(|phi| Vector3::new(r * phi.cos(), r * phi.sin(), height))
        .collect()
}

/// Rotate all `vectors` by `theta` around `axis`.
///
/// The axis does not have to be normalized, but it must be non-zero and finite.
pub fn rotate(
    vectors: &[Vector3<Float>],
    theta: Float,
    axis: &Vector3<Float>,
) -> Result<Vec<Vector3<Float>>> {
    if !axis.iter().all(|c| c.is_finite()) {
        return Err(Error::InvalidGeometry(format!(
            "rotation axis {axis:?} is not finite"
        )));
    }
    let axis = Unit::try_new(*axis, Float::EPSILON).ok_or_else(|| {
        Error::InvalidGeometry("rotation axis must be non-zero".to_string())
    })?;
    let rotation = Rotation3::from_axis_angle(&axis, theta);

    Ok(vectors.iter().map(|v| rotation * v).collect())
}

/// Speed of a circular orbit at radius `r` around a Plummer-softened point mass.
#[must_use]
pub fn circular_speed(g: Float, mass: Float, r: Float, softening: Float) -> Float {
    let r2 = r * r;
    (g * mass * r2 / (r2 + softening * softening).powf(1.5)).sqrt()
}

/// Velocities of circular, counter-clockwise orbits in the xy-plane at the given azimuths.
#[must_use]
pub fn circular_orbit_velocity(
    g: Float,
    mass: Float,
    azimuths: &[Float],
    radius: Float,
    softening: Float,
) -> Vec<Vector3<Float>> {
    let speed = circular_speed(g, mass, radius, softening);
    azimuths
        .iter()
        .map(|phi| speed * Vector3::new(-phi.sin(), phi.cos(), 0.))
        .collect()
}
