use std::fmt::{self, Display};

use nalgebra::Vector3;

use crate::{Error, Float, Result};

/// Convert a dynamically sized slice into a 3-vector.
///
/// Fails with [`Error::InvalidDimension`] if the slice does not have exactly three elements.
pub fn vector3_from_slice(values: &[Float]) -> Result<Vector3<Float>> {
    match values {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(Error::InvalidDimension {
            expected: 3,
            found: values.len(),
        }),
    }
}

/// A point mass in space.
///
/// Galactic cores carry a large mass, ring tracers are massless.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    position: Vector3<Float>,
    velocity: Vector3<Float>,
    mass: Float,
}

impl Particle {
    #[must_use]
    pub fn new(position: Vector3<Float>, velocity: Vector3<Float>, mass: Float) -> Self {
        Self {
            position,
            velocity,
            mass,
        }
    }

    /// A massive particle at rest at the origin.
    #[must_use]
    pub fn core(mass: Float) -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros(), mass)
    }

    /// A massless particle.
    #[must_use]
    pub fn tracer(position: Vector3<Float>, velocity: Vector3<Float>) -> Self {
        Self::new(position, velocity, 0.)
    }

    /// Create a particle from slices, checking that each has three components.
    ///
    /// Without a velocity the particle starts at rest.
    pub fn from_slices(position: &[Float], velocity: Option<&[Float]>, mass: Float) -> Result<Self> {
        let position = vector3_from_slice(position)?;
        let velocity = velocity.map_or(Ok(Vector3::zeros()), vector3_from_slice)?;
        Ok(Self::new(position, velocity, mass))
    }

    #[must_use]
    pub fn position(&self) -> &Vector3<Float> {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut Vector3<Float> {
        &mut self.position
    }

    #[must_use]
    pub fn velocity(&self) -> &Vector3<Float> {
        &self.velocity
    }

    pub fn velocity_mut(&mut self) -> &mut Vector3<Float> {
        &mut self.velocity
    }

    #[must_use]
    pub fn mass(&self) -> Float {
        self.mass
    }

    #[must_use]
    pub fn is_massive(&self) -> bool {
        self.mass > 0.
    }

    pub fn set_position(&mut self, position: Vector3<Float>) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: Vector3<Float>) {
        self.velocity = velocity;
    }

    pub fn try_set_position(&mut self, position: &[Float]) -> Result<()> {
        self.position = vector3_from_slice(position)?;
        Ok(())
    }

    pub fn try_set_velocity(&mut self, velocity: &[Float]) -> Result<()> {
        self.velocity = vector3_from_slice(velocity)?;
        Ok(())
    }

    /// Move the particle to `new_position`, deriving its velocity from the
    /// displacement over `dt`.
    pub fn update_from_position(&mut self, new_position: Vector3<Float>, dt: Float) -> Result<()> {
        if dt == 0. {
            return Err(Error::DivisionByZero);
        }
        self.velocity = (new_position - self.position) / dt;
        self.position = new_position;
        Ok(())
    }

    /// Slice variant of [`Particle::update_from_position`].
    pub fn try_update_from_position(&mut self, new_position: &[Float], dt: Float) -> Result<()> {
        let new_position = vector3_from_slice(new_position)?;
        self.update_from_position(new_position, dt)
    }

    pub fn translate(&mut self, dx: Float, dy: Float, dz: Float) {
        self.position += Vector3::new(dx, dy, dz);
    }

    pub fn add_velocity(&mut self, vx: Float, vy: Float, vz: Float) {
        self.velocity += Vector3::new(vx, vy, vz);
    }
}

impl Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (p, v) = (&self.position, &self.velocity);
        writeln!(f, "Pos:({}, {}, {})", p.x, p.y, p.z)?;
        write!(f, "Vel:({}, {}, {})", v.x, v.y, v.z)
    }
}
