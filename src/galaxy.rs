use std::fmt::{self, Display};

use nalgebra::Vector3;
use serde::Deserialize;

use crate::{
    geometry::{azimuths, circular_orbit_velocity, cylindrical_to_xyz, rotate},
    particle::Particle,
    Error, Float, Result, G,
};

/// Number of rings in a standard galaxy.
pub const NUM_RINGS: usize = 12;

/// Shape parameter of the circular-speed law used to seed ring velocities.
pub const SEED_SOFTENING: Float = 5.;

/// Parameters a galaxy is generated from.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GalaxyParams {
    #[serde(default = "default_name")]
    pub name: String,
    /// Reference radius; ring radii scale with it.
    pub r_min: Float,
    /// Tilt angle of the disk.
    #[serde(default)]
    pub theta: Float,
    /// Axis the disk is tilted around.
    #[serde(default = "default_axis")]
    pub axis: Vector3<Float>,
    pub core_mass: Float,
    #[serde(default = "default_num_rings")]
    pub num_rings: usize,
    /// Softening of the orbit-seeding velocity law. Defaults to [`SEED_SOFTENING`].
    #[serde(default)]
    pub softening: Option<Float>,
}

fn default_name() -> String {
    "Unnamed Galaxy".to_string()
}

fn default_axis() -> Vector3<Float> {
    Vector3::x()
}

fn default_num_rings() -> usize {
    NUM_RINGS
}

impl GalaxyParams {
    #[must_use]
    pub fn new(r_min: Float, theta: Float, axis: Vector3<Float>, core_mass: Float) -> Self {
        Self {
            name: default_name(),
            r_min,
            theta,
            axis,
            core_mass,
            num_rings: NUM_RINGS,
            softening: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn num_rings(mut self, num_rings: usize) -> Self {
        self.num_rings = num_rings;
        self
    }

    #[must_use]
    pub fn softening(mut self, softening: Float) -> Self {
        self.softening = Some(softening);
        self
    }

    #[must_use]
    pub fn ring_radius(&self, i: usize) -> Float {
        0.2 * self.r_min + 0.05 * self.r_min * i as Float
    }

    #[must_use]
    pub fn ring_size(i: usize) -> usize {
        12 + 3 * i
    }
}

/// A circular ring of equally spaced massless particles.
#[derive(Clone, Debug)]
pub struct Ring {
    radius: Float,
    particles: Vec<Particle>,
}

impl Ring {
    #[must_use]
    pub fn radius(&self) -> Float {
        self.radius
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// A disk galaxy: a massive core surrounded by concentric rings of tracer particles.
#[derive(Clone, Debug)]
pub struct Galaxy {
    name: String,
    core: Particle,
    rings: Vec<Ring>,
}

impl Galaxy {
    /// Generate a galaxy with the standard number of rings.
    pub fn new(r_min: Float, theta: Float, axis: Vector3<Float>, core_mass: Float) -> Result<Self> {
        Self::generate(&GalaxyParams::new(r_min, theta, axis, core_mass))
    }

    pub fn generate(params: &GalaxyParams) -> Result<Self> {
        if !(params.r_min > 0.) || !params.r_min.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "r_min must be positive, got {}",
                params.r_min
            )));
        }
        if params.num_rings == 0 {
            return Err(Error::InvalidGeometry(
                "a galaxy needs at least one ring".to_string(),
            ));
        }

        let core = Particle::core(params.core_mass);
        let softening = params.softening.unwrap_or(SEED_SOFTENING);

        let rings = (0..params.num_rings)
            .map(|i| {
                generate_ring(
                    params.ring_radius(i),
                    GalaxyParams::ring_size(i),
                    &core,
                    softening,
                    params.theta,
                    &params.axis,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: params.name.clone(),
            core,
            rings,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn core(&self) -> &Particle {
        &self.core
    }

    #[must_use]
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// The core followed by every ring particle, ring by ring.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        std::iter::once(&self.core).chain(self.rings.iter().flat_map(|r| r.particles.iter()))
    }

    /// Mutable counterpart of [`Galaxy::particles`], in the same order.
    pub fn particles_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        std::iter::once(&mut self.core)
            .chain(self.rings.iter_mut().flat_map(|r| r.particles.iter_mut()))
    }

    #[must_use]
    pub fn all_particles(&self) -> Vec<&Particle> {
        self.particles().collect()
    }

    /// Number of ring particles. The core is not counted.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.rings.iter().map(Ring::len).sum()
    }

    /// Add the same velocity to every particle including the core.
    pub fn add_initial_velocity(&mut self, vx: Float, vy: Float, vz: Float) {
        for par in self.particles_mut() {
            par.add_velocity(vx, vy, vz);
        }
    }

    pub fn translate(&mut self, dx: Float, dy: Float, dz: Float) {
        for par in self.particles_mut() {
            par.translate(dx, dy, dz);
        }
    }
}

impl Display for Galaxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.core.position();
        writeln!(f, "{}:", self.name)?;
        writeln!(f, "    Number of rings: {}", self.rings.len())?;
        writeln!(f, "    Number of particles: {}", self.particle_count())?;
        write!(f, "    Position of core: ({}, {}, {})", p.x, p.y, p.z)
    }
}

fn generate_ring(
    radius: Float,
    num_particles: usize,
    core: &Particle,
    softening: Float,
    theta: Float,
    axis: &Vector3<Float>,
) -> Result<Ring> {
    if num_particles == 0 {
        return Err(Error::InvalidGeometry(format!(
            "ring of radius {radius} has no particles"
        )));
    }

    let phis = azimuths(num_particles);

    let positions = rotate(&cylindrical_to_xyz(radius, &phis, 0.), theta, axis)?;
    let velocities = rotate(
        &circular_orbit_velocity(G, core.mass(), &phis, radius, softening),
        theta,
        axis,
    )?;

    let particles = positions
        .into_iter()
        .zip(velocities)
        .map(|(pos, vel)| Particle::tracer(core.position() + pos, core.velocity() + vel))
        .collect();

    Ok(Ring { radius, particles })
}
