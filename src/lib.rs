//! Restricted-gravity simulation of two colliding disk galaxies.
//!
//! Each galaxy is a massive core surrounded by concentric rings of massless
//! tracer particles. Only the cores attract, which makes a force evaluation
//! linear in the number of particles. Particles are advanced with a
//! kick-drift-kick leapfrog at a fixed time step.

pub mod config;
pub mod ensemble;
mod error;
pub mod galaxy;
pub mod geometry;
pub mod gravity;
pub mod integrator;
pub mod particle;
pub mod recorder;
pub mod scenario;

pub use config::ScenarioConfig;
pub use ensemble::{Ensemble, ParticleOrigin};
pub use error::{Error, Result};
pub use galaxy::{Galaxy, GalaxyParams, Ring};
pub use gravity::RestrictedGravity;
pub use integrator::{leapstep, IntegratorState, Phase, Schedule, Simulation};
pub use particle::Particle;
pub use recorder::{CountingRecorder, CsvRecorder, Record, Recorder};
pub use scenario::{simulate, Scenario};

pub type Float = f64;

/// Gravitational constant in simulation units (25 kpc, 1e8 years, solar masses).
pub const G: Float = 1.;

/// Softening length relative to the reference radius of a galaxy.
pub const SOFTENING_FACTOR: Float = 0.2;
