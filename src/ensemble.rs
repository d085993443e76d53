use nalgebra::Vector3;

use crate::{galaxy::Galaxy, particle::Particle, Error, Float, Result};

/// Where a flattened particle came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParticleOrigin {
    pub galaxy: usize,
    /// `None` for the core.
    pub ring: Option<usize>,
    /// Position within the ring, 0 for the core.
    pub slot: usize,
}

/// A flat collection of particles, the working set of the integrator.
///
/// This struct uses the Struct-of-Arrays (SOA) layout; index `i` refers to the
/// same particle in every array for the whole run.
#[derive(Clone, Debug)]
pub struct Ensemble {
    pub(crate) positions: Vec<Vector3<Float>>,
    pub(crate) velocities: Vec<Vector3<Float>>,
    pub(crate) masses: Vec<Float>,
    pub(crate) cores: Vec<usize>,
    origins: Vec<ParticleOrigin>,
}

impl Ensemble {
    /// Build an ensemble from raw arrays.
    ///
    /// `cores` lists the indices of the particles that act as sources of gravity.
    pub fn new(
        positions: Vec<Vector3<Float>>,
        velocities: Vec<Vector3<Float>>,
        masses: Vec<Float>,
        cores: Vec<usize>,
    ) -> Result<Self> {
        let len = masses.len();
        if positions.len() != len || velocities.len() != len {
            return Err(Error::MismatchedLengths {
                positions: positions.len(),
                velocities: velocities.len(),
                masses: len,
            });
        }

        for (index, (p, v)) in positions.iter().zip(&velocities).enumerate() {
            if !p.iter().chain(v.iter()).all(|c| c.is_finite()) || !masses[index].is_finite() {
                return Err(Error::NonFinite { index });
            }
        }

        if let Some(&index) = cores.iter().find(|&&c| c >= len) {
            return Err(Error::InvalidCore { index, len });
        }

        Ok(Self {
            positions,
            velocities,
            masses,
            cores,
            origins: Vec::new(),
        })
    }

    /// Flatten galaxies in order, each one core first followed by its rings.
    ///
    /// Core indices are derived from the actual particle counts of the galaxies.
    pub fn from_galaxies<'a>(galaxies: impl IntoIterator<Item = &'a Galaxy>) -> Result<Self> {
        let mut entries: Vec<(&Particle, ParticleOrigin)> = Vec::new();
        let mut cores = Vec::new();

        for (g, galaxy) in galaxies.into_iter().enumerate() {
            cores.push(entries.len());
            entries.push((
                galaxy.core(),
                ParticleOrigin {
                    galaxy: g,
                    ring: None,
                    slot: 0,
                },
            ));
            for (r, ring) in galaxy.rings().iter().enumerate() {
                for (slot, par) in ring.particles().iter().enumerate() {
                    entries.push((
                        par,
                        ParticleOrigin {
                            galaxy: g,
                            ring: Some(r),
                            slot,
                        },
                    ));
                }
            }
        }

        let positions = entries.iter().map(|(p, _)| *p.position()).collect();
        let velocities = entries.iter().map(|(p, _)| *p.velocity()).collect();
        let masses = entries.iter().map(|(p, _)| p.mass()).collect();
        let origins = entries.into_iter().map(|(_, o)| o).collect();

        let mut ensemble = Self::new(positions, velocities, masses, cores)?;
        ensemble.origins = origins;
        Ok(ensemble)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    #[must_use]
    pub fn positions(&self) -> &[Vector3<Float>] {
        &self.positions
    }

    #[must_use]
    pub fn velocities(&self) -> &[Vector3<Float>] {
        &self.velocities
    }

    #[must_use]
    pub fn masses(&self) -> &[Float] {
        &self.masses
    }

    #[must_use]
    pub fn cores(&self) -> &[usize] {
        &self.cores
    }

    /// The galaxy, ring and slot particle `index` was flattened from.
    ///
    /// Always `None` for ensembles built from raw arrays.
    #[must_use]
    pub fn origin(&self, index: usize) -> Option<&ParticleOrigin> {
        self.origins.get(index)
    }

    /// Copy the current state back into the galaxies the ensemble was built from.
    ///
    /// The galaxies must be passed in the same order as to [`Ensemble::from_galaxies`].
    pub fn write_back(&self, galaxies: &mut [Galaxy]) -> Result<()> {
        let expected: usize = galaxies.iter().map(|g| g.particle_count() + 1).sum();
        if expected != self.len() {
            return Err(Error::InvalidGeometry(format!(
                "galaxies hold {expected} particles but the ensemble has {}",
                self.len()
            )));
        }

        let targets = galaxies.iter_mut().flat_map(|g| g.particles_mut());
        for ((par, pos), vel) in targets.zip(&self.positions).zip(&self.velocities) {
            par.set_position(*pos);
            par.set_velocity(*vel);
        }

        Ok(())
    }
}
