use nalgebra::Vector3;

use crate::{ensemble::Ensemble, Float, G, SOFTENING_FACTOR};

/// Softened gravity in which only a handful of massive cores attract.
///
/// Every other particle is a massless tracer: it feels the cores but exerts
/// no force on anything, so one evaluation costs O(N * cores) instead of O(N^2).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RestrictedGravity {
    g: Float,
    epsilon: Float,
}

impl RestrictedGravity {
    #[must_use]
    pub fn new(epsilon: Float) -> Self {
        Self { g: G, epsilon }
    }

    /// Softening length of `0.2 * r_min`.
    #[must_use]
    pub fn from_reference_radius(r_min: Float) -> Self {
        Self::new(SOFTENING_FACTOR * r_min)
    }

    #[must_use]
    pub fn with_gravitational_constant(mut self, g: Float) -> Self {
        self.g = g;
        self
    }

    #[must_use]
    pub fn epsilon(&self) -> Float {
        self.epsilon
    }

    /// Acceleration at `position` caused by a core.
    #[must_use]
    pub fn acceleration(
        &self,
        position: &Vector3<Float>,
        core_mass: Float,
        core_position: &Vector3<Float>,
    ) -> Vector3<Float> {
        let r = core_position - position;
        let r_square = r.norm_squared();
        r * self.g * core_mass / (r_square + self.epsilon * self.epsilon).powf(1.5)
    }

    /// Softened potential at `position` caused by a core.
    #[must_use]
    pub fn potential(
        &self,
        position: &Vector3<Float>,
        core_mass: Float,
        core_position: &Vector3<Float>,
    ) -> Float {
        let r_square = (core_position - position).norm_squared();
        -self.g * core_mass / (r_square + self.epsilon * self.epsilon).sqrt()
    }

    /// Overwrite `accelerations` with the pull of all `cores` on every particle.
    ///
    /// A core does not act on itself.
    pub fn accelerations(
        &self,
        positions: &[Vector3<Float>],
        masses: &[Float],
        cores: &[usize],
        accelerations: &mut [Vector3<Float>],
    ) {
        for a in accelerations.iter_mut() {
            *a = Vector3::zeros();
        }

        for &c in cores {
            let (core_mass, core_position) = (masses[c], positions[c]);
            for (j, (a, p)) in accelerations.iter_mut().zip(positions).enumerate() {
                if j == c {
                    continue;
                }
                *a += self.acceleration(p, core_mass, &core_position);
            }
        }
    }

    /// Kinetic plus mutual potential energy of the cores.
    ///
    /// Tracers are massless and contribute nothing.
    #[must_use]
    pub fn core_energy(&self, ensemble: &Ensemble) -> Float {
        let cores = ensemble.cores();
        let (m, x, v) = (ensemble.masses(), ensemble.positions(), ensemble.velocities());

        let kinetic: Float = cores.iter().map(|&c| 0.5 * m[c] * v[c].norm_squared()).sum();
        let mut potential = 0.;
        for (i, &a) in cores.iter().enumerate() {
            for &b in &cores[i + 1..] {
                potential += m[b] * self.potential(&x[b], m[a], &x[a]);
            }
        }

        kinetic + potential
    }

    /// Energy per unit mass of particle `index` in the field of the cores.
    #[must_use]
    pub fn specific_energy(&self, ensemble: &Ensemble, index: usize) -> Float {
        let (m, x) = (ensemble.masses(), ensemble.positions());
        let potential: Float = ensemble
            .cores()
            .iter()
            .filter(|&&c| c != index)
            .map(|&c| self.potential(&x[index], m[c], &x[c]))
            .sum();

        0.5 * ensemble.velocities()[index].norm_squared() + potential
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    #[test]
    fn attracts_towards_core() {
        let gravity = RestrictedGravity::new(1e-3);
        let a = gravity.acceleration(&Vector3::new(1., 0., 0.), 1., &Vector3::new(-1., 0., 0.));

        assert!(a[0] < 0.);
        assert_relative_eq!(a[0], -0.25, epsilon = 1e-6);
        assert_eq!(a[1], 0.);
    }

    #[test]
    fn tracers_do_not_interact() {
        let gravity = RestrictedGravity::from_reference_radius(25.);
        let positions = vec![
            Vector3::new(1e6, 0., 0.),
            Vector3::new(0., 0., 0.),
            Vector3::new(0.1, 0., 0.),
        ];
        let masses = vec![1e11, 0., 0.];
        let mut acc = vec![Vector3::new(9., 9., 9.); 3];

        gravity.accelerations(&positions, &masses, &[], &mut acc);
        assert!(acc.iter().all(|a| *a == Vector3::zeros()));

        // far from the only core, two nearby tracers feel (almost) the same pull
        gravity.accelerations(&positions, &masses, &[0], &mut acc);
        assert_relative_eq!(acc[1], acc[2], max_relative = 1e-6);
        assert_eq!(acc[0], Vector3::zeros());
    }

    #[test]
    fn massless_particles_are_ignored_even_if_listed_elsewhere() {
        let gravity = RestrictedGravity::new(0.5);
        let positions = vec![Vector3::zeros(), Vector3::new(1., 0., 0.)];
        let masses = vec![0., 0.];
        let mut acc = vec![Vector3::zeros(); 2];

        gravity.accelerations(&positions, &masses, &[0], &mut acc);
        assert!(acc.iter().all(|a| *a == Vector3::zeros()));
    }

    #[test]
    fn softening_bounds_acceleration() {
        let epsilon = 5.;
        let mass = 1e11;
        let gravity = RestrictedGravity::new(epsilon);
        let mut rng = StdRng::seed_from_u64(0);

        for i in 0..1000 {
            let scale = 10f64.powi(-(i % 12));
            let offset = scale * Vector3::<Float>::new(rng.gen(), rng.gen(), rng.gen());
            let a = gravity.acceleration(&offset, mass, &Vector3::zeros());
            assert!(a.norm() <= G * mass / (epsilon * epsilon));
        }

        let a = gravity.acceleration(&Vector3::zeros(), mass, &Vector3::zeros());
        assert_eq!(a, Vector3::zeros());
    }

    #[test]
    fn superposition_of_cores() {
        let gravity = RestrictedGravity::new(0.1);
        let positions = vec![
            Vector3::new(-2., 0., 0.),
            Vector3::new(2., 0., 0.),
            Vector3::new(0., 0., 0.),
        ];
        let masses = vec![3., 3., 0.];
        let mut acc = vec![Vector3::zeros(); 3];

        gravity.accelerations(&positions, &masses, &[0, 1], &mut acc);
        assert_abs_diff_eq!(acc[2], Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(acc[0], -acc[1], epsilon = 1e-12);
        assert!(acc[0][0] > 0.);
    }

    #[test]
    fn energy_of_core_pair() {
        let gravity = RestrictedGravity::new(0.).with_gravitational_constant(2.);
        let ensemble = Ensemble::new(
            vec![Vector3::zeros(), Vector3::new(4., 0., 0.), Vector3::new(1., 0., 0.)],
            vec![Vector3::new(1., 0., 0.), Vector3::zeros(), Vector3::new(0., 3., 0.)],
            vec![2., 1., 0.],
            vec![0, 1],
        )
        .unwrap();

        assert_relative_eq!(gravity.core_energy(&ensemble), 1. - 2. * 2. / 4.);
        assert_relative_eq!(
            gravity.specific_energy(&ensemble, 2),
            4.5 - 2. * 2. / 1. - 2. * 1. / 3.
        );
    }
}
