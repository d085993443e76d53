use std::time::Instant;

use log::{debug, info};
use nalgebra::Vector3;

use crate::{
    ensemble::Ensemble,
    gravity::RestrictedGravity,
    recorder::{Record, Recorder},
    Error, Float, Result,
};

/// Lifecycle of a [`Simulation`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Complete,
}

/// How long to integrate and how often to record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Schedule {
    /// Number of steps.
    pub nstep: usize,
    /// Record every `nout` steps.
    pub nout: usize,
    /// Time step, fixed for the whole run.
    pub dt: Float,
}

impl Schedule {
    #[must_use]
    pub fn new(nstep: usize, nout: usize, dt: Float) -> Self {
        Self { nstep, nout, dt }
    }

    pub fn validate(&self) -> Result<()> {
        if self.nout == 0 {
            return Err(Error::InvalidSchedule(
                "output interval must be at least 1".to_string(),
            ));
        }
        if self.dt == 0. || !self.dt.is_finite() {
            return Err(Error::InvalidSchedule(format!(
                "time step must be finite and non-zero, got {}",
                self.dt
            )));
        }
        Ok(())
    }

    /// Number of times the state is recorded during a run.
    #[must_use]
    pub fn num_samples(&self) -> usize {
        let during = self.nstep.div_ceil(self.nout);
        let after = usize::from(self.nstep % self.nout == 0);
        during + after
    }
}

/// Everything the integrator mutates while running.
#[derive(Clone, Debug)]
pub struct IntegratorState {
    pub time: Float,
    pub step: usize,
    pub phase: Phase,
    pub ensemble: Ensemble,
    accelerations: Vec<Vector3<Float>>,
}

impl IntegratorState {
    #[must_use]
    pub fn new(ensemble: Ensemble, time: Float) -> Self {
        let accelerations = vec![Vector3::zeros(); ensemble.len()];
        Self {
            time,
            step: 0,
            phase: Phase::Idle,
            ensemble,
            accelerations,
        }
    }
}

/// Advance all particles by `dt` with a kick-drift-kick leapfrog.
///
/// The scheme is only second-order accurate and time-reversible if `dt` is the
/// same for every call. The time of `state` is not changed.
pub fn leapstep(state: &mut IntegratorState, gravity: &RestrictedGravity, dt: Float) {
    let IntegratorState {
        ensemble,
        accelerations,
        ..
    } = state;
    let half_dt = 0.5 * dt;

    gravity.accelerations(
        &ensemble.positions,
        &ensemble.masses,
        &ensemble.cores,
        accelerations,
    );
    for (v, a) in ensemble.velocities.iter_mut().zip(accelerations.iter()) {
        *v += a * half_dt;
    }

    for (x, v) in ensemble.positions.iter_mut().zip(&ensemble.velocities) {
        *x += v * dt;
    }

    gravity.accelerations(
        &ensemble.positions,
        &ensemble.masses,
        &ensemble.cores,
        accelerations,
    );
    for (v, a) in ensemble.velocities.iter_mut().zip(accelerations.iter()) {
        *v += a * half_dt;
    }
}

/// Restricted-gravity simulation of an [`Ensemble`].
#[derive(Clone, Debug)]
pub struct Simulation {
    state: IntegratorState,
    gravity: RestrictedGravity,
}

impl Simulation {
    #[must_use]
    pub fn new(ensemble: Ensemble, gravity: RestrictedGravity) -> Self {
        Self {
            state: IntegratorState::new(ensemble, 0.),
            gravity,
        }
    }

    /// Start the clock at `time` instead of zero.
    #[must_use]
    pub fn start_time(mut self, time: Float) -> Self {
        self.state.time = time;
        self
    }

    #[must_use]
    pub fn time(&self) -> Float {
        self.state.time
    }

    #[must_use]
    pub fn steps_taken(&self) -> usize {
        self.state.step
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    #[must_use]
    pub fn ensemble(&self) -> &Ensemble {
        &self.state.ensemble
    }

    #[must_use]
    pub fn gravity(&self) -> &RestrictedGravity {
        &self.gravity
    }

    /// Take a single step and advance the clock.
    pub fn step(&mut self, dt: Float) {
        leapstep(&mut self.state, &self.gravity, dt);
        self.state.time += dt;
        self.state.step += 1;
    }

    /// Hand the current state of every particle to `recorder`.
    pub fn record(&self, recorder: &mut impl Recorder) -> Result<()> {
        let ensemble = &self.state.ensemble;
        for (index, (position, velocity)) in ensemble
            .positions()
            .iter()
            .zip(ensemble.velocities())
            .enumerate()
        {
            recorder.record(&Record {
                time: self.state.time,
                index,
                position: *position,
                velocity: *velocity,
            })?;
        }
        Ok(())
    }

    /// Integrate `schedule.nstep` steps, recording every `schedule.nout` steps
    /// and once more at the end if `nstep` is a multiple of `nout`.
    ///
    /// Running a completed simulation again continues from its current state.
    pub fn run(&mut self, schedule: &Schedule, recorder: &mut impl Recorder) -> Result<()> {
        schedule.validate()?;

        let Schedule { nstep, nout, dt } = *schedule;
        let start = Instant::now();
        let report_every = (nstep / 10).max(1);

        info!(
            "integrating {} particles for {nstep} steps of {dt} from t = {}",
            self.state.ensemble.len(),
            self.state.time
        );
        self.state.phase = Phase::Running;

        for step in 0..nstep {
            if step % nout == 0 {
                debug!("recording state at t = {}", self.state.time);
                self.record(recorder)?;
            }

            self.step(dt);

            if (step + 1) % report_every == 0 {
                info!("{} out of {nstep} time steps done.", step + 1);
            }
        }
        if nstep % nout == 0 {
            debug!("recording final state at t = {}", self.state.time);
            self.record(recorder)?;
        }
        recorder.flush()?;

        self.state.phase = Phase::Complete;
        info!(
            "reached t = {} after {:.2?}",
            self.state.time,
            start.elapsed()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::{geometry::circular_speed, G};

    /// A core at rest with one tracer on a circular orbit.
    fn two_body(radius: Float, mass: Float, epsilon: Float) -> Simulation {
        let speed = circular_speed(G, mass, radius, epsilon);
        let ensemble = Ensemble::new(
            vec![Vector3::zeros(), Vector3::new(radius, 0., 0.)],
            vec![Vector3::zeros(), Vector3::new(0., speed, 0.)],
            vec![mass, 0.],
            vec![0],
        )
        .unwrap();
        Simulation::new(ensemble, RestrictedGravity::new(epsilon))
    }

    #[test]
    fn schedule_samples() {
        assert_eq!(Schedule::new(1500, 2, 0.03).num_samples(), 751);
        assert_eq!(Schedule::new(10, 3, 0.1).num_samples(), 4);
        assert_eq!(Schedule::new(9, 3, 0.1).num_samples(), 4);
        assert_eq!(Schedule::new(0, 3, 0.1).num_samples(), 1);
    }

    #[test]
    fn schedule_validation() {
        assert!(Schedule::new(10, 0, 0.1).validate().is_err());
        assert!(Schedule::new(10, 1, 0.).validate().is_err());
        assert!(Schedule::new(10, 1, Float::NAN).validate().is_err());
        assert!(Schedule::new(10, 1, -0.1).validate().is_ok());
    }

    #[test]
    fn invalid_schedule_leaves_state_untouched() {
        let mut sim = two_body(1., 1., 0.1);
        let mut records: Vec<Record> = Vec::new();

        assert!(sim.run(&Schedule::new(10, 0, 0.1), &mut records).is_err());
        assert!(records.is_empty());
        assert_eq!(sim.phase(), Phase::Idle);
        assert_eq!(sim.steps_taken(), 0);
    }

    #[test]
    fn leapstep_matches_hand_computation() {
        let gravity = RestrictedGravity::new(0.);
        let ensemble = Ensemble::new(
            vec![Vector3::zeros(), Vector3::new(2., 0., 0.)],
            vec![Vector3::zeros(), Vector3::new(0., 1., 0.)],
            vec![4., 0.],
            vec![0],
        )
        .unwrap();
        let mut state = IntegratorState::new(ensemble, 0.);
        let dt = 0.1;

        leapstep(&mut state, &gravity, dt);

        // a0 = -1 along x, half kick, drift, then the kick at the drifted position
        let v_half = Vector3::new(-0.05, 1., 0.);
        let x1 = Vector3::new(2., 0., 0.) + v_half * dt;
        let a1 = -4. * x1 / x1.norm().powi(3);
        assert_relative_eq!(state.ensemble.positions()[1], x1, epsilon = 1e-14);
        assert_relative_eq!(
            state.ensemble.velocities()[1],
            v_half + a1 * 0.5 * dt,
            epsilon = 1e-14
        );
        // the core has nothing to pull it
        assert_eq!(state.ensemble.positions()[0], Vector3::zeros());
        assert_eq!(state.time, 0.);
    }

    #[test]
    fn circular_orbit_stays_circular() {
        let mut sim = two_body(5., 100., 0.5);
        let energy = sim.gravity().specific_energy(sim.ensemble(), 1);

        for _ in 0..2000 {
            sim.step(0.01);
        }

        let r = sim.ensemble().positions()[1].norm();
        assert_relative_eq!(r, 5., max_relative = 1e-3);
        assert_relative_eq!(
            sim.gravity().specific_energy(sim.ensemble(), 1),
            energy,
            max_relative = 1e-4
        );
    }

    #[test]
    fn time_reversible() {
        let mut sim = two_body(3., 50., 0.3);
        // make the orbit eccentric
        sim.state.ensemble.velocities[1] *= 0.7;
        let x0 = sim.ensemble().positions()[1];
        let v0 = sim.ensemble().velocities()[1];

        for _ in 0..500 {
            sim.step(0.02);
        }
        assert_ne!(sim.ensemble().positions()[1], x0);
        for _ in 0..500 {
            sim.step(-0.02);
        }

        assert_abs_diff_eq!(sim.ensemble().positions()[1], x0, epsilon = 1e-8);
        assert_abs_diff_eq!(sim.ensemble().velocities()[1], v0, epsilon = 1e-8);
        assert_eq!(sim.steps_taken(), 1000);
    }

    #[test]
    fn two_cores_conserve_energy() {
        let gravity = RestrictedGravity::new(0.2);
        let ensemble = Ensemble::new(
            vec![Vector3::new(-1., 0., 0.), Vector3::new(1., 0., 0.)],
            vec![Vector3::new(0., -0.45, 0.), Vector3::new(0., 0.45, 0.)],
            vec![1., 1.],
            vec![0, 1],
        )
        .unwrap();
        let mut sim = Simulation::new(ensemble, gravity);
        let energy = gravity.core_energy(sim.ensemble());

        for _ in 0..2000 {
            sim.step(0.002);
        }

        assert_relative_eq!(gravity.core_energy(sim.ensemble()), energy, max_relative = 1e-4);
        // momentum is conserved exactly up to rounding
        let p: Vector3<Float> = sim.ensemble().velocities().iter().sum();
        assert_abs_diff_eq!(p, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn run_records_on_schedule() {
        let mut sim = two_body(1., 1., 0.1).start_time(-1.);
        let mut records: Vec<Record> = Vec::new();

        sim.run(&Schedule::new(6, 2, 0.5), &mut records).unwrap();

        assert_eq!(sim.phase(), Phase::Complete);
        assert_eq!(records.len(), 4 * 2);
        let times: Vec<_> = records.iter().step_by(2).map(|r| r.time).collect();
        assert_eq!(times, vec![-1., 0., 1., 2.]);
        for pair in records.chunks(2) {
            assert_eq!(pair[0].index, 0);
            assert_eq!(pair[1].index, 1);
        }
        let last = records.last().unwrap();
        assert_eq!(last.position, sim.ensemble().positions()[1]);
        assert_relative_eq!(sim.time(), 2.);
    }

    #[test]
    fn run_skips_final_record_off_schedule() {
        let mut sim = two_body(1., 1., 0.1);
        let mut records: Vec<Record> = Vec::new();

        sim.run(&Schedule::new(5, 2, 0.5), &mut records).unwrap();

        let times: Vec<_> = records.iter().step_by(2).map(|r| r.time).collect();
        assert_eq!(times, vec![0., 1., 2.]);
        assert_relative_eq!(sim.time(), 2.5);
    }

    #[test]
    fn run_continues_after_completion() {
        let mut sim = two_body(1., 1., 0.1);
        let mut records: Vec<Record> = Vec::new();

        sim.run(&Schedule::new(2, 1, 0.25), &mut records).unwrap();
        sim.run(&Schedule::new(2, 1, 0.25), &mut records).unwrap();

        assert_eq!(sim.steps_taken(), 4);
        assert_relative_eq!(sim.time(), 1.);
        assert_eq!(records.len(), 2 * 3 * 2);
    }
}
