//! Build a ready-to-run simulation from a [`ScenarioConfig`].

use log::{debug, info};

use crate::{
    config::ScenarioConfig,
    ensemble::Ensemble,
    galaxy::Galaxy,
    gravity::RestrictedGravity,
    integrator::{Schedule, Simulation},
    recorder::Recorder,
    Result,
};

/// Generated galaxies together with the simulation integrating them.
#[derive(Clone, Debug)]
pub struct Scenario {
    galaxies: Vec<Galaxy>,
    simulation: Simulation,
    schedule: Schedule,
}

impl Scenario {
    pub fn build(cfg: &ScenarioConfig) -> Result<Self> {
        cfg.integration.validate()?;
        let schedule = cfg.integration.schedule();

        let galaxies = cfg
            .galaxies
            .iter()
            .map(|gc| -> Result<Galaxy> {
                let mut galaxy = Galaxy::generate(&gc.params)?;
                galaxy.translate(gc.offset.x, gc.offset.y, gc.offset.z);
                galaxy.add_initial_velocity(gc.boost.x, gc.boost.y, gc.boost.z);
                debug!("{galaxy}");
                Ok(galaxy)
            })
            .collect::<Result<Vec<_>>>()?;

        let ensemble = Ensemble::from_galaxies(&galaxies)?;
        info!(
            "built {} galaxies with {} particles, cores at {:?}",
            galaxies.len(),
            ensemble.len(),
            ensemble.cores()
        );

        let gravity = RestrictedGravity::from_reference_radius(cfg.integration.softening_radius);
        let simulation = Simulation::new(ensemble, gravity).start_time(cfg.integration.t_start);

        Ok(Self {
            galaxies,
            simulation,
            schedule,
        })
    }

    #[must_use]
    pub fn galaxies(&self) -> &[Galaxy] {
        &self.galaxies
    }

    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    #[must_use]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Integrate the configured schedule and bring the galaxies up to date.
    pub fn run(&mut self, recorder: &mut impl Recorder) -> Result<()> {
        self.simulation.run(&self.schedule, recorder)?;
        self.simulation.ensemble().write_back(&mut self.galaxies)
    }
}

/// Build the scenario described by `cfg` and write its trajectories to the
/// configured output.
///
/// The output file is only opened once the scenario is known to be valid.
pub fn simulate(cfg: &ScenarioConfig) -> Result<Scenario> {
    let mut scenario = Scenario::build(cfg)?;
    for galaxy in scenario.galaxies() {
        info!("{galaxy}");
    }

    let mut recorder = cfg.output.open()?;
    scenario.run(&mut recorder)?;
    info!("trajectories written to {}", cfg.output.path.display());

    Ok(scenario)
}
