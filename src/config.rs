//! Scenario configuration loaded from YAML.
//!
//! An example matching [`ScenarioConfig::default`]:
//!
//! ```yaml
//! galaxies:
//!   - name: NGC 4038
//!     r_min: 25.0
//!     core_mass: 1.0e11
//!     boost: [2.0, 0.0, 0.0]
//!   - name: NGC 4039
//!     r_min: 25.0
//!     theta: 0.7853981633974483   # tilt of the disk
//!     axis: [1.0, 0.0, 0.0]       # tilt axis, need not be normalized
//!     core_mass: 1.0e11
//!     offset: [80.0, 30.0, 5.0]
//!     boost: [-2.0, 0.0, 0.0]
//!
//! integration:
//!   nstep: 1500
//!   nout: 2
//!   dt: 0.03
//!   t_start: -11.85
//!   softening_radius: 25.0        # softening length is 0.2 * softening_radius
//!
//! output:
//!   path: data/leapstep_latest.csv
//!   append: false
//! ```

use std::{
    f64::consts::FRAC_PI_4,
    fs::{self, File},
    io::{BufReader, BufWriter, Read},
    path::{Path, PathBuf},
};

use nalgebra::Vector3;
use serde::Deserialize;

use crate::{
    galaxy::GalaxyParams, integrator::Schedule, recorder::CsvRecorder, Error, Float, Result,
};

fn zero_vector() -> Vector3<Float> {
    Vector3::zeros()
}

/// One galaxy and where it starts.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GalaxyConfig {
    #[serde(flatten)]
    pub params: GalaxyParams,
    /// Translation applied after generation.
    #[serde(default = "zero_vector")]
    pub offset: Vector3<Float>,
    /// Velocity added to every particle of the galaxy.
    #[serde(default = "zero_vector")]
    pub boost: Vector3<Float>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct IntegrationConfig {
    pub nstep: usize,
    pub nout: usize,
    pub dt: Float,
    #[serde(default)]
    pub t_start: Float,
    /// Reference radius of the softening length used by the integrator.
    pub softening_radius: Float,
}

impl IntegrationConfig {
    #[must_use]
    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.nstep, self.nout, self.dt)
    }

    /// Check the schedule, the start time and the softening radius.
    pub fn validate(&self) -> Result<()> {
        self.schedule().validate()?;
        if !self.t_start.is_finite() {
            return Err(Error::InvalidSchedule(format!(
                "start time must be finite, got {}",
                self.t_start
            )));
        }
        if !(self.softening_radius > 0.) || !self.softening_radius.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "softening radius must be positive and finite, got {}",
                self.softening_radius
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OutputConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub append: bool,
}

impl OutputConfig {
    /// Open the output file, creating missing parent directories.
    ///
    /// The file is truncated unless `append` is set.
    pub fn open(&self) -> Result<CsvRecorder<BufWriter<File>>> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        if self.append {
            CsvRecorder::append(&self.path)
        } else {
            CsvRecorder::create(&self.path)
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/leapstep_latest.csv"),
            append: false,
        }
    }
}

/// Top-level scenario configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    pub galaxies: Vec<GalaxyConfig>,
    pub integration: IntegrationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ScenarioConfig {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

/// The Antennae encounter: two equal galaxies on a collision course.
impl Default for ScenarioConfig {
    fn default() -> Self {
        let r_min = 25.;
        let core_mass = 1e11;

        Self {
            galaxies: vec![
                GalaxyConfig {
                    params: GalaxyParams::new(r_min, 0., Vector3::x(), core_mass).name("NGC 4038"),
                    offset: Vector3::zeros(),
                    boost: Vector3::new(2., 0., 0.),
                },
                GalaxyConfig {
                    params: GalaxyParams::new(r_min, FRAC_PI_4, Vector3::x(), core_mass)
                        .name("NGC 4039"),
                    offset: Vector3::new(80., 30., 5.),
                    boost: Vector3::new(-2., 0., 0.),
                },
            ],
            integration: IntegrationConfig {
                nstep: 1500,
                nout: 2,
                dt: 0.03,
                t_start: -11.85,
                softening_radius: r_min,
            },
            output: OutputConfig::default(),
        }
    }
}
