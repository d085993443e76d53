use thiserror::Error;

/// Everything that can go wrong while setting up or running a simulation.
///
/// All variants are fatal to the call that produced them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("expected a {expected}-dimensional vector, found {found} components")]
    InvalidDimension { expected: usize, found: usize },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("division by zero: time step must be non-zero")]
    DivisionByZero,

    #[error("ensemble arrays differ in length: {positions} positions, {velocities} velocities, {masses} masses")]
    MismatchedLengths {
        positions: usize,
        velocities: usize,
        masses: usize,
    },

    #[error("particle {index} has a non-finite position or velocity")]
    NonFinite { index: usize },

    #[error("core index {index} is out of range for {len} particles")]
    InvalidCore { index: usize, len: usize },

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
