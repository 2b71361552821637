use thiserror::Error;

pub type MabResult<T> = Result<T, MabError>;

/// Failures surfaced by the decision engine.
///
/// A stored arm whose bias or reward is negative or non-finite fails with
/// `InvalidBias` / `InvalidReward` before any policy runs.
///
/// An empty arm set is not represented here: deciding over a topic with no
/// arms yields an empty decision. Degenerate probability vectors are caught
/// inside the policies themselves and never reach the caller.
#[derive(Error, Debug)]
pub enum MabError {
    #[error("Unknown policy: {0}")]
    UnknownPolicy(String),

    #[error("Arm not found: {0}")]
    ArmNotFound(String),

    #[error("Invalid bias {0}: must be finite and non-negative")]
    InvalidBias(f64),

    #[error("Invalid reward signal {0}: must be finite and non-negative")]
    InvalidReward(f64),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for MabError {
    fn from(err: config::ConfigError) -> Self {
        MabError::Config(err.to_string())
    }
}
