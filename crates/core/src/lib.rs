//! Shared types for the RandomMe decision engine: arms, topics, policy
//! identifiers, configuration and errors.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DecaySchedule, EngineConfig};
pub use error::{MabError, MabResult};
pub use types::{Arm, ArmState, OutcomeResolution, PolicyId, ProbabilityVector, Topic};
