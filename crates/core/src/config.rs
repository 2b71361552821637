use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MabError, MabResult};

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `RANDOMME__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Decay schedules handed to the adaptive policies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_epsilon_schedule")]
    pub epsilon_greedy: DecaySchedule,
    #[serde(default = "default_softmax_schedule")]
    pub softmax: DecaySchedule,
}

/// Exponential decay floored at `end`: `max(end, start * decay^t)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecaySchedule {
    pub start: f64,
    pub end: f64,
    pub decay: f64,
}

impl DecaySchedule {
    pub const fn new(start: f64, end: f64, decay: f64) -> Self {
        Self { start, end, decay }
    }

    /// Value of the schedule after `t` resolved selections.
    pub fn value_at(&self, t: u64) -> f64 {
        let between = self.start * self.decay.powf(t as f64);
        if between > self.end {
            between
        } else {
            self.end
        }
    }

    pub fn validate(&self, name: &str) -> MabResult<()> {
        if !(self.start.is_finite() && self.start > 0.0) {
            return Err(MabError::Config(format!(
                "{name}.start must be finite and positive, got {}",
                self.start
            )));
        }
        if !(self.end.is_finite() && self.end > 0.0) {
            return Err(MabError::Config(format!(
                "{name}.end must be finite and positive, got {}",
                self.end
            )));
        }
        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(MabError::Config(format!(
                "{name}.decay must lie in (0, 1], got {}",
                self.decay
            )));
        }
        Ok(())
    }
}

fn default_epsilon_schedule() -> DecaySchedule {
    DecaySchedule::new(0.3, 0.1, 0.99)
}
fn default_softmax_schedule() -> DecaySchedule {
    DecaySchedule::new(1.0, 0.1, 0.99)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon_greedy: default_epsilon_schedule(),
            softmax: default_softmax_schedule(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> MabResult<()> {
        self.epsilon_greedy.validate("engine.epsilon_greedy")?;
        self.softmax.validate("engine.softmax")
    }
}

impl AppConfig {
    /// Load configuration from an optional config file, then environment
    /// variables (`RANDOMME__ENGINE__SOFTMAX__END=0.05`).
    pub fn load(path: Option<&Path>) -> MabResult<Self> {
        let mut builder = config::Config::builder();
        // Per-field defaults, so a source may override a single field of a
        // schedule without restating the rest of it.
        let defaults = EngineConfig::default();
        for (name, schedule) in [
            ("epsilon_greedy", defaults.epsilon_greedy),
            ("softmax", defaults.softmax),
        ] {
            builder = builder
                .set_default(format!("engine.{name}.start"), schedule.start)?
                .set_default(format!("engine.{name}.end"), schedule.end)?
                .set_default(format!("engine.{name}.decay"), schedule.decay)?;
        }
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("RANDOMME")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.engine.validate()?;
        tracing::debug!(
            epsilon = ?config.engine.epsilon_greedy,
            softmax = ?config.engine.softmax,
            "Engine configuration loaded"
        );
        Ok(config)
    }
}
