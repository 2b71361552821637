//! Decision orchestration: topic in, probabilities and a chosen arm out.
//!
//! The engine never mutates the topic it is handed. Applying the outcome of
//! a decision is the caller's job, through [`Topic::resolve`].

use chrono::{DateTime, Utc};
use rand::Rng;
use randomme_core::{EngineConfig, MabResult, PolicyId, ProbabilityVector, Topic};
use serde::{Deserialize, Serialize};

use crate::{dispatcher, sampler};

/// One arm's share of a decision, as displayed to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmProbability {
    pub arm_id: String,
    pub arm_name: String,
    pub probability: f64,
    pub policy_display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub topic_id: String,
    /// `None` when the topic has no arms.
    pub chosen: Option<ArmProbability>,
    /// Probabilities in the topic's arm order.
    pub probabilities: ProbabilityVector,
    /// The same probabilities, highest first.
    pub ranking: Vec<ArmProbability>,
    pub policy: Option<PolicyId>,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    pub fn is_empty(&self) -> bool {
        self.chosen.is_none()
    }

    pub fn policy_display_name(&self) -> Option<&'static str> {
        self.policy.as_ref().map(PolicyId::display_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: EngineConfig,
}

impl DecisionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Probability of every arm, in arm order. Empty for a topic with no arms.
    ///
    /// Fails with `InvalidBias` or `InvalidReward` when a stored arm carries
    /// a negative or non-finite value.
    pub fn probabilities<R: Rng + ?Sized>(
        &self,
        topic: &Topic,
        rng: &mut R,
    ) -> MabResult<ProbabilityVector> {
        if topic.arms.is_empty() {
            return Ok(Vec::new());
        }
        topic.validate()?;
        dispatcher::dispatch_tag(
            &topic.policy,
            &topic.states(),
            topic.t,
            &topic.biases(),
            &self.config,
            rng,
        )
    }

    /// Ranked probabilities without picking an arm.
    pub fn preview(&self, topic: &Topic) -> MabResult<Vec<ArmProbability>> {
        self.preview_with(topic, &mut rand::thread_rng())
    }

    pub fn preview_with<R: Rng + ?Sized>(
        &self,
        topic: &Topic,
        rng: &mut R,
    ) -> MabResult<Vec<ArmProbability>> {
        if topic.arms.is_empty() {
            return Ok(Vec::new());
        }
        let policy = topic.policy_id()?;
        let probabilities = self.probabilities(topic, rng)?;
        Ok(rank(topic, &probabilities, policy))
    }

    /// Live decision: compute probabilities and sample one arm.
    pub fn decide(&self, topic: &Topic) -> MabResult<Decision> {
        self.decide_with(topic, &mut rand::thread_rng())
    }

    pub fn decide_with<R: Rng + ?Sized>(&self, topic: &Topic, rng: &mut R) -> MabResult<Decision> {
        if topic.arms.is_empty() {
            tracing::debug!(topic_id = %topic.id, "Topic has no arms, nothing to decide");
            return Ok(Decision {
                topic_id: topic.id.clone(),
                chosen: None,
                probabilities: Vec::new(),
                ranking: Vec::new(),
                policy: topic.policy_id().ok(),
                decided_at: Utc::now(),
            });
        }

        let policy = topic.policy_id()?;
        let probabilities = self.probabilities(topic, rng)?;
        let chosen = sampler::choose_index(&probabilities, rng).map(|i| ArmProbability {
            arm_id: topic.arms[i].id.clone(),
            arm_name: topic.arms[i].name.clone(),
            probability: probabilities[i],
            policy_display_name: policy.display_name().to_string(),
        });

        if let Some(arm) = &chosen {
            tracing::debug!(
                topic_id = %topic.id,
                policy = %policy,
                arm_id = %arm.arm_id,
                probability = arm.probability,
                "Arm chosen"
            );
        }

        Ok(Decision {
            topic_id: topic.id.clone(),
            chosen,
            ranking: rank(topic, &probabilities, policy),
            probabilities,
            policy: Some(policy),
            decided_at: Utc::now(),
        })
    }
}

/// Pair arms with their probabilities, highest first; ties keep arm order.
fn rank(topic: &Topic, probabilities: &[f64], policy: PolicyId) -> Vec<ArmProbability> {
    let mut ranked: Vec<ArmProbability> = topic
        .arms
        .iter()
        .zip(probabilities)
        .map(|(arm, p)| ArmProbability {
            arm_id: arm.id.clone(),
            arm_name: arm.name.clone(),
            probability: *p,
            policy_display_name: policy.display_name().to_string(),
        })
        .collect();
    ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    ranked
}
