use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MabError, MabResult};

/// Probability per arm, in arm order. Recomputed on every decision.
pub type ProbabilityVector = Vec<f64>;

/// Snapshot of one arm's history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArmState {
    pub pulls: u64,
    pub reward: f64,
}

impl ArmState {
    pub const fn new(pulls: u64, reward: f64) -> Self {
        Self { pulls, reward }
    }

    /// Empirical reward rate. A never-pulled arm has rate 0.
    pub fn rate(&self) -> f64 {
        if self.pulls > 0 {
            self.reward / self.pulls as f64
        } else {
            0.0
        }
    }
}

/// One selectable option within a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arm {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub pulls: u64,
    #[serde(default)]
    pub reward: f64,
    /// Static weight, only read by the multinomial policy.
    #[serde(default)]
    pub bias: f64,
}

impl Arm {
    /// A fresh, never-pulled arm.
    pub fn new(name: impl Into<String>, bias: f64) -> MabResult<Self> {
        if !bias.is_finite() || bias < 0.0 {
            return Err(MabError::InvalidBias(bias));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            pulls: 0,
            reward: 0.0,
            bias,
        })
    }

    pub fn state(&self) -> ArmState {
        ArmState::new(self.pulls, self.reward)
    }

    /// Record one resolved selection of this arm.
    pub fn pull(&mut self, reward: f64) {
        self.pulls += 1;
        self.reward += reward;
    }
}

/// Policy governing how a topic's arms are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum PolicyId {
    EqualWeight,
    Randomize,
    EpsilonGreedy,
    Softmax,
    Ucb1,
    #[default]
    Multinomial,
}

impl PolicyId {
    pub const ALL: [PolicyId; 6] = [
        PolicyId::EqualWeight,
        PolicyId::Randomize,
        PolicyId::EpsilonGreedy,
        PolicyId::Softmax,
        PolicyId::Ucb1,
        PolicyId::Multinomial,
    ];

    /// Stored tag, as persisted alongside the topic.
    pub fn as_tag(&self) -> &'static str {
        match self {
            PolicyId::EqualWeight => "EQUAL_WEIGHT",
            PolicyId::Randomize => "RANDOMIZE",
            PolicyId::EpsilonGreedy => "EPSILON_GREEDY",
            PolicyId::Softmax => "SOFTMAX",
            PolicyId::Ucb1 => "UCB1",
            PolicyId::Multinomial => "MULTINOMIAL",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PolicyId::EqualWeight => "Equal Weight",
            PolicyId::Randomize => "Randomize",
            PolicyId::EpsilonGreedy => "Epsilon Greedy",
            PolicyId::Softmax => "Softmax",
            PolicyId::Ucb1 => "UCB1",
            PolicyId::Multinomial => "Multinomial",
        }
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for PolicyId {
    type Err = MabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyId::ALL
            .into_iter()
            .find(|p| p.as_tag() == s)
            .ok_or_else(|| MabError::UnknownPolicy(s.to_string()))
    }
}

/// Outcome of a live randomisation, reported back by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeResolution {
    pub arm_id: String,
    pub reward: f64,
}

/// A set of competing arms plus the policy and iteration counter that
/// govern how the next one is picked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    /// Policy tag as stored. Parsed on every decision so that a tag this
    /// build does not know fails only the decisions of this topic.
    pub policy: String,
    /// Resolved selections so far.
    #[serde(default)]
    pub t: u64,
    #[serde(default)]
    pub arms: Vec<Arm>,
}

impl Topic {
    /// An empty topic using the multinomial policy.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            policy: PolicyId::default().as_tag().to_string(),
            t: 0,
            arms: Vec::new(),
        }
    }

    pub fn policy_id(&self) -> MabResult<PolicyId> {
        self.policy.parse()
    }

    pub fn set_policy(&mut self, policy: PolicyId) {
        self.policy = policy.as_tag().to_string();
    }

    pub fn states(&self) -> Vec<ArmState> {
        self.arms.iter().map(Arm::state).collect()
    }

    pub fn biases(&self) -> Vec<f64> {
        self.arms.iter().map(|a| a.bias).collect()
    }

    pub fn arm(&self, arm_id: &str) -> Option<&Arm> {
        self.arms.iter().find(|a| a.id == arm_id)
    }

    /// Check arms that came from storage rather than through `add_arm` and
    /// `resolve`: biases and rewards must be finite and non-negative.
    pub fn validate(&self) -> MabResult<()> {
        for arm in &self.arms {
            if !arm.bias.is_finite() || arm.bias < 0.0 {
                return Err(MabError::InvalidBias(arm.bias));
            }
            if !arm.reward.is_finite() || arm.reward < 0.0 {
                return Err(MabError::InvalidReward(arm.reward));
            }
        }
        Ok(())
    }

    /// Add a new option and return its id.
    pub fn add_arm(&mut self, name: impl Into<String>, bias: f64) -> MabResult<String> {
        let arm = Arm::new(name, bias)?;
        let id = arm.id.clone();
        self.arms.push(arm);
        Ok(id)
    }

    pub fn remove_arm(&mut self, arm_id: &str) -> MabResult<Arm> {
        let idx = self
            .arms
            .iter()
            .position(|a| a.id == arm_id)
            .ok_or_else(|| MabError::ArmNotFound(arm_id.to_string()))?;
        Ok(self.arms.remove(idx))
    }

    /// Apply a resolved outcome: pull the arm and advance `t`.
    pub fn resolve(&mut self, outcome: &OutcomeResolution) -> MabResult<ArmState> {
        if !outcome.reward.is_finite() || outcome.reward < 0.0 {
            return Err(MabError::InvalidReward(outcome.reward));
        }
        let arm = self
            .arms
            .iter_mut()
            .find(|a| a.id == outcome.arm_id)
            .ok_or_else(|| MabError::ArmNotFound(outcome.arm_id.clone()))?;
        arm.pull(outcome.reward);
        let state = arm.state();
        self.t += 1;

        tracing::info!(
            topic_id = %self.id,
            arm_id = %outcome.arm_id,
            reward = outcome.reward,
            pulls = state.pulls,
            t = self.t,
            "Outcome resolved"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_of_unpulled_arm_is_zero() {
        assert_eq!(ArmState::new(0, 0.0).rate(), 0.0);
        assert_eq!(ArmState::new(4, 3.0).rate(), 0.75);
    }

    #[test]
    fn test_pull_accumulates_in_any_order() {
        let mut forward = Arm::new("a", 1.0).unwrap();
        let mut backward = forward.clone();
        let rewards = [1.0, 0.0, 1.0, 1.0, 0.0];

        for r in rewards {
            forward.pull(r);
        }
        for r in rewards.iter().rev() {
            backward.pull(*r);
        }

        assert_eq!(forward.state(), ArmState::new(5, 3.0));
        assert_eq!(forward.state(), backward.state());
    }

    #[test]
    fn test_new_arm_rejects_bad_bias() {
        assert!(matches!(Arm::new("x", -1.0), Err(MabError::InvalidBias(_))));
        assert!(matches!(
            Arm::new("x", f64::INFINITY),
            Err(MabError::InvalidBias(_))
        ));
        let arm = Arm::new("x", 0.0).unwrap();
        assert_eq!(arm.state(), ArmState::default());
    }

    #[test]
    fn test_policy_tags_round_trip() {
        for policy in PolicyId::ALL {
            assert_eq!(policy.as_tag().parse::<PolicyId>().unwrap(), policy);
            let json = serde_json::to_string(&policy).unwrap();
            assert_eq!(json, format!("\"{}\"", policy.as_tag()));
        }
        assert_eq!(PolicyId::Ucb1.display_name(), "UCB1");
        assert_eq!(PolicyId::EpsilonGreedy.display_name(), "Epsilon Greedy");
    }

    #[test]
    fn test_unknown_policy_tag() {
        let err = "THOMPSON".parse::<PolicyId>().unwrap_err();
        assert!(matches!(err, MabError::UnknownPolicy(ref tag) if tag == "THOMPSON"));
    }

    #[test]
    fn test_new_topic_defaults() {
        let topic = Topic::new("lunch");
        assert_eq!(topic.policy_id().unwrap(), PolicyId::Multinomial);
        assert_eq!(topic.t, 0);
        assert!(topic.arms.is_empty());
    }

    #[test]
    fn test_resolve_pulls_and_advances_t() {
        let mut topic = Topic::new("lunch");
        let pizza = topic.add_arm("pizza", 1.0).unwrap();
        topic.add_arm("sushi", 2.0).unwrap();

        let state = topic
            .resolve(&OutcomeResolution {
                arm_id: pizza.clone(),
                reward: 1.0,
            })
            .unwrap();

        assert_eq!(state, ArmState::new(1, 1.0));
        assert_eq!(topic.t, 1);
        assert_eq!(topic.arm(&pizza).unwrap().pulls, 1);
        assert_eq!(topic.arms[1].pulls, 0);
    }

    #[test]
    fn test_resolve_rejects_unknown_arm_and_bad_reward() {
        let mut topic = Topic::new("lunch");
        let id = topic.add_arm("pizza", 1.0).unwrap();

        let missing = topic.resolve(&OutcomeResolution {
            arm_id: "nope".into(),
            reward: 1.0,
        });
        assert!(matches!(missing, Err(MabError::ArmNotFound(_))));

        let negative = topic.resolve(&OutcomeResolution {
            arm_id: id,
            reward: -1.0,
        });
        assert!(matches!(negative, Err(MabError::InvalidReward(_))));
        assert_eq!(topic.t, 0);
    }

    #[test]
    fn test_remove_arm() {
        let mut topic = Topic::new("lunch");
        let id = topic.add_arm("pizza", 1.0).unwrap();
        let removed = topic.remove_arm(&id).unwrap();
        assert_eq!(removed.name, "pizza");
        assert!(topic.arms.is_empty());
        assert!(matches!(topic.remove_arm(&id), Err(MabError::ArmNotFound(_))));
    }

    #[test]
    fn test_validate_rejects_stored_bad_values() {
        let json = r#"{
            "id": "t1",
            "name": "dinner",
            "policy": "MULTINOMIAL",
            "arms": [
                {"id": "a1", "name": "ramen", "bias": 3},
                {"id": "a2", "name": "curry", "bias": -1}
            ]
        }"#;
        let mut topic: Topic = serde_json::from_str(json).unwrap();
        assert!(matches!(topic.validate(), Err(MabError::InvalidBias(b)) if b == -1.0));

        topic.arms[1].bias = 1.0;
        assert!(topic.validate().is_ok());

        topic.arms[0].reward = f64::NAN;
        assert!(matches!(topic.validate(), Err(MabError::InvalidReward(_))));
    }

    #[test]
    fn test_topic_deserializes_from_storage_shape() {
        let json = r#"{
            "id": "t1",
            "name": "dinner",
            "policy": "UCB1",
            "t": 3,
            "arms": [{"id": "a1", "name": "ramen", "pulls": 3, "reward": 2, "bias": 1}]
        }"#;
        let topic: Topic = serde_json::from_str(json).unwrap();
        assert_eq!(topic.policy_id().unwrap(), PolicyId::Ucb1);
        assert_eq!(topic.states(), vec![ArmState::new(3, 2.0)]);
        assert_eq!(topic.biases(), vec![1.0]);
    }
}
