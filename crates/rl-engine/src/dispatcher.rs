//! Maps a policy identifier to its policy function and arguments.

use rand::Rng;
use randomme_core::{ArmState, EngineConfig, MabResult, PolicyId, ProbabilityVector};

use crate::policies;

/// Probability vector for `states` under `policy`.
///
/// `biases` is only read by the multinomial policy and must be parallel to
/// `states`. `t` feeds the decay schedules and the UCB1 confidence term.
pub fn dispatch<R: Rng + ?Sized>(
    policy: PolicyId,
    states: &[ArmState],
    t: u64,
    biases: &[f64],
    config: &EngineConfig,
    rng: &mut R,
) -> ProbabilityVector {
    tracing::debug!(policy = %policy, arms = states.len(), t, "Dispatching policy");
    match policy {
        PolicyId::EqualWeight => policies::equal_weight(states),
        PolicyId::Randomize => policies::randomize(states, rng),
        PolicyId::EpsilonGreedy => {
            policies::epsilon_greedy(states, t, &config.epsilon_greedy, rng)
        }
        PolicyId::Softmax => policies::softmax(states, t, &config.softmax),
        PolicyId::Ucb1 => policies::ucb1(states, t),
        PolicyId::Multinomial => policies::multinomial(biases),
    }
}

/// Like [`dispatch`], starting from a stored policy tag.
///
/// An unrecognised tag fails with `UnknownPolicy` before anything is drawn.
pub fn dispatch_tag<R: Rng + ?Sized>(
    tag: &str,
    states: &[ArmState],
    t: u64,
    biases: &[f64],
    config: &EngineConfig,
    rng: &mut R,
) -> MabResult<ProbabilityVector> {
    let policy: PolicyId = tag.parse()?;
    Ok(dispatch(policy, states, t, biases, config, rng))
}
