//! Policy functions: arm histories in, one probability per arm out.
//!
//! Every function expects at least one arm. Randomness comes only from the
//! generator passed in, so a seeded or mocked `Rng` makes them reproducible.

use rand::Rng;
use randomme_core::{ArmState, DecaySchedule, ProbabilityVector};

fn rates(states: &[ArmState]) -> Vec<f64> {
    states.iter().map(ArmState::rate).collect()
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn one_hot(len: usize, idx: usize) -> ProbabilityVector {
    let mut probabilities = vec![0.0; len];
    probabilities[idx] = 1.0;
    probabilities
}

pub fn equal_weight(states: &[ArmState]) -> ProbabilityVector {
    let p = 1.0 / states.len() as f64;
    vec![p; states.len()]
}

/// Independent uniform weights, normalised. Not history dependent.
pub fn randomize<R: Rng + ?Sized>(states: &[ArmState], rng: &mut R) -> ProbabilityVector {
    let draws: Vec<f64> = states.iter().map(|_| rng.gen::<f64>()).collect();
    let sum: f64 = draws.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        tracing::warn!(
            arms = states.len(),
            "All random weights were zero, using equal weight"
        );
        return equal_weight(states);
    }
    draws.into_iter().map(|d| d / sum).collect()
}

/// Epsilon-greedy with a decaying epsilon.
///
/// A draw above epsilon returns the equal-weight vector; a draw at or below
/// it puts all mass on the best empirical rate. This is the reverse of the
/// textbook branch and is kept as is.
pub fn epsilon_greedy<R: Rng + ?Sized>(
    states: &[ArmState],
    t: u64,
    schedule: &DecaySchedule,
    rng: &mut R,
) -> ProbabilityVector {
    let p = rng.gen::<f64>();
    let epsilon = schedule.value_at(t);
    if p > epsilon {
        return equal_weight(states);
    }
    one_hot(states.len(), argmax(&rates(states)))
}

/// Boltzmann weights over empirical rates with a decaying temperature.
pub fn softmax(states: &[ArmState], t: u64, schedule: &DecaySchedule) -> ProbabilityVector {
    let temperature = schedule.value_at(t);
    let scaled: Vec<f64> = rates(states).iter().map(|r| r / temperature).collect();
    // shift by the max so the largest exponent is e^0
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        // rate / temperature overflowed; the overflowing arms share all mass
        let top = scaled.iter().filter(|s| **s == max).count() as f64;
        tracing::warn!(temperature, "Softmax exponent overflowed, splitting over top arms");
        return scaled
            .iter()
            .map(|s| if *s == max { 1.0 / top } else { 0.0 })
            .collect();
    }
    let exps: Vec<f64> = scaled.iter().map(|s| (s - max).exp()).collect();
    let denominator: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / denominator).collect()
}

/// UCB1, as a one-hot vector.
///
/// Arms that were never pulled have an unbounded confidence term, as does
/// every arm while `t == 0`; the first such arm is chosen outright.
pub fn ucb1(states: &[ArmState], t: u64) -> ProbabilityVector {
    if let Some(idx) = states.iter().position(|s| s.pulls == 0 || t == 0) {
        return one_hot(states.len(), idx);
    }

    let log_t = (t as f64).ln();
    let scores: Vec<f64> = states
        .iter()
        .map(|s| s.rate() + (2.0 * log_t / s.pulls as f64).sqrt())
        .collect();
    one_hot(states.len(), argmax(&scores))
}

/// Static distribution proportional to the declared biases.
pub fn multinomial(biases: &[f64]) -> ProbabilityVector {
    let sum: f64 = biases.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        tracing::warn!(
            arms = biases.len(),
            "Biases do not sum to a positive value, using equal weight"
        );
        let p = 1.0 / biases.len() as f64;
        return vec![p; biases.len()];
    }
    biases.iter().map(|b| b / sum).collect()
}
