//! Multi-armed bandit decision engine: six policies (equal weight, randomize,
//! epsilon-greedy, softmax, UCB1, multinomial), a policy dispatcher, a
//! weighted sampler and the orchestrator tying them to a topic.

pub mod dispatcher;
pub mod orchestrator;
pub mod policies;
pub mod sampler;

pub use dispatcher::{dispatch, dispatch_tag};
pub use orchestrator::{ArmProbability, Decision, DecisionEngine};
pub use sampler::{choose, choose_index};
