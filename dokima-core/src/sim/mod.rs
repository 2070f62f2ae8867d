//! Simulation harness
//!
//! Executes one test case at a time against an [`AgentRunner`] inside a
//! mocked environment: injected context and declared tool mocks flow into
//! the invocation, latency is measured wall-clock, and failures or
//! timeouts become data on the output instead of propagating.

mod agent;
mod simulator;

pub use agent::{AgentOutput, AgentRunner};
pub use simulator::Simulator;
