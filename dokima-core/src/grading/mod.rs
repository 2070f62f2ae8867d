//! Pluggable grading
//!
//! A grader consumes a case, its expectations and the simulation output
//! and produces a named, bounded [`Score`](crate::model::Score). Two
//! families share one capability interface:
//! - Deterministic graders (latency, schema, forbidden content): pure,
//!   synchronous, always terminate.
//! - Judge-based graders (reasoning alignment, faithfulness, tone):
//!   asynchronous, delegate to an [`LLMJudge`] and parse a structured
//!   verdict out of its free-text reply. A verdict that does not parse is
//!   a [`GradingError`], surfaced separately from a failing score.

mod faithfulness;
mod forbidden;
mod grader;
mod judge;
mod latency;
mod prompts;
mod reasoning;
mod registry;
mod schema;
mod tone;
mod verdict;

pub use faithfulness::FaithfulnessGrader;
pub use forbidden::ForbiddenContentGrader;
pub use grader::{Grader, GradingError};
pub use judge::LLMJudge;
pub use latency::LatencyGrader;
pub use reasoning::ReasoningGrader;
pub use registry::GraderRegistry;
pub use schema::SchemaGrader;
pub use tone::ToneGrader;
