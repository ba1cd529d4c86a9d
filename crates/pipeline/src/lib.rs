//! Run pipeline: extraction fan-out, SKU matching, pricing, and the
//! review-gated phase orchestrator.
//!
//! The pipeline is a fixed sequence (Extraction → Matching → Pricing)
//! where each phase writes its artifacts into the run directory, is
//! assessed by the external review capability, and either loops back with
//! feedback or advances. All inference traffic goes through the
//! resilient client from `bidpilot-inference`; all numeric work happens
//! in `bidpilot-core`.

pub mod error;
pub mod export;
pub mod extract;
pub mod matching;
pub mod orchestrator;
pub mod pricing;
pub mod prompts;
pub mod report;
pub mod review;
pub mod run;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::PipelineError;
pub use extract::JitterWindow;
pub use orchestrator::{Orchestrator, PipelineSettings};
pub use run::{ArtifactPaths, RunContext};
