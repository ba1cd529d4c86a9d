//! Drives one run through the phase machine: execute phase, review,
//! transition, until the machine reaches its terminal state.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use bidpilot_core::phase::{Phase, PhaseMachine, Step, Transition};
use bidpilot_inference::{ResilientClient, StructuredInference};

use crate::error::PipelineError;
use crate::extract::{run_extraction, JitterWindow};
use crate::matching::run_matching;
use crate::pricing::run_pricing;
use crate::review::run_review;
use crate::run::{RunContext, FINAL_BID_JSON};

#[derive(Clone, Debug)]
pub struct PipelineSettings {
    pub material_catalog: PathBuf,
    pub service_catalog: Option<PathBuf>,
    pub extraction_jitter: JitterWindow,
    pub max_review_retries: u32,
}

pub struct Orchestrator<P> {
    client: Arc<ResilientClient<P>>,
    settings: PipelineSettings,
    machine: PhaseMachine,
}

impl<P: StructuredInference + 'static> Orchestrator<P> {
    pub fn new(client: Arc<ResilientClient<P>>, settings: PipelineSettings) -> Self {
        let machine = PhaseMachine::new(settings.max_review_retries);
        Self { client, settings, machine }
    }

    /// Run the pipeline to completion and return the final bid artifact
    /// path. Phase errors abort the run; review rejections only loop or
    /// force progress per the retry budget.
    pub async fn run(&self, ctx: &mut RunContext) -> Result<PathBuf, PipelineError> {
        loop {
            info!(
                event_name = "phase.started",
                run_id = %ctx.run_id,
                phase = ctx.phase.as_str(),
                retry_count = ctx.retry_count,
                "entering phase"
            );

            self.execute_phase(ctx).await?;
            let verdict = run_review(self.client.as_ref(), ctx).await;

            match self.machine.decide(ctx.phase, &verdict, ctx.retry_count) {
                Transition::Retry { retry_count, feedback, .. } => {
                    info!(
                        event_name = "review.retry",
                        phase = ctx.phase.as_str(),
                        retry_count,
                        "review rejected; re-running phase with feedback"
                    );
                    ctx.retry_count = retry_count;
                    ctx.feedback = Some(feedback);
                }
                Transition::Advance { next } => {
                    if let Some(path) = self.advance(ctx, next)? {
                        return Ok(path);
                    }
                }
                Transition::ForceAdvance { next } => {
                    warn!(
                        event_name = "review.forced_advance",
                        phase = ctx.phase.as_str(),
                        retries_spent = ctx.retry_count,
                        critique = %verdict.critique,
                        "retry budget exhausted; advancing despite rejection"
                    );
                    if let Some(path) = self.advance(ctx, next)? {
                        return Ok(path);
                    }
                }
            }
        }
    }

    async fn execute_phase(&self, ctx: &mut RunContext) -> Result<(), PipelineError> {
        match ctx.phase {
            Phase::Extraction => {
                run_extraction(&self.client, ctx, self.settings.extraction_jitter).await;
                Ok(())
            }
            Phase::Matching => {
                run_matching(self.client.as_ref(), ctx, &self.settings.material_catalog).await
            }
            Phase::Pricing => {
                run_pricing(
                    self.client.as_ref(),
                    ctx,
                    &self.settings.material_catalog,
                    self.settings.service_catalog.as_deref(),
                )
                .await
            }
        }
    }

    /// Move to the next step, resetting the per-phase review state. On
    /// completion, returns the final bid path.
    fn advance(&self, ctx: &mut RunContext, next: Step) -> Result<Option<PathBuf>, PipelineError> {
        ctx.retry_count = 0;
        ctx.feedback = None;
        match next {
            Step::Phase(phase) => {
                ctx.phase = phase;
                Ok(None)
            }
            Step::Complete => {
                let path =
                    ctx.require(Phase::Pricing, &ctx.artifacts.final_bid, FINAL_BID_JSON)?;
                info!(
                    event_name = "run.completed",
                    run_id = %ctx.run_id,
                    final_bid = %path.display(),
                    "pipeline complete"
                );
                Ok(Some(path))
            }
        }
    }
}
