//! Extraction phase: four independent agents fan out against the
//! resilient client and join.
//!
//! An agent's fatal error (or panic) is caught at the join barrier,
//! logged, and recorded as absent artifacts; sibling tasks are never
//! cancelled. Missing artifacts do not block phase completion: the
//! review gate inspects content and is the place where poor extractions
//! get rejected.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use bidpilot_core::domain::extraction::{
    CommercialTerms, ComplianceProfile, ExecutiveSummary, TechnicalExtraction,
};
use bidpilot_inference::{DocumentPayload, InferenceRequest, ResilientClient, StructuredInference};

use crate::error::PipelineError;
use crate::prompts;
use crate::report;
use crate::run::{
    write_json, write_markdown, RunContext, BOM_JSON, COMMERCIAL_JSON, COMMERCIAL_MD,
    COMPLIANCE_MD, CONSTRAINTS_JSON, SUMMARY_JSON, SUMMARY_MD,
};

/// Uniform pre-call delay window. Concurrent extraction tasks each draw
/// an independent delay so their first attempts do not burst against the
/// shared credential pool at the same instant.
#[derive(Clone, Copy, Debug)]
pub struct JitterWindow {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl JitterWindow {
    pub fn none() -> Self {
        Self { min_secs: 0, max_secs: 0 }
    }

    fn draw(&self) -> Duration {
        if self.max_secs == 0 {
            return Duration::ZERO;
        }
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs(secs)
    }
}

/// Everything one extraction task needs; cloned per spawned task so the
/// run context itself never crosses into the fan-out.
#[derive(Clone)]
struct ExtractionJob {
    document: DocumentPayload,
    run_dir: PathBuf,
    feedback: Option<String>,
    jitter: JitterWindow,
}

/// Run all four extraction agents concurrently and join. Never fails the
/// phase: per-task errors become absent artifacts and consolidation only
/// warns about what is missing.
pub async fn run_extraction<P>(
    client: &Arc<ResilientClient<P>>,
    ctx: &mut RunContext,
    jitter: JitterWindow,
) where
    P: StructuredInference + 'static,
{
    let job = ExtractionJob {
        document: ctx.document.clone(),
        run_dir: ctx.run_dir.clone(),
        feedback: ctx.feedback.clone(),
        jitter,
    };

    let technical = tokio::spawn(technical_agent(Arc::clone(client), job.clone()));
    let commercial = tokio::spawn(commercial_agent(Arc::clone(client), job.clone()));
    let compliance = tokio::spawn(compliance_agent(Arc::clone(client), job.clone()));
    let summary = tokio::spawn(summary_agent(Arc::clone(client), job));

    let (technical, commercial, compliance, summary) =
        tokio::join!(technical, commercial, compliance, summary);

    if let Some((bom, constraints)) = settle("technical", technical) {
        ctx.artifacts.bom = Some(bom);
        ctx.artifacts.constraints = Some(constraints);
    }
    if let Some((json, md)) = settle("commercial", commercial) {
        ctx.artifacts.commercial_json = Some(json);
        ctx.artifacts.commercial_md = Some(md);
    }
    if let Some(md) = settle("compliance", compliance) {
        ctx.artifacts.compliance_md = Some(md);
    }
    if let Some((md, json)) = settle("summary", summary) {
        ctx.artifacts.summary_md = Some(md);
        ctx.artifacts.summary_json = Some(json);
    }

    consolidate(ctx);
}

/// Collapse a task's join/extraction outcome, logging instead of
/// propagating so sibling results still land.
fn settle<T>(
    agent: &'static str,
    outcome: Result<Result<T, PipelineError>, tokio::task::JoinError>,
) -> Option<T> {
    match outcome {
        Ok(Ok(value)) => Some(value),
        Ok(Err(error)) => {
            warn!(event_name = "extraction.task_failed", agent, %error, "extraction task failed");
            None
        }
        Err(join_error) => {
            warn!(
                event_name = "extraction.task_panicked",
                agent,
                error = %join_error,
                "extraction task aborted"
            );
            None
        }
    }
}

fn consolidate(ctx: &RunContext) {
    let required = [
        (BOM_JSON, ctx.artifacts.bom.is_some()),
        (CONSTRAINTS_JSON, ctx.artifacts.constraints.is_some()),
        (COMMERCIAL_JSON, ctx.artifacts.commercial_json.is_some()),
        (COMPLIANCE_MD, ctx.artifacts.compliance_md.is_some()),
        (SUMMARY_MD, ctx.artifacts.summary_md.is_some()),
    ];
    let missing: Vec<&str> =
        required.iter().filter(|(_, present)| !present).map(|(name, _)| *name).collect();

    if missing.is_empty() {
        info!(event_name = "extraction.consolidated", "all extraction artifacts present");
    } else {
        warn!(
            event_name = "extraction.artifacts_missing",
            missing = ?missing,
            "extraction completed with missing artifacts; deferring to review"
        );
    }
}

fn request(role: &str, task: &str, job: &ExtractionJob) -> InferenceRequest {
    InferenceRequest {
        role: role.to_string(),
        instruction: prompts::with_feedback(task, job.feedback.as_deref()),
        document: Some(job.document.clone()),
    }
}

async fn technical_agent<P: StructuredInference>(
    client: Arc<ResilientClient<P>>,
    job: ExtractionJob,
) -> Result<(PathBuf, PathBuf), PipelineError> {
    tokio::time::sleep(job.jitter.draw()).await;

    let extraction: TechnicalExtraction = client
        .invoke_structured(&request(prompts::ROLE_TECHNICAL, prompts::TECHNICAL_TASK, &job))
        .await?;

    let bom_path = job.run_dir.join(BOM_JSON);
    let constraints_path = job.run_dir.join(CONSTRAINTS_JSON);
    write_json(&bom_path, &extraction.bill_of_materials).await?;
    write_json(&constraints_path, &extraction.technical_constraints).await?;

    info!(
        event_name = "extraction.technical_done",
        items = extraction.bill_of_materials.len(),
        "bill of materials extracted"
    );
    Ok((bom_path, constraints_path))
}

async fn commercial_agent<P: StructuredInference>(
    client: Arc<ResilientClient<P>>,
    job: ExtractionJob,
) -> Result<(PathBuf, PathBuf), PipelineError> {
    tokio::time::sleep(job.jitter.draw()).await;

    let terms: CommercialTerms = client
        .invoke_structured(&request(prompts::ROLE_COMMERCIAL, prompts::COMMERCIAL_TASK, &job))
        .await?;

    let json_path = job.run_dir.join(COMMERCIAL_JSON);
    let md_path = job.run_dir.join(COMMERCIAL_MD);
    write_json(&json_path, &terms).await?;
    write_markdown(&md_path, &report::commercial_terms_md(&terms)).await?;

    info!(event_name = "extraction.commercial_done", "commercial terms extracted");
    Ok((json_path, md_path))
}

async fn compliance_agent<P: StructuredInference>(
    client: Arc<ResilientClient<P>>,
    job: ExtractionJob,
) -> Result<PathBuf, PipelineError> {
    tokio::time::sleep(job.jitter.draw()).await;

    let profile: ComplianceProfile = client
        .invoke_structured(&request(prompts::ROLE_COMPLIANCE, prompts::COMPLIANCE_TASK, &job))
        .await?;

    let md_path = job.run_dir.join(COMPLIANCE_MD);
    write_markdown(&md_path, &report::compliance_md(&profile)).await?;

    info!(event_name = "extraction.compliance_done", "compliance checklist extracted");
    Ok(md_path)
}

async fn summary_agent<P: StructuredInference>(
    client: Arc<ResilientClient<P>>,
    job: ExtractionJob,
) -> Result<(PathBuf, PathBuf), PipelineError> {
    tokio::time::sleep(job.jitter.draw()).await;

    let summary: ExecutiveSummary = client
        .invoke_structured(&request(prompts::ROLE_SUMMARY, prompts::SUMMARY_TASK, &job))
        .await?;

    let md_path = job.run_dir.join(SUMMARY_MD);
    let json_path = job.run_dir.join(SUMMARY_JSON);
    write_markdown(&md_path, &report::executive_summary_md(&summary)).await?;
    write_json(&json_path, &summary).await?;

    info!(event_name = "extraction.summary_done", "executive summary extracted");
    Ok((md_path, json_path))
}
