//! Per-run state and the on-disk artifact layout.
//!
//! Artifact file names are a stable contract: downstream phases and the
//! review gate locate inputs by these names, and operators eyeball the
//! run directory in the same order the pipeline produced them.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use bidpilot_core::phase::Phase;
use bidpilot_inference::DocumentPayload;

use crate::error::PipelineError;

pub const SUMMARY_MD: &str = "01_executive_summary.md";
pub const SUMMARY_JSON: &str = "01_executive_summary.json";
pub const BOM_JSON: &str = "02_bill_of_materials.json";
pub const CONSTRAINTS_JSON: &str = "03_technical_constraints.json";
pub const COMMERCIAL_JSON: &str = "04_commercial_terms.json";
pub const COMMERCIAL_MD: &str = "04_commercial_terms.md";
pub const COMPLIANCE_MD: &str = "05_compliance_checklist.md";
pub const MATCHED_SKUS_JSON: &str = "06_matched_skus.json";
pub const PRICING_STRATEGY_JSON: &str = "07_pricing_strategy.json";
pub const FINAL_BID_JSON: &str = "07_final_bid.json";
pub const PRICE_BID_CSV: &str = "Annexure_VI_Price_Bid.csv";

/// Paths of artifacts produced so far; each is `None` until its phase
/// (or extraction task) has written it.
#[derive(Clone, Debug, Default)]
pub struct ArtifactPaths {
    pub summary_md: Option<PathBuf>,
    pub summary_json: Option<PathBuf>,
    pub bom: Option<PathBuf>,
    pub constraints: Option<PathBuf>,
    pub commercial_json: Option<PathBuf>,
    pub commercial_md: Option<PathBuf>,
    pub compliance_md: Option<PathBuf>,
    pub matched_skus: Option<PathBuf>,
    pub pricing_strategy: Option<PathBuf>,
    pub final_bid: Option<PathBuf>,
    pub price_bid_csv: Option<PathBuf>,
}

/// One pipeline execution. Owned exclusively by the orchestrator;
/// mutated only by phase completions and review outcomes. Discarded at
/// process exit; a failed run is not resumable.
#[derive(Debug)]
pub struct RunContext {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub rfp_path: PathBuf,
    pub document: DocumentPayload,
    pub phase: Phase,
    pub feedback: Option<String>,
    pub retry_count: u32,
    pub started_at: DateTime<Utc>,
    pub artifacts: ArtifactPaths,
}

impl RunContext {
    /// Read the procurement document and create a fresh run directory
    /// under `runs_dir`.
    pub async fn create(runs_dir: &Path, rfp_path: &Path) -> Result<Self, PipelineError> {
        let bytes = tokio::fs::read(rfp_path).await.map_err(|source| {
            PipelineError::ReadDocument { path: rfp_path.to_path_buf(), source }
        })?;

        let run_id = Uuid::new_v4().to_string()[..8].to_string();
        let run_dir = runs_dir.join(&run_id);
        tokio::fs::create_dir_all(&run_dir)
            .await
            .map_err(|source| PipelineError::CreateRunDir { path: run_dir.clone(), source })?;

        info!(
            event_name = "run.created",
            run_id = %run_id,
            run_dir = %run_dir.display(),
            "run directory ready"
        );

        Ok(Self {
            run_id,
            run_dir,
            rfp_path: rfp_path.to_path_buf(),
            document: DocumentPayload::pdf(bytes),
            phase: Phase::Extraction,
            feedback: None,
            retry_count: 0,
            started_at: Utc::now(),
            artifacts: ArtifactPaths::default(),
        })
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.run_dir.join(name)
    }

    /// Path of a required upstream artifact, or the diagnostic the run
    /// aborts with.
    pub fn require(
        &self,
        phase: Phase,
        artifact: &Option<PathBuf>,
        name: &str,
    ) -> Result<PathBuf, PipelineError> {
        artifact
            .clone()
            .ok_or_else(|| PipelineError::MissingInput { phase, artifact: name.to_string() })
    }
}

pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|source| PipelineError::EncodeArtifact { path: path.to_path_buf(), source })?;
    tokio::fs::write(path, content)
        .await
        .map_err(|source| PipelineError::WriteArtifact { path: path.to_path_buf(), source })
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| PipelineError::ReadArtifact { path: path.to_path_buf(), source })?;
    serde_json::from_str(&content)
        .map_err(|source| PipelineError::DecodeArtifact { path: path.to_path_buf(), source })
}

pub async fn write_markdown(path: &Path, content: &str) -> Result<(), PipelineError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| PipelineError::WriteArtifact { path: path.to_path_buf(), source })
}
