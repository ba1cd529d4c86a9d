//! Matching phase: one structured call pairing extracted BOM items with
//! catalog SKUs.
//!
//! Unlike extraction, this phase has hard inputs. A run that reaches
//! matching without a bill of materials cannot produce a bid, so missing
//! artifacts abort instead of degrading.

use std::path::Path;

use tracing::{info, warn};

use bidpilot_core::domain::bom::BomItem;
use bidpilot_core::domain::extraction::TechnicalConstraints;
use bidpilot_core::domain::matching::MatchOutput;
use bidpilot_core::phase::Phase;
use bidpilot_inference::{InferenceRequest, ResilientClient, StructuredInference};

use crate::error::PipelineError;
use crate::prompts;
use crate::run::{read_json, write_json, RunContext, BOM_JSON, CONSTRAINTS_JSON, MATCHED_SKUS_JSON};

pub async fn run_matching<P: StructuredInference>(
    client: &ResilientClient<P>,
    ctx: &mut RunContext,
    material_catalog_path: &Path,
) -> Result<(), PipelineError> {
    let bom_path = ctx.require(Phase::Matching, &ctx.artifacts.bom, BOM_JSON)?;
    let constraints_path =
        ctx.require(Phase::Matching, &ctx.artifacts.constraints, CONSTRAINTS_JSON)?;

    let bom: Vec<BomItem> = read_json(&bom_path).await?;
    let constraints: TechnicalConstraints = read_json(&constraints_path).await?;
    let catalog_content =
        tokio::fs::read_to_string(material_catalog_path).await.map_err(|source| {
            PipelineError::ReadArtifact { path: material_catalog_path.to_path_buf(), source }
        })?;

    let bom_json = serde_json::to_string_pretty(&bom)
        .map_err(|source| PipelineError::EncodeArtifact { path: bom_path.clone(), source })?;
    let constraints_json = serde_json::to_string_pretty(&constraints).map_err(|source| {
        PipelineError::EncodeArtifact { path: constraints_path.clone(), source }
    })?;

    let request = InferenceRequest {
        role: prompts::ROLE_SOURCING.to_string(),
        instruction: prompts::with_feedback(
            &prompts::matching_instruction(&bom_json, &constraints_json, &catalog_content),
            ctx.feedback.as_deref(),
        ),
        document: None,
    };

    let output: MatchOutput = client.invoke_structured(&request).await?;
    if output.recommendations.is_empty() {
        warn!(event_name = "matching.empty", "matcher returned no recommendations");
    }

    let path = ctx.artifact_path(MATCHED_SKUS_JSON);
    write_json(&path, &output).await?;
    ctx.artifacts.matched_skus = Some(path);

    let matched = output.recommendations.iter().filter(|r| r.is_matched()).count();
    info!(
        event_name = "matching.done",
        items = output.recommendations.len(),
        matched,
        "sku matching complete"
    );
    Ok(())
}
