//! Pricing phase: strategy inference, deterministic computation, and the
//! customer-facing price bid export.
//!
//! Only the strategy leg talks to the inference capability, and it fails
//! soft: conservative defaults price the bid when strategy inference
//! errors out. Everything after that point is pure computation in
//! `bidpilot-core` plus artifact writes.

use std::path::Path;

use tracing::{info, warn};

use bidpilot_core::catalog::{MaterialCatalog, ServiceCatalog};
use bidpilot_core::domain::bid::PricedBid;
use bidpilot_core::domain::bom::BomItem;
use bidpilot_core::domain::extraction::{CommercialTerms, TechnicalConstraints};
use bidpilot_core::domain::matching::MatchOutput;
use bidpilot_core::domain::strategy::PricingStrategy;
use bidpilot_core::phase::Phase;
use bidpilot_core::pricing::{compute_bid, PricingInputs};
use bidpilot_inference::{InferenceRequest, ResilientClient, StructuredInference};

use crate::error::PipelineError;
use crate::export::write_price_bid_csv;
use crate::prompts;
use crate::run::{
    read_json, write_json, RunContext, COMMERCIAL_JSON, FINAL_BID_JSON, MATCHED_SKUS_JSON,
    PRICE_BID_CSV, PRICING_STRATEGY_JSON,
};

pub async fn run_pricing<P: StructuredInference>(
    client: &ResilientClient<P>,
    ctx: &mut RunContext,
    material_catalog_path: &Path,
    service_catalog_path: Option<&Path>,
) -> Result<(), PipelineError> {
    let matches_path =
        ctx.require(Phase::Pricing, &ctx.artifacts.matched_skus, MATCHED_SKUS_JSON)?;
    let commercial_path =
        ctx.require(Phase::Pricing, &ctx.artifacts.commercial_json, COMMERCIAL_JSON)?;

    let matches: MatchOutput = read_json(&matches_path).await?;
    let commercial: CommercialTerms = read_json(&commercial_path).await?;

    // Absent optional inputs degrade to neutral values rather than
    // aborting a run that already survived review.
    let bom: Vec<BomItem> = match &ctx.artifacts.bom {
        Some(path) => read_json(path).await.unwrap_or_default(),
        None => Vec::new(),
    };
    let constraints: TechnicalConstraints = match &ctx.artifacts.constraints {
        Some(path) => read_json(path).await.unwrap_or_default(),
        None => TechnicalConstraints::default(),
    };
    let summary_json = match &ctx.artifacts.summary_json {
        Some(path) => tokio::fs::read_to_string(path).await.unwrap_or_else(|_| "{}".to_string()),
        None => "{}".to_string(),
    };

    let commercial_json = serde_json::to_string_pretty(&commercial)
        .map_err(|source| PipelineError::EncodeArtifact { path: commercial_path.clone(), source })?;

    let strategy = infer_strategy(client, ctx, &summary_json, &commercial_json).await;

    let materials = MaterialCatalog::load(material_catalog_path)?;
    let services = load_service_catalog(service_catalog_path);

    let bid = compute_bid(PricingInputs {
        matches: &matches.recommendations,
        strategy: &strategy,
        materials: &materials,
        services: &services,
        required_tests: &constraints.testing_requirements,
        bom: &bom,
        tax_terms: &commercial.taxes_and_duties,
    });

    write_artifacts(ctx, &strategy, &bid).await?;

    info!(
        event_name = "pricing.done",
        lines = bid.lines.len(),
        grand_total = %bid.grand_total,
        "bid priced"
    );
    Ok(())
}

/// Strategy inference with the conservative fallback applied on any
/// failure, including exhausted retries.
async fn infer_strategy<P: StructuredInference>(
    client: &ResilientClient<P>,
    ctx: &RunContext,
    summary_json: &str,
    commercial_json: &str,
) -> PricingStrategy {
    let request = InferenceRequest {
        role: prompts::ROLE_PRICING.to_string(),
        instruction: prompts::with_feedback(
            &prompts::pricing_instruction(summary_json, commercial_json),
            ctx.feedback.as_deref(),
        ),
        document: None,
    };

    match client.invoke_structured(&request).await {
        Ok(strategy) => strategy,
        Err(error) => {
            warn!(
                event_name = "pricing.strategy_fallback",
                %error,
                "strategy inference failed; applying default strategy"
            );
            PricingStrategy::fallback(&error.to_string())
        }
    }
}

fn load_service_catalog(path: Option<&Path>) -> ServiceCatalog {
    let Some(path) = path else {
        return ServiceCatalog::new(Vec::new());
    };
    match ServiceCatalog::load(path) {
        Ok(catalog) => catalog,
        Err(error) => {
            warn!(
                event_name = "pricing.service_catalog_missing",
                path = %path.display(),
                %error,
                "service catalog unavailable; service costs priced at zero"
            );
            ServiceCatalog::new(Vec::new())
        }
    }
}

async fn write_artifacts(
    ctx: &mut RunContext,
    strategy: &PricingStrategy,
    bid: &PricedBid,
) -> Result<(), PipelineError> {
    let strategy_path = ctx.artifact_path(PRICING_STRATEGY_JSON);
    write_json(&strategy_path, strategy).await?;
    ctx.artifacts.pricing_strategy = Some(strategy_path);

    let bid_path = ctx.artifact_path(FINAL_BID_JSON);
    write_json(&bid_path, bid).await?;
    ctx.artifacts.final_bid = Some(bid_path);

    let csv_path = ctx.artifact_path(PRICE_BID_CSV);
    write_price_bid_csv(&csv_path, bid).await?;
    ctx.artifacts.price_bid_csv = Some(csv_path);
    Ok(())
}
