//! Review gate: after every phase, the reviewer sees the phase's
//! artifacts next to the source document and returns a verdict.
//!
//! The gate fails open. A reviewer that cannot answer must not be able
//! to kill a run whose artifacts may be perfectly good, so any inference
//! failure here becomes an approval and the run moves on.

use serde::Deserialize;
use tracing::{info, warn};

use bidpilot_core::phase::{Phase, Verdict};
use bidpilot_inference::{InferenceRequest, ResilientClient, StructuredInference};

use crate::prompts;
use crate::run::RunContext;

#[derive(Debug, Deserialize)]
struct ReviewOutput {
    is_approved: bool,
    #[serde(default)]
    critique: String,
    #[serde(default)]
    suggestions: Vec<String>,
}

pub async fn run_review<P: StructuredInference>(
    client: &ResilientClient<P>,
    ctx: &RunContext,
) -> Verdict {
    let data = review_data(ctx).await;
    let request = InferenceRequest {
        role: prompts::ROLE_REVIEWER.to_string(),
        instruction: prompts::review_instruction(ctx.phase, &data),
        document: Some(ctx.document.clone()),
    };

    match client.invoke_structured::<ReviewOutput>(&request).await {
        Ok(output) => {
            info!(
                event_name = "review.verdict",
                phase = ctx.phase.as_str(),
                approved = output.is_approved,
                "review complete"
            );
            let mut critique = output.critique;
            if !output.suggestions.is_empty() {
                critique.push_str("\nSuggestions: ");
                critique.push_str(&output.suggestions.join("; "));
            }
            Verdict { approved: output.is_approved, critique }
        }
        Err(error) => {
            warn!(
                event_name = "review.fail_open",
                phase = ctx.phase.as_str(),
                %error,
                "review unavailable; approving by default"
            );
            Verdict::approved()
        }
    }
}

/// Artifacts the reviewer audits for the current phase, rendered as raw
/// text. A missing artifact is stated rather than hidden so the reviewer
/// can reject on incompleteness.
async fn review_data(ctx: &RunContext) -> String {
    let mut sections: Vec<(&str, Option<&std::path::PathBuf>)> = Vec::new();
    match ctx.phase {
        Phase::Extraction => {
            sections.push(("Bill of materials", ctx.artifacts.bom.as_ref()));
            sections.push(("Commercial terms", ctx.artifacts.commercial_json.as_ref()));
        }
        Phase::Matching => {
            sections.push(("SKU recommendations", ctx.artifacts.matched_skus.as_ref()));
        }
        Phase::Pricing => {
            sections.push(("Pricing strategy", ctx.artifacts.pricing_strategy.as_ref()));
        }
    }

    let mut data = String::new();
    for (label, path) in sections {
        let content = match path {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .unwrap_or_else(|_| "(artifact unreadable)".to_string()),
            None => "(artifact missing)".to_string(),
        };
        data.push_str(label);
        data.push_str(":\n");
        data.push_str(&content);
        data.push_str("\n\n");
    }
    data
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bidpilot_core::phase::Phase;
    use bidpilot_inference::{CredentialPool, InferenceError, ResilientClient, RetryPolicy};

    use crate::prompts;
    use crate::run::{write_json, RunContext, BOM_JSON, MATCHED_SKUS_JSON};
    use crate::test_support::{payloads, RoutedInference};

    use super::run_review;

    async fn context() -> (tempfile::TempDir, RunContext) {
        let base = tempfile::tempdir().expect("temp dir");
        let rfp = base.path().join("tender.pdf");
        tokio::fs::write(&rfp, b"%PDF").await.expect("write rfp");
        let ctx = RunContext::create(base.path(), &rfp).await.expect("run context");
        (base, ctx)
    }

    fn client(provider: RoutedInference) -> ResilientClient<RoutedInference> {
        let pool =
            Arc::new(CredentialPool::new(vec!["test-key".to_string().into()]).expect("pool"));
        ResilientClient::new(provider, pool, RetryPolicy::immediate(1))
    }

    #[tokio::test]
    async fn rejection_carries_critique_and_suggestions() {
        let (_base, ctx) = context().await;
        let client = client(RoutedInference::default().with_script(
            prompts::ROLE_REVIEWER,
            vec![Ok(serde_json::json!({
                "is_approved": false,
                "critique": "item 2 quantity is wrong",
                "suggestions": ["re-read the BOM table"]
            }))],
        ));

        let verdict = run_review(&client, &ctx).await;
        assert!(!verdict.approved);
        assert!(verdict.critique.contains("item 2 quantity is wrong"));
        assert!(verdict.critique.contains("re-read the BOM table"));
    }

    #[tokio::test]
    async fn review_failure_fails_open() {
        let (_base, ctx) = context().await;
        let client = client(RoutedInference::default().with_script(
            prompts::ROLE_REVIEWER,
            vec![Err(InferenceError::Fatal("reviewer unavailable".to_string()))],
        ));

        let verdict = run_review(&client, &ctx).await;
        assert!(verdict.approved);
    }

    #[tokio::test]
    async fn extraction_review_names_missing_artifacts() {
        let (_base, mut ctx) = context().await;
        let bom_path = ctx.artifact_path(BOM_JSON);
        write_json(&bom_path, &payloads::technical()["bill_of_materials"])
            .await
            .expect("write bom");
        ctx.artifacts.bom = Some(bom_path);
        // commercial terms never produced

        let client = client(
            RoutedInference::default()
                .with_fallback(prompts::ROLE_REVIEWER, payloads::review(true, "")),
        );
        let verdict = run_review(&client, &ctx).await;
        assert!(verdict.approved);

        let instructions = client.provider().instructions_for(prompts::ROLE_REVIEWER);
        assert!(instructions[0].contains("Cable, armoured"));
        assert!(instructions[0].contains("(artifact missing)"));
    }

    #[tokio::test]
    async fn matching_review_sees_the_recommendations() {
        let (_base, mut ctx) = context().await;
        ctx.phase = Phase::Matching;
        let matches_path = ctx.artifact_path(MATCHED_SKUS_JSON);
        write_json(&matches_path, &payloads::matches()).await.expect("write matches");
        ctx.artifacts.matched_skus = Some(matches_path);

        let client = client(
            RoutedInference::default()
                .with_fallback(prompts::ROLE_REVIEWER, payloads::review(true, "")),
        );
        let _ = run_review(&client, &ctx).await;

        let instructions = client.provider().instructions_for(prompts::ROLE_REVIEWER);
        assert!(instructions[0].contains("CAB-11KV-300"));
    }
}
