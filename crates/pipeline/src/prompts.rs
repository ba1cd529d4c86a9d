//! Role descriptors and task instructions sent to the inference
//! capability. The wording here is an external contract with the model,
//! not program logic; the pipeline only cares that each task names the
//! schema it expects back.

use bidpilot_core::phase::Phase;

pub const ROLE_TECHNICAL: &str =
    "You are a senior tender analyst specializing in technical requirements of procurement documents.";
pub const ROLE_COMMERCIAL: &str =
    "You are a commercial manager extracting payment, logistics, and tax terms from tenders.";
pub const ROLE_COMPLIANCE: &str =
    "You are a compliance officer extracting vendor eligibility criteria from tenders.";
pub const ROLE_SUMMARY: &str =
    "You are a bid manager writing concise executive briefs of procurement documents.";
pub const ROLE_SOURCING: &str =
    "You are a sourcing engineer matching tender line items against a product catalog.";
pub const ROLE_PRICING: &str =
    "You are a commercial manager deciding margin and logistics strategy for a bid.";
pub const ROLE_REVIEWER: &str =
    "You are a quality supervisor auditing pipeline outputs against the source document.";

pub const TECHNICAL_TASK: &str = "Extract the complete bill of materials and all technical \
constraints from the attached document. Return JSON with `bill_of_materials` (array of items \
with item_no, description, quantity, unit, optional category/delivery_location/requested_make, \
requires_local_content_declaration) and `technical_constraints` (applicable_standards, \
specifications, testing_requirements, inspection_requirements).";

pub const COMMERCIAL_TASK: &str = "Extract the commercial and logistics terms from the attached \
document. Return JSON with currency, incoterms, unloading_responsibility, packing_requirements, \
insurance_responsibility, payment_terms, delivery_period_weeks, taxes_and_duties, \
warranty_terms, liquidated_damages, financial_instruments.";

pub const COMPLIANCE_TASK: &str = "Extract vendor eligibility and compliance criteria from the \
attached document. Return JSON with vendor_class_requirement, local_content_percent_req, \
turnover_requirement_avg_3yrs, past_experience_requirement, specific_experience_criteria, \
required_documents, blacklisting_declaration.";

pub const SUMMARY_TASK: &str = "Write an executive summary of the attached document. Return JSON \
with client_name, tender_reference, bid_submission_mode, critical_dates \
(submission_deadline, opening_date), scope_of_work_summary, estimated_contract_value, \
key_risks_and_flags.";

/// Matching instruction: BOM, constraints, and the raw catalog rows go
/// into the prompt; the matcher must answer with ranked candidates.
pub fn matching_instruction(bom_json: &str, constraints_json: &str, catalog_content: &str) -> String {
    format!(
        "Match every bill-of-materials item to the best catalog SKUs.\n\n\
         BOM items:\n{bom_json}\n\nTechnical constraints:\n{constraints_json}\n\n\
         Product catalog (CSV):\n{catalog_content}\n\n\
         Return JSON with `recommendations`: one entry per BOM item carrying item_no, \
         rfp_description, top_candidates (up to 3, each with sku, description, \
         spec_match_percent, missing_specs, justification), selected_sku (use \"NO_MATCH\" \
         when nothing qualifies), and selection_reason."
    )
}

pub fn pricing_instruction(summary_json: &str, commercial_json: &str) -> String {
    format!(
        "Develop the pricing strategy for this bid.\n\nExecutive summary:\n{summary_json}\n\n\
         Commercial terms:\n{commercial_json}\n\n\
         Return JSON with risk_assessment, global_margin_percent, transport_overhead_percent, \
         split_award_strategy, item_strategies (item_no, margin_percent, rationale), \
         strategic_rationale."
    )
}

pub fn review_instruction(phase: Phase, data: &str) -> String {
    let criteria = match phase {
        Phase::Extraction => {
            "Check the extracted data against the attached document: every line item captured, \
             quantities and units correct, commercial terms consistent with the tender text."
        }
        Phase::Matching => {
            "Check the SKU recommendations: selected SKUs must satisfy the stated specifications, \
             NO_MATCH only where the catalog truly has no fit, justifications grounded in specs."
        }
        Phase::Pricing => {
            "Check the pricing strategy: margins consistent with the stated risks, transport \
             overhead plausible, per-item overrides justified."
        }
    };
    format!(
        "{criteria}\n\nData under review:\n{data}\n\n\
         Return JSON with is_approved (boolean), critique, and suggestions."
    )
}

/// Appends the reviewer's critique so a retried agent can steer its next
/// attempt.
pub fn with_feedback(instruction: &str, feedback: Option<&str>) -> String {
    match feedback {
        Some(critique) => format!(
            "{instruction}\n\nIMPORTANT REVISION INSTRUCTION:\nThe previous attempt failed \
             quality review.\nFeedback: {critique}\nFix these issues in your new output."
        ),
        None => instruction.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::with_feedback;

    #[test]
    fn feedback_is_appended_only_when_present() {
        assert_eq!(with_feedback("do the task", None), "do the task");
        let revised = with_feedback("do the task", Some("quantities were wrong"));
        assert!(revised.starts_with("do the task"));
        assert!(revised.contains("quantities were wrong"));
    }
}
