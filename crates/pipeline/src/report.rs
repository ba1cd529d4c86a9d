//! Human-readable markdown renderings of extraction artifacts. These sit
//! next to the JSON files for operators; nothing downstream parses them.

use bidpilot_core::domain::extraction::{CommercialTerms, ComplianceProfile, ExecutiveSummary};

pub fn executive_summary_md(summary: &ExecutiveSummary) -> String {
    let mut out = String::new();
    out.push_str("# Executive Summary\n\n");
    out.push_str(&format!("- **Client:** {}\n", summary.client_name));
    out.push_str(&format!("- **Tender reference:** {}\n", summary.tender_reference));
    out.push_str(&format!("- **Submission mode:** {}\n", summary.bid_submission_mode));
    if let Some(deadline) = &summary.critical_dates.submission_deadline {
        out.push_str(&format!("- **Submission deadline:** {deadline}\n"));
    }
    if let Some(opening) = &summary.critical_dates.opening_date {
        out.push_str(&format!("- **Opening date:** {opening}\n"));
    }
    if let Some(value) = &summary.estimated_contract_value {
        out.push_str(&format!("- **Estimated value:** {value}\n"));
    }
    out.push_str(&format!("\n## Scope\n\n{}\n", summary.scope_of_work_summary));
    if !summary.key_risks_and_flags.is_empty() {
        out.push_str("\n## Risks and flags\n\n");
        for risk in &summary.key_risks_and_flags {
            out.push_str(&format!("- {risk}\n"));
        }
    }
    out
}

pub fn commercial_terms_md(terms: &CommercialTerms) -> String {
    let mut out = String::new();
    out.push_str("# Commercial & Logistics Terms\n\n");
    out.push_str(&format!("- **Currency:** {}\n", terms.currency));
    out.push_str(&format!("- **Incoterms:** {}\n", terms.incoterms));
    out.push_str(&format!("- **Payment terms:** {}\n", terms.payment_terms));
    if let Some(weeks) = terms.delivery_period_weeks {
        out.push_str(&format!("- **Delivery period:** {weeks} weeks\n"));
    }
    out.push_str(&format!("- **Taxes and duties:** {}\n", terms.taxes_and_duties));
    out.push_str(&format!("- **Unloading:** {}\n", terms.unloading_responsibility));
    out.push_str(&format!("- **Insurance:** {}\n", terms.insurance_responsibility));
    if let Some(warranty) = &terms.warranty_terms {
        out.push_str(&format!("- **Warranty:** {warranty}\n"));
    }
    if let Some(packing) = &terms.packing_requirements {
        out.push_str(&format!("- **Packing:** {packing}\n"));
    }
    if let Some(ld) = &terms.liquidated_damages {
        out.push_str(&format!(
            "- **Liquidated damages:** {} (cap {})\n",
            ld.rate_per_week, ld.max_cap
        ));
    }
    if let Some(instruments) = &terms.financial_instruments {
        if let Some(pbg) = &instruments.performance_bank_guarantee {
            out.push_str(&format!("- **PBG:** {pbg}\n"));
        }
        if let Some(deposit) = &instruments.security_deposit {
            out.push_str(&format!("- **Security deposit:** {deposit}\n"));
        }
        if let Some(emd) = &instruments.emd_amount {
            out.push_str(&format!("- **EMD:** {emd}\n"));
        }
    }
    out
}

pub fn compliance_md(profile: &ComplianceProfile) -> String {
    let mut out = String::new();
    out.push_str("# Compliance & Eligibility Checklist\n\n");
    out.push_str(&format!("- **Vendor class:** {}\n", profile.vendor_class_requirement));
    if let Some(percent) = profile.local_content_percent_req {
        out.push_str(&format!("- **Minimum local content:** {percent}%\n"));
    }
    if let Some(turnover) = &profile.turnover_requirement_avg_3yrs {
        out.push_str(&format!("- **Turnover requirement:** {turnover}\n"));
    }
    if let Some(experience) = &profile.past_experience_requirement {
        out.push_str(&format!("- **Past experience:** {experience}\n"));
    }
    if !profile.specific_experience_criteria.is_empty() {
        out.push_str("\n## Experience criteria\n\n");
        for criterion in &profile.specific_experience_criteria {
            match criterion.min_value {
                Some(value) => out.push_str(&format!(
                    "- {} (min {} {})\n",
                    criterion.description, value, criterion.currency
                )),
                None => out.push_str(&format!("- {}\n", criterion.description)),
            }
        }
    }
    if !profile.required_documents.is_empty() {
        out.push_str("\n## Required documents\n\n");
        for document in &profile.required_documents {
            out.push_str(&format!("- {document}\n"));
        }
    }
    if profile.blacklisting_declaration {
        out.push_str("\n- Self-declaration regarding blacklisting is required.\n");
    }
    out
}
