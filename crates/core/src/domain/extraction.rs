//! Typed payloads produced by the extraction phase.
//!
//! These are the schemas the structured-inference capability is asked to
//! fill in. Every field set mirrors what downstream phases actually read;
//! anything else the document contains is deliberately dropped here.

use serde::{Deserialize, Serialize};

use crate::domain::bom::BomItem;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalDates {
    #[serde(default)]
    pub submission_deadline: Option<String>,
    #[serde(default)]
    pub opening_date: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub client_name: String,
    pub tender_reference: String,
    pub bid_submission_mode: String,
    #[serde(default)]
    pub critical_dates: CriticalDates,
    pub scope_of_work_summary: String,
    #[serde(default)]
    pub estimated_contract_value: Option<String>,
    #[serde(default)]
    pub key_risks_and_flags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpecificationItem {
    pub component: String,
    pub parameter: String,
    pub value: String,
    #[serde(default)]
    pub tolerance: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InspectionRequirement {
    pub inspection_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub agency: Option<String>,
    #[serde(default)]
    pub expense_bearer: Option<String>,
}

/// Technical constraints drive both SKU matching and the service/test
/// cost leg of pricing (`testing_requirements`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalConstraints {
    #[serde(default)]
    pub applicable_standards: Vec<String>,
    #[serde(default)]
    pub specifications: Vec<SpecificationItem>,
    #[serde(default)]
    pub testing_requirements: Vec<String>,
    #[serde(default)]
    pub inspection_requirements: Vec<InspectionRequirement>,
}

/// The technical agent extracts the BOM and constraints in one pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechnicalExtraction {
    pub bill_of_materials: Vec<BomItem>,
    #[serde(default)]
    pub technical_constraints: TechnicalConstraints,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidatedDamages {
    pub rate_per_week: String,
    pub max_cap: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialInstruments {
    #[serde(default)]
    pub performance_bank_guarantee: Option<String>,
    #[serde(default)]
    pub security_deposit: Option<String>,
    #[serde(default)]
    pub emd_amount: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommercialTerms {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub incoterms: String,
    pub unloading_responsibility: String,
    #[serde(default)]
    pub packing_requirements: Option<String>,
    #[serde(default = "default_insurance")]
    pub insurance_responsibility: String,
    pub payment_terms: String,
    #[serde(default)]
    pub delivery_period_weeks: Option<u32>,
    /// Free text; the pricing engine only scans it for the word
    /// "inclusive" to pick the tax rate.
    pub taxes_and_duties: String,
    #[serde(default)]
    pub warranty_terms: Option<String>,
    #[serde(default)]
    pub liquidated_damages: Option<LiquidatedDamages>,
    #[serde(default)]
    pub financial_instruments: Option<FinancialInstruments>,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_insurance() -> String {
    "Vendor".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceCriterion {
    pub description: String,
    #[serde(default)]
    pub min_value: Option<rust_decimal::Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComplianceProfile {
    pub vendor_class_requirement: String,
    #[serde(default)]
    pub local_content_percent_req: Option<rust_decimal::Decimal>,
    #[serde(default)]
    pub turnover_requirement_avg_3yrs: Option<String>,
    #[serde(default)]
    pub past_experience_requirement: Option<String>,
    #[serde(default)]
    pub specific_experience_criteria: Vec<ExperienceCriterion>,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub blacklisting_declaration: bool,
}
