//! Role-routing inference double shared by pipeline tests.
//!
//! Extraction fans out concurrently, so a single sequential script would
//! make test outcomes depend on task scheduling. Routing by the request
//! role keeps every agent's responses deterministic.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;

use bidpilot_inference::{InferenceError, InferenceRequest, StructuredInference};

#[derive(Debug)]
pub struct RecordedCall {
    pub role: String,
    pub instruction: String,
}

#[derive(Default)]
pub struct RoutedInference {
    scripts: Mutex<HashMap<String, VecDeque<Result<Value, InferenceError>>>>,
    fallbacks: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RoutedInference {
    /// Fixed response returned for every call with this role, once any
    /// scripted outcomes for the role are used up.
    pub fn with_fallback(self, role: &str, value: Value) -> Self {
        self.fallbacks
            .lock()
            .expect("fallbacks lock")
            .insert(role.to_string(), value);
        self
    }

    /// Ordered outcomes consumed one per call for this role.
    pub fn with_script(
        self,
        role: &str,
        outcomes: Vec<Result<Value, InferenceError>>,
    ) -> Self {
        self.scripts
            .lock()
            .expect("scripts lock")
            .insert(role.to_string(), outcomes.into());
        self
    }

    pub fn calls_for(&self, role: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|call| call.role == role)
            .count()
    }

    pub fn instructions(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .map(|call| call.instruction.clone())
            .collect()
    }

    pub fn instructions_for(&self, role: &str) -> Vec<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|call| call.role == role)
            .map(|call| call.instruction.clone())
            .collect()
    }
}

#[async_trait]
impl StructuredInference for RoutedInference {
    async fn generate(
        &self,
        request: &InferenceRequest,
        _credential: SecretString,
    ) -> Result<Value, InferenceError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            role: request.role.clone(),
            instruction: request.instruction.clone(),
        });

        if let Some(queue) = self
            .scripts
            .lock()
            .expect("scripts lock")
            .get_mut(&request.role)
        {
            if let Some(outcome) = queue.pop_front() {
                return outcome;
            }
        }
        if let Some(value) = self.fallbacks.lock().expect("fallbacks lock").get(&request.role) {
            return Ok(value.clone());
        }
        Err(InferenceError::Fatal(format!("no scripted route for role: {}", request.role)))
    }
}

/// Canned responses matching the schemas each agent expects back.
pub mod payloads {
    use serde_json::{json, Value};

    pub fn technical() -> Value {
        json!({
            "bill_of_materials": [
                {
                    "item_no": "1",
                    "description": "Cable, armoured, 11kV XLPE 3C x 300 sqmm",
                    "quantity": 4,
                    "unit": "km"
                },
                {
                    "item_no": "2",
                    "description": "Cable termination kit, outdoor, 11kV",
                    "quantity": 8,
                    "unit": "nos"
                }
            ],
            "technical_constraints": {
                "applicable_standards": ["IS 7098"],
                "specifications": [],
                "testing_requirements": ["High voltage test on armoured cable drum"],
                "inspection_requirements": []
            }
        })
    }

    pub fn commercial(taxes_and_duties: &str) -> Value {
        json!({
            "currency": "INR",
            "incoterms": "FOR Destination",
            "unloading_responsibility": "Vendor",
            "insurance_responsibility": "Vendor",
            "payment_terms": "100% within 30 days of acceptance",
            "delivery_period_weeks": 12,
            "taxes_and_duties": taxes_and_duties,
            "warranty_terms": "18 months from supply"
        })
    }

    pub fn compliance() -> Value {
        json!({
            "vendor_class_requirement": "Class I local supplier",
            "local_content_percent_req": 50,
            "required_documents": ["GST registration", "PAN"],
            "blacklisting_declaration": true
        })
    }

    pub fn summary() -> Value {
        json!({
            "client_name": "Metro Power Distribution Ltd",
            "tender_reference": "MPDL/2026/CBL/014",
            "bid_submission_mode": "Online (e-procurement portal)",
            "critical_dates": {
                "submission_deadline": "2026-09-30",
                "opening_date": "2026-10-01"
            },
            "scope_of_work_summary": "Supply of 11kV armoured cable and termination kits.",
            "estimated_contract_value": "INR 1.2 Cr",
            "key_risks_and_flags": ["Liquidated damages at 0.5% per week"]
        })
    }

    pub fn matches() -> Value {
        json!({
            "recommendations": [
                {
                    "item_no": "1",
                    "rfp_description": "Cable, armoured, 11kV XLPE 3C x 300 sqmm",
                    "top_candidates": [
                        {
                            "sku": "CAB-11KV-300",
                            "description": "11kV XLPE armoured cable 3C x 300 sqmm",
                            "spec_match_percent": 95,
                            "missing_specs": [],
                            "justification": "Conductor size and voltage class match."
                        }
                    ],
                    "selected_sku": "CAB-11KV-300",
                    "selection_reason": "Full specification match."
                },
                {
                    "item_no": "2",
                    "rfp_description": "Cable termination kit, outdoor, 11kV",
                    "top_candidates": [],
                    "selected_sku": "NO_MATCH",
                    "selection_reason": "No termination kits in catalog."
                }
            ]
        })
    }

    pub fn strategy() -> Value {
        json!({
            "risk_assessment": "Low technical risk; penalty exposure on delivery.",
            "global_margin_percent": 10,
            "transport_overhead_percent": 2,
            "split_award_strategy": "Bid all items",
            "item_strategies": [],
            "strategic_rationale": "Competitive framework tender."
        })
    }

    pub fn review(approved: bool, critique: &str) -> Value {
        json!({
            "is_approved": approved,
            "critique": critique,
            "suggestions": []
        })
    }
}
