//! Scripted provider for tests: pops one pre-programmed outcome per call
//! and records what it was asked.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::error::InferenceError;
use crate::{InferenceRequest, StructuredInference};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub role: String,
    pub instruction: String,
    pub credential: String,
}

#[derive(Default)]
pub struct MockInference {
    script: Mutex<VecDeque<Result<Value, InferenceError>>>,
    /// Answer used once the script runs dry; `None` makes exhaustion a
    /// fatal error.
    fallback: Option<Value>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockInference {
    pub fn new(outcomes: Vec<Result<Value, InferenceError>>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Provider that answers every call with the same value.
    pub fn always(value: Value) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(value),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fallback(mut self, value: Value) -> Self {
        self.fallback = Some(value);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock lock").len()
    }
}

#[async_trait]
impl StructuredInference for MockInference {
    async fn generate(
        &self,
        request: &InferenceRequest,
        credential: SecretString,
    ) -> Result<Value, InferenceError> {
        self.calls.lock().expect("mock lock").push(RecordedCall {
            role: request.role.clone(),
            instruction: request.instruction.clone(),
            credential: credential.expose_secret().to_string(),
        });

        match self.script.lock().expect("mock lock").pop_front() {
            Some(outcome) => outcome,
            None => match &self.fallback {
                Some(value) => Ok(value.clone()),
                None => Err(InferenceError::Fatal("mock script exhausted".to_string())),
            },
        }
    }
}
