//! Resilient access to the external structured-inference capability.
//!
//! Everything the pipeline learns from the inference service flows
//! through [`StructuredInference::generate`]: a role descriptor, a
//! natural-language instruction, and an optional binary document in,
//! a JSON value out. The service's reasoning is opaque to this crate;
//! what it owns is the credential pool, failure classification, and the
//! rotation/backoff retry loop around every call.

pub mod error;
pub mod gemini;
pub mod mock;
pub mod pool;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;

pub use error::InferenceError;
pub use gemini::GeminiProvider;
pub use pool::{CredentialPool, PoolError};
pub use retry::{ResilientClient, RetryPolicy};

/// Binary document forwarded verbatim to the inference service.
#[derive(Clone, Debug)]
pub struct DocumentPayload {
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

impl DocumentPayload {
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self { mime_type: "application/pdf".to_string(), bytes: Arc::new(bytes) }
    }
}

/// One structured-inference request. The caller describes the persona
/// (`role`), the task (`instruction`), and optionally attaches the
/// source document; the provider must answer with a JSON value.
#[derive(Clone, Debug)]
pub struct InferenceRequest {
    pub role: String,
    pub instruction: String,
    pub document: Option<DocumentPayload>,
}

#[async_trait]
pub trait StructuredInference: Send + Sync {
    async fn generate(
        &self,
        request: &InferenceRequest,
        credential: SecretString,
    ) -> Result<Value, InferenceError>;
}
