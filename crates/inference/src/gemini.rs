//! Gemini REST provider for the structured-inference capability.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::InferenceError;
use crate::{InferenceRequest, StructuredInference};

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|error| InferenceError::Fatal(format!("http client build failed: {error}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_body(request: &InferenceRequest) -> Value {
        let mut parts = vec![json!({ "text": request.instruction })];
        if let Some(document) = &request.document {
            parts.push(json!({
                "inlineData": {
                    "mimeType": document.mime_type,
                    "data": encode_base64(&document.bytes),
                }
            }));
        }
        json!({
            "systemInstruction": { "parts": [{ "text": request.role }] },
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "temperature": 0.1,
                "responseMimeType": "application/json",
            },
        })
    }

    /// Pulls `candidates[0].content.parts[0].text` and parses it as JSON.
    fn decode_payload(body: Value) -> Result<Value, InferenceError> {
        let text = body
            .get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.pointer("/content/parts/0/text"))
            .and_then(Value::as_str)
            .ok_or(InferenceError::EmptyResponse)?;
        serde_json::from_str(text).map_err(|error| {
            InferenceError::Fatal(format!("provider returned a non-JSON payload: {error}"))
        })
    }
}

#[async_trait]
impl StructuredInference for GeminiProvider {
    async fn generate(
        &self,
        request: &InferenceRequest,
        credential: SecretString,
    ) -> Result<Value, InferenceError> {
        debug!(event_name = "inference.request", role = %request.role, "dispatching inference call");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", credential.expose_secret())
            .json(&Self::build_body(request))
            .send()
            .await
            .map_err(|error| InferenceError::classify(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| InferenceError::classify(error.to_string()))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(InferenceError::RateLimited(body));
        }
        if !status.is_success() {
            return Err(InferenceError::classify(format!("HTTP {status}: {body}")));
        }

        let parsed: Value = serde_json::from_str(&body).map_err(|error| {
            InferenceError::Fatal(format!("provider response was not JSON: {error}"))
        })?;
        Self::decode_payload(parsed)
    }
}

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Standard base64 with padding, for the inline document payload.
fn encode_base64(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len().div_ceil(3) * 4);
    for chunk in input.chunks(3) {
        let b0 = chunk[0] as u32;
        let b1 = chunk.get(1).copied().unwrap_or(0) as u32;
        let b2 = chunk.get(2).copied().unwrap_or(0) as u32;
        let triple = (b0 << 16) | (b1 << 8) | b2;

        output.push(BASE64_ALPHABET[(triple >> 18) as usize & 0x3f] as char);
        output.push(BASE64_ALPHABET[(triple >> 12) as usize & 0x3f] as char);
        output.push(if chunk.len() > 1 {
            BASE64_ALPHABET[(triple >> 6) as usize & 0x3f] as char
        } else {
            '='
        });
        output.push(if chunk.len() > 2 {
            BASE64_ALPHABET[triple as usize & 0x3f] as char
        } else {
            '='
        });
    }
    output
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::InferenceError;
    use crate::{DocumentPayload, InferenceRequest};

    use super::{encode_base64, GeminiProvider};

    #[test]
    fn base64_matches_known_vectors() {
        assert_eq!(encode_base64(b""), "");
        assert_eq!(encode_base64(b"f"), "Zg==");
        assert_eq!(encode_base64(b"fo"), "Zm8=");
        assert_eq!(encode_base64(b"foo"), "Zm9v");
        assert_eq!(encode_base64(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn body_includes_inline_document_when_present() {
        let request = InferenceRequest {
            role: "analyst".to_string(),
            instruction: "extract the bill of materials".to_string(),
            document: Some(DocumentPayload::pdf(b"%PDF-1.4".to_vec())),
        };
        let body = GeminiProvider::build_body(&request);

        let parts = body.pointer("/contents/0/parts").and_then(|v| v.as_array()).expect("parts");
        assert_eq!(parts.len(), 2);
        assert_eq!(
            body.pointer("/contents/0/parts/1/inlineData/mimeType").and_then(|v| v.as_str()),
            Some("application/pdf")
        );
        assert_eq!(
            body.pointer("/generationConfig/responseMimeType").and_then(|v| v.as_str()),
            Some("application/json")
        );
    }

    #[test]
    fn payload_text_is_parsed_as_json() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"items\": [1, 2]}" }] }
            }]
        });
        let value = GeminiProvider::decode_payload(body).expect("payload decodes");
        assert_eq!(value, json!({ "items": [1, 2] }));
    }

    #[test]
    fn missing_candidates_is_an_empty_response() {
        let result = GeminiProvider::decode_payload(json!({ "candidates": [] }));
        assert!(matches!(result, Err(InferenceError::EmptyResponse)));
    }

    #[test]
    fn non_json_payload_text_is_fatal() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "sorry, I cannot" }] } }]
        });
        let result = GeminiProvider::decode_payload(body);
        assert!(matches!(result, Err(InferenceError::Fatal(_))));
    }
}
