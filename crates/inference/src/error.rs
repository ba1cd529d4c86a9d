use thiserror::Error;

/// Substrings that mark a provider failure as a transient rate limit.
/// Matched case-insensitively against the whole error message.
const RATE_LIMIT_MARKERS: &[&str] = &[
    "rate limit",
    "rate_limit",
    "ratelimit",
    "429",
    "quota",
    "resource exhausted",
    "resourceexhausted",
    "too many requests",
];

#[derive(Debug, Error)]
pub enum InferenceError {
    /// Transient; the invoker rotates the credential pool and retries.
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Non-retryable provider or transport failure.
    #[error("inference call failed: {0}")]
    Fatal(String),
    /// The call succeeded but produced no usable value. Treated as fatal:
    /// absence is a decoding problem, not a rate limit.
    #[error("inference returned an empty response")]
    EmptyResponse,
    /// The value decoded but does not match the requested schema.
    #[error("inference response did not match the expected schema: {0}")]
    Schema(#[source] serde_json::Error),
}

impl InferenceError {
    /// Classify a raw failure message into the retry taxonomy.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_rate_limit_message(&message) {
            Self::RateLimited(message)
        } else {
            Self::Fatal(message)
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

pub fn is_rate_limit_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lowered.contains(marker))
}
