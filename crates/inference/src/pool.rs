//! Shared credential pool with round-robin rotation.
//!
//! One pool per process, shared by every concurrent caller through an
//! `Arc`. The cursor is the single source of truth for "current
//! credential": a rotation triggered by any caller is visible to all
//! of them. Only two operations touch the cursor, both atomic under one
//! mutex: read-current and advance-and-read.

use std::env;
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::info;

const PRIMARY_ENV_KEY: &str = "BIDPILOT_API_KEY";

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("no credentials configured (set {PRIMARY_ENV_KEY} or numbered fallbacks)")]
    Empty,
}

pub struct CredentialPool {
    credentials: Vec<SecretString>,
    cursor: Mutex<usize>,
}

impl CredentialPool {
    pub fn new(credentials: Vec<SecretString>) -> Result<Self, PoolError> {
        if credentials.is_empty() {
            return Err(PoolError::Empty);
        }
        Ok(Self { credentials, cursor: Mutex::new(0) })
    }

    /// Reads `BIDPILOT_API_KEY` plus `BIDPILOT_API_KEY_1..n` (stopping at
    /// the first gap), dropping duplicates. Read once at startup; runtime
    /// reload is not supported.
    pub fn from_env() -> Result<Self, PoolError> {
        let mut credentials: Vec<SecretString> = Vec::new();
        let mut push_unique = |value: String| {
            let duplicate = credentials
                .iter()
                .any(|existing| existing.expose_secret() == value.as_str());
            if !duplicate {
                credentials.push(value.into());
            }
        };

        if let Ok(primary) = env::var(PRIMARY_ENV_KEY) {
            push_unique(primary);
        }
        for index in 1.. {
            match env::var(format!("{PRIMARY_ENV_KEY}_{index}")) {
                Ok(value) => push_unique(value),
                Err(_) => break,
            }
        }

        let pool = Self::new(credentials)?;
        info!(event_name = "credentials.loaded", count = pool.len(), "credential pool ready");
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Current credential without rotating.
    pub fn current(&self) -> SecretString {
        let cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        self.credentials[*cursor].clone()
    }

    /// Advance the cursor (wrapping) and return the new credential. The
    /// rotation is a global side effect seen by every subsequent caller.
    pub fn advance(&self) -> SecretString {
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        *cursor = (*cursor + 1) % self.credentials.len();
        self.credentials[*cursor].clone()
    }

    /// 0-based cursor position, exposed for observability and tests.
    pub fn cursor_index(&self) -> usize {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::{CredentialPool, PoolError};

    fn pool(keys: &[&str]) -> CredentialPool {
        CredentialPool::new(keys.iter().map(|key| (*key).to_string().into()).collect())
            .expect("non-empty pool")
    }

    #[test]
    fn empty_pool_fails_construction() {
        assert!(matches!(CredentialPool::new(Vec::new()), Err(PoolError::Empty)));
    }

    #[test]
    fn advance_wraps_back_to_start_after_full_cycle() {
        let pool = pool(&["k0", "k1", "k2"]);
        assert_eq!(pool.cursor_index(), 0);

        for _ in 0..pool.len() {
            pool.advance();
        }
        assert_eq!(pool.cursor_index(), 0);
        assert_eq!(pool.current().expose_secret(), "k0");
    }

    #[test]
    fn advance_returns_the_new_credential() {
        let pool = pool(&["k0", "k1"]);
        assert_eq!(pool.advance().expose_secret(), "k1");
        assert_eq!(pool.advance().expose_secret(), "k0");
    }

    #[test]
    fn rotation_is_shared_across_handles() {
        let pool = std::sync::Arc::new(pool(&["k0", "k1", "k2"]));
        let other = std::sync::Arc::clone(&pool);

        pool.advance();
        assert_eq!(other.current().expose_secret(), "k1");
    }
}
