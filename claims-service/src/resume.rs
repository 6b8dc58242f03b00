//! Resume tokens: a returning visitor who already completed the contact step
//! re-enters the wizard at the role step instead of retyping everything.
//!
//! The token has an explicit schema and expiry and is decoupled from the
//! wizard's in-memory session model: the contact step writes it, session
//! creation reads it, nothing else touches it.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use intake_flow::Result;

use crate::steps::types::ContactInfo;

pub const RESUME_TOKEN_VERSION: u8 = 1;
const RESUME_TOKEN_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeToken {
    pub version: u8,
    pub contact: ContactInfo,
    pub issued_at: DateTime<Utc>,
}

impl ResumeToken {
    pub fn new(contact: ContactInfo) -> Self {
        Self {
            version: RESUME_TOKEN_VERSION,
            contact,
            issued_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > Duration::days(RESUME_TOKEN_TTL_DAYS)
    }

    /// A token only resumes the wizard when every contact field is present.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.version == RESUME_TOKEN_VERSION && !self.is_expired(now) && self.contact.is_complete()
    }
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn put(&self, client_id: &str, token: ResumeToken) -> Result<()>;
    async fn get(&self, client_id: &str) -> Result<Option<ResumeToken>>;
    async fn delete(&self, client_id: &str) -> Result<()>;
}

/// In-memory resume store. Tokens are kept as raw JSON and parsed on read;
/// malformed data degrades to "no cached token" instead of failing the
/// session.
pub struct InMemoryResumeStore {
    tokens: Arc<DashMap<String, String>>,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Test/maintenance hook: store raw bytes without validation.
    pub fn put_raw(&self, client_id: &str, raw: impl Into<String>) {
        self.tokens.insert(client_id.to_string(), raw.into());
    }
}

impl Default for InMemoryResumeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn put(&self, client_id: &str, token: ResumeToken) -> Result<()> {
        match serde_json::to_string(&token) {
            Ok(raw) => {
                self.tokens.insert(client_id.to_string(), raw);
            }
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "failed to serialize resume token");
            }
        }
        Ok(())
    }

    async fn get(&self, client_id: &str) -> Result<Option<ResumeToken>> {
        let Some(raw) = self.tokens.get(client_id) else {
            return Ok(None);
        };
        match serde_json::from_str::<ResumeToken>(raw.value()) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                debug!(client_id = %client_id, error = %e, "ignoring malformed resume token");
                Ok(None)
            }
        }
    }

    async fn delete(&self, client_id: &str) -> Result<()> {
        self.tokens.remove(client_id);
        Ok(())
    }
}
