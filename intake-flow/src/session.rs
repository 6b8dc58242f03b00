use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{context::Context, error::Result, step::WizardStep};

/// One visitor's progress through the wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSession {
    pub id: String,
    pub current_step: WizardStep,
    /// Set once the qualification gate rejects the claim. Terminal.
    pub rejected: Option<String>,
    /// Set once the elevated confirmation has been shown. Terminal.
    pub completed: bool,
    /// The single current-step error banner. Overwritten, never accumulated.
    pub status_message: Option<String>,
    #[serde(skip, default)]
    pub context: Context,
    pub updated_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(id: String) -> Self {
        Self::starting_at(id, WizardStep::Contact)
    }

    /// Start at a later step, e.g. when a resume token restored the contact
    /// details and the wizard re-enters at the role step.
    pub fn starting_at(id: String, step: WizardStep) -> Self {
        Self {
            id,
            current_step: step,
            rejected: None,
            completed: false,
            status_message: None,
            context: Context::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.rejected.is_some() || self.completed
    }
}

/// Storage for wizard sessions.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: WizardSession) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<WizardSession>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory session storage. Sessions live for the lifetime of the process,
/// which is all the intake flow needs: the claim record itself is never
/// persisted here.
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, WizardSession>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemorySessionStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: WizardSession) -> Result<()> {
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<WizardSession>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}
