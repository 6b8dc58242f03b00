//! WizardRunner – loads a session, executes exactly one wizard submission,
//! and persists the updated session back to storage.
//!
//! The runner also enforces the single-pending-submission rule: while a
//! submission for a session is in flight (including the processing step's
//! backend call), a second submission or back navigation for the same session
//! fails with `SubmissionInFlight` instead of racing the first.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::{
    error::{FlowError, Result},
    machine::{ExecutionResult, WizardMachine},
    session::{SessionStorage, WizardSession},
};

#[derive(Clone)]
pub struct WizardRunner {
    machine: Arc<WizardMachine>,
    storage: Arc<dyn SessionStorage>,
    in_flight: Arc<DashMap<String, ()>>,
}

impl WizardRunner {
    pub fn new(machine: Arc<WizardMachine>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            machine,
            storage,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Execute one submission for the given session and persist the result.
    pub async fn run(&self, session_id: &str) -> Result<ExecutionResult> {
        let _guard = self.acquire(session_id)?;

        let mut session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))?;

        let result = self.machine.execute_session(&mut session).await?;

        session.updated_at = Utc::now();
        self.storage.save(session).await?;

        Ok(result)
    }

    /// Navigate the session one step back and persist it.
    pub async fn back(&self, session_id: &str) -> Result<WizardSession> {
        let _guard = self.acquire(session_id)?;

        let mut session = self
            .storage
            .get(session_id)
            .await?
            .ok_or_else(|| FlowError::SessionNotFound(session_id.to_string()))?;

        self.machine.go_back(&mut session)?;

        session.updated_at = Utc::now();
        self.storage.save(session.clone()).await?;

        Ok(session)
    }

    fn acquire(&self, session_id: &str) -> Result<InFlightGuard> {
        if self
            .in_flight
            .insert(session_id.to_string(), ())
            .is_some()
        {
            return Err(FlowError::SubmissionInFlight(session_id.to_string()));
        }
        Ok(InFlightGuard {
            map: Arc::clone(&self.in_flight),
            key: session_id.to_string(),
        })
    }
}

struct InFlightGuard {
    map: Arc<DashMap<String, ()>>,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}
