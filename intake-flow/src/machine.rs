use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::{
    error::{FlowError, Result},
    session::WizardSession,
    step::{NextAction, Step, StepResult, WizardStep},
};

/// The wizard state machine: an enum-keyed dispatch table from step to its
/// guard/transition logic.
pub struct WizardMachine {
    pub id: String,
    steps: HashMap<WizardStep, Arc<dyn Step>>,
}

impl WizardMachine {
    fn step(&self, id: WizardStep) -> Result<Arc<dyn Step>> {
        self.steps
            .get(&id)
            .cloned()
            .ok_or(FlowError::StepNotRegistered(id))
    }

    /// Run the session's current step and apply its transition.
    ///
    /// Terminal sessions are reported without running anything: rejection is
    /// a designed outcome and does not allow returning to the qualify step.
    pub async fn execute_session(&self, session: &mut WizardSession) -> Result<ExecutionResult> {
        if let Some(reason) = session.rejected.clone() {
            return Ok(ExecutionResult {
                response: Some(reason.clone()),
                status: WizardStatus::Rejected(reason),
            });
        }
        if session.completed {
            return Ok(ExecutionResult {
                response: None,
                status: WizardStatus::Completed,
            });
        }

        let step = self.step(session.current_step)?;
        let StepResult { response, next } = step.run(session.context.clone()).await?;

        match next {
            NextAction::Stay => {
                session.status_message = response.clone();
                Ok(ExecutionResult {
                    response,
                    status: WizardStatus::WaitingForInput,
                })
            }
            NextAction::Advance => {
                session.status_message = None;
                if let Some(next_step) = session.current_step.next() {
                    session.current_step = next_step;
                }
                Ok(ExecutionResult {
                    response,
                    status: WizardStatus::WaitingForInput,
                })
            }
            NextAction::AdvanceAndRun => {
                session.status_message = None;
                match session.current_step.next() {
                    Some(next_step) => {
                        session.current_step = next_step;
                        Box::pin(self.execute_session(session)).await
                    }
                    None => Ok(ExecutionResult {
                        response,
                        status: WizardStatus::WaitingForInput,
                    }),
                }
            }
            NextAction::Reject(reason) => {
                session.rejected = Some(reason.clone());
                session.status_message = Some(reason.clone());
                Ok(ExecutionResult {
                    response: response.or_else(|| Some(reason.clone())),
                    status: WizardStatus::Rejected(reason),
                })
            }
            NextAction::Complete => {
                session.completed = true;
                session.status_message = None;
                Ok(ExecutionResult {
                    response,
                    status: WizardStatus::Completed,
                })
            }
        }
    }

    /// Back navigation: allowed from any step after the first while the
    /// session is not terminal. Entered values are kept; only the transient
    /// banner is cleared.
    pub fn go_back(&self, session: &mut WizardSession) -> Result<()> {
        if session.rejected.is_some() {
            return Err(FlowError::InvalidTransition(
                "cannot navigate back from a rejected claim".to_string(),
            ));
        }
        if session.completed {
            return Err(FlowError::InvalidTransition(
                "cannot navigate back from a completed claim".to_string(),
            ));
        }
        match session.current_step.prev() {
            Some(prev) => {
                session.current_step = prev;
                session.status_message = None;
                Ok(())
            }
            None => Err(FlowError::InvalidTransition(
                "already at the first step".to_string(),
            )),
        }
    }
}

/// Builder for a wizard machine. `build` fails unless every step of the
/// closed enum has a registered implementation.
pub struct MachineBuilder {
    id: String,
    steps: HashMap<WizardStep, Arc<dyn Step>>,
}

impl MachineBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: HashMap::new(),
        }
    }

    pub fn add_step(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.insert(step.id(), step);
        self
    }

    pub fn build(self) -> Result<WizardMachine> {
        for id in WizardStep::ALL {
            if !self.steps.contains_key(&id) {
                return Err(FlowError::StepNotRegistered(id));
            }
        }
        debug!(wizard = %self.id, steps = self.steps.len(), "wizard machine assembled");
        Ok(WizardMachine {
            id: self.id,
            steps: self.steps,
        })
    }
}

/// Outcome of one submission against the machine.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub response: Option<String>,
    pub status: WizardStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardStatus {
    /// Waiting for the next step submission.
    WaitingForInput,
    /// The claim was elevated; the flow is finished.
    Completed,
    /// The qualification gate rejected the claim.
    Rejected(String),
}

impl WizardStatus {
    pub fn label(&self) -> &'static str {
        match self {
            WizardStatus::WaitingForInput => "waiting_for_input",
            WizardStatus::Completed => "completed",
            WizardStatus::Rejected(_) => "rejected",
        }
    }
}
