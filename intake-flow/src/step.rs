use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{context::Context, error::Result};

/// The five wizard states, in their linear order.
///
/// Rejection and completion are not steps: they are terminal conditions
/// carried on the session, so the set of live states stays a closed enum and
/// transition handling can be matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Contact,
    Role,
    Qualify,
    Processing,
    Elevated,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Contact,
        WizardStep::Role,
        WizardStep::Qualify,
        WizardStep::Processing,
        WizardStep::Elevated,
    ];

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Contact => Some(WizardStep::Role),
            WizardStep::Role => Some(WizardStep::Qualify),
            WizardStep::Qualify => Some(WizardStep::Processing),
            WizardStep::Processing => Some(WizardStep::Elevated),
            WizardStep::Elevated => None,
        }
    }

    pub fn prev(self) -> Option<WizardStep> {
        match self {
            WizardStep::Contact => None,
            WizardStep::Role => Some(WizardStep::Contact),
            WizardStep::Qualify => Some(WizardStep::Role),
            WizardStep::Processing => Some(WizardStep::Qualify),
            WizardStep::Elevated => Some(WizardStep::Processing),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Contact => "contact",
            WizardStep::Role => "role",
            WizardStep::Qualify => "qualify",
            WizardStep::Processing => "processing",
            WizardStep::Elevated => "elevated",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What should happen after a step runs.
#[derive(Debug, Clone)]
pub enum NextAction {
    /// Stay on the current step; the response carries the validation banner.
    Stay,
    /// Move to the next step and wait for the next submission.
    Advance,
    /// Move to the next step and execute it immediately.
    AdvanceAndRun,
    /// Terminal rejection with a human-readable reason.
    Reject(String),
    /// Terminal success.
    Complete,
}

/// Result of running a single step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Message to surface to the visitor, if any.
    pub response: Option<String>,
    pub next: NextAction,
}

impl StepResult {
    pub fn new(response: Option<String>, next: NextAction) -> Self {
        Self { response, next }
    }

    pub fn stay(message: impl Into<String>) -> Self {
        Self::new(Some(message.into()), NextAction::Stay)
    }

    pub fn advance() -> Self {
        Self::new(None, NextAction::Advance)
    }

    pub fn advance_and_run() -> Self {
        Self::new(None, NextAction::AdvanceAndRun)
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self::new(None, NextAction::Reject(reason.into()))
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(Some(message.into()), NextAction::Complete)
    }
}

/// A single wizard step: validates the pending input in the context and
/// decides the transition.
#[async_trait]
pub trait Step: Send + Sync {
    fn id(&self) -> WizardStep;

    async fn run(&self, context: Context) -> Result<StepResult>;
}
