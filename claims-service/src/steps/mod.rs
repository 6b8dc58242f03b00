// Claim qualification wizard steps
pub mod contact;
pub mod elevated;
pub mod processing;
pub mod qualify;
pub mod role;

// Shared domain types
pub mod types;

pub use contact::ContactStep;
pub use elevated::ElevatedStep;
pub use processing::ProcessingStep;
pub use qualify::QualifyStep;
pub use role::RoleStep;

pub use types::session_keys;

use std::sync::Arc;

use intake_flow::{MachineBuilder, Result, WizardMachine};

use crate::resume::ResumeStore;
use crate::submit::SubmissionClient;

/// Assemble the claim qualification wizard.
pub fn build_wizard(
    resume: Arc<dyn ResumeStore>,
    backend: Arc<dyn SubmissionClient>,
) -> Result<WizardMachine> {
    MachineBuilder::new("rideshare_claim_intake")
        .add_step(Arc::new(ContactStep::new(resume)))
        .add_step(Arc::new(RoleStep))
        .add_step(Arc::new(QualifyStep))
        .add_step(Arc::new(ProcessingStep::new(backend)))
        .add_step(Arc::new(ElevatedStep))
        .build()
}
