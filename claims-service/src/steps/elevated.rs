use async_trait::async_trait;
use tracing::info;

use intake_flow::{Context, Result, Step, StepResult, WizardStep};

pub const ELEVATED_MESSAGE: &str =
    "Your claim has been elevated. Your case manager is ready to assist you.";

/// Step 5: terminal confirmation after a successful submission.
pub struct ElevatedStep;

#[async_trait]
impl Step for ElevatedStep {
    fn id(&self) -> WizardStep {
        WizardStep::Elevated
    }

    async fn run(&self, _context: Context) -> Result<StepResult> {
        info!("claim elevated to a case manager");
        Ok(StepResult::complete(ELEVATED_MESSAGE))
    }
}
