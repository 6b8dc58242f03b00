use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use intake_flow::{Context, Result, Step, StepResult, WizardStep};

use crate::steps::types::{ClaimRecord, session_keys};
use crate::submit::SubmissionClient;

pub const SUBMISSION_RETRY_MESSAGE: &str =
    "We could not submit your claim right now. Please try again.";

/// Step 4: submit the qualified claim to the backend. Failure keeps the
/// session here with a retryable banner; a later submission re-runs the call.
pub struct ProcessingStep {
    backend: Arc<dyn SubmissionClient>,
}

impl ProcessingStep {
    pub fn new(backend: Arc<dyn SubmissionClient>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Step for ProcessingStep {
    fn id(&self) -> WizardStep {
        WizardStep::Processing
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let record: ClaimRecord = context
            .get(session_keys::CLAIM_RECORD)
            .await
            .unwrap_or_default();

        info!("submitting claim to backend");
        match self.backend.submit(&record).await {
            Ok(()) => Ok(StepResult::advance_and_run()),
            Err(e) => {
                error!(error = %e, "claim submission failed");
                Ok(StepResult::stay(SUBMISSION_RETRY_MESSAGE))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_flow::{FlowError, NextAction};

    struct FailingBackend;

    #[async_trait]
    impl SubmissionClient for FailingBackend {
        async fn submit(&self, _record: &ClaimRecord) -> Result<()> {
            Err(FlowError::SubmissionFailed("backend returned 502".into()))
        }
    }

    struct RecordingBackend {
        submitted: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl SubmissionClient for RecordingBackend {
        async fn submit(&self, _record: &ClaimRecord) -> Result<()> {
            self.submitted
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn successful_submission_advances() {
        let backend = Arc::new(RecordingBackend {
            submitted: std::sync::atomic::AtomicUsize::new(0),
        });
        let step = ProcessingStep::new(backend.clone());

        let result = step.run(Context::new()).await.unwrap();
        assert!(matches!(result.next, NextAction::AdvanceAndRun));
        assert_eq!(
            backend.submitted.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn failed_submission_stays_with_retry_banner() {
        let step = ProcessingStep::new(Arc::new(FailingBackend));

        let result = step.run(Context::new()).await.unwrap();
        assert!(matches!(result.next, NextAction::Stay));
        assert_eq!(result.response.as_deref(), Some(SUBMISSION_RETRY_MESSAGE));
    }
}
