use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use intake_flow::{Context, Result, Step, StepResult, WizardStep};

use crate::steps::types::{AccidentRole, ClaimRecord, session_keys};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleInput {
    role: Option<AccidentRole>,
    #[serde(default, alias = "rideshareUserInfo")]
    guest_info: Option<String>,
}

/// Step 2: accident involvement. A guest of a rideshare user must also name
/// that user; any other role clears previously entered guest info.
pub struct RoleStep;

#[async_trait]
impl Step for RoleStep {
    fn id(&self) -> WizardStep {
        WizardStep::Role
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let input: Option<RoleInput> = context
            .get::<serde_json::Value>(session_keys::USER_INPUT)
            .await
            .and_then(|v| serde_json::from_value(v).ok());

        let Some(role) = input.as_ref().and_then(|i| i.role) else {
            return Ok(StepResult::stay("Please select your role in the accident"));
        };

        let guest_info = input.and_then(|i| i.guest_info);
        let guest_info = match role {
            AccidentRole::Guest => {
                let trimmed = guest_info.as_deref().map(str::trim).unwrap_or_default();
                if trimmed.is_empty() {
                    return Ok(StepResult::stay(
                        "Please provide the rideshare user information",
                    ));
                }
                Some(trimmed.to_string())
            }
            _ => None,
        };

        let mut record: ClaimRecord = context
            .get(session_keys::CLAIM_RECORD)
            .await
            .unwrap_or_default();
        record.role = Some(role);
        record.guest_info = guest_info;
        context.set(session_keys::CLAIM_RECORD, record).await;

        info!(role = ?role, "accident role recorded");
        Ok(StepResult::advance())
    }
}
