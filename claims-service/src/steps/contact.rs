use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

use intake_flow::{Context, Result, Step, StepResult, WizardStep};

use crate::resume::{ResumeStore, ResumeToken};
use crate::steps::types::{ClaimRecord, ContactInfo, normalize_phone, session_keys};

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactInput {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    email: String,
}

/// Step 1: collect and validate contact details, then cache them in the
/// resume store so a returning visitor can skip straight to the role step.
pub struct ContactStep {
    resume: Arc<dyn ResumeStore>,
}

impl ContactStep {
    pub fn new(resume: Arc<dyn ResumeStore>) -> Self {
        Self { resume }
    }
}

#[async_trait]
impl Step for ContactStep {
    fn id(&self) -> WizardStep {
        WizardStep::Contact
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let input: ContactInput = match context
            .get::<serde_json::Value>(session_keys::USER_INPUT)
            .await
            .and_then(|v| serde_json::from_value(v).ok())
        {
            Some(input) => input,
            None => return Ok(StepResult::stay("Please fill in your contact details.")),
        };

        if input.first_name.trim().len() < 2 {
            return Ok(StepResult::stay("First name is required"));
        }
        if input.last_name.trim().len() < 2 {
            return Ok(StepResult::stay("Last name is required"));
        }
        let Some(phone) = normalize_phone(&input.phone) else {
            return Ok(StepResult::stay(
                "Phone number must be between 10 and 15 digits",
            ));
        };
        if !EMAIL_SHAPE.is_match(input.email.trim()) {
            return Ok(StepResult::stay("Valid email is required"));
        }

        let contact = ContactInfo {
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            phone,
            email: input.email.trim().to_string(),
        };

        let mut record: ClaimRecord = context
            .get(session_keys::CLAIM_RECORD)
            .await
            .unwrap_or_default();
        record.contact = Some(contact.clone());
        context.set(session_keys::CLAIM_RECORD, record).await;

        // Overwrites any earlier token for this visitor.
        match context.get::<String>(session_keys::CLIENT_ID).await {
            Some(client_id) => {
                self.resume
                    .put(&client_id, ResumeToken::new(contact))
                    .await?;
                info!(client_id = %client_id, "contact details cached for resume");
            }
            None => debug!("no client id, skipping resume cache"),
        }

        Ok(StepResult::advance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::InMemoryResumeStore;
    use intake_flow::NextAction;
    use serde_json::json;

    async fn run_with(input: serde_json::Value) -> (StepResult, Context, Arc<InMemoryResumeStore>) {
        let resume = Arc::new(InMemoryResumeStore::new());
        let step = ContactStep::new(resume.clone());
        let context = Context::new();
        context.set(session_keys::USER_INPUT, input).await;
        context.set(session_keys::CLIENT_ID, "visitor-1").await;
        let result = step.run(context.clone()).await.unwrap();
        (result, context, resume)
    }

    #[tokio::test]
    async fn accepts_formatted_phone_and_advances() {
        let (result, context, resume) = run_with(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "phone": "(555) 555-5555",
            "email": "ada@example.com",
        }))
        .await;

        assert!(matches!(result.next, NextAction::Advance));

        let record: ClaimRecord = context.get(session_keys::CLAIM_RECORD).await.unwrap();
        assert_eq!(record.contact.as_ref().unwrap().phone, "5555555555");

        let token = resume.get("visitor-1").await.unwrap().unwrap();
        assert_eq!(token.contact.first_name, "Ada");
    }

    #[tokio::test]
    async fn rejects_short_phone() {
        let (result, _, resume) = run_with(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "phone": "555-5555",
            "email": "ada@example.com",
        }))
        .await;

        assert!(matches!(result.next, NextAction::Stay));
        assert_eq!(
            result.response.as_deref(),
            Some("Phone number must be between 10 and 15 digits")
        );
        assert!(resume.get("visitor-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_single_letter_name() {
        let (result, _, _) = run_with(json!({
            "firstName": "A",
            "lastName": "Lovelace",
            "phone": "5555555555",
            "email": "ada@example.com",
        }))
        .await;

        assert!(matches!(result.next, NextAction::Stay));
        assert_eq!(result.response.as_deref(), Some("First name is required"));
    }

    #[tokio::test]
    async fn rejects_malformed_email() {
        let (result, _, _) = run_with(json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "phone": "5555555555",
            "email": "not an email",
        }))
        .await;

        assert!(matches!(result.next, NextAction::Stay));
        assert_eq!(result.response.as_deref(), Some("Valid email is required"));
    }
}
