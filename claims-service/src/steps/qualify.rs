use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use intake_flow::{Context, Result, Step, StepResult, WizardStep};

use crate::steps::types::{ClaimRecord, RideshareCompany, session_keys};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QualifyInput {
    rideshare_company: Option<RideshareCompany>,
    accident_date: Option<String>,
    #[serde(default)]
    filed_complaint: bool,
    #[serde(default)]
    has_police_report: bool,
    #[serde(default, alias = "medicalTreatment48h")]
    medical_treatment_48h: bool,
    #[serde(default, alias = "medicalTreatment7d")]
    medical_treatment_7d: bool,
}

/// Step 3: legal qualification. Field guards first, then the qualification
/// gate, which either hands the claim to processing or rejects it for good.
pub struct QualifyStep;

#[async_trait]
impl Step for QualifyStep {
    fn id(&self) -> WizardStep {
        WizardStep::Qualify
    }

    async fn run(&self, context: Context) -> Result<StepResult> {
        let input: Option<QualifyInput> = context
            .get::<serde_json::Value>(session_keys::USER_INPUT)
            .await
            .and_then(|v| serde_json::from_value(v).ok());

        let Some(input) = input else {
            return Ok(StepResult::stay("Please answer the qualification questions."));
        };

        let Some(company) = input.rideshare_company else {
            return Ok(StepResult::stay("Please select the rideshare company"));
        };

        let accident_date = match input
            .accident_date
            .as_deref()
            .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        {
            Some(Ok(date)) => date,
            Some(Err(_)) | None => {
                return Ok(StepResult::stay(
                    "Please provide the accident date (YYYY-MM-DD)",
                ));
            }
        };

        let mut record: ClaimRecord = context
            .get(session_keys::CLAIM_RECORD)
            .await
            .unwrap_or_default();
        record.rideshare_company = Some(company);
        record.accident_date = Some(accident_date);
        record.filed_complaint = input.filed_complaint;
        record.has_police_report = input.has_police_report;
        record.medical_treatment_48h = input.medical_treatment_48h;
        record.medical_treatment_7d = input.medical_treatment_7d;

        if let Some(reason) = record.qualification_failure() {
            context.set(session_keys::CLAIM_RECORD, record).await;
            info!(reason = %reason, "claim rejected by qualification gate");
            return Ok(StepResult::reject(reason));
        }

        context.set(session_keys::CLAIM_RECORD, record).await;
        info!(company = ?company, "claim qualified, handing off to processing");
        Ok(StepResult::advance_and_run())
    }
}
