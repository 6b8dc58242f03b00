use axum::{
    Router,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{Next, from_fn, from_fn_with_state},
    response::Json,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info};
use uuid::Uuid;

use intake_flow::{
    FlowError, SessionStorage, WizardRunner, WizardSession, WizardStatus, WizardStep,
};

use crate::consent::{ConsentRegistry, PixelLoader};
use crate::gate::{GateState, request_gate};
use crate::resume::ResumeStore;
use crate::steps::session_keys;
use crate::steps::types::ClaimRecord;

#[derive(Clone)]
pub struct AppState {
    pub runner: WizardRunner,
    pub session_storage: Arc<dyn SessionStorage>,
    pub resume_store: Arc<dyn ResumeStore>,
    pub consent: ConsentRegistry,
    pub pixels: Arc<Vec<Arc<dyn PixelLoader>>>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub session_id: Option<String>,
    pub client_id: Option<String>,
    /// The current step's submission, parsed by the step itself.
    #[serde(default)]
    pub input: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub session_id: String,
    pub step: String,
    pub status: String,
    pub response: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BackRequest {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ConsentRequest {
    pub client_id: String,
    pub granted: bool,
}

#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub client_id: String,
    pub granted: bool,
}

/// Build the service router: claim wizard endpoints behind the request gate,
/// with correlation ids and request tracing.
pub fn app(state: AppState, gate: GateState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/claim/execute", post(execute_claim))
        .route("/claim/back", post(back_claim))
        .route("/claim/session/{id}", get(get_session))
        .route("/consent", post(record_consent))
        .layer(from_fn_with_state(gate, request_gate))
        .layer(from_fn(correlation_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Tag every request with a correlation id, carried in a tracing span and
/// echoed back on the response.
pub async fn correlation_id_middleware(mut request: Request, next: Next) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value.clone());

        let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
        let mut response = next.run(request).instrument(span).await;
        response.headers_mut().insert("x-correlation-id", value);
        return response;
    }

    next.run(request).await
}

async fn health_check() -> &'static str {
    "OK"
}

/// Create a session for a new visitor. A complete, unexpired resume token
/// skips the contact step: the cached contact is seeded into the record and
/// the wizard starts at the role step.
pub async fn new_session(client_id: Option<&str>, resume: &dyn ResumeStore) -> WizardSession {
    let id = Uuid::new_v4().to_string();

    if let Some(client_id) = client_id
        && let Ok(Some(token)) = resume.get(client_id).await
        && token.is_usable(Utc::now())
    {
        info!(client_id = %client_id, "resuming with cached contact details");
        let session = WizardSession::starting_at(id, WizardStep::Role);
        let record = ClaimRecord {
            contact: Some(token.contact),
            ..Default::default()
        };
        session.context.set(session_keys::CLAIM_RECORD, record).await;
        return session;
    }

    WizardSession::new(id)
}

fn status_for(e: &FlowError) -> StatusCode {
    match e {
        FlowError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        FlowError::SubmissionInFlight(_) | FlowError::InvalidTransition(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn execute_claim(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, StatusCode> {
    if let Some(id) = &request.session_id
        && Uuid::parse_str(id).is_err()
    {
        error!(session_id = %id, "invalid session id format");
        return Err(StatusCode::BAD_REQUEST);
    }

    let (session, created) = match &request.session_id {
        Some(id) => match state.session_storage.get(id).await {
            Ok(Some(session)) => (session, false),
            Ok(None) => {
                error!(session_id = %id, "session not found");
                return Err(StatusCode::NOT_FOUND);
            }
            Err(e) => {
                error!(session_id = %id, error = %e, "failed to get session");
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        },
        None => {
            let session = new_session(request.client_id.as_deref(), &*state.resume_store).await;
            info!(session_id = %session.id, step = %session.current_step, "created new session");
            (session, true)
        }
    };

    let session_id = session.id.clone();

    session
        .context
        .set(session_keys::USER_INPUT, request.input)
        .await;
    session
        .context
        .set(session_keys::SESSION_ID, session_id.clone())
        .await;
    if let Some(client_id) = &request.client_id {
        session
            .context
            .set(session_keys::CLIENT_ID, client_id.clone())
            .await;
    }

    // The input reaches the wizard through the shared context. Only a newly
    // created session is persisted here; saving an existing one would sit
    // outside the runner's in-flight guard and could clobber a concurrently
    // completing submission.
    if created && let Err(e) = state.session_storage.save(session).await {
        error!(session_id = %session_id, error = %e, "failed to save session");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let result = match state.runner.run(&session_id).await {
        Ok(result) => result,
        Err(e) => {
            error!(session_id = %session_id, error = %e, "failed to execute wizard step");
            return Err(status_for(&e));
        }
    };

    let step = match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => session.current_step,
        _ => WizardStep::Contact,
    };

    info!(
        session_id = %session_id,
        step = %step,
        status = %result.status.label(),
        "request completed"
    );

    let rejection_reason = match &result.status {
        WizardStatus::Rejected(reason) => Some(reason.clone()),
        _ => None,
    };

    Ok(Json(ExecuteResponse {
        session_id,
        step: step.as_str().to_string(),
        status: result.status.label().to_string(),
        response: result.response,
        rejection_reason,
    }))
}

async fn back_claim(
    State(state): State<AppState>,
    Json(request): Json<BackRequest>,
) -> Result<Json<ExecuteResponse>, StatusCode> {
    match state.runner.back(&request.session_id).await {
        Ok(session) => Ok(Json(ExecuteResponse {
            session_id: session.id,
            step: session.current_step.as_str().to_string(),
            status: "waiting_for_input".to_string(),
            response: None,
            rejection_reason: None,
        })),
        Err(e) => {
            error!(session_id = %request.session_id, error = %e, "back navigation refused");
            Err(status_for(&e))
        }
    }
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<WizardSession>, StatusCode> {
    match state.session_storage.get(&session_id).await {
        Ok(Some(session)) => Ok(Json(session)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "failed to get session");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Record a consent change and invoke the pixel collaborators' entry points.
/// Each loader re-checks the flag itself, so invoking them on revocation is
/// safe and keeps the callback contract simple.
async fn record_consent(
    State(state): State<AppState>,
    Json(request): Json<ConsentRequest>,
) -> Json<ConsentResponse> {
    state.consent.set(&request.client_id, request.granted);
    info!(client_id = %request.client_id, granted = request.granted, "marketing consent updated");

    for pixel in state.pixels.iter() {
        info!(vendor = %pixel.vendor(), client_id = %request.client_id, "notifying pixel loader");
        pixel.load(&state.consent, &request.client_id);
    }

    Json(ConsentResponse {
        client_id: request.client_id,
        granted: request.granted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::{InMemoryResumeStore, ResumeToken};
    use crate::steps::types::ContactInfo;

    fn contact() -> ContactInfo {
        ContactInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: "5555555555".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn new_visitor_starts_at_contact() {
        let resume = InMemoryResumeStore::new();
        let session = new_session(Some("visitor-1"), &resume).await;
        assert_eq!(session.current_step, WizardStep::Contact);
    }

    #[tokio::test]
    async fn complete_resume_token_starts_at_role() {
        let resume = InMemoryResumeStore::new();
        resume
            .put("visitor-1", ResumeToken::new(contact()))
            .await
            .unwrap();

        let session = new_session(Some("visitor-1"), &resume).await;
        assert_eq!(session.current_step, WizardStep::Role);

        let record: ClaimRecord = session
            .context
            .get(session_keys::CLAIM_RECORD)
            .await
            .unwrap();
        assert_eq!(record.contact.unwrap(), contact());
    }

    #[tokio::test]
    async fn incomplete_resume_token_starts_at_contact() {
        let resume = InMemoryResumeStore::new();
        let mut incomplete = contact();
        incomplete.phone = String::new();
        resume
            .put("visitor-1", ResumeToken::new(incomplete))
            .await
            .unwrap();

        let session = new_session(Some("visitor-1"), &resume).await;
        assert_eq!(session.current_step, WizardStep::Contact);
    }

    #[tokio::test]
    async fn malformed_resume_token_starts_at_contact() {
        let resume = InMemoryResumeStore::new();
        resume.put_raw("visitor-1", "{broken");

        let session = new_session(Some("visitor-1"), &resume).await;
        assert_eq!(session.current_step, WizardStep::Contact);
    }
}
