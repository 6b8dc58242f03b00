use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claims_service::config::ServiceConfig;
use claims_service::consent::{ConsentRegistry, PixelLoader, VendorPixel};
use claims_service::gate::{FixedWindowLimiter, GateState};
use claims_service::resume::{InMemoryResumeStore, ResumeStore};
use claims_service::service::{AppState, app};
use claims_service::steps::build_wizard;
use claims_service::submit::{HttpSubmissionClient, SimulatedSubmissionClient, SubmissionClient};

use intake_flow::{InMemorySessionStorage, SessionStorage, WizardRunner};

/// Initialize structured tracing based on environment variables.
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "claims_service=debug,intake_flow=debug,tower_http=debug".into());

    match log_format.as_str() {
        "pretty" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServiceConfig::from_env();

    let backend: Arc<dyn SubmissionClient> = match &config.submit_url {
        Some(url) => {
            info!(url = %url, "using HTTP claim submission backend");
            Arc::new(HttpSubmissionClient::new(url.clone()))
        }
        None => {
            info!("no SUBMIT_URL set, using simulated claim submission");
            Arc::new(SimulatedSubmissionClient::new())
        }
    };

    let resume_store: Arc<dyn ResumeStore> = Arc::new(InMemoryResumeStore::new());
    let session_storage: Arc<dyn SessionStorage> = Arc::new(InMemorySessionStorage::new());

    let wizard = Arc::new(build_wizard(resume_store.clone(), backend)?);
    let runner = WizardRunner::new(wizard, session_storage.clone());

    let pixels: Vec<Arc<dyn PixelLoader>> =
        vec![Arc::new(VendorPixel::meta()), Arc::new(VendorPixel::tiktok())];

    let state = AppState {
        runner,
        session_storage,
        resume_store,
        consent: ConsentRegistry::new(),
        pixels: Arc::new(pixels),
    };

    let limiter = Arc::new(FixedWindowLimiter::new(
        config.rate_window_ms,
        config.rate_max_requests,
    ));
    let gate = GateState::new(limiter);

    let app = app(state, gate);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "claims intake service listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
