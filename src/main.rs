// Main entry point - dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::customer_service::CustomerService;
use crate::application::dashboard_service::DashboardService;
use crate::application::layout_service::LayoutService;
use crate::application::org_service::OrgService;
use crate::application::repositories::{
    ActivityRepository, AuthProvider, BranchRepository, CustomerRepository, SettingsRepository,
    TeamRepository, UserRepository,
};
use crate::application::seed_service::SeedService;
use crate::application::settings_service::SettingsService;
use crate::infrastructure::auth_provider::{HttpAuthProvider, LocalAuthProvider};
use crate::infrastructure::config::{load_settings, BackendMode, DataApiSettings};
use crate::infrastructure::data_api::DataApiClient;
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::uploads::BrandingStore;
use crate::presentation::app_state::AppState;

/// One handle per repository trait; both backends implement all of them.
struct Backend {
    customers: Arc<dyn CustomerRepository>,
    users: Arc<dyn UserRepository>,
    teams: Arc<dyn TeamRepository>,
    branches: Arc<dyn BranchRepository>,
    activity: Arc<dyn ActivityRepository>,
    settings: Arc<dyn SettingsRepository>,
}

async fn build_backend(config: &DataApiSettings) -> Backend {
    match config.mode {
        BackendMode::Memory => {
            let store = Arc::new(MemoryStore::with_sample_branches());
            store.seed_sample_users().await;
            Backend {
                customers: store.clone(),
                users: store.clone(),
                teams: store.clone(),
                branches: store.clone(),
                activity: store.clone(),
                settings: store,
            }
        }
        BackendMode::Http => {
            let client = Arc::new(DataApiClient::new(
                config.base_url.clone(),
                config.api_key.clone(),
            ));
            Backend {
                customers: client.clone(),
                users: client.clone(),
                teams: client.clone(),
                branches: client.clone(),
                activity: client.clone(),
                settings: client,
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Repositories (infrastructure layer)
    let backend = build_backend(&settings.data_api).await;
    let auth: Arc<dyn AuthProvider> = match settings.data_api.mode {
        BackendMode::Memory => Arc::new(LocalAuthProvider),
        BackendMode::Http => Arc::new(HttpAuthProvider::new(settings.auth.clone())),
    };

    // Services (application layer)
    let customer_service =
        CustomerService::new(backend.customers.clone(), backend.branches.clone());
    let dashboard_service = DashboardService::new(
        backend.customers.clone(),
        backend.users.clone(),
        backend.settings.clone(),
    );
    let layout_service = LayoutService::new(backend.settings.clone());
    let org_service = OrgService::new(
        backend.users.clone(),
        backend.teams.clone(),
        backend.activity.clone(),
        auth,
    );
    let settings_service = SettingsService::new(backend.settings.clone());
    let seed_service = settings
        .server
        .enable_seed
        .then(|| SeedService::new(backend.customers.clone(), backend.branches.clone()));

    let state = Arc::new(AppState {
        customer_service,
        dashboard_service,
        layout_service,
        org_service,
        settings_service,
        seed_service,
        branding_store: BrandingStore::new(settings.upload.clone()),
        branches: backend.branches,
    });

    // Build router (presentation layer)
    let router = presentation::handlers::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!(%addr, "starting leadboard service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
