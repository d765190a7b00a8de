// Application state for HTTP handlers
use std::sync::Arc;

use crate::application::customer_service::CustomerService;
use crate::application::dashboard_service::DashboardService;
use crate::application::layout_service::LayoutService;
use crate::application::org_service::OrgService;
use crate::application::repositories::BranchRepository;
use crate::application::seed_service::SeedService;
use crate::application::settings_service::SettingsService;
use crate::infrastructure::uploads::BrandingStore;

#[derive(Clone)]
pub struct AppState {
    pub customer_service: CustomerService,
    pub dashboard_service: DashboardService,
    pub layout_service: LayoutService,
    pub org_service: OrgService,
    pub settings_service: SettingsService,
    /// Present only when `server.enable_seed` is set.
    pub seed_service: Option<SeedService>,
    pub branding_store: BrandingStore,
    pub branches: Arc<dyn BranchRepository>,
}
