// HTTP request handlers and router assembly
pub mod customers;
pub mod dashboard;
pub mod landing;
pub mod layout;
pub mod settings;
pub mod teams;
pub mod upload;
pub mod users;

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::application::error::ServiceError;
use crate::domain::customer::CustomerStatus;
use crate::presentation::app_state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route(
            "/api/customers",
            post(customers::intake).get(customers::list),
        )
        .route(
            "/api/customers/duplicate-check",
            post(customers::duplicate_check),
        )
        .route("/api/customers/:id", patch(customers::update))
        .route(
            "/api/users",
            get(users::list).post(users::create).put(users::update),
        )
        .route(
            "/api/users/:id/permissions",
            get(users::permissions).patch(users::update_permissions),
        )
        .route(
            "/api/users/:id/activity",
            get(users::activity).post(users::append_activity),
        )
        .route("/api/users/:id/memo", patch(users::update_memo))
        .route("/api/teams", get(teams::list).post(teams::create))
        .route("/api/teams/:id/memo", patch(teams::update_memo))
        .route("/api/teams/:id/members", patch(teams::move_member))
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/dashboard/callbacks", get(dashboard::callbacks))
        .route("/api/dashboard/goal", get(dashboard::goal))
        .route("/api/dashboard/incomplete", get(dashboard::incomplete))
        .route("/api/dashboard/performance", get(dashboard::performance))
        .route("/api/dashboard/stale", get(dashboard::stale))
        .route("/api/dashboard/timeline", get(dashboard::timeline))
        .route(
            "/api/dashboard/layout",
            get(layout::get_layout).put(layout::replace_layout),
        )
        .route("/api/dashboard/layout/widgets", post(layout::add_widget))
        .route(
            "/api/dashboard/layout/widgets/:id",
            patch(layout::update_widget).delete(layout::remove_widget),
        )
        .route(
            "/api/dashboard/layout/widgets/:id/data",
            get(layout::widget_data),
        )
        .route(
            "/api/settings/:key",
            get(settings::get_blob).put(settings::put_blob),
        )
        .route("/api/upload/branding", post(upload::branding))
        .route("/api/seed-sample-data", post(seed_sample_data))
        .route("/landing/:slug", get(landing::landing))
        .with_state(state)
}

/// Liveness probe
pub async fn health_check() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
pub struct SeedQuery {
    pub count: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub inserted: u32,
}

/// Development-only synthetic data. The route 404s when seeding is not
/// enabled so production deployments do not advertise it.
pub async fn seed_sample_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeedQuery>,
) -> Result<Json<SeedResponse>, ServiceError> {
    let seed = state
        .seed_service
        .as_ref()
        .ok_or(ServiceError::NotFound("route"))?;
    let inserted = seed.seed_customers(query.count.unwrap_or(50)).await?;
    Ok(Json(SeedResponse { inserted }))
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
pub(crate) fn parse_date(raw: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| {
            date.and_hms_opt(0, 0, 0)
                .expect("midnight is always valid")
                .and_utc()
        })
        .map_err(|_| ServiceError::validation(format!("invalid date '{raw}'")))
}

pub(crate) fn parse_opt_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ServiceError> {
    raw.map(parse_date).transpose()
}

/// Status filter from either the single `status` param or the
/// comma-separated `statuses` param.
pub(crate) fn parse_statuses(
    status: Option<&str>,
    statuses: Option<&str>,
) -> Result<Vec<CustomerStatus>, ServiceError> {
    let mut parsed = Vec::new();
    let raw: Vec<&str> = match (status, statuses) {
        (Some(single), _) => vec![single],
        (None, Some(list)) => list.split(',').map(str::trim).collect(),
        (None, None) => Vec::new(),
    };
    for name in raw {
        if name.is_empty() {
            continue;
        }
        let status = CustomerStatus::parse(name)
            .ok_or_else(|| ServiceError::validation(format!("unknown status '{name}'")))?;
        parsed.push(status);
    }
    Ok(parsed)
}

pub(crate) fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
