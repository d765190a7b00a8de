// Dashboard aggregation endpoints
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::application::dashboard_service::DateRange;
use crate::application::error::ServiceError;
use crate::domain::customer::Customer;
use crate::domain::reporting::{GoalProgress, PerformanceRow, StatsSummary, TimelineEvent};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::parse_opt_date;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange, ServiceError> {
        Ok(DateRange {
            from: parse_opt_date(self.date_from.as_deref())?,
            to: parse_opt_date(self.date_to.as_deref())?,
        })
    }
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<StatsSummary>, ServiceError> {
    Ok(Json(state.dashboard_service.stats(query.range()?).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbacksQuery {
    pub assigned_to: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub limit: Option<u32>,
}

pub async fn callbacks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbacksQuery>,
) -> Result<Json<Vec<Customer>>, ServiceError> {
    let range = DateRange {
        from: parse_opt_date(query.date_from.as_deref())?,
        to: parse_opt_date(query.date_to.as_deref())?,
    };
    let customers = state
        .dashboard_service
        .callbacks(query.assigned_to, range, query.limit.unwrap_or(20))
        .await?;
    Ok(Json(customers))
}

pub async fn goal(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GoalProgress>, ServiceError> {
    Ok(Json(state.dashboard_service.goal().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncompleteQuery {
    pub branch_id: Option<String>,
    pub limit: Option<u32>,
}

pub async fn incomplete(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IncompleteQuery>,
) -> Result<Json<Vec<Customer>>, ServiceError> {
    let customers = state
        .dashboard_service
        .incomplete(query.branch_id, query.limit.unwrap_or(20))
        .await?;
    Ok(Json(customers))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub branch_id: Option<String>,
}

pub async fn performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PerformanceQuery>,
) -> Result<Json<Vec<PerformanceRow>>, ServiceError> {
    let range = DateRange {
        from: parse_opt_date(query.date_from.as_deref())?,
        to: parse_opt_date(query.date_to.as_deref())?,
    };
    let rows = state
        .dashboard_service
        .performance(range, query.branch_id)
        .await?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
pub struct StaleQuery {
    pub days: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn stale(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StaleQuery>,
) -> Result<Json<Vec<Customer>>, ServiceError> {
    let customers = state
        .dashboard_service
        .stale(query.days.unwrap_or(7), query.limit.unwrap_or(20))
        .await?;
    Ok(Json(customers))
}

#[derive(Deserialize)]
pub struct TimelineQuery {
    pub limit: Option<u32>,
}

pub async fn timeline(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Vec<TimelineEvent>>, ServiceError> {
    let events = state
        .dashboard_service
        .timeline(query.limit.unwrap_or(20))
        .await?;
    Ok(Json(events))
}
