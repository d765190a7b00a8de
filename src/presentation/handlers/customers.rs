// Customer endpoints - public intake, listing, duplicate check, edits
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::customer_service::CustomerIntake;
use crate::application::error::ServiceError;
use crate::application::repositories::{
    CustomerFilter, CustomerPatch, CustomerSort, PageRequest, Pagination, SortField, SortOrder,
};
use crate::domain::customer::{Customer, CustomerStatus, UtmAttribution};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{parse_csv, parse_opt_date, parse_statuses};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    pub phone: String,
    pub branch_id: String,
    pub name: Option<String>,
    pub source: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    pub success: bool,
    pub customer: IntakeCustomer,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeCustomer {
    pub id: String,
    pub is_duplicate: bool,
}

pub async fn intake(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IntakeRequest>,
) -> Result<Json<IntakeResponse>, ServiceError> {
    let outcome = state
        .customer_service
        .intake(CustomerIntake {
            phone: request.phone,
            branch_id: request.branch_id,
            name: request.name,
            source: request.source,
            utm: UtmAttribution {
                source: request.utm_source,
                medium: request.utm_medium,
                campaign: request.utm_campaign,
            },
        })
        .await?;

    Ok(Json(IntakeResponse {
        success: true,
        customer: IntakeCustomer {
            id: outcome.id,
            is_duplicate: outcome.is_duplicate,
        },
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub statuses: Option<String>,
    pub categories: Option<String>,
    pub branch_id: Option<String>,
    pub assigned_to: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub is_duplicate: Option<bool>,
    pub has_license: Option<bool>,
    pub has_insurance: Option<bool>,
    pub has_credit_card: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub customers: Vec<Customer>,
    pub pagination: Pagination,
}

fn parse_sort(sort_by: Option<&str>, sort_order: Option<&str>) -> Result<CustomerSort, ServiceError> {
    let field = match sort_by {
        None => SortField::CreatedAt,
        Some("createdAt") => SortField::CreatedAt,
        Some("updatedAt") => SortField::UpdatedAt,
        Some("name") => SortField::Name,
        Some("status") => SortField::Status,
        Some("callBackAt") => SortField::CallBackAt,
        Some(other) => {
            return Err(ServiceError::validation(format!("unknown sort field '{other}'")))
        }
    };
    let order = match sort_order {
        None => SortOrder::Desc,
        Some("asc") => SortOrder::Asc,
        Some("desc") => SortOrder::Desc,
        Some(other) => {
            return Err(ServiceError::validation(format!("unknown sort order '{other}'")))
        }
    };
    Ok(CustomerSort { field, order })
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ServiceError> {
    let filter = CustomerFilter {
        statuses: parse_statuses(query.status.as_deref(), query.statuses.as_deref())?,
        categories: query.categories.as_deref().map(parse_csv).unwrap_or_default(),
        branch_id: query.branch_id,
        assigned_to: query.assigned_to,
        search: query.search,
        created_from: parse_opt_date(query.date_from.as_deref())?,
        created_to: parse_opt_date(query.date_to.as_deref())?,
        is_duplicate: query.is_duplicate,
        has_license: query.has_license,
        has_insurance: query.has_insurance,
        has_credit_card: query.has_credit_card,
        ..CustomerFilter::default()
    };
    let sort = parse_sort(query.sort_by.as_deref(), query.sort_order.as_deref())?;
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(20),
    };

    let result = state.customer_service.list(filter, sort, page).await?;
    Ok(Json(ListResponse {
        customers: result.customers,
        pagination: result.pagination,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckRequest {
    pub phone: String,
    pub branch_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckResponse {
    pub is_duplicate: bool,
    pub existing_customer: Option<ExistingCustomer>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingCustomer {
    pub id: String,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
}

pub async fn duplicate_check(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DuplicateCheckRequest>,
) -> Result<Json<DuplicateCheckResponse>, ServiceError> {
    let check = state
        .customer_service
        .duplicate_check(&request.phone, request.branch_id.as_deref())
        .await?;

    Ok(Json(DuplicateCheckResponse {
        is_duplicate: check.is_duplicate,
        existing_customer: check.existing.map(|c| ExistingCustomer {
            id: c.id,
            status: c.status,
            created_at: c.created_at,
        }),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub name: Option<String>,
    pub status: Option<CustomerStatus>,
    pub assigned_to: Option<String>,
    pub categories: Option<Vec<String>>,
    pub memo: Option<String>,
    pub has_license: Option<bool>,
    pub has_insurance: Option<bool>,
    pub has_credit_card: Option<bool>,
    pub call_back_at: Option<DateTime<Utc>>,
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRequest>,
) -> Result<Json<Customer>, ServiceError> {
    let patch = CustomerPatch {
        name: request.name,
        status: request.status,
        assigned_to: request.assigned_to,
        categories: request.categories,
        memo: request.memo,
        has_license: request.has_license,
        has_insurance: request.has_insurance,
        has_credit_card: request.has_credit_card,
        call_back_at: request.call_back_at,
    };
    let customer = state.customer_service.update(&id, patch).await?;
    Ok(Json(customer))
}
