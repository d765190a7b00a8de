// Hosted data API repository - row-level query/filter/sort/paginate
// primitives over HTTP (PostgREST dialect)
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::repositories::{
    ActivityPage, ActivityRepository, BranchRepository, CustomerFilter, CustomerPage,
    CustomerPatch, CustomerRepository, CustomerSort, PageRequest, Pagination, SettingsRepository,
    SortField, SortOrder, TeamRepository, UserRepository,
};
use crate::domain::activity::ActivityEntry;
use crate::domain::branch::{Branch, LandingTheme};
use crate::domain::customer::{Customer, CustomerStatus, UtmAttribution};
use crate::domain::permission::{PermissionMode, PermissionSet};
use crate::domain::team::Team;
use crate::domain::user::{Role, User};

#[derive(Debug, Clone)]
pub struct DataApiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl DataApiClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self, table: &str, query: &[(String, String)]) -> String {
        let mut url = format!("{}/{}", self.base_url, table);
        let mut sep = '?';
        for (key, value) in query {
            url.push(sep);
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            sep = '&';
        }
        url
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>> {
        let url = self.table_url(table, query);
        tracing::debug!(%url, "data api select");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .context("failed to reach the data api")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("data api select failed with status {}: {}", status, body);
        }

        response
            .json::<Vec<T>>()
            .await
            .context("failed to parse data api response")
    }

    /// Select with an exact row count (`Prefer: count=exact`); the total
    /// is carried in the Content-Range trailer (`0-19/53`).
    async fn fetch_rows_counted<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(String, String)],
    ) -> Result<(Vec<T>, u64)> {
        let url = self.table_url(table, query);
        tracing::debug!(%url, "data api counted select");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .header("Prefer", "count=exact")
            .send()
            .await
            .context("failed to reach the data api")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("data api select failed with status {}: {}", status, body);
        }

        let total = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .context("data api response is missing a row count")?;

        let rows = response
            .json::<Vec<T>>()
            .await
            .context("failed to parse data api response")?;
        Ok((rows, total))
    }

    /// Insert one row and read it back (`Prefer: return=representation`).
    async fn insert_row<T: Serialize, R: DeserializeOwned>(&self, table: &str, row: &T) -> Result<R> {
        let url = self.table_url(table, &[]);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await
            .context("failed to reach the data api")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("data api insert failed with status {}: {}", status, body);
        }

        let mut rows = response
            .json::<Vec<R>>()
            .await
            .context("failed to parse data api response")?;
        if rows.is_empty() {
            anyhow::bail!("data api insert returned no representation");
        }
        Ok(rows.remove(0))
    }

    /// Patch rows selected by `query` and read back the updated rows.
    async fn update_rows<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(String, String)],
        patch: &T,
    ) -> Result<Vec<R>> {
        let url = self.table_url(table, query);
        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await
            .context("failed to reach the data api")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("data api update failed with status {}: {}", status, body);
        }

        response
            .json::<Vec<R>>()
            .await
            .context("failed to parse data api response")
    }

    /// Insert-or-replace keyed rows (`Prefer: resolution=merge-duplicates`).
    async fn upsert_row<T: Serialize>(&self, table: &str, conflict_key: &str, row: &T) -> Result<()> {
        let query = vec![("on_conflict".to_string(), conflict_key.to_string())];
        let url = self.table_url(table, &query);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(row)
            .send()
            .await
            .context("failed to reach the data api")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("data api upsert failed with status {}: {}", status, body);
        }
        Ok(())
    }
}

fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit('/').next()?.parse().ok()
}

fn sort_param(sort: CustomerSort) -> String {
    let column = match sort.field {
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
        SortField::Name => "name",
        SortField::Status => "status",
        SortField::CallBackAt => "call_back_at",
    };
    let direction = match sort.order {
        SortOrder::Asc => "asc",
        SortOrder::Desc => "desc",
    };
    format!("{column}.{direction}")
}

/// Translate a row-level filter into the backend's query operators.
fn filter_params(filter: &CustomerFilter) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let push = |params: &mut Vec<(String, String)>, key: &str, value: String| {
        params.push((key.to_string(), value));
    };

    if !filter.statuses.is_empty() {
        let list = filter
            .statuses
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",");
        push(&mut params, "status", format!("in.({list})"));
    }
    if !filter.categories.is_empty() {
        push(
            &mut params,
            "categories",
            format!("cs.{{{}}}", filter.categories.join(",")),
        );
    }
    if let Some(branch_id) = &filter.branch_id {
        push(&mut params, "branch_id", format!("eq.{branch_id}"));
    }
    if let Some(assigned_to) = &filter.assigned_to {
        push(&mut params, "assigned_to", format!("eq.{assigned_to}"));
    }
    if let Some(search) = &filter.search {
        let term = search.trim();
        push(
            &mut params,
            "or",
            format!("(name.ilike.*{term}*,phone.like.*{term}*)"),
        );
    }
    if let Some(from) = filter.created_from {
        push(&mut params, "created_at", format!("gte.{}", from.to_rfc3339()));
    }
    if let Some(to) = filter.created_to {
        push(&mut params, "created_at", format!("lt.{}", to.to_rfc3339()));
    }
    if let Some(is_duplicate) = filter.is_duplicate {
        push(&mut params, "is_duplicate", format!("eq.{is_duplicate}"));
    }
    if let Some(has_license) = filter.has_license {
        push(&mut params, "has_license", format!("eq.{has_license}"));
    }
    if let Some(has_insurance) = filter.has_insurance {
        push(&mut params, "has_insurance", format!("eq.{has_insurance}"));
    }
    if let Some(has_credit_card) = filter.has_credit_card {
        push(&mut params, "has_credit_card", format!("eq.{has_credit_card}"));
    }
    if let Some(from) = filter.callback_from {
        push(&mut params, "call_back_at", format!("gte.{}", from.to_rfc3339()));
    }
    if let Some(to) = filter.callback_to {
        push(&mut params, "call_back_at", format!("lt.{}", to.to_rfc3339()));
    }
    if let Some(before) = filter.updated_before {
        push(&mut params, "updated_at", format!("lt.{}", before.to_rfc3339()));
    }
    if filter.incomplete_only {
        push(
            &mut params,
            "or",
            "(name.is.null,assigned_to.is.null)".to_string(),
        );
    }
    params
}

// Row shapes mirror the backend's snake_case columns; the mapping
// functions below convert to and from the domain models.

#[derive(Debug, Serialize, Deserialize)]
struct CustomerRow {
    id: String,
    name: Option<String>,
    phone: String,
    branch_id: String,
    assigned_to: Option<String>,
    status: CustomerStatus,
    #[serde(default)]
    categories: Vec<String>,
    source: Option<String>,
    utm_source: Option<String>,
    utm_medium: Option<String>,
    utm_campaign: Option<String>,
    is_duplicate: bool,
    has_license: Option<bool>,
    has_insurance: Option<bool>,
    has_credit_card: Option<bool>,
    call_back_at: Option<DateTime<Utc>>,
    memo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn customer_to_row(customer: Customer) -> CustomerRow {
    CustomerRow {
        id: customer.id,
        name: customer.name,
        phone: customer.phone,
        branch_id: customer.branch_id,
        assigned_to: customer.assigned_to,
        status: customer.status,
        categories: customer.categories,
        source: customer.source,
        utm_source: customer.utm.source,
        utm_medium: customer.utm.medium,
        utm_campaign: customer.utm.campaign,
        is_duplicate: customer.is_duplicate,
        has_license: customer.has_license,
        has_insurance: customer.has_insurance,
        has_credit_card: customer.has_credit_card,
        call_back_at: customer.call_back_at,
        memo: customer.memo,
        created_at: customer.created_at,
        updated_at: customer.updated_at,
    }
}

fn customer_from_row(row: CustomerRow) -> Customer {
    Customer {
        id: row.id,
        name: row.name,
        phone: row.phone,
        branch_id: row.branch_id,
        assigned_to: row.assigned_to,
        status: row.status,
        categories: row.categories,
        source: row.source,
        utm: UtmAttribution {
            source: row.utm_source,
            medium: row.utm_medium,
            campaign: row.utm_campaign,
        },
        is_duplicate: row.is_duplicate,
        has_license: row.has_license,
        has_insurance: row.has_insurance,
        has_credit_card: row.has_credit_card,
        call_back_at: row.call_back_at,
        memo: row.memo,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Sparse customer patch; only populated columns are sent.
#[derive(Debug, Serialize)]
struct CustomerPatchRow<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<CustomerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assigned_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_license: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_insurance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    has_credit_card: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    call_back_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl CustomerRepository for DataApiClient {
    async fn insert(&self, customer: Customer) -> Result<Customer> {
        let row: CustomerRow = self
            .insert_row("customers", &customer_to_row(customer))
            .await?;
        Ok(customer_from_row(row))
    }

    async fn get(&self, id: &str) -> Result<Option<Customer>> {
        let query = vec![("id".to_string(), format!("eq.{id}"))];
        let rows: Vec<CustomerRow> = self.fetch_rows("customers", &query).await?;
        Ok(rows.into_iter().next().map(customer_from_row))
    }

    async fn find_by_phone(&self, phone: &str, branch_id: Option<&str>) -> Result<Vec<Customer>> {
        let mut query = vec![
            ("phone".to_string(), format!("eq.{phone}")),
            ("order".to_string(), "created_at.asc".to_string()),
        ];
        if let Some(branch_id) = branch_id {
            query.push(("branch_id".to_string(), format!("eq.{branch_id}")));
        }
        let rows: Vec<CustomerRow> = self.fetch_rows("customers", &query).await?;
        Ok(rows.into_iter().map(customer_from_row).collect())
    }

    async fn list(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
        page: PageRequest,
    ) -> Result<CustomerPage> {
        let mut query = filter_params(filter);
        query.push(("order".to_string(), sort_param(sort)));
        query.push(("limit".to_string(), page.limit.to_string()));
        query.push(("offset".to_string(), page.offset().to_string()));

        let (rows, total): (Vec<CustomerRow>, u64) =
            self.fetch_rows_counted("customers", &query).await?;
        Ok(CustomerPage {
            customers: rows.into_iter().map(customer_from_row).collect(),
            pagination: Pagination::new(page, total),
        })
    }

    async fn apply_patch(&self, id: &str, patch: &CustomerPatch) -> Result<Option<Customer>> {
        let query = vec![("id".to_string(), format!("eq.{id}"))];
        let row = CustomerPatchRow {
            name: patch.name.as_deref(),
            status: patch.status,
            assigned_to: patch.assigned_to.as_deref(),
            categories: patch.categories.as_deref(),
            memo: patch.memo.as_deref(),
            has_license: patch.has_license,
            has_insurance: patch.has_insurance,
            has_credit_card: patch.has_credit_card,
            call_back_at: patch.call_back_at,
            updated_at: Utc::now(),
        };
        let rows: Vec<CustomerRow> = self.update_rows("customers", &query, &row).await?;
        Ok(rows.into_iter().next().map(customer_from_row))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserRow {
    id: String,
    username: String,
    display_name: String,
    role: Role,
    branch_id: Option<String>,
    team_id: Option<String>,
    permission_mode: PermissionMode,
    custom_permissions: PermissionSet,
    #[serde(default)]
    memo: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

fn user_to_row(user: User) -> UserRow {
    UserRow {
        id: user.id,
        username: user.username,
        display_name: user.display_name,
        role: user.role,
        branch_id: user.branch_id,
        team_id: user.team_id,
        permission_mode: user.permission_mode,
        custom_permissions: user.custom_permissions,
        memo: user.memo,
        is_active: user.is_active,
        created_at: user.created_at,
    }
}

fn user_from_row(row: UserRow) -> User {
    User {
        id: row.id,
        username: row.username,
        display_name: row.display_name,
        role: row.role,
        branch_id: row.branch_id,
        team_id: row.team_id,
        permission_mode: row.permission_mode,
        custom_permissions: row.custom_permissions,
        memo: row.memo,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}

#[async_trait]
impl UserRepository for DataApiClient {
    async fn insert(&self, user: User) -> Result<User> {
        let row: UserRow = self.insert_row("users", &user_to_row(user)).await?;
        Ok(user_from_row(row))
    }

    async fn update(&self, user: User) -> Result<User> {
        let query = vec![("id".to_string(), format!("eq.{}", user.id))];
        let rows: Vec<UserRow> = self
            .update_rows("users", &query, &user_to_row(user))
            .await?;
        rows.into_iter()
            .next()
            .map(user_from_row)
            .context("user update matched no row")
    }

    async fn get(&self, id: &str) -> Result<Option<User>> {
        let query = vec![("id".to_string(), format!("eq.{id}"))];
        let rows: Vec<UserRow> = self.fetch_rows("users", &query).await?;
        Ok(rows.into_iter().next().map(user_from_row))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let query = vec![("username".to_string(), format!("eq.{username}"))];
        let rows: Vec<UserRow> = self.fetch_rows("users", &query).await?;
        Ok(rows.into_iter().next().map(user_from_row))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let query = vec![("order".to_string(), "created_at.asc".to_string())];
        let rows: Vec<UserRow> = self.fetch_rows("users", &query).await?;
        Ok(rows.into_iter().map(user_from_row).collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TeamRow {
    id: String,
    name: String,
    branch_id: String,
    leader_id: Option<String>,
    #[serde(default)]
    memo: String,
    #[serde(default)]
    member_ids: Vec<String>,
}

fn team_to_row(team: Team) -> TeamRow {
    TeamRow {
        id: team.id,
        name: team.name,
        branch_id: team.branch_id,
        leader_id: team.leader_id,
        memo: team.memo,
        member_ids: team.member_ids,
    }
}

fn team_from_row(row: TeamRow) -> Team {
    Team {
        id: row.id,
        name: row.name,
        branch_id: row.branch_id,
        leader_id: row.leader_id,
        memo: row.memo,
        member_ids: row.member_ids,
    }
}

#[async_trait]
impl TeamRepository for DataApiClient {
    async fn insert(&self, team: Team) -> Result<Team> {
        let row: TeamRow = self.insert_row("teams", &team_to_row(team)).await?;
        Ok(team_from_row(row))
    }

    async fn update(&self, team: Team) -> Result<Team> {
        let query = vec![("id".to_string(), format!("eq.{}", team.id))];
        let rows: Vec<TeamRow> = self.update_rows("teams", &query, &team_to_row(team)).await?;
        rows.into_iter()
            .next()
            .map(team_from_row)
            .context("team update matched no row")
    }

    async fn get(&self, id: &str) -> Result<Option<Team>> {
        let query = vec![("id".to_string(), format!("eq.{id}"))];
        let rows: Vec<TeamRow> = self.fetch_rows("teams", &query).await?;
        Ok(rows.into_iter().next().map(team_from_row))
    }

    async fn list(&self) -> Result<Vec<Team>> {
        let query = vec![("order".to_string(), "name.asc".to_string())];
        let rows: Vec<TeamRow> = self.fetch_rows("teams", &query).await?;
        Ok(rows.into_iter().map(team_from_row).collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BranchRow {
    id: String,
    name: String,
    slug: String,
    is_active: bool,
    #[serde(default)]
    landing: Option<LandingTheme>,
}

fn branch_from_row(row: BranchRow) -> Branch {
    Branch {
        id: row.id,
        name: row.name,
        slug: row.slug,
        is_active: row.is_active,
        landing: row.landing.unwrap_or_default(),
    }
}

#[async_trait]
impl BranchRepository for DataApiClient {
    async fn get(&self, id: &str) -> Result<Option<Branch>> {
        let query = vec![("id".to_string(), format!("eq.{id}"))];
        let rows: Vec<BranchRow> = self.fetch_rows("branches", &query).await?;
        Ok(rows.into_iter().next().map(branch_from_row))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Branch>> {
        let query = vec![("slug".to_string(), format!("eq.{slug}"))];
        let rows: Vec<BranchRow> = self.fetch_rows("branches", &query).await?;
        Ok(rows.into_iter().next().map(branch_from_row))
    }

    async fn list(&self) -> Result<Vec<Branch>> {
        let query = vec![("order".to_string(), "name.asc".to_string())];
        let rows: Vec<BranchRow> = self.fetch_rows("branches", &query).await?;
        Ok(rows.into_iter().map(branch_from_row).collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ActivityRow {
    id: String,
    user_id: String,
    action: String,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl ActivityRepository for DataApiClient {
    async fn append(&self, entry: ActivityEntry) -> Result<()> {
        let row = ActivityRow {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            detail: entry.detail,
            created_at: entry.created_at,
        };
        let _: ActivityRow = self.insert_row("user_activity", &row).await?;
        Ok(())
    }

    async fn list_page(&self, user_id: &str, page: PageRequest) -> Result<ActivityPage> {
        let query = vec![
            ("user_id".to_string(), format!("eq.{user_id}")),
            ("order".to_string(), "created_at.desc".to_string()),
            ("limit".to_string(), page.limit.to_string()),
            ("offset".to_string(), page.offset().to_string()),
        ];
        let (rows, total): (Vec<ActivityRow>, u64) =
            self.fetch_rows_counted("user_activity", &query).await?;
        Ok(ActivityPage {
            entries: rows
                .into_iter()
                .map(|row| ActivityEntry {
                    id: row.id,
                    user_id: row.user_id,
                    action: row.action,
                    detail: row.detail,
                    created_at: row.created_at,
                })
                .collect(),
            pagination: Pagination::new(page, total),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingRow {
    key: String,
    value: serde_json::Value,
}

#[async_trait]
impl SettingsRepository for DataApiClient {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let query = vec![("key".to_string(), format!("eq.{key}"))];
        let rows: Vec<SettingRow> = self.fetch_rows("settings", &query).await?;
        Ok(rows.into_iter().next().map(|row| row.value))
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let row = SettingRow {
            key: key.to_string(),
            value,
        };
        self.upsert_row("settings", "key", &row).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_row_json() -> serde_json::Value {
        serde_json::json!({
            "id": "c1",
            "name": "Kim Minjun",
            "phone": "01012345678",
            "branch_id": "branch-gangnam",
            "assigned_to": null,
            "status": "new",
            "categories": [],
            "source": "landing",
            "utm_source": "naver",
            "utm_medium": null,
            "utm_campaign": null,
            "is_duplicate": false,
            "has_license": null,
            "has_insurance": null,
            "has_credit_card": null,
            "call_back_at": null,
            "memo": null,
            "created_at": "2026-08-01T09:00:00Z",
            "updated_at": "2026-08-01T09:00:00Z"
        })
    }

    #[test]
    fn content_range_parsing() {
        assert_eq!(parse_content_range_total("0-19/53"), Some(53));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn filter_translates_to_query_operators() {
        let filter = CustomerFilter {
            statuses: vec![CustomerStatus::New, CustomerStatus::CallBack],
            branch_id: Some("branch-gangnam".to_string()),
            search: Some("kim".to_string()),
            is_duplicate: Some(true),
            incomplete_only: true,
            ..CustomerFilter::default()
        };
        let params = filter_params(&filter);
        assert!(params.contains(&("status".to_string(), "in.(new,call_back)".to_string())));
        assert!(params.contains(&("branch_id".to_string(), "eq.branch-gangnam".to_string())));
        assert!(params.contains(&(
            "or".to_string(),
            "(name.ilike.*kim*,phone.like.*kim*)".to_string()
        )));
        assert!(params.contains(&("is_duplicate".to_string(), "eq.true".to_string())));
        assert!(params.contains(&(
            "or".to_string(),
            "(name.is.null,assigned_to.is.null)".to_string()
        )));
    }

    #[tokio::test]
    async fn list_reads_rows_and_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers"))
            .and(query_param("status", "in.(new)"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "0"))
            .and(header("Prefer", "count=exact"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-range", "0-0/41")
                    .set_body_json(serde_json::json!([sample_row_json()])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = DataApiClient::new(server.uri(), "key".to_string());
        let filter = CustomerFilter {
            statuses: vec![CustomerStatus::New],
            ..CustomerFilter::default()
        };
        let page = CustomerRepository::list(&client, &filter, CustomerSort::default(), PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 41);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.customers.len(), 1);
        assert_eq!(page.customers[0].utm.source.as_deref(), Some("naver"));
    }

    #[tokio::test]
    async fn insert_round_trips_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .and(header("Prefer", "return=representation"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!([sample_row_json()])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = DataApiClient::new(server.uri(), "key".to_string());
        let customer = customer_from_row(serde_json::from_value(sample_row_json()).unwrap());
        let stored = CustomerRepository::insert(&client, customer.clone()).await.unwrap();
        assert_eq!(stored, customer);
    }

    #[tokio::test]
    async fn settings_upsert_targets_conflict_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/settings"))
            .and(query_param("on_conflict", "key"))
            .and(header("Prefer", "resolution=merge-duplicates"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = DataApiClient::new(server.uri(), "key".to_string());
        client
            .put("statusBadges", serde_json::json!({"new": "#16a34a"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn backend_error_is_reported_with_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = DataApiClient::new(server.uri(), "key".to_string());
        let err = CustomerRepository::get(&client, "c1").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
