// Repository and provider traits over the hosted data API
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::activity::ActivityEntry;
use crate::domain::branch::Branch;
use crate::domain::customer::{Customer, CustomerStatus};
use crate::domain::team::Team;
use crate::domain::user::User;

/// Row-level filter over the customers table. Every field is optional;
/// the repository translates the populated ones into backend query
/// parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerFilter {
    pub statuses: Vec<CustomerStatus>,
    pub categories: Vec<String>,
    pub branch_id: Option<String>,
    pub assigned_to: Option<String>,
    /// Free-text match over name and phone.
    pub search: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub is_duplicate: Option<bool>,
    pub has_license: Option<bool>,
    pub has_insurance: Option<bool>,
    pub has_credit_card: Option<bool>,
    pub callback_from: Option<DateTime<Utc>>,
    pub callback_to: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
    pub incomplete_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Name,
    Status,
    CallBackAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for CustomerSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

/// 1-based page request. `limit` is capped by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        (self.page.max(1) as u64 - 1) * self.limit as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = request.limit.max(1);
        Self {
            page: request.page.max(1),
            limit,
            total,
            total_pages: total.div_ceil(limit as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub pagination: Pagination,
}

/// Partial update for inline edits; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerPatch {
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

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn insert(&self, customer: Customer) -> anyhow::Result<Customer>;
    async fn get(&self, id: &str) -> anyhow::Result<Option<Customer>>;
    /// All customers with the given normalized phone, optionally scoped
    /// to one branch, oldest first.
    async fn find_by_phone(
        &self,
        phone: &str,
        branch_id: Option<&str>,
    ) -> anyhow::Result<Vec<Customer>>;
    async fn list(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
        page: PageRequest,
    ) -> anyhow::Result<CustomerPage>;
    async fn apply_patch(
        &self,
        id: &str,
        patch: &CustomerPatch,
    ) -> anyhow::Result<Option<Customer>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> anyhow::Result<User>;
    async fn update(&self, user: User) -> anyhow::Result<User>;
    async fn get(&self, id: &str) -> anyhow::Result<Option<User>>;
    async fn get_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn insert(&self, team: Team) -> anyhow::Result<Team>;
    async fn update(&self, team: Team) -> anyhow::Result<Team>;
    async fn get(&self, id: &str) -> anyhow::Result<Option<Team>>;
    async fn list(&self) -> anyhow::Result<Vec<Team>>;
}

#[async_trait]
pub trait BranchRepository: Send + Sync {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Branch>>;
    async fn get_by_slug(&self, slug: &str) -> anyhow::Result<Option<Branch>>;
    async fn list(&self) -> anyhow::Result<Vec<Branch>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityPage {
    pub entries: Vec<ActivityEntry>,
    pub pagination: Pagination,
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn append(&self, entry: ActivityEntry) -> anyhow::Result<()>;
    /// Newest first.
    async fn list_page(&self, user_id: &str, page: PageRequest) -> anyhow::Result<ActivityPage>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>>;
    async fn put(&self, key: &str, value: serde_json::Value) -> anyhow::Result<()>;
}

/// External credential-exchange service. Implementations derive the
/// synthetic email/password pair from the username and 4-digit PIN.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_account(&self, username: &str, pin: &str) -> anyhow::Result<()>;
    async fn update_password(&self, username: &str, pin: &str) -> anyhow::Result<()>;
}
