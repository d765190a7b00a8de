// In-memory backend - local development mode and the test double for
// every repository trait
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::repositories::{
    ActivityPage, ActivityRepository, BranchRepository, CustomerFilter, CustomerPage,
    CustomerPatch, CustomerRepository, CustomerSort, PageRequest, Pagination, SettingsRepository,
    SortField, SortOrder, TeamRepository, UserRepository,
};
use crate::domain::activity::ActivityEntry;
use crate::domain::branch::{Branch, LandingTheme};
use crate::domain::customer::Customer;
use crate::domain::permission::{PermissionMode, PermissionSet};
use crate::domain::team::Team;
use crate::domain::user::{Role, User};

#[derive(Default)]
pub struct MemoryStore {
    customers: RwLock<Vec<Customer>>,
    users: RwLock<Vec<User>>,
    teams: RwLock<Vec<Team>>,
    branches: RwLock<Vec<Branch>>,
    activity: RwLock<Vec<ActivityEntry>>,
    settings: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a few branches provisioned, mirroring what the hosted
    /// backend would already contain.
    pub fn with_sample_branches() -> Self {
        let store = Self::new();
        {
            let mut branches = store.branches.try_write().expect("fresh store");
            branches.push(Branch {
                id: "branch-gangnam".to_string(),
                name: "Gangnam".to_string(),
                slug: "gangnam".to_string(),
                is_active: true,
                landing: LandingTheme::default(),
            });
            branches.push(Branch {
                id: "branch-pangyo".to_string(),
                name: "Pangyo".to_string(),
                slug: "pangyo".to_string(),
                is_active: true,
                landing: LandingTheme {
                    title: "Pangyo consultation".to_string(),
                    ..LandingTheme::default()
                },
            });
            branches.push(Branch {
                id: "branch-closed".to_string(),
                name: "Closed branch".to_string(),
                slug: "closed".to_string(),
                is_active: false,
                landing: LandingTheme::default(),
            });
        }
        store
    }

    /// Two ready-made accounts for tests and local development.
    pub async fn seed_sample_users(&self) {
        let mut users = self.users.write().await;
        for (id, username, role) in [
            ("user-1", "agent1", Role::Agent),
            ("user-2", "manager1", Role::Manager),
        ] {
            users.push(User {
                id: id.to_string(),
                username: username.to_string(),
                display_name: username.to_string(),
                role,
                branch_id: Some("branch-gangnam".to_string()),
                team_id: None,
                permission_mode: PermissionMode::RoleOnly,
                custom_permissions: PermissionSet::empty(),
                memo: String::new(),
                is_active: true,
                created_at: Utc::now(),
            });
        }
    }

    fn matches(filter: &CustomerFilter, customer: &Customer) -> bool {
        if !filter.statuses.is_empty() && !filter.statuses.contains(&customer.status) {
            return false;
        }
        if !filter.categories.is_empty()
            && !filter
                .categories
                .iter()
                .any(|c| customer.categories.contains(c))
        {
            return false;
        }
        if let Some(branch_id) = &filter.branch_id {
            if &customer.branch_id != branch_id {
                return false;
            }
        }
        if let Some(assigned_to) = &filter.assigned_to {
            if customer.assigned_to.as_deref() != Some(assigned_to.as_str()) {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let name_hit = customer
                .name
                .as_deref()
                .map(|n| n.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !name_hit && !customer.phone.contains(search.trim()) {
                return false;
            }
        }
        if let Some(from) = filter.created_from {
            if customer.created_at < from {
                return false;
            }
        }
        if let Some(to) = filter.created_to {
            if customer.created_at >= to {
                return false;
            }
        }
        if let Some(is_duplicate) = filter.is_duplicate {
            if customer.is_duplicate != is_duplicate {
                return false;
            }
        }
        if let Some(has_license) = filter.has_license {
            if customer.has_license != Some(has_license) {
                return false;
            }
        }
        if let Some(has_insurance) = filter.has_insurance {
            if customer.has_insurance != Some(has_insurance) {
                return false;
            }
        }
        if let Some(has_credit_card) = filter.has_credit_card {
            if customer.has_credit_card != Some(has_credit_card) {
                return false;
            }
        }
        if let Some(from) = filter.callback_from {
            match customer.call_back_at {
                Some(at) if at >= from => {}
                _ => return false,
            }
        }
        if let Some(to) = filter.callback_to {
            match customer.call_back_at {
                Some(at) if at < to => {}
                _ => return false,
            }
        }
        if let Some(before) = filter.updated_before {
            if customer.updated_at >= before {
                return false;
            }
        }
        if filter.incomplete_only && !customer.is_incomplete() {
            return false;
        }
        true
    }

    fn sort(customers: &mut [Customer], sort: CustomerSort) {
        customers.sort_by(|a, b| {
            let ordering = match sort.field {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                SortField::Name => a.name.cmp(&b.name),
                SortField::Status => a.status.cmp(&b.status),
                SortField::CallBackAt => a.call_back_at.cmp(&b.call_back_at),
            };
            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn insert(&self, customer: Customer) -> anyhow::Result<Customer> {
        self.customers.write().await.push(customer.clone());
        Ok(customer)
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Customer>> {
        Ok(self
            .customers
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_phone(
        &self,
        phone: &str,
        branch_id: Option<&str>,
    ) -> anyhow::Result<Vec<Customer>> {
        let mut matches: Vec<Customer> = self
            .customers
            .read()
            .await
            .iter()
            .filter(|c| c.phone == phone)
            .filter(|c| branch_id.is_none_or(|b| c.branch_id == b))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matches)
    }

    async fn list(
        &self,
        filter: &CustomerFilter,
        sort: CustomerSort,
        page: PageRequest,
    ) -> anyhow::Result<CustomerPage> {
        let mut matches: Vec<Customer> = self
            .customers
            .read()
            .await
            .iter()
            .filter(|c| Self::matches(filter, c))
            .cloned()
            .collect();
        Self::sort(&mut matches, sort);

        let total = matches.len() as u64;
        let start = (page.offset() as usize).min(matches.len());
        let end = (start + page.limit as usize).min(matches.len());

        Ok(CustomerPage {
            customers: matches[start..end].to_vec(),
            pagination: Pagination::new(page, total),
        })
    }

    async fn apply_patch(
        &self,
        id: &str,
        patch: &CustomerPatch,
    ) -> anyhow::Result<Option<Customer>> {
        let mut customers = self.customers.write().await;
        let Some(customer) = customers.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            customer.name = Some(name.clone());
        }
        if let Some(status) = patch.status {
            customer.status = status;
        }
        if let Some(assigned_to) = &patch.assigned_to {
            customer.assigned_to = Some(assigned_to.clone());
        }
        if let Some(categories) = &patch.categories {
            customer.categories = categories.clone();
        }
        if let Some(memo) = &patch.memo {
            customer.memo = Some(memo.clone());
        }
        if let Some(has_license) = patch.has_license {
            customer.has_license = Some(has_license);
        }
        if let Some(has_insurance) = patch.has_insurance {
            customer.has_insurance = Some(has_insurance);
        }
        if let Some(has_credit_card) = patch.has_credit_card {
            customer.has_credit_card = Some(has_credit_card);
        }
        if let Some(call_back_at) = patch.call_back_at {
            customer.call_back_at = Some(call_back_at);
        }
        customer.updated_at = Utc::now();
        Ok(Some(customer.clone()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: User) -> anyhow::Result<User> {
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> anyhow::Result<User> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => anyhow::bail!("user '{}' does not exist", user.id),
        }
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.users.read().await.clone())
    }
}

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn insert(&self, team: Team) -> anyhow::Result<Team> {
        self.teams.write().await.push(team.clone());
        Ok(team)
    }

    async fn update(&self, team: Team) -> anyhow::Result<Team> {
        let mut teams = self.teams.write().await;
        match teams.iter_mut().find(|t| t.id == team.id) {
            Some(existing) => {
                *existing = team.clone();
                Ok(team)
            }
            None => anyhow::bail!("team '{}' does not exist", team.id),
        }
    }

    async fn get(&self, id: &str) -> anyhow::Result<Option<Team>> {
        Ok(self.teams.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Team>> {
        Ok(self.teams.read().await.clone())
    }
}

#[async_trait]
impl BranchRepository for MemoryStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Branch>> {
        Ok(self
            .branches
            .read()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> anyhow::Result<Option<Branch>> {
        Ok(self
            .branches
            .read()
            .await
            .iter()
            .find(|b| b.slug == slug)
            .cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<Branch>> {
        Ok(self.branches.read().await.clone())
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn append(&self, entry: ActivityEntry) -> anyhow::Result<()> {
        self.activity.write().await.push(entry);
        Ok(())
    }

    async fn list_page(&self, user_id: &str, page: PageRequest) -> anyhow::Result<ActivityPage> {
        let mut entries: Vec<ActivityEntry> = self
            .activity
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = entries.len() as u64;
        let start = (page.offset() as usize).min(entries.len());
        let end = (start + page.limit as usize).min(entries.len());

        Ok(ActivityPage {
            entries: entries[start..end].to_vec(),
            pagination: Pagination::new(page, total),
        })
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        Ok(self.settings.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> anyhow::Result<()> {
        self.settings.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{CustomerStatus, UtmAttribution};
    use chrono::Duration;

    fn customer(id: &str, name: &str, phone: &str, status: CustomerStatus) -> Customer {
        let now = Utc::now();
        Customer {
            id: id.to_string(),
            name: Some(name.to_string()),
            phone: phone.to_string(),
            branch_id: "branch-gangnam".to_string(),
            assigned_to: Some("user-1".to_string()),
            status,
            categories: vec!["walk-in".to_string()],
            source: None,
            utm: UtmAttribution::default(),
            is_duplicate: false,
            has_license: Some(true),
            has_insurance: None,
            has_credit_card: None,
            call_back_at: None,
            memo: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn list_filters_by_status_and_search() {
        let store = MemoryStore::new();
        CustomerRepository::insert(&store, customer("c1", "Kim Minjun", "01011112222", CustomerStatus::New))
            .await
            .unwrap();
        CustomerRepository::insert(&store, customer("c2", "Lee Seoyeon", "01033334444", CustomerStatus::Converted))
            .await
            .unwrap();

        let filter = CustomerFilter {
            statuses: vec![CustomerStatus::New],
            ..CustomerFilter::default()
        };
        let page = CustomerRepository::list(&store, &filter, CustomerSort::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.customers.len(), 1);
        assert_eq!(page.customers[0].id, "c1");

        let filter = CustomerFilter {
            search: Some("seoyeon".to_string()),
            ..CustomerFilter::default()
        };
        let page = CustomerRepository::list(&store, &filter, CustomerSort::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.customers.len(), 1);
        assert_eq!(page.customers[0].id, "c2");

        // Phone search matches digits
        let filter = CustomerFilter {
            search: Some("0103333".to_string()),
            ..CustomerFilter::default()
        };
        let page = CustomerRepository::list(&store, &filter, CustomerSort::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.customers[0].id, "c2");
    }

    #[tokio::test]
    async fn list_sorts_and_paginates() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let mut c = customer(
                &format!("c{i}"),
                &format!("Name {i}"),
                &format!("0101111000{i}"),
                CustomerStatus::New,
            );
            c.created_at = Utc::now() - Duration::hours(i as i64);
            c.updated_at = c.created_at;
            CustomerRepository::insert(&store, c).await.unwrap();
        }

        // Default sort is created_at desc: c0 is the newest
        let page = CustomerRepository::list(
                &store,
                &CustomerFilter::default(),
                CustomerSort::default(),
                PageRequest { page: 1, limit: 2 },
            )
            .await
            .unwrap();
        assert_eq!(page.customers[0].id, "c0");
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);

        let page2 = CustomerRepository::list(
                &store,
                &CustomerFilter::default(),
                CustomerSort::default(),
                PageRequest { page: 2, limit: 2 },
            )
            .await
            .unwrap();
        assert_eq!(page2.customers[0].id, "c2");

        // Ascending flips the order
        let asc = CustomerRepository::list(
                &store,
                &CustomerFilter::default(),
                CustomerSort {
                    field: SortField::CreatedAt,
                    order: SortOrder::Asc,
                },
                PageRequest { page: 1, limit: 2 },
            )
            .await
            .unwrap();
        assert_eq!(asc.customers[0].id, "c4");
    }

    #[tokio::test]
    async fn patch_updates_fields_and_timestamp() {
        let store = MemoryStore::new();
        let before = customer("c1", "Kim", "01011112222", CustomerStatus::New);
        CustomerRepository::insert(&store, before.clone()).await.unwrap();

        let patch = CustomerPatch {
            status: Some(CustomerStatus::InProgress),
            memo: Some("called twice".to_string()),
            ..CustomerPatch::default()
        };
        let after = store.apply_patch("c1", &patch).await.unwrap().unwrap();
        assert_eq!(after.status, CustomerStatus::InProgress);
        assert_eq!(after.memo.as_deref(), Some("called twice"));
        assert!(after.updated_at >= before.updated_at);
        // Untouched fields survive
        assert_eq!(after.name.as_deref(), Some("Kim"));

        assert!(store
            .apply_patch("missing", &patch)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn incomplete_filter_finds_unassigned() {
        let store = MemoryStore::new();
        let mut unassigned = customer("c1", "Kim", "01011112222", CustomerStatus::New);
        unassigned.assigned_to = None;
        CustomerRepository::insert(&store, unassigned).await.unwrap();
        CustomerRepository::insert(&store, customer("c2", "Lee", "01033334444", CustomerStatus::New))
            .await
            .unwrap();

        let filter = CustomerFilter {
            incomplete_only: true,
            ..CustomerFilter::default()
        };
        let page = CustomerRepository::list(&store, &filter, CustomerSort::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.customers.len(), 1);
        assert_eq!(page.customers[0].id, "c1");
    }
}
