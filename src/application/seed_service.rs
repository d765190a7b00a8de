// Development-only synthetic data generator
use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repositories::{BranchRepository, CustomerRepository};
use crate::domain::customer::{Customer, CustomerStatus, UtmAttribution};

const SAMPLE_NAMES: [&str; 8] = [
    "Kim Minjun",
    "Lee Seoyeon",
    "Park Jihoo",
    "Choi Haeun",
    "Jung Woojin",
    "Kang Yuna",
    "Cho Dohyun",
    "Yoon Chaewon",
];

const SAMPLE_SOURCES: [&str; 4] = ["landing", "referral", "ad_kakao", "ad_naver"];

#[derive(Clone)]
pub struct SeedService {
    customers: Arc<dyn CustomerRepository>,
    branches: Arc<dyn BranchRepository>,
}

impl SeedService {
    pub fn new(customers: Arc<dyn CustomerRepository>, branches: Arc<dyn BranchRepository>) -> Self {
        Self {
            customers,
            branches,
        }
    }

    /// Insert `count` synthetic leads spread over the last 60 days across
    /// the active branches. Returns the number inserted.
    pub async fn seed_customers(&self, count: u32) -> Result<u32, ServiceError> {
        let branches: Vec<_> = self
            .branches
            .list()
            .await?
            .into_iter()
            .filter(|b| b.is_active)
            .collect();
        if branches.is_empty() {
            return Err(ServiceError::validation("no active branch to seed into"));
        }

        let mut inserted = 0;
        for _ in 0..count.min(500) {
            let customer = {
                let mut rng = rand::rng();
                let branch = branches.choose(&mut rng).expect("non-empty");
                let age = Duration::days(rng.random_range(0..60))
                    + Duration::minutes(rng.random_range(0..1440));
                let created_at = Utc::now() - age;
                let status = *[
                    CustomerStatus::New,
                    CustomerStatus::InProgress,
                    CustomerStatus::CallBack,
                    CustomerStatus::Converted,
                    CustomerStatus::Closed,
                ]
                .choose(&mut rng)
                .expect("non-empty");

                Customer {
                    id: Uuid::new_v4().to_string(),
                    name: SAMPLE_NAMES.choose(&mut rng).map(|n| n.to_string()),
                    phone: format!("010{:08}", rng.random_range(10_000_000u32..100_000_000)),
                    branch_id: branch.id.clone(),
                    assigned_to: None,
                    status,
                    categories: Vec::new(),
                    source: SAMPLE_SOURCES.choose(&mut rng).map(|s| s.to_string()),
                    utm: UtmAttribution::default(),
                    is_duplicate: false,
                    has_license: Some(rng.random_bool(0.6)),
                    has_insurance: Some(rng.random_bool(0.4)),
                    has_credit_card: Some(rng.random_bool(0.5)),
                    call_back_at: matches!(status, CustomerStatus::CallBack)
                        .then(|| Utc::now() + Duration::hours(rng.random_range(1..72))),
                    memo: None,
                    created_at,
                    updated_at: created_at,
                }
            };

            self.customers.insert(customer).await?;
            inserted += 1;
        }

        tracing::info!(inserted, "seeded sample customers");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repositories::{CustomerFilter, CustomerSort, PageRequest};
    use crate::infrastructure::memory::MemoryStore;

    #[tokio::test]
    async fn seeds_requested_count() {
        let store = Arc::new(MemoryStore::with_sample_branches());
        let service = SeedService::new(store.clone(), store.clone());

        let inserted = service.seed_customers(25).await.unwrap();
        assert_eq!(inserted, 25);

        let page = CustomerRepository::list(
                &*store,
                &CustomerFilter::default(),
                CustomerSort::default(),
                PageRequest { page: 1, limit: 1 },
            )
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 25);
    }

    #[tokio::test]
    async fn seeding_without_branches_fails() {
        let store = Arc::new(MemoryStore::new());
        let service = SeedService::new(store.clone(), store.clone());
        assert!(matches!(
            service.seed_customers(5).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
    }
}
