// Customer service - intake, duplicate check, listing, inline edits
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::error::ServiceError;
use crate::application::repositories::{
    BranchRepository, CustomerFilter, CustomerPage, CustomerPatch, CustomerRepository,
    CustomerSort, PageRequest,
};
use crate::domain::customer::{
    is_valid_mobile, normalize_phone, Customer, CustomerStatus, UtmAttribution,
};

/// A landing-page submission.
#[derive(Debug, Clone)]
pub struct CustomerIntake {
    pub phone: String,
    pub branch_id: String,
    pub name: Option<String>,
    pub source: Option<String>,
    pub utm: UtmAttribution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub id: String,
    pub is_duplicate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub existing: Option<Customer>,
}

#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
    branches: Arc<dyn BranchRepository>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerRepository>, branches: Arc<dyn BranchRepository>) -> Self {
        Self {
            customers,
            branches,
        }
    }

    /// Record a landing-page lead. Duplicates by normalized phone are
    /// flagged, not rejected - the lead is stored either way.
    pub async fn intake(&self, intake: CustomerIntake) -> Result<IntakeOutcome, ServiceError> {
        let phone = normalize_phone(&intake.phone);
        if !is_valid_mobile(&phone) {
            return Err(ServiceError::validation("invalid mobile number"));
        }

        let branch = self
            .branches
            .get(&intake.branch_id)
            .await?
            .ok_or_else(|| ServiceError::validation("unknown branch"))?;
        if !branch.is_active {
            return Err(ServiceError::validation("branch is not accepting leads"));
        }

        let existing = self
            .customers
            .find_by_phone(&phone, Some(&branch.id))
            .await?;
        let is_duplicate = !existing.is_empty();
        if is_duplicate {
            tracing::info!(phone = %phone, branch = %branch.id, "duplicate lead recorded");
        }

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: intake.name,
            phone,
            branch_id: branch.id,
            assigned_to: None,
            status: CustomerStatus::New,
            categories: Vec::new(),
            source: intake.source,
            utm: intake.utm,
            is_duplicate,
            has_license: None,
            has_insurance: None,
            has_credit_card: None,
            call_back_at: None,
            memo: None,
            created_at: now,
            updated_at: now,
        };

        let stored = self.customers.insert(customer).await?;
        Ok(IntakeOutcome {
            id: stored.id,
            is_duplicate,
        })
    }

    /// Pre-submit duplicate probe used by the intake form's debounced
    /// check. Requires a full 11-digit number; returns the oldest match.
    pub async fn duplicate_check(
        &self,
        phone: &str,
        branch_id: Option<&str>,
    ) -> Result<DuplicateCheck, ServiceError> {
        let phone = normalize_phone(phone);
        if phone.len() != 11 {
            return Err(ServiceError::validation("an 11-digit phone number is required"));
        }

        let mut existing = self.customers.find_by_phone(&phone, branch_id).await?;
        Ok(DuplicateCheck {
            is_duplicate: !existing.is_empty(),
            existing: if existing.is_empty() {
                None
            } else {
                Some(existing.remove(0))
            },
        })
    }

    pub async fn list(
        &self,
        filter: CustomerFilter,
        sort: CustomerSort,
        page: PageRequest,
    ) -> Result<CustomerPage, ServiceError> {
        let page = PageRequest {
            page: page.page.max(1),
            limit: page.limit.clamp(1, 100),
        };
        Ok(self.customers.list(&filter, sort, page).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Customer, ServiceError> {
        self.customers
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("customer"))
    }

    /// Inline edit from the customer table.
    pub async fn update(&self, id: &str, patch: CustomerPatch) -> Result<Customer, ServiceError> {
        self.customers
            .apply_patch(id, &patch)
            .await?
            .ok_or(ServiceError::NotFound("customer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryStore;

    fn service() -> (CustomerService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_sample_branches());
        let service = CustomerService::new(store.clone(), store.clone());
        (service, store)
    }

    fn intake(phone: &str) -> CustomerIntake {
        CustomerIntake {
            phone: phone.to_string(),
            branch_id: "branch-gangnam".to_string(),
            name: Some("Kim".to_string()),
            source: Some("landing".to_string()),
            utm: UtmAttribution::default(),
        }
    }

    #[tokio::test]
    async fn intake_normalizes_and_stores() {
        let (service, store) = service();
        let outcome = service.intake(intake("010-1234-5678")).await.unwrap();
        assert!(!outcome.is_duplicate);

        let stored = CustomerRepository::get(&*store, &outcome.id).await.unwrap().unwrap();
        assert_eq!(stored.phone, "01012345678");
        assert_eq!(stored.status, CustomerStatus::New);
    }

    #[tokio::test]
    async fn intake_rejects_bad_phone() {
        let (service, _) = service();
        let err = service.intake(intake("0101234567")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn intake_rejects_unknown_and_inactive_branch() {
        let (service, _) = service();
        let mut bad = intake("01012345678");
        bad.branch_id = "nope".to_string();
        assert!(matches!(
            service.intake(bad).await.unwrap_err(),
            ServiceError::Validation(_)
        ));

        let mut inactive = intake("01012345678");
        inactive.branch_id = "branch-closed".to_string();
        assert!(matches!(
            service.intake(inactive).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn second_intake_with_same_phone_is_flagged_not_rejected() {
        let (service, _) = service();
        let first = service.intake(intake("01012345678")).await.unwrap();
        assert!(!first.is_duplicate);

        let second = service.intake(intake("010 1234 5678")).await.unwrap();
        assert!(second.is_duplicate);
        assert_ne!(second.id, first.id);
    }

    #[tokio::test]
    async fn duplicate_check_requires_full_number() {
        let (service, _) = service();
        assert!(matches!(
            service.duplicate_check("010-1234-567", None).await.unwrap_err(),
            ServiceError::Validation(_)
        ));

        let check = service.duplicate_check("010-1234-5678", None).await.unwrap();
        assert!(!check.is_duplicate);
        assert!(check.existing.is_none());
    }

    #[tokio::test]
    async fn duplicate_check_returns_oldest_match() {
        let (service, _) = service();
        let first = service.intake(intake("01012345678")).await.unwrap();
        service.intake(intake("01012345678")).await.unwrap();

        let check = service
            .duplicate_check("01012345678", Some("branch-gangnam"))
            .await
            .unwrap();
        assert!(check.is_duplicate);
        assert_eq!(check.existing.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn update_unknown_customer_is_not_found() {
        let (service, _) = service();
        let err = service
            .update("missing", CustomerPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("customer")));
    }
}
