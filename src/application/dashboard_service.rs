// Dashboard service - read-only aggregations over the customers table
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use futures::future::join_all;

use crate::application::error::ServiceError;
use crate::application::repositories::{
    CustomerFilter, CustomerRepository, CustomerSort, PageRequest, SettingsRepository, SortField,
    SortOrder, UserRepository,
};
use crate::domain::color_rules;
use crate::domain::customer::{Customer, CustomerStatus};
use crate::domain::reporting::{GoalProgress, PerformanceRow, StatsSummary, TimelineEvent};
use crate::domain::widget::WidgetConfig;

const GOAL_SETTINGS_KEY: &str = "goalSettings";
const DEFAULT_MONTHLY_TARGET: u64 = 50;

/// Optional created-at window shared by the aggregation endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Value plus optional trend for a single widget, with the first matching
/// conditional color rule already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetData {
    pub value: f64,
    pub change_percent: Option<f64>,
    pub color: Option<AppliedColor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedColor {
    pub color: String,
    pub bg_color: String,
    pub label: Option<String>,
}

#[derive(Clone)]
pub struct DashboardService {
    customers: Arc<dyn CustomerRepository>,
    users: Arc<dyn UserRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl DashboardService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        users: Arc<dyn UserRepository>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            customers,
            users,
            settings,
        }
    }

    pub async fn stats(&self, range: DateRange) -> Result<StatsSummary, ServiceError> {
        let base = CustomerFilter {
            created_from: range.from,
            created_to: range.to,
            ..CustomerFilter::default()
        };

        let status_counts = join_all(CustomerStatus::ALL.into_iter().map(|status| {
            let filter = CustomerFilter {
                statuses: vec![status],
                ..base.clone()
            };
            async move { (status, self.count(filter).await) }
        }));

        let today_start = day_start(Utc::now());
        let (status_counts, total, new_today, duplicates) = tokio::join!(
            status_counts,
            self.count(base.clone()),
            self.count(CustomerFilter {
                created_from: Some(today_start),
                ..CustomerFilter::default()
            }),
            self.count(CustomerFilter {
                is_duplicate: Some(true),
                ..base.clone()
            }),
        );

        let mut by_status = BTreeMap::new();
        for (status, count) in status_counts {
            by_status.insert(status, count?);
        }

        let total = total?;
        let converted = by_status
            .get(&CustomerStatus::Converted)
            .copied()
            .unwrap_or(0);
        let conversion_rate = if total == 0 {
            0.0
        } else {
            converted as f64 / total as f64
        };

        Ok(StatsSummary {
            total,
            by_status,
            new_today: new_today?,
            duplicates: duplicates?,
            conversion_rate,
        })
    }

    /// Callbacks due in the window, soonest first.
    pub async fn callbacks(
        &self,
        assigned_to: Option<String>,
        range: DateRange,
        limit: u32,
    ) -> Result<Vec<Customer>, ServiceError> {
        let filter = CustomerFilter {
            statuses: vec![CustomerStatus::CallBack],
            assigned_to,
            callback_from: range.from,
            callback_to: range.to,
            ..CustomerFilter::default()
        };
        let sort = CustomerSort {
            field: SortField::CallBackAt,
            order: SortOrder::Asc,
        };
        let page = self
            .customers
            .list(
                &filter,
                sort,
                PageRequest {
                    page: 1,
                    limit: limit.clamp(1, 100),
                },
            )
            .await?;
        Ok(page.customers)
    }

    /// Monthly goal progress: conversions this calendar month against the
    /// target stored in settings.
    pub async fn goal(&self) -> Result<GoalProgress, ServiceError> {
        let target = match self.settings.get(GOAL_SETTINGS_KEY).await? {
            Some(value) => value
                .get("monthlyTarget")
                .and_then(|t| t.as_u64())
                .unwrap_or(DEFAULT_MONTHLY_TARGET),
            None => DEFAULT_MONTHLY_TARGET,
        };

        let achieved = self
            .count(CustomerFilter {
                statuses: vec![CustomerStatus::Converted],
                created_from: Some(month_start(Utc::now())),
                ..CustomerFilter::default()
            })
            .await?;

        Ok(GoalProgress::new(target, achieved))
    }

    /// Leads still missing a name or an assigned agent, newest first.
    pub async fn incomplete(
        &self,
        branch_id: Option<String>,
        limit: u32,
    ) -> Result<Vec<Customer>, ServiceError> {
        let filter = CustomerFilter {
            incomplete_only: true,
            branch_id,
            ..CustomerFilter::default()
        };
        let page = self
            .customers
            .list(
                &filter,
                CustomerSort::default(),
                PageRequest {
                    page: 1,
                    limit: limit.clamp(1, 100),
                },
            )
            .await?;
        Ok(page.customers)
    }

    /// Per-agent conversion table. An agent whose counts fail is dropped
    /// from the table rather than failing the whole response.
    pub async fn performance(
        &self,
        range: DateRange,
        branch_id: Option<String>,
    ) -> Result<Vec<PerformanceRow>, ServiceError> {
        let users = self.users.list().await?;

        let rows = join_all(users.into_iter().filter(|u| u.is_active).map(|user| {
            let branch_id = branch_id.clone();
            async move {
                let base = CustomerFilter {
                    assigned_to: Some(user.id.clone()),
                    branch_id,
                    created_from: range.from,
                    created_to: range.to,
                    ..CustomerFilter::default()
                };
                let converted = CustomerFilter {
                    statuses: vec![CustomerStatus::Converted],
                    ..base.clone()
                };
                match tokio::try_join!(self.count(base), self.count(converted)) {
                    Ok((total, converted)) => Some(PerformanceRow {
                        user_id: user.id,
                        display_name: user.display_name,
                        total,
                        converted,
                        rate: if total == 0 {
                            0.0
                        } else {
                            converted as f64 / total as f64
                        },
                    }),
                    Err(e) => {
                        tracing::warn!(user = %user.id, error = %e, "skipping agent in performance table");
                        None
                    }
                }
            }
        }))
        .await;

        let mut rows: Vec<PerformanceRow> = rows.into_iter().flatten().collect();
        rows.sort_by(|a, b| {
            b.converted
                .cmp(&a.converted)
                .then(a.display_name.cmp(&b.display_name))
        });
        Ok(rows)
    }

    /// Open leads untouched for `days` days, oldest update first.
    pub async fn stale(&self, days: u32, limit: u32) -> Result<Vec<Customer>, ServiceError> {
        let cutoff = Utc::now() - Duration::days(days.max(1) as i64);
        let filter = CustomerFilter {
            statuses: vec![
                CustomerStatus::New,
                CustomerStatus::InProgress,
                CustomerStatus::CallBack,
            ],
            updated_before: Some(cutoff),
            ..CustomerFilter::default()
        };
        let sort = CustomerSort {
            field: SortField::UpdatedAt,
            order: SortOrder::Asc,
        };
        let page = self
            .customers
            .list(
                &filter,
                sort,
                PageRequest {
                    page: 1,
                    limit: limit.clamp(1, 100),
                },
            )
            .await?;
        Ok(page.customers)
    }

    /// Most recently touched leads as a flat event feed.
    pub async fn timeline(&self, limit: u32) -> Result<Vec<TimelineEvent>, ServiceError> {
        let sort = CustomerSort {
            field: SortField::UpdatedAt,
            order: SortOrder::Desc,
        };
        let page = self
            .customers
            .list(
                &CustomerFilter::default(),
                sort,
                PageRequest {
                    page: 1,
                    limit: limit.clamp(1, 100),
                },
            )
            .await?;

        Ok(page
            .customers
            .into_iter()
            .map(|c| TimelineEvent {
                summary: match (&c.name, c.status) {
                    (Some(name), CustomerStatus::New) => format!("{name} registered"),
                    (Some(name), status) => format!("{name} moved to {}", status.as_str()),
                    (None, _) => format!("{} registered", c.phone),
                },
                customer_id: c.id,
                status: c.status,
                at: c.updated_at,
            })
            .collect())
    }

    /// Resolve a placed widget's current value and trend, and apply its
    /// conditional color rules (first match wins).
    pub async fn widget_data(&self, widget: &WidgetConfig) -> Result<WidgetData, ServiceError> {
        let (value, change_percent) = self.metric_value(&widget.data_binding.metric).await?;
        let color =
            color_rules::evaluate(value, change_percent, &widget.color_rules).map(|rule| {
                AppliedColor {
                    color: rule.color.clone(),
                    bg_color: rule.bg_color.clone(),
                    label: rule.label.clone(),
                }
            });
        Ok(WidgetData {
            value,
            change_percent,
            color,
        })
    }

    async fn metric_value(&self, metric: &str) -> Result<(f64, Option<f64>), ServiceError> {
        let now = Utc::now();
        match metric {
            "customers_total" => {
                let window = Duration::days(30);
                let current = self
                    .count(CustomerFilter {
                        created_from: Some(now - window),
                        ..CustomerFilter::default()
                    })
                    .await?;
                let previous = self
                    .count(CustomerFilter {
                        created_from: Some(now - window - window),
                        created_to: Some(now - window),
                        ..CustomerFilter::default()
                    })
                    .await?;
                Ok((current as f64, percent_change(previous, current)))
            }
            "customers_new_today" => {
                let today = day_start(now);
                let current = self
                    .count(CustomerFilter {
                        created_from: Some(today),
                        ..CustomerFilter::default()
                    })
                    .await?;
                let previous = self
                    .count(CustomerFilter {
                        created_from: Some(today - Duration::days(1)),
                        created_to: Some(today),
                        ..CustomerFilter::default()
                    })
                    .await?;
                Ok((current as f64, percent_change(previous, current)))
            }
            "conversion_rate" => {
                let stats = self.stats(DateRange::default()).await?;
                Ok((stats.conversion_rate * 100.0, None))
            }
            "goal_progress" => {
                let goal = self.goal().await?;
                Ok((goal.rate * 100.0, None))
            }
            "callbacks_due" => {
                let today = day_start(now);
                let count = self
                    .count(CustomerFilter {
                        statuses: vec![CustomerStatus::CallBack],
                        callback_from: Some(today),
                        callback_to: Some(today + Duration::days(1)),
                        ..CustomerFilter::default()
                    })
                    .await?;
                Ok((count as f64, None))
            }
            "stale_leads" => {
                let count = self
                    .count(CustomerFilter {
                        statuses: vec![
                            CustomerStatus::New,
                            CustomerStatus::InProgress,
                            CustomerStatus::CallBack,
                        ],
                        updated_before: Some(now - Duration::days(7)),
                        ..CustomerFilter::default()
                    })
                    .await?;
                Ok((count as f64, None))
            }
            "duplicates" => {
                let count = self
                    .count(CustomerFilter {
                        is_duplicate: Some(true),
                        ..CustomerFilter::default()
                    })
                    .await?;
                Ok((count as f64, None))
            }
            other => Err(ServiceError::validation(format!("unknown metric '{other}'"))),
        }
    }

    /// Row count for a filter, delegated to the backend via a 1-row page.
    async fn count(&self, filter: CustomerFilter) -> anyhow::Result<u64> {
        let page = self
            .customers
            .list(
                &filter,
                CustomerSort::default(),
                PageRequest { page: 1, limit: 1 },
            )
            .await?;
        Ok(page.pagination.total)
    }
}

fn percent_change(previous: u64, current: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 - previous as f64) / previous as f64 * 100.0)
}

fn day_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

fn month_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive()
        .with_day(1)
        .expect("day 1 is always valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::color_rules::{ColorRule, RuleField, RuleOp};
    use crate::domain::customer::UtmAttribution;
    use crate::domain::widget::{DataBinding, GridPosition, GridSize, WidgetKind};
    use crate::infrastructure::memory::MemoryStore;

    fn service_with_store() -> (DashboardService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_sample_branches());
        let service = DashboardService::new(store.clone(), store.clone(), store.clone());
        (service, store)
    }

    fn customer(id: &str, status: CustomerStatus, phone: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: id.to_string(),
            name: Some(format!("lead-{id}")),
            phone: phone.to_string(),
            branch_id: "branch-gangnam".to_string(),
            assigned_to: Some("user-1".to_string()),
            status,
            categories: Vec::new(),
            source: None,
            utm: UtmAttribution::default(),
            is_duplicate: false,
            has_license: None,
            has_insurance: None,
            has_credit_card: None,
            call_back_at: None,
            memo: None,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seed(store: &MemoryStore) {
        use crate::application::repositories::CustomerRepository;
        for (i, status) in [
            CustomerStatus::New,
            CustomerStatus::New,
            CustomerStatus::InProgress,
            CustomerStatus::Converted,
        ]
        .into_iter()
        .enumerate()
        {
            CustomerRepository::insert(store, customer(&format!("c{i}"), status, &format!("0101234567{i}")))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn stats_counts_by_status() {
        let (service, store) = service_with_store();
        seed(&store).await;

        let stats = service.stats(DateRange::default()).await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status[&CustomerStatus::New], 2);
        assert_eq!(stats.by_status[&CustomerStatus::Converted], 1);
        assert_eq!(stats.by_status[&CustomerStatus::Closed], 0);
        assert_eq!(stats.new_today, 4);
        assert!((stats.conversion_rate - 0.25).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn goal_uses_settings_target() {
        use crate::application::repositories::SettingsRepository;
        let (service, store) = service_with_store();
        seed(&store).await;
        store
            .put(GOAL_SETTINGS_KEY, serde_json::json!({"monthlyTarget": 4}))
            .await
            .unwrap();

        let goal = service.goal().await.unwrap();
        assert_eq!(goal.target, 4);
        assert_eq!(goal.achieved, 1);
        assert!((goal.rate - 0.25).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn widget_data_applies_color_rules() {
        let (service, store) = service_with_store();
        seed(&store).await;

        let widget = WidgetConfig {
            id: "w1".to_string(),
            kind: WidgetKind::Stat,
            position: GridPosition::new(0, 0),
            size: GridSize::new(3, 2),
            data_binding: DataBinding::metric("customers_total"),
            style_overrides: None,
            color_rules: vec![ColorRule {
                id: "hot".to_string(),
                field: RuleField::Value,
                op: RuleOp::Gte,
                value: 3.0,
                value2: None,
                color: "#fff".to_string(),
                bg_color: "#16a34a".to_string(),
                label: Some("on track".to_string()),
            }],
        };

        let data = service.widget_data(&widget).await.unwrap();
        assert_eq!(data.value, 4.0);
        let color = data.color.unwrap();
        assert_eq!(color.bg_color, "#16a34a");
        assert_eq!(color.label.as_deref(), Some("on track"));
    }

    #[tokio::test]
    async fn widget_data_rejects_unknown_metric() {
        let (service, _) = service_with_store();
        let widget = WidgetConfig {
            id: "w1".to_string(),
            kind: WidgetKind::Stat,
            position: GridPosition::new(0, 0),
            size: GridSize::new(3, 2),
            data_binding: DataBinding::metric("no_such_metric"),
            style_overrides: None,
            color_rules: Vec::new(),
        };
        assert!(matches!(
            service.widget_data(&widget).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn performance_ranks_by_conversions() {
        let (service, store) = service_with_store();
        store.seed_sample_users().await;
        seed(&store).await;

        let rows = service
            .performance(DateRange::default(), None)
            .await
            .unwrap();
        assert!(!rows.is_empty());
        // user-1 owns every seeded customer including the conversion
        assert_eq!(rows[0].user_id, "user-1");
        assert_eq!(rows[0].converted, 1);
        assert_eq!(rows[0].total, 4);
    }

    #[test]
    fn percent_change_guards_zero_baseline() {
        assert_eq!(percent_change(0, 10), None);
        assert_eq!(percent_change(10, 15), Some(50.0));
        assert_eq!(percent_change(10, 5), Some(-50.0));
    }
}
