// Dashboard aggregation result models
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerStatus;

/// Headline numbers for the stats widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total: u64,
    pub by_status: BTreeMap<CustomerStatus, u64>,
    pub new_today: u64,
    pub duplicates: u64,
    /// Converted / total over the requested range, 0.0 when empty.
    pub conversion_rate: f64,
}

/// Monthly goal progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub target: u64,
    pub achieved: u64,
    pub rate: f64,
}

impl GoalProgress {
    pub fn new(target: u64, achieved: u64) -> Self {
        let rate = if target == 0 {
            0.0
        } else {
            achieved as f64 / target as f64
        };
        Self {
            target,
            achieved,
            rate,
        }
    }
}

/// Per-agent conversion row for the performance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRow {
    pub user_id: String,
    pub display_name: String,
    pub total: u64,
    pub converted: u64,
    pub rate: f64,
}

/// A recent event on the intake timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub customer_id: String,
    pub status: CustomerStatus,
    pub summary: String,
    pub at: DateTime<Utc>,
}
