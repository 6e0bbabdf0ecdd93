use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Freshness of a perishable item relative to its sell-by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessStatus {
    /// Past the sell-by date
    Expired,
    /// Sell-by date is today
    Today,
    /// One or two days left
    Warning,
    /// Three or more days left
    Fresh,
}

impl FreshnessStatus {
    /// Urgent items are surfaced on the dashboard.
    pub fn is_urgent(self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

/// Days until the sell-by date. Negative means past due.
pub fn days_remaining(sell_by_date: NaiveDate, today: NaiveDate) -> i64 {
    (sell_by_date - today).num_days()
}

/// Classify a sell-by date relative to `today`.
pub fn classify(sell_by_date: NaiveDate, today: NaiveDate) -> FreshnessStatus {
    match days_remaining(sell_by_date, today) {
        days if days < 0 => FreshnessStatus::Expired,
        0 => FreshnessStatus::Today,
        1..=2 => FreshnessStatus::Warning,
        _ => FreshnessStatus::Fresh,
    }
}
