use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A tracked perishable item in the kitchen.
///
/// `quantity_amount` is optional: an item may be tracked by sell-by date
/// alone. When a quantity is tracked, it never goes below zero and `used`
/// is set whenever it reaches zero.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pantry_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub quantity_amount: Option<Decimal>,
    pub unit: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub low_stock_threshold: Option<Decimal>,
    pub storage: StorageLocation,
    pub sell_by_date: NaiveDate,
    pub notes: String,
    pub used: bool,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Where the item is stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum StorageLocation {
    #[sea_orm(string_value = "fridge")]
    Refrigerator,
    #[sea_orm(string_value = "freezer")]
    Freezer,
    #[sea_orm(string_value = "pantry")]
    Pantry,
}

impl Model {
    /// Low stock means a tracked quantity at or below the configured
    /// threshold. Zero quantity is low stock by this definition, but the
    /// depletion path takes precedence when both fire on the same event.
    pub fn is_low_stock(&self) -> bool {
        match (self.quantity_amount, self.low_stock_threshold) {
            (Some(quantity), Some(threshold)) => quantity <= threshold,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: Option<Decimal>, threshold: Option<Decimal>) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "Milk".to_string(),
            quantity_amount: quantity,
            unit: "gallon".to_string(),
            low_stock_threshold: threshold,
            storage: StorageLocation::Refrigerator,
            sell_by_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            notes: String::new(),
            used: false,
            added_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn low_stock_requires_both_quantity_and_threshold() {
        assert!(!item(None, Some(dec!(1))).is_low_stock());
        assert!(!item(Some(dec!(0.5)), None).is_low_stock());
        assert!(!item(None, None).is_low_stock());
    }

    #[test]
    fn low_stock_at_or_below_threshold() {
        assert!(item(Some(dec!(0.5)), Some(dec!(0.5))).is_low_stock());
        assert!(item(Some(dec!(0.4)), Some(dec!(0.5))).is_low_stock());
        assert!(!item(Some(dec!(0.6)), Some(dec!(0.5))).is_low_stock());
    }

    #[test]
    fn zero_quantity_is_low_stock() {
        assert!(item(Some(dec!(0)), Some(dec!(0.5))).is_low_stock());
    }
}
