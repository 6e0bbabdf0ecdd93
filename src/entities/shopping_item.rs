use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// An entry on the shopping list.
///
/// Entries with `checked = false` are "active". The replenishment
/// dispatcher maintains at most one active entry per item name
/// (case-insensitive); checked duplicates may coexist.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub quantity_text: String,
    pub section: ShoppingSection,
    pub checked: bool,
    pub added_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Store section, used for grouping the printed list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum ShoppingSection {
    #[sea_orm(string_value = "produce")]
    Produce,
    #[sea_orm(string_value = "dairy")]
    Dairy,
    #[sea_orm(string_value = "meat")]
    Meat,
    #[sea_orm(string_value = "bakery")]
    Bakery,
    #[sea_orm(string_value = "frozen")]
    Frozen,
    #[sea_orm(string_value = "pantry")]
    Pantry,
    #[sea_orm(string_value = "beverages")]
    Beverages,
    #[sea_orm(string_value = "other")]
    Other,
}

impl Default for ShoppingSection {
    fn default() -> Self {
        Self::Other
    }
}
