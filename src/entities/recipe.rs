use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recipe with optional AI-estimated nutrition facts (per serving).
///
/// The seven nutrition columns are either all set or all unset:
/// enrichment persists them together with `ingredients_hash` in a single
/// partial update, and a failed enrichment writes nothing.
/// `ingredients_hash` holds the fingerprint of the ingredients/servings
/// the last successful estimate was computed for; empty until then.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub category_id: Option<Uuid>,
    pub prep_time: i32,
    pub cook_time: i32,
    pub servings: i32,
    pub calories: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((6, 1)))", nullable)]
    pub protein_g: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((6, 1)))", nullable)]
    pub carbs_g: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((6, 1)))", nullable)]
    pub fat_g: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((6, 1)))", nullable)]
    pub fiber_g: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((6, 1)))", nullable)]
    pub sugar_g: Option<Decimal>,
    pub sodium_mg: Option<i32>,
    pub ingredients_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn has_nutrition(&self) -> bool {
        self.calories.is_some()
    }

    pub fn total_time(&self) -> i32 {
        self.prep_time + self.cook_time
    }
}
