use crate::{
    entities::shopping_item::{self, Entity as ShoppingItem, Model as ShoppingItemModel, ShoppingSection},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Input for creating a shopping entry by hand.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateShoppingItemInput {
    pub name: String,
    #[serde(default)]
    pub quantity_text: String,
    #[serde(default)]
    pub section: ShoppingSection,
}

/// Partial update for a shopping entry.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateShoppingItemInput {
    pub name: Option<String>,
    pub quantity_text: Option<String>,
    pub section: Option<ShoppingSection>,
}

/// Service for the shopping list, including the idempotent ensure-entry
/// operation used by pantry replenishment.
#[derive(Clone)]
pub struct ShoppingListService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ShoppingListService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Lists shopping entries, unchecked first, grouped by section.
    #[instrument(skip(self))]
    pub async fn list(&self, include_checked: bool) -> Result<Vec<ShoppingItemModel>, ServiceError> {
        let mut query = ShoppingItem::find();
        if !include_checked {
            query = query.filter(shopping_item::Column::Checked.eq(false));
        }
        let items = query
            .order_by_asc(shopping_item::Column::Checked)
            .order_by_asc(shopping_item::Column::Section)
            .order_by_asc(shopping_item::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    pub async fn get(&self, id: Uuid) -> Result<ShoppingItemModel, ServiceError> {
        ShoppingItem::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Shopping item {} not found", id)))
    }

    /// Creates a shopping entry from user input.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: CreateShoppingItemInput,
    ) -> Result<ShoppingItemModel, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name must not be empty".to_string(),
            ));
        }
        self.insert_entry(name, input.quantity_text, input.section)
            .await
    }

    /// Finds the active (unchecked) entry with this name, matched
    /// case-insensitively.
    pub async fn find_active_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ShoppingItemModel>, ServiceError> {
        let item = ShoppingItem::find()
            .filter(shopping_item::Column::Checked.eq(false))
            .filter(
                Expr::expr(Func::lower(Expr::col(shopping_item::Column::Name)))
                    .eq(name.to_lowercase()),
            )
            .one(&*self.db)
            .await?;
        Ok(item)
    }

    /// Ensures an active entry exists for `name`, creating one with the
    /// given quantity text when none does. Returns whether a row was
    /// created.
    ///
    /// The check-then-create is not atomic: two concurrent calls for the
    /// same name can each see no entry and both insert one. The worst
    /// outcome is a redundant list line naming the same item, so this is
    /// left unlocked.
    #[instrument(skip(self))]
    pub async fn ensure_active_entry(
        &self,
        name: &str,
        quantity_text: &str,
    ) -> Result<bool, ServiceError> {
        if self.find_active_by_name(name).await?.is_some() {
            return Ok(false);
        }

        self.insert_entry(
            name.to_string(),
            quantity_text.to_string(),
            ShoppingSection::Other,
        )
        .await?;
        Ok(true)
    }

    /// Applies a partial update to an entry.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateShoppingItemInput,
    ) -> Result<ShoppingItemModel, ServiceError> {
        let item = self.get(id).await?;
        let mut active: shopping_item::ActiveModel = item.into();

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "name must not be empty".to_string(),
                ));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(quantity_text) = input.quantity_text {
            active.quantity_text = Set(quantity_text);
        }
        if let Some(section) = input.section {
            active.section = Set(section);
        }

        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    /// Flips the checked flag on an entry.
    #[instrument(skip(self))]
    pub async fn toggle_checked(&self, id: Uuid) -> Result<ShoppingItemModel, ServiceError> {
        let item = self.get(id).await?;
        let checked = item.checked;
        let mut active: shopping_item::ActiveModel = item.into();
        active.checked = Set(!checked);
        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let item = self.get(id).await?;
        let active: shopping_item::ActiveModel = item.into();
        active.delete(&*self.db).await?;
        Ok(())
    }

    /// Deletes every checked entry, returning the number removed.
    #[instrument(skip(self))]
    pub async fn clear_checked(&self) -> Result<u64, ServiceError> {
        let result = ShoppingItem::delete_many()
            .filter(shopping_item::Column::Checked.eq(true))
            .exec(&*self.db)
            .await?;
        info!(removed = result.rows_affected, "cleared checked shopping entries");
        Ok(result.rows_affected)
    }

    pub async fn count_active(&self) -> Result<u64, ServiceError> {
        let count = ShoppingItem::find()
            .filter(shopping_item::Column::Checked.eq(false))
            .count(&*self.db)
            .await?;
        Ok(count)
    }

    async fn insert_entry(
        &self,
        name: String,
        quantity_text: String,
        section: ShoppingSection,
    ) -> Result<ShoppingItemModel, ServiceError> {
        let entry = shopping_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            quantity_text: Set(quantity_text),
            section: Set(section),
            checked: Set(false),
            added_at: Set(Utc::now()),
        };

        let created = entry.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ShoppingItemAdded {
                item_id: created.id,
                name: created.name.clone(),
            })
            .await;

        info!(item_id = %created.id, name = %created.name, "created shopping entry");
        Ok(created)
    }
}
