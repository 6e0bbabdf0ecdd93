use crate::{
    entities::pantry_item::{self, Entity as PantryItem, Model as PantryItemModel, StorageLocation},
    errors::ServiceError,
    events::{Event, EventSender},
    services::shopping::ShoppingListService,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Fraction of the initial quantity used as the low-stock threshold when
/// none is given at creation time. Captured once; later quantity changes
/// do not move it.
const DEFAULT_THRESHOLD_RATIO: Decimal = dec!(0.25);

/// Input for adding a pantry item.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePantryItemInput {
    pub name: String,
    pub quantity_amount: Option<Decimal>,
    #[serde(default)]
    pub unit: String,
    pub low_stock_threshold: Option<Decimal>,
    pub storage: StorageLocation,
    pub sell_by_date: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

/// Partial update for a pantry item.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePantryItemInput {
    pub name: Option<String>,
    pub quantity_amount: Option<Decimal>,
    pub unit: Option<String>,
    pub low_stock_threshold: Option<Decimal>,
    pub storage: Option<StorageLocation>,
    pub sell_by_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Outcome of a quantity adjustment, including the replenishment flags
/// reported back to the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuantityChange {
    pub quantity_amount: Decimal,
    pub unit: String,
    pub low_stock_threshold: Option<Decimal>,
    pub is_low_stock: bool,
    /// The reduction brought a positive quantity down to exactly zero
    pub reached_zero: bool,
    /// A shopping entry was created as a result of this adjustment
    pub added_to_shopping: bool,
    /// The item crossed from above the threshold to at-or-below it
    pub became_low_stock: bool,
}

/// Zero-floored quantity reduction. Returns the new quantity and whether
/// this reduction is the one that depleted the item (an already-zero
/// quantity never "reaches" zero again).
pub fn apply_reduction(current: Decimal, amount: Decimal) -> (Decimal, bool) {
    let reduced = current - amount;
    let new_quantity = if reduced < Decimal::ZERO {
        Decimal::ZERO
    } else {
        reduced
    };
    let reached_zero = current > Decimal::ZERO && new_quantity.is_zero();
    (new_quantity, reached_zero)
}

/// Default low-stock threshold for a newly created item: 25% of the
/// initial quantity.
pub fn default_low_stock_threshold(initial_quantity: Decimal) -> Decimal {
    (initial_quantity * DEFAULT_THRESHOLD_RATIO).round_dp(4)
}

/// Service for pantry items: intake, edits, and the quantity ledger with
/// its shopping-list replenishment side effects.
#[derive(Clone)]
pub struct PantryService {
    db: Arc<DatabaseConnection>,
    shopping: Arc<ShoppingListService>,
    event_sender: EventSender,
}

impl PantryService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        shopping: Arc<ShoppingListService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            shopping,
            event_sender,
        }
    }

    /// Lists pantry items ordered by sell-by date; `include_used` controls
    /// whether retired items appear.
    #[instrument(skip(self))]
    pub async fn list(&self, include_used: bool) -> Result<Vec<PantryItemModel>, ServiceError> {
        let mut query = PantryItem::find();
        if !include_used {
            query = query.filter(pantry_item::Column::Used.eq(false));
        }
        let items = query
            .order_by_asc(pantry_item::Column::SellByDate)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    pub async fn get(&self, id: Uuid) -> Result<PantryItemModel, ServiceError> {
        PantryItem::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Pantry item {} not found", id)))
    }

    /// Creates a pantry item. When a quantity is tracked and no explicit
    /// threshold is given, the low-stock threshold is captured here as 25%
    /// of the initial quantity and not recomputed afterwards.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: CreatePantryItemInput,
    ) -> Result<PantryItemModel, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name must not be empty".to_string(),
            ));
        }
        if let Some(quantity) = input.quantity_amount {
            if quantity < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "quantity must not be negative".to_string(),
                ));
            }
        }

        let threshold = input
            .low_stock_threshold
            .or_else(|| input.quantity_amount.map(default_low_stock_threshold));

        // A tracked quantity of zero means the item starts out used up.
        let used = input
            .quantity_amount
            .map(|q| q.is_zero())
            .unwrap_or(false);

        let now = Utc::now();
        let item = pantry_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            quantity_amount: Set(input.quantity_amount),
            unit: Set(input.unit),
            low_stock_threshold: Set(threshold),
            storage: Set(input.storage),
            sell_by_date: Set(input.sell_by_date),
            notes: Set(input.notes),
            used: Set(used),
            added_at: Set(now),
            updated_at: Set(now),
        };

        let created = item.insert(&*self.db).await?;
        info!(item_id = %created.id, name = %created.name, "created pantry item");
        Ok(created)
    }

    /// Applies a manual edit. Editing the threshold here deliberately does
    /// not re-derive it from the current quantity.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePantryItemInput,
    ) -> Result<PantryItemModel, ServiceError> {
        let item = self.get(id).await?;
        let mut active: pantry_item::ActiveModel = item.into();

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "name must not be empty".to_string(),
                ));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(quantity) = input.quantity_amount {
            if quantity < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "quantity must not be negative".to_string(),
                ));
            }
            active.quantity_amount = Set(Some(quantity));
            // Keep `used` in step with a manual quantity edit, the same
            // way reduce/replenish do.
            active.used = Set(quantity.is_zero());
        }
        if let Some(unit) = input.unit {
            active.unit = Set(unit);
        }
        if let Some(threshold) = input.low_stock_threshold {
            active.low_stock_threshold = Set(Some(threshold));
        }
        if let Some(storage) = input.storage {
            active.storage = Set(storage);
        }
        if let Some(sell_by_date) = input.sell_by_date {
            active.sell_by_date = Set(sell_by_date);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    /// Retires an item without deleting it.
    #[instrument(skip(self))]
    pub async fn mark_used(&self, id: Uuid) -> Result<PantryItemModel, ServiceError> {
        let item = self.get(id).await?;
        let mut active: pantry_item::ActiveModel = item.into();
        active.used = Set(true);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    /// Removal is an explicit user action; nothing deletes items silently.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let item = self.get(id).await?;
        let active: pantry_item::ActiveModel = item.into();
        active.delete(&*self.db).await?;
        Ok(())
    }

    /// Reduces a tracked quantity, floored at zero, and dispatches
    /// shopping-list replenishment on the resulting transition:
    ///
    /// 1. quantity reached zero: the item is marked used and an active
    ///    shopping entry is ensured (takes precedence over low stock);
    /// 2. the item newly crossed into low stock: an entry is ensured;
    /// 3. otherwise no shopping-list effect.
    ///
    /// Rejects non-positive amounts and items without a numeric quantity
    /// before any mutation.
    #[instrument(skip(self))]
    pub async fn reduce_quantity(
        &self,
        id: Uuid,
        amount: Decimal,
    ) -> Result<QuantityChange, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "reduction amount must be positive".to_string(),
            ));
        }

        let item = self.get(id).await?;
        let current = item.quantity_amount.ok_or_else(|| {
            ServiceError::InvalidOperation("Item has no numeric quantity".to_string())
        })?;

        let was_low_stock = item.is_low_stock();
        let (new_quantity, reached_zero) = apply_reduction(current, amount);

        let mut active: pantry_item::ActiveModel = item.into();
        active.quantity_amount = Set(Some(new_quantity));
        if new_quantity.is_zero() {
            active.used = Set(true);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        let is_low_stock = updated.is_low_stock();
        let became_low_stock = !reached_zero && is_low_stock && !was_low_stock;

        let mut added_to_shopping = false;
        if reached_zero {
            added_to_shopping = self
                .shopping
                .ensure_active_entry(&updated.name, &updated.unit)
                .await?;
            self.event_sender
                .send_or_log(Event::PantryItemDepleted {
                    item_id: updated.id,
                    name: updated.name.clone(),
                })
                .await;
        } else if became_low_stock {
            added_to_shopping = self
                .shopping
                .ensure_active_entry(&updated.name, &updated.unit)
                .await?;
            self.event_sender
                .send_or_log(Event::PantryItemLowStock {
                    item_id: updated.id,
                    name: updated.name.clone(),
                })
                .await;
        }

        Ok(QuantityChange {
            quantity_amount: new_quantity,
            unit: updated.unit,
            low_stock_threshold: updated.low_stock_threshold,
            is_low_stock,
            reached_zero,
            added_to_shopping,
            became_low_stock,
        })
    }

    /// Adds quantity back to an item, reversing depletion bookkeeping.
    /// Clears `used` when the result is positive. Never touches the
    /// shopping list.
    #[instrument(skip(self))]
    pub async fn replenish_quantity(
        &self,
        id: Uuid,
        amount: Decimal,
    ) -> Result<QuantityChange, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "replenish amount must be positive".to_string(),
            ));
        }

        let item = self.get(id).await?;
        let current = item.quantity_amount.ok_or_else(|| {
            ServiceError::InvalidOperation("Item has no numeric quantity".to_string())
        })?;

        let new_quantity = current + amount;
        let was_used = item.used;

        let mut active: pantry_item::ActiveModel = item.into();
        active.quantity_amount = Set(Some(new_quantity));
        if was_used && new_quantity > Decimal::ZERO {
            active.used = Set(false);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        let is_low_stock = updated.is_low_stock();
        Ok(QuantityChange {
            quantity_amount: new_quantity,
            unit: updated.unit,
            low_stock_threshold: updated.low_stock_threshold,
            is_low_stock,
            reached_zero: false,
            added_to_shopping: false,
            became_low_stock: false,
        })
    }

    /// Count of items not yet used up.
    pub async fn count_active(&self) -> Result<u64, ServiceError> {
        let count = PantryItem::find()
            .filter(pantry_item::Column::Used.eq(false))
            .count(&*self.db)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_floors_at_zero() {
        let (new, reached) = apply_reduction(dec!(2), dec!(5));
        assert_eq!(new, Decimal::ZERO);
        assert!(reached);
    }

    #[test]
    fn reduction_to_exact_zero_reaches_zero() {
        let (new, reached) = apply_reduction(dec!(0.4), dec!(0.4));
        assert_eq!(new, Decimal::ZERO);
        assert!(reached);
    }

    #[test]
    fn partial_reduction_does_not_reach_zero() {
        let (new, reached) = apply_reduction(dec!(2), dec!(1.6));
        assert_eq!(new, dec!(0.4));
        assert!(!reached);
    }

    #[test]
    fn reducing_an_already_zero_quantity_is_a_no_op() {
        let (new, reached) = apply_reduction(Decimal::ZERO, dec!(1));
        assert_eq!(new, Decimal::ZERO);
        assert!(!reached, "depletion must not re-fire once at zero");
    }

    #[test]
    fn default_threshold_is_a_quarter_of_initial_quantity() {
        assert_eq!(default_low_stock_threshold(dec!(2)), dec!(0.5));
        assert_eq!(default_low_stock_threshold(dec!(10)), dec!(2.5));
        assert_eq!(default_low_stock_threshold(Decimal::ZERO), Decimal::ZERO);
    }
}
