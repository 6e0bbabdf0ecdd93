use crate::{
    entities::category::Entity as Category,
    entities::recipe::{self, Entity as Recipe, Model as RecipeModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::enrichment::{ingredients_fingerprint, EnrichmentClient},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Input for creating a recipe.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub ingredients: String,
    pub instructions: String,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub prep_time: i32,
    #[serde(default)]
    pub cook_time: i32,
    #[serde(default = "default_servings")]
    pub servings: i32,
}

fn default_servings() -> i32 {
    1
}

/// Partial update for a recipe.
///
/// `category_id` distinguishes "absent" (leave as is) from an explicit
/// `null` (detach the category).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRecipeInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

/// Service for recipes. Saving a recipe whose ingredients or serving count
/// changed since the last successful estimate triggers nutrition
/// enrichment through the external client; the fingerprint gate keeps
/// unchanged recipes from producing external calls.
#[derive(Clone)]
pub struct RecipeService {
    db: Arc<DatabaseConnection>,
    client: Arc<dyn EnrichmentClient>,
    event_sender: EventSender,
}

impl RecipeService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        client: Arc<dyn EnrichmentClient>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            client,
            event_sender,
        }
    }

    /// Lists recipes, newest first, optionally filtered by a substring
    /// match on title or ingredients and/or by category.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        query: Option<&str>,
        category_id: Option<Uuid>,
    ) -> Result<Vec<RecipeModel>, ServiceError> {
        let mut select = Recipe::find().order_by_desc(recipe::Column::CreatedAt);
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(recipe::Column::Title.contains(q))
                    .add(recipe::Column::Ingredients.contains(q)),
            );
        }
        if let Some(category_id) = category_id {
            select = select.filter(recipe::Column::CategoryId.eq(category_id));
        }
        let recipes = select.all(&*self.db).await?;
        Ok(recipes)
    }

    /// Fails with `NotFound` unless the category exists.
    async fn check_category(&self, id: Uuid) -> Result<(), ServiceError> {
        Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))
    }

    /// The five most recently created recipes, for the dashboard.
    pub async fn recent(&self, limit: u64) -> Result<Vec<RecipeModel>, ServiceError> {
        let recipes = Recipe::find()
            .order_by_desc(recipe::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db)
            .await?;
        Ok(recipes)
    }

    pub async fn get(&self, id: Uuid) -> Result<RecipeModel, ServiceError> {
        Recipe::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Recipe {} not found", id)))
    }

    pub async fn count(&self) -> Result<u64, ServiceError> {
        let count = Recipe::find().count(&*self.db).await?;
        Ok(count)
    }

    /// Creates a recipe and attempts enrichment. The recipe itself is
    /// persisted first; a failed enrichment leaves it saved without
    /// nutrition data.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CreateRecipeInput) -> Result<RecipeModel, ServiceError> {
        validate_recipe_fields(&input.title, input.prep_time, input.cook_time, input.servings)?;
        if let Some(category_id) = input.category_id {
            self.check_category(category_id).await?;
        }

        let now = Utc::now();
        let model = recipe::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            ingredients: Set(input.ingredients),
            instructions: Set(input.instructions),
            category_id: Set(input.category_id),
            prep_time: Set(input.prep_time),
            cook_time: Set(input.cook_time),
            servings: Set(input.servings),
            calories: Set(None),
            protein_g: Set(None),
            carbs_g: Set(None),
            fat_g: Set(None),
            fiber_g: Set(None),
            sugar_g: Set(None),
            sodium_mg: Set(None),
            ingredients_hash: Set(String::new()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(&*self.db).await?;
        info!(recipe_id = %created.id, "created recipe");
        self.event_sender
            .send_or_log(Event::RecipeCreated(created.id))
            .await;

        self.enrich_if_changed(&created).await;
        self.get(created.id).await
    }

    /// Applies a partial update to a recipe's primary fields, then attempts
    /// enrichment when ingredients or servings changed.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateRecipeInput,
    ) -> Result<RecipeModel, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: recipe::ActiveModel = existing.into();

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "title must not be empty".to_string(),
                ));
            }
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(ingredients) = input.ingredients {
            active.ingredients = Set(ingredients);
        }
        if let Some(instructions) = input.instructions {
            active.instructions = Set(instructions);
        }
        if let Some(category_id) = input.category_id {
            if let Some(category_id) = category_id {
                self.check_category(category_id).await?;
            }
            active.category_id = Set(category_id);
        }
        if let Some(prep_time) = input.prep_time {
            if prep_time < 0 {
                return Err(ServiceError::ValidationError(
                    "prep and cook time must not be negative".to_string(),
                ));
            }
            active.prep_time = Set(prep_time);
        }
        if let Some(cook_time) = input.cook_time {
            if cook_time < 0 {
                return Err(ServiceError::ValidationError(
                    "prep and cook time must not be negative".to_string(),
                ));
            }
            active.cook_time = Set(cook_time);
        }
        if let Some(servings) = input.servings {
            if servings < 1 {
                return Err(ServiceError::ValidationError(
                    "servings must be at least 1".to_string(),
                ));
            }
            active.servings = Set(servings);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.enrich_if_changed(&updated).await;
        self.get(updated.id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        let active: recipe::ActiveModel = existing.into();
        active.delete(&*self.db).await?;
        Ok(())
    }

    /// The enrichment cache gate.
    ///
    /// Computes the ingredients/servings fingerprint and, when it differs
    /// from the one stored with the last successful estimate, calls the
    /// external estimator. Success persists all nutrition fields plus the
    /// new fingerprint in a single partial update scoped to this row, so
    /// concurrent edits to unrelated fields are not clobbered. Any failure
    /// is logged and leaves the previous nutrition state and fingerprint
    /// untouched; the fingerprint not advancing is what makes a later
    /// retry possible.
    pub async fn enrich_if_changed(&self, current: &RecipeModel) {
        let fingerprint = ingredients_fingerprint(&current.ingredients, current.servings);
        if fingerprint == current.ingredients_hash {
            debug!(recipe_id = %current.id, "ingredients unchanged; skipping enrichment");
            return;
        }
        if current.ingredients.trim().is_empty() {
            return;
        }
        if !self.client.is_configured() {
            warn!("Skipping nutrition estimation: enrichment client not configured");
            return;
        }

        match self
            .client
            .estimate_nutrition(&current.ingredients, current.servings)
            .await
        {
            Ok(estimate) => {
                let update = recipe::ActiveModel {
                    calories: Set(Some(estimate.calories)),
                    protein_g: Set(Some(estimate.protein_g)),
                    carbs_g: Set(Some(estimate.carbs_g)),
                    fat_g: Set(Some(estimate.fat_g)),
                    fiber_g: Set(Some(estimate.fiber_g)),
                    sugar_g: Set(Some(estimate.sugar_g)),
                    sodium_mg: Set(Some(estimate.sodium_mg)),
                    ingredients_hash: Set(fingerprint),
                    ..Default::default()
                };

                let result = Recipe::update_many()
                    .set(update)
                    .filter(recipe::Column::Id.eq(current.id))
                    .exec(&*self.db)
                    .await;

                match result {
                    Ok(_) => {
                        info!(recipe_id = %current.id, "nutrition estimated");
                        self.event_sender
                            .send_or_log(Event::RecipeEnriched(current.id))
                            .await;
                    }
                    Err(e) => {
                        error!(recipe_id = %current.id, error = %e, "failed to persist nutrition estimate");
                    }
                }
            }
            Err(e) => {
                warn!(
                    recipe_id = %current.id,
                    error = %e,
                    "nutrition estimation failed; keeping previous values"
                );
            }
        }
    }
}

fn validate_recipe_fields(
    title: &str,
    prep_time: i32,
    cook_time: i32,
    servings: i32,
) -> Result<(), ServiceError> {
    if title.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "title must not be empty".to_string(),
        ));
    }
    if prep_time < 0 || cook_time < 0 {
        return Err(ServiceError::ValidationError(
            "prep and cook time must not be negative".to_string(),
        ));
    }
    if servings < 1 {
        return Err(ServiceError::ValidationError(
            "servings must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_bad_fields() {
        assert!(validate_recipe_fields("", 0, 0, 1).is_err());
        assert!(validate_recipe_fields("  ", 0, 0, 1).is_err());
        assert!(validate_recipe_fields("ok", -1, 0, 1).is_err());
        assert!(validate_recipe_fields("ok", 0, -5, 1).is_err());
        assert!(validate_recipe_fields("ok", 0, 0, 0).is_err());
        assert!(validate_recipe_fields("ok", 10, 20, 4).is_ok());
    }
}
