use crate::{
    entities::category::{self, Entity as Category, Model as CategoryModel},
    entities::recipe::{self, Entity as Recipe, Model as RecipeModel},
    errors::ServiceError,
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

/// Input for creating or renaming a category.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CategoryInput {
    pub name: String,
}

/// Service for recipe categories. Names are kept unique
/// case-insensitively; deleting a category detaches its recipes instead
/// of deleting them.
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists categories by name, each with its recipe count.
    #[instrument(skip(self))]
    pub async fn list_with_counts(&self) -> Result<Vec<(CategoryModel, u64)>, ServiceError> {
        let categories = Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;

        let mut out = Vec::with_capacity(categories.len());
        for cat in categories {
            let count = Recipe::find()
                .filter(recipe::Column::CategoryId.eq(cat.id))
                .count(&*self.db)
                .await?;
            out.push((cat, count));
        }
        Ok(out)
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryModel, ServiceError> {
        Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))
    }

    /// The category's recipes, newest first.
    pub async fn recipes(&self, id: Uuid) -> Result<Vec<RecipeModel>, ServiceError> {
        let recipes = Recipe::find()
            .filter(recipe::Column::CategoryId.eq(id))
            .order_by_desc(recipe::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(recipes)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<CategoryModel>, ServiceError> {
        let cat = Category::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(category::Column::Name)))
                    .eq(name.to_lowercase()),
            )
            .one(&*self.db)
            .await?;
        Ok(cat)
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CategoryInput) -> Result<CategoryModel, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name must not be empty".to_string(),
            ));
        }
        if self.find_by_name(&name).await?.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "category '{}' already exists",
                name
            )));
        }

        let cat = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            added_at: Set(Utc::now()),
        };
        let created = cat.insert(&*self.db).await?;
        info!(category_id = %created.id, name = %created.name, "created category");
        Ok(created)
    }

    /// Renames a category, keeping names unique case-insensitively.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let cat = self.get(id).await?;
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "name must not be empty".to_string(),
            ));
        }
        if let Some(existing) = self.find_by_name(&name).await? {
            if existing.id != id {
                return Err(ServiceError::ValidationError(format!(
                    "category '{}' already exists",
                    name
                )));
            }
        }

        let mut active: category::ActiveModel = cat.into();
        active.name = Set(name);
        let updated = active.update(&*self.db).await?;
        Ok(updated)
    }

    /// Deletes a category after detaching its recipes.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let cat = self.get(id).await?;

        Recipe::update_many()
            .col_expr(recipe::Column::CategoryId, Expr::value(Option::<Uuid>::None))
            .filter(recipe::Column::CategoryId.eq(id))
            .exec(&*self.db)
            .await?;

        let active: category::ActiveModel = cat.into();
        active.delete(&*self.db).await?;
        Ok(())
    }
}
