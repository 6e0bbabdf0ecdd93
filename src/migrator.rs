#![allow(elided_lifetimes_in_paths)]

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_pantry_items_table::Migration),
            Box::new(m20240101_000002_create_shopping_items_table::Migration),
            Box::new(m20240101_000003_create_recipes_table::Migration),
            Box::new(m20240101_000004_create_categories_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_pantry_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_pantry_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PantryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PantryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PantryItems::Name).string().not_null())
                        .col(ColumnDef::new(PantryItems::QuantityAmount).decimal_len(19, 4))
                        .col(
                            ColumnDef::new(PantryItems::Unit)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(PantryItems::LowStockThreshold).decimal_len(19, 4))
                        .col(ColumnDef::new(PantryItems::Storage).string().not_null())
                        .col(ColumnDef::new(PantryItems::SellByDate).date().not_null())
                        .col(
                            ColumnDef::new(PantryItems::Notes)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(PantryItems::Used)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PantryItems::AddedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PantryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_pantry_items_sell_by_date")
                        .table(PantryItems::Table)
                        .col(PantryItems::SellByDate)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PantryItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PantryItems {
        Table,
        Id,
        Name,
        QuantityAmount,
        Unit,
        LowStockThreshold,
        Storage,
        SellByDate,
        Notes,
        Used,
        AddedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_shopping_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_shopping_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ShoppingItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ShoppingItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ShoppingItems::Name).string().not_null())
                        .col(
                            ColumnDef::new(ShoppingItems::QuantityText)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(ShoppingItems::Section).string().not_null())
                        .col(
                            ColumnDef::new(ShoppingItems::Checked)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ShoppingItems::AddedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Speeds up the dispatcher's case-insensitive active-entry lookup.
            manager
                .create_index(
                    Index::create()
                        .name("idx_shopping_items_checked")
                        .table(ShoppingItems::Table)
                        .col(ShoppingItems::Checked)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ShoppingItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ShoppingItems {
        Table,
        Id,
        Name,
        QuantityText,
        Section,
        Checked,
        AddedAt,
    }
}

mod m20240101_000003_create_recipes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_recipes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Recipes::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Recipes::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Recipes::Title).string().not_null())
                        .col(
                            ColumnDef::new(Recipes::Description)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Recipes::Ingredients).text().not_null())
                        .col(ColumnDef::new(Recipes::Instructions).text().not_null())
                        .col(
                            ColumnDef::new(Recipes::PrepTime)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Recipes::CookTime)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Recipes::Servings)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Recipes::Calories).integer())
                        .col(ColumnDef::new(Recipes::ProteinG).decimal_len(6, 1))
                        .col(ColumnDef::new(Recipes::CarbsG).decimal_len(6, 1))
                        .col(ColumnDef::new(Recipes::FatG).decimal_len(6, 1))
                        .col(ColumnDef::new(Recipes::FiberG).decimal_len(6, 1))
                        .col(ColumnDef::new(Recipes::SugarG).decimal_len(6, 1))
                        .col(ColumnDef::new(Recipes::SodiumMg).integer())
                        .col(
                            ColumnDef::new(Recipes::IngredientsHash)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Recipes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Recipes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Recipes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Recipes {
        Table,
        Id,
        Title,
        Description,
        Ingredients,
        Instructions,
        PrepTime,
        CookTime,
        Servings,
        Calories,
        ProteinG,
        CarbsG,
        FatG,
        FiberG,
        SugarG,
        SodiumMg,
        IngredientsHash,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_categories_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Categories::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(
                            ColumnDef::new(Categories::AddedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_categories_name")
                        .table(Categories::Table)
                        .col(Categories::Name)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            // Optional category per recipe; detached (set to null) when the
            // category is deleted, so no database-level FK here.
            manager
                .alter_table(
                    Table::alter()
                        .table(Recipes::Table)
                        .add_column(ColumnDef::new(Recipes::CategoryId).uuid())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_recipes_category_id")
                        .table(Recipes::Table)
                        .col(Recipes::CategoryId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .alter_table(
                    Table::alter()
                        .table(Recipes::Table)
                        .drop_column(Recipes::CategoryId)
                        .to_owned(),
                )
                .await?;
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Categories {
        Table,
        Id,
        Name,
        AddedAt,
    }

    #[derive(DeriveIden)]
    enum Recipes {
        Table,
        CategoryId,
    }
}
