pub mod category;
pub mod pantry_item;
pub mod recipe;
pub mod shopping_item;

pub use category::Entity as Category;
pub use pantry_item::Entity as PantryItem;
pub use recipe::Entity as Recipe;
pub use shopping_item::Entity as ShoppingItem;

pub use category::Model as CategoryModel;
pub use pantry_item::Model as PantryItemModel;
pub use recipe::Model as RecipeModel;
pub use shopping_item::Model as ShoppingItemModel;
