pub mod categories;
pub mod enrichment;
pub mod freshness;
pub mod pantry;
pub mod recipes;
pub mod shopping;

pub use categories::CategoryService;
pub use enrichment::{AnthropicClient, EnrichmentClient};
pub use pantry::PantryService;
pub use recipes::RecipeService;
pub use shopping::ShoppingListService;
