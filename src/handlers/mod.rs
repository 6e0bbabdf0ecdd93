pub mod categories;
pub mod dashboard;
pub mod health;
pub mod pantry;
pub mod recipes;
pub mod shopping;

use serde::Deserialize;
use utoipa::IntoParams;

/// Common `?show=` filter used by the pantry and shopping list views:
/// `active` (default) hides used/checked rows, `all` includes them.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ShowParams {
    pub show: Option<String>,
}

impl ShowParams {
    pub fn include_all(&self) -> bool {
        self.show.as_deref() == Some("all")
    }
}
