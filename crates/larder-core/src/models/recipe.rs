//! Recipe domain model.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recipe with its linked ingredient and tag references.
///
/// Referenced ingredients/tags may belong to any user, not just the
/// recipe's owner — the catalog is shared at this layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    /// The user this recipe belongs to.
    pub owner: Uuid,
    pub title: String,
    /// Preparation time; never negative.
    pub time_minutes: u32,
    /// Fixed-point price, two fraction digits by convention.
    pub price: Decimal,
    pub link: Option<String>,
    pub ingredients: Vec<Uuid>,
    pub tags: Vec<Uuid>,
    /// Generated storage path, set via the image upload operation.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipe {
    pub owner: Uuid,
    pub title: String,
    pub time_minutes: u32,
    pub price: Decimal,
    pub link: Option<String>,
    pub ingredients: Vec<Uuid>,
    pub tags: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRecipe {
    pub title: Option<String>,
    pub time_minutes: Option<u32>,
    pub price: Option<Decimal>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub link: Option<Option<String>>,
    /// Replaces the full reference set when present.
    pub ingredients: Option<Vec<Uuid>>,
    /// Replaces the full reference set when present.
    pub tags: Option<Vec<Uuid>>,
}
