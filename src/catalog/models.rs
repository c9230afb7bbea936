use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{KioskError, KioskResult};

pub const PRINTING_TYPE: &str = "Printing type";
pub const BINDING_AND_FINISHING: &str = "Binding and Finishing";
pub const LOCATION: &str = "Location";

/// A priced option, unique per `(field_name, name)`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow, PartialEq)]
pub struct CatalogEntry {
    #[schema(example = "a1b2c3d4-e5f6-7890-1234-567890abcdef")]
    pub id: Uuid,
    #[schema(example = "Printing type")]
    pub field_name: String,
    #[schema(example = "Black & White")]
    pub name: String,
    #[schema(example = 2.0)]
    pub cost: f64,
}

impl CatalogEntry {
    pub fn new(field_name: impl Into<String>, name: impl Into<String>, cost: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            field_name: field_name.into(),
            name: name.into(),
            cost,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CatalogItemRequest {
    #[schema(example = "Binding and Finishing")]
    pub field_name: String,
    #[schema(example = "Spiral Binding")]
    pub name: String,
    #[schema(example = 30.0)]
    pub cost: f64,
}

impl CatalogItemRequest {
    pub fn validate(&self) -> KioskResult<()> {
        if self.field_name.trim().is_empty() {
            return Err(KioskError::Validation("field_name cannot be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(KioskError::Validation("name cannot be empty".to_string()));
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(KioskError::Validation(
                "cost must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQuery {
    /// Only list entries of this category.
    pub field_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogMessageResponse {
    pub message: String,
    pub entry: CatalogEntry,
}
