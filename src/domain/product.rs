use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub price: i32,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated product fields, the only way product data reaches a write.
///
/// Field checks mirror the catalog's declarative rules: non-empty name,
/// URL-shaped image reference, non-negative price and stock.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub image_url: String,
    pub price: i32,
    pub stock: i32,
}

impl ProductDraft {
    pub fn new(
        name: String,
        image_url: String,
        price: i32,
        stock: i32,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation("Name can't be empty".to_string()));
        }
        if image_url.trim().is_empty() {
            return Err(DomainError::Validation("URL can't be empty".to_string()));
        }
        if Url::parse(&image_url).is_err() {
            return Err(DomainError::Validation("Must be an url format".to_string()));
        }
        if price < 0 {
            return Err(DomainError::Validation("Price can't be a minus".to_string()));
        }
        if stock < 0 {
            return Err(DomainError::Validation("Stock can't be a minus".to_string()));
        }
        Ok(Self {
            name,
            image_url,
            price,
            stock,
        })
    }
}
