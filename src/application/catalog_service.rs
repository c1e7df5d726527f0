use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{ProductDraft, ProductView};

/// CRUD over the product catalog. All field rules live in [`ProductDraft`];
/// this service only adds not-found handling on top of the repository.
pub struct CatalogService<P> {
    products: P,
}

impl<P: ProductRepository> CatalogService<P> {
    pub fn new(products: P) -> Self {
        Self { products }
    }

    pub fn list(&self) -> Result<Vec<ProductView>, DomainError> {
        self.products.list()
    }

    pub fn get(&self, id: Uuid) -> Result<ProductView, DomainError> {
        self.products.find(id)?.ok_or(DomainError::ProductNotFound)
    }

    pub fn create(&self, draft: ProductDraft) -> Result<ProductView, DomainError> {
        self.products.create(draft)
    }

    pub fn update(&self, id: Uuid, draft: ProductDraft) -> Result<ProductView, DomainError> {
        self.products
            .update(id, draft)?
            .ok_or(DomainError::ProductNotFound)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self.products.delete(id)?;
        if deleted != 1 {
            return Err(DomainError::ProductNotFound);
        }
        Ok(())
    }
}
