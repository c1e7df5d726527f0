use uuid::Uuid;

use super::cart::{CartLine, CartLineWithProduct, HistoryEntryWithProduct, PurchasedLine, Receipt};
use super::errors::DomainError;
use super::product::{ProductDraft, ProductView};

pub trait CartRepository: Send + Sync + 'static {
    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<CartLineWithProduct>, DomainError>;

    fn find_line(&self, user_id: Uuid, product_id: Uuid)
        -> Result<Option<CartLine>, DomainError>;

    /// Insert a fresh line with quantity 1.
    fn create_line(&self, user_id: Uuid, product_id: Uuid) -> Result<CartLine, DomainError>;

    /// Atomically add `by` to the stored quantity. Returns `None` when no row
    /// matched.
    fn increment_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        by: i32,
    ) -> Result<Option<CartLine>, DomainError>;

    /// Delete one line by id, scoped to its owner. Returns the row count.
    fn delete_line(&self, user_id: Uuid, line_id: Uuid) -> Result<usize, DomainError>;

    /// Convert the user's cart into history in a single transaction:
    /// decrement stock per line, archive the lines, clear the cart.
    /// Returns the purchased lines, empty if the cart was empty.
    fn checkout(&self, user_id: Uuid) -> Result<Vec<PurchasedLine>, DomainError>;

    fn history_for_user(&self, user_id: Uuid)
        -> Result<Vec<HistoryEntryWithProduct>, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn list(&self) -> Result<Vec<ProductView>, DomainError>;
    fn find(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;
    fn create(&self, draft: ProductDraft) -> Result<ProductView, DomainError>;
    fn update(&self, id: Uuid, draft: ProductDraft) -> Result<Option<ProductView>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<usize, DomainError>;
}

/// Outbound notification port. Delivery is fire-and-forget: implementations
/// must never block the caller on the actual send.
pub trait ReceiptMailer: Send + Sync + 'static {
    fn deliver(&self, receipt: Receipt);
}
