use uuid::Uuid;

use crate::domain::cart::{CartLineWithProduct, CartUpdate, HistoryEntryWithProduct, Receipt};
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, ProductRepository};

pub struct CartService<C, P> {
    cart: C,
    products: P,
}

impl<C: CartRepository, P: ProductRepository> CartService<C, P> {
    pub fn new(cart: C, products: P) -> Self {
        Self { cart, products }
    }

    pub fn list_cart(&self, user_id: Uuid) -> Result<Vec<CartLineWithProduct>, DomainError> {
        self.cart.list_for_user(user_id)
    }

    /// Add a product to the cart, or increment an existing line.
    ///
    /// A new line always starts at quantity 1, whatever quantity the request
    /// carried; only repeat adds honor the requested amount. Increments are
    /// refused once they would exceed the product's current stock.
    pub fn update_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartUpdate, DomainError> {
        if quantity < 1 {
            return Err(DomainError::Validation(
                "Quantity must be a positive number".to_string(),
            ));
        }

        let product = self
            .products
            .find(product_id)?
            .ok_or(DomainError::ProductNotFound)?;

        match self.cart.find_line(user_id, product_id)? {
            None => {
                let line = self.cart.create_line(user_id, product_id)?;
                Ok(CartUpdate::Created(line))
            }
            Some(line) => {
                if i64::from(product.stock) < i64::from(line.quantity) + i64::from(quantity) {
                    return Err(DomainError::LimitReached);
                }
                // Unreachable after the lookup by user id; kept as a guard.
                if line.user_id != user_id {
                    return Err(DomainError::NotAuthorized);
                }
                let updated = self
                    .cart
                    .increment_line(user_id, product_id, quantity)?
                    .ok_or(DomainError::UpdateCartFailed)?;
                Ok(CartUpdate::Incremented(updated))
            }
        }
    }

    pub fn remove_line(&self, user_id: Uuid, line_id: Uuid) -> Result<(), DomainError> {
        let deleted = self.cart.delete_line(user_id, line_id)?;
        if deleted != 1 {
            return Err(DomainError::DeleteCartFailed);
        }
        Ok(())
    }

    /// Convert the cart into purchase history and build the receipt.
    ///
    /// The repository runs the whole mutation in one transaction; the total
    /// is computed here from the purchased unit prices. A client-claimed
    /// total is only ever compared for logging, never trusted.
    pub fn checkout(
        &self,
        user_id: Uuid,
        email: &str,
        claimed_total: Option<i64>,
    ) -> Result<Receipt, DomainError> {
        let purchased = self.cart.checkout(user_id)?;
        if purchased.is_empty() {
            return Err(DomainError::CheckoutFailed);
        }

        let receipt = Receipt::new(email.to_string(), purchased);
        if let Some(claimed) = claimed_total {
            if claimed != receipt.total {
                log::warn!(
                    "checkout for {} claimed total {} but lines sum to {}",
                    user_id,
                    claimed,
                    receipt.total
                );
            }
        }
        Ok(receipt)
    }

    pub fn history(&self, user_id: Uuid) -> Result<Vec<HistoryEntryWithProduct>, DomainError> {
        self.cart.history_for_user(user_id)
    }
}
