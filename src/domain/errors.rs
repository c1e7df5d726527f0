use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("Limit Reached")]
    LimitReached,

    #[error("Not Authorized")]
    NotAuthorized,

    #[error("Product Not Found")]
    ProductNotFound,

    #[error("Update Cart Failed")]
    UpdateCartFailed,

    #[error("Delete Cart Failed")]
    DeleteCartFailed,

    #[error("Checkout failed")]
    CheckoutFailed,

    #[error("Internal error: {0}")]
    Internal(String),
}
