use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::cart_service::CartService;
use crate::auth::AuthenticatedUser;
use crate::db::DbPool;
use crate::domain::cart::{CartLine, CartLineWithProduct, CartUpdate, HistoryEntryWithProduct};
use crate::domain::ports::ReceiptMailer;
use crate::errors::AppError;
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::product_repo::DieselProductRepository;

use super::products::ProductResponse;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Client-side display total. Informational only; the receipt total is
    /// recomputed from the stored unit prices.
    pub total: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineDetailResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub product: ProductResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub product: ProductResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            user_id: line.user_id,
            product_id: line.product_id,
            quantity: line.quantity,
        }
    }
}

impl From<CartLineWithProduct> for CartLineDetailResponse {
    fn from(item: CartLineWithProduct) -> Self {
        Self {
            id: item.line.id,
            user_id: item.line.user_id,
            product_id: item.line.product_id,
            quantity: item.line.quantity,
            product: item.product.into(),
        }
    }
}

impl From<HistoryEntryWithProduct> for HistoryEntryResponse {
    fn from(item: HistoryEntryWithProduct) -> Self {
        Self {
            id: item.entry.id,
            user_id: item.entry.user_id,
            product_id: item.entry.product_id,
            quantity: item.entry.quantity,
            created_at: item.entry.created_at,
            product: item.product.into(),
        }
    }
}

fn cart_service(pool: DbPool) -> CartService<DieselCartRepository, DieselProductRepository> {
    CartService::new(
        DieselCartRepository::new(pool.clone()),
        DieselProductRepository::new(pool),
    )
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /cart
///
/// Lists the caller's cart lines joined with their products.
#[utoipa::path(
    get,
    path = "/cart",
    responses(
        (status = 200, description = "The caller's cart", body = [CartLineDetailResponse]),
        (status = 401, description = "Missing or invalid identity"),
    ),
    tag = "cart"
)]
pub async fn read_all(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let lines = web::block(move || cart_service(pool).list_cart(user.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<CartLineDetailResponse> = lines.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// PUT /cart
///
/// Adds a product to the cart or increments an existing line. A new line
/// always starts at quantity 1; only repeat adds use the requested quantity.
#[utoipa::path(
    put,
    path = "/cart",
    request_body = UpdateCartRequest,
    responses(
        (status = 201, description = "Line created", body = CartLineResponse),
        (status = 200, description = "Line incremented", body = CartLineResponse),
        (status = 400, description = "Stock limit reached or invalid quantity"),
        (status = 401, description = "Missing or invalid identity"),
        (status = 404, description = "Unknown product or no row updated"),
    ),
    tag = "cart"
)]
pub async fn update_cart(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    body: web::Json<UpdateCartRequest>,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let body = body.into_inner();

    let outcome =
        web::block(move || cart_service(pool).update_cart(user.id, body.product_id, body.quantity))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

    match outcome {
        CartUpdate::Created(line) => {
            Ok(HttpResponse::Created().json(CartLineResponse::from(line)))
        }
        CartUpdate::Incremented(line) => Ok(HttpResponse::Ok().json(CartLineResponse::from(line))),
    }
}

/// DELETE /cart/{id}
///
/// Removes one of the caller's cart lines by id.
#[utoipa::path(
    delete,
    path = "/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart line UUID"),
    ),
    responses(
        (status = 200, description = "Line removed", body = MessageResponse),
        (status = 401, description = "Missing or invalid identity"),
        (status = 404, description = "No such line for this user"),
    ),
    tag = "cart"
)]
pub async fn remove_cart(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let line_id = path.into_inner();

    web::block(move || cart_service(pool).remove_line(user.id, line_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "msg": "Remove cart success" })))
}

/// POST /cart/checkout
///
/// Converts the whole cart into purchase history inside one transaction,
/// then hands the receipt to the mailer without waiting on delivery.
#[utoipa::path(
    post,
    path = "/cart/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout complete", body = MessageResponse),
        (status = 400, description = "Cart was empty"),
        (status = 401, description = "Missing or invalid identity"),
    ),
    tag = "cart"
)]
pub async fn checkout(
    pool: web::Data<DbPool>,
    mailer: web::Data<dyn ReceiptMailer>,
    user: AuthenticatedUser,
    body: Option<web::Json<CheckoutRequest>>,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let claimed_total = body.and_then(|b| b.into_inner().total);
    let email = user.email.clone();

    let receipt = web::block(move || cart_service(pool).checkout(user.id, &email, claimed_total))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    mailer.deliver(receipt);

    Ok(HttpResponse::Ok().json(json!({ "msg": "Checked out successfully" })))
}

/// GET /cart/history
///
/// Lists the caller's purchase history joined with product data.
#[utoipa::path(
    get,
    path = "/cart/history",
    responses(
        (status = 200, description = "Purchase history", body = [HistoryEntryResponse]),
        (status = 401, description = "Missing or invalid identity"),
    ),
    tag = "cart"
)]
pub async fn get_history(
    pool: web::Data<DbPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let entries = web::block(move || cart_service(pool).history(user.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<HistoryEntryResponse> = entries.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}
