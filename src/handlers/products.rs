use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::auth::{AdminUser, AuthenticatedUser};
use crate::db::DbPool;
use crate::domain::product::{ProductDraft, ProductView};
use crate::errors::AppError;
use crate::infrastructure::product_repo::DieselProductRepository;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductPayload {
    pub name: String,
    pub image_url: String,
    pub price: i32,
    pub stock: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub price: i32,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductView> for ProductResponse {
    fn from(product: ProductView) -> Self {
        Self {
            id: product.id,
            name: product.name,
            image_url: product.image_url,
            price: product.price,
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl TryFrom<ProductPayload> for ProductDraft {
    type Error = AppError;

    fn try_from(payload: ProductPayload) -> Result<Self, AppError> {
        ProductDraft::new(
            payload.name,
            payload.image_url,
            payload.price,
            payload.stock,
        )
        .map_err(Into::into)
    }
}

fn catalog_service(pool: DbPool) -> CatalogService<DieselProductRepository> {
    CatalogService::new(DieselProductRepository::new(pool))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Lists the whole catalog; open to any authenticated user.
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
        (status = 401, description = "Missing or invalid identity"),
    ),
    tag = "products"
)]
pub async fn read_all(
    pool: web::Data<DbPool>,
    _user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let products = web::block(move || catalog_service(pool).list())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /products
///
/// Creates a product after field validation. Admin only.
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Field validation failed"),
        (status = 401, description = "Caller is not an admin"),
    ),
    tag = "products"
)]
pub async fn add_product(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    body: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let draft = ProductDraft::try_from(body.into_inner())?;

    let product = web::block(move || catalog_service(pool).create(draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// GET /products/{id}
///
/// Fetches one product. Admin only.
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 401, description = "Caller is not an admin"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_one(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let id = path.into_inner();

    let product = web::block(move || catalog_service(pool).get(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /products/{id}
///
/// Full-record update with the same validation as creation. Admin only.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Field validation failed"),
        (status = 401, description = "Caller is not an admin"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn update_product(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    body: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let id = path.into_inner();
    let draft = ProductDraft::try_from(body.into_inner())?;

    let product = web::block(move || catalog_service(pool).update(id, draft))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /products/{id}
///
/// Removes a product from the catalog. Admin only.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 401, description = "Caller is not an admin"),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    pool: web::Data<DbPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let pool = pool.get_ref().clone();
    let id = path.into_inner();

    web::block(move || catalog_service(pool).delete(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "msg": "Product deleted" })))
}
