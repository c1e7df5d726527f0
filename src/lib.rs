pub mod application;
pub mod auth;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::ports::ReceiptMailer;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::read_all,
        handlers::cart::update_cart,
        handlers::cart::remove_cart,
        handlers::cart::checkout,
        handlers::cart::get_history,
        handlers::products::read_all,
        handlers::products::add_product,
        handlers::products::get_one,
        handlers::products::update_product,
        handlers::products::delete_product,
    ),
    components(schemas(
        handlers::cart::UpdateCartRequest,
        handlers::cart::CheckoutRequest,
        handlers::cart::CartLineResponse,
        handlers::cart::CartLineDetailResponse,
        handlers::cart::HistoryEntryResponse,
        handlers::cart::MessageResponse,
        handlers::products::ProductPayload,
        handlers::products::ProductResponse,
    ))
)]
struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    mailer: Arc<dyn ReceiptMailer>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::from(mailer.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/cart")
                    .route("/checkout", web::post().to(handlers::cart::checkout))
                    .route("/history", web::get().to(handlers::cart::get_history))
                    .route("", web::get().to(handlers::cart::read_all))
                    .route("", web::put().to(handlers::cart::update_cart))
                    .route("/{id}", web::delete().to(handlers::cart::remove_cart)),
            )
            .service(
                web::scope("/products")
                    .route("", web::get().to(handlers::products::read_all))
                    .route("", web::post().to(handlers::products::add_product))
                    .route("/{id}", web::get().to(handlers::products::get_one))
                    .route("/{id}", web::put().to(handlers::products::update_product))
                    .route("/{id}", web::delete().to(handlers::products::delete_product)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
