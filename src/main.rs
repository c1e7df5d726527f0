use std::env;
use std::sync::Arc;

use dotenvy::dotenv;
use shopi_service::domain::ports::ReceiptMailer;
use shopi_service::infrastructure::mailer::{LogReceiptMailer, SmtpConfig, SmtpReceiptMailer};
use shopi_service::{build_server, create_pool, run_migrations};

fn smtp_config_from_env() -> Option<SmtpConfig> {
    let host = env::var("SMTP_HOST").ok()?;
    let from_address = env::var("MAIL_FROM").ok()?;
    let port: u16 = env::var("SMTP_PORT")
        .unwrap_or_else(|_| "587".to_string())
        .parse()
        .expect("SMTP_PORT must be a valid number");

    Some(SmtpConfig {
        host,
        port,
        username: env::var("SMTP_USERNAME").unwrap_or_default(),
        password: env::var("SMTP_PASSWORD").unwrap_or_default(),
        from_address,
    })
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");

    let mailer: Arc<dyn ReceiptMailer> = match smtp_config_from_env() {
        Some(config) => {
            let mailer = SmtpReceiptMailer::new(&config).expect("Failed to build SMTP transport");
            log::info!("Sending receipts via {}:{}", config.host, config.port);
            Arc::new(mailer)
        }
        None => {
            log::warn!("SMTP not configured; receipts will only be logged");
            Arc::new(LogReceiptMailer)
        }
    };

    let pool = create_pool(&database_url);
    run_migrations(&pool);

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(pool, mailer, &host, port)?.await
}
