//! Receipt delivery over SMTP.
//!
//! Checkout hands the receipt off and moves on: `deliver` spawns the actual
//! send and never reports back to the caller. Failures land in the log.

use lettre::message::header::ContentType;
use lettre::message::{MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::cart::Receipt;
use crate::domain::ports::ReceiptMailer;

const RECEIPT_SUBJECT: &str = "Thank You For Shopping At SHOPI";

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
}

pub struct SmtpReceiptMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpReceiptMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    fn build_message(&self, receipt: &Receipt) -> Result<Message, String> {
        Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| format!("invalid from address {}", self.from_address))?,
            )
            .to(receipt
                .recipient
                .parse()
                .map_err(|_| format!("invalid recipient {}", receipt.recipient))?)
            .subject(RECEIPT_SUBJECT)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(render_text(receipt)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(render_html(receipt)),
                    ),
            )
            .map_err(|e| e.to_string())
    }
}

impl ReceiptMailer for SmtpReceiptMailer {
    fn deliver(&self, receipt: Receipt) {
        let message = match self.build_message(&receipt) {
            Ok(message) => message,
            Err(reason) => {
                log::warn!("receipt for {} not sent: {}", receipt.recipient, reason);
                return;
            }
        };

        let transport = self.transport.clone();
        let recipient = receipt.recipient;
        tokio::spawn(async move {
            match transport.send(message).await {
                Ok(_) => log::info!("receipt sent to {recipient}"),
                Err(e) => log::warn!("receipt delivery to {recipient} failed: {e}"),
            }
        });
    }
}

/// Stand-in mailer for environments without SMTP credentials. The receipt
/// content still reaches the log, so checkout behaves identically.
pub struct LogReceiptMailer;

impl ReceiptMailer for LogReceiptMailer {
    fn deliver(&self, receipt: Receipt) {
        log::info!(
            "receipt for {} ({} items, total {}): suppressed, SMTP not configured",
            receipt.recipient,
            receipt.lines.len(),
            receipt.total
        );
    }
}

pub fn render_text(receipt: &Receipt) -> String {
    let mut body = String::from("SHOPI\n\nHere are the list of item that you recently bought:\n");
    for line in &receipt.lines {
        body.push_str(&format!("  - {} X {}\n", line.product_name, line.quantity));
    }
    body.push_str(&format!("\nTotal: {}\n", receipt.total));
    body.push_str("\nWe look forward to your next purchase!\nWarm Regards, SHOPI\n");
    body
}

pub fn render_html(receipt: &Receipt) -> String {
    let mut items = String::new();
    for line in &receipt.lines {
        items.push_str(&format!(
            "<li> {} X {} </li>",
            escape_html(&line.product_name),
            line.quantity
        ));
    }
    format!(
        "<header>SHOPI</header>\
         <h1>Here are the list of item that you recently bought</h1>\
         <ul>{items}</ul>\
         <h4>Total: <strong>{total}</strong></h4>\
         <footer><p>We look forward to your next purchase!</p>\
         <i>Warm Regards, SHOPI</i></footer>",
        items = items,
        total = receipt.total
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
