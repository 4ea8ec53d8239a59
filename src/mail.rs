use crate::config::Config;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address {address:?}: {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },
    #[error("failed to build report message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

pub fn subject(hostname: &str) -> String {
    format!("System Health Report - {hostname}")
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

pub fn build_message(cfg: &Config, hostname: &str, html: &str) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(&cfg.from_address)?)
        .subject(subject(hostname));
    for to in &cfg.to_addresses {
        builder = builder.to(mailbox(to)?);
    }
    let message =
        builder.multipart(MultiPart::mixed().singlepart(SinglePart::html(html.to_string())))?;
    Ok(message)
}

pub async fn send_report(cfg: &Config, hostname: &str, html: &str) -> Result<(), MailError> {
    let message = build_message(cfg, hostname, html)?;
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(cfg.smtp_host.as_str())
        .port(cfg.smtp_port)
        .build();
    mailer.send(message).await?;
    info!(
        relay = %cfg.smtp_host,
        port = cfg.smtp_port,
        recipients = cfg.to_addresses.len(),
        "report mailed"
    );
    Ok(())
}
