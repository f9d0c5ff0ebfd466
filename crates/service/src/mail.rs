//! Background email dispatch.
//!
//! Requests enqueue an [`EmailJob`] and return immediately; a single tokio
//! task drains the queue and hands each job to a [`MailTransport`]:
//! [`SmtpTransport`] when a relay is configured, otherwise [`LogTransport`].

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJob {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid message: {0}")]
    Message(String),
}

#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    async fn send(&self, job: &EmailJob) -> Result<(), MailError>;
}

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Default, Clone)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, job: &EmailJob) -> Result<(), MailError> {
        info!(from = %job.from, to = %job.to, subject = %job.subject, body = %job.html_body, "mail_sent");
        Ok(())
    }
}

/// Delivers mail through an SMTP relay.
#[derive(Clone)]
pub struct SmtpTransport {
    relay: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Build a relay from the `[mail]` section, or `None` when no SMTP host
    /// is configured.
    pub fn from_config(cfg: &configs::MailConfig) -> Result<Option<Self>, MailError> {
        let Some(host) = cfg.smtp_host.as_deref() else {
            return Ok(None);
        };
        let mut builder = if cfg.smtp_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| MailError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        builder = builder.port(cfg.smtp_port);
        if let (Some(user), Some(password)) = (&cfg.smtp_user, &cfg.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }
        info!(host, port = cfg.smtp_port, starttls = cfg.smtp_starttls, "smtp relay configured");
        Ok(Some(Self { relay: builder.build() }))
    }
}

/// Turn a job into an HTML message with parsed sender and recipient.
pub fn build_message(job: &EmailJob) -> Result<Message, MailError> {
    let from: Mailbox = job.from.parse().map_err(|e| MailError::Message(format!("from: {e}")))?;
    let to: Mailbox = job.to.parse().map_err(|e| MailError::Message(format!("to: {e}")))?;
    Message::builder()
        .from(from)
        .to(to)
        .subject(job.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(job.html_body.clone())
        .map_err(|e| MailError::Message(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, job: &EmailJob) -> Result<(), MailError> {
        let message = build_message(job)?;
        self.relay.send(message).await.map_err(|e| MailError::Transport(e.to_string()))?;
        info!(to = %job.to, subject = %job.subject, "mail_sent");
        Ok(())
    }
}

/// Handle to the mail worker. Cheap to clone.
#[derive(Clone)]
pub struct Mailer {
    tx: mpsc::UnboundedSender<EmailJob>,
}

impl Mailer {
    /// Start the worker on the current tokio runtime.
    pub fn spawn<T: MailTransport>(transport: T) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<EmailJob>();
        let transport = Arc::new(transport);
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                if let Err(e) = transport.send(&job).await {
                    warn!(to = %job.to, error = %e, "mail delivery failed");
                }
            }
            info!("mail worker stopped");
        });
        Self { tx }
    }

    /// Queue a job. Never blocks and never fails the caller.
    pub fn enqueue(&self, job: EmailJob) {
        if let Err(e) = self.tx.send(job) {
            warn!(to = %e.0.to, "mail queue closed; dropping message");
        }
    }
}

/// Welcome message carrying the activation link.
pub fn activation_email(from: &str, site_url: &str, to: &str, username: &str, token: &str) -> EmailJob {
    let link = format!("{}/user/active/{}", site_url.trim_end_matches('/'), token);
    let html_body = format!(
        "<h1>{username}, welcome to dailyfresh</h1>Please click the link below to activate your account<br/><a href=\"{link}\">{link}</a>"
    );
    EmailJob { from: from.to_string(), to: to.to_string(), subject: "dailyfresh welcome".into(), html_body }
}

/// Test transports
pub mod mock {
    use super::*;

    /// Forwards every delivered job to a channel.
    pub struct ChannelTransport(pub mpsc::UnboundedSender<EmailJob>);

    #[async_trait]
    impl MailTransport for ChannelTransport {
        async fn send(&self, job: &EmailJob) -> Result<(), MailError> {
            self.0.send(job.clone()).map_err(|e| MailError::Transport(e.to_string()))
        }
    }

    /// Worker plus the receiving end of everything it delivered.
    pub fn capturing_mailer() -> (Mailer, mpsc::UnboundedReceiver<EmailJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Mailer::spawn(ChannelTransport(tx)), rx)
    }
}
