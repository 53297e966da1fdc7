//! `InviteMailer` delivering plain-text invites over SMTP with `lettre`.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use zeroize::Zeroizing;

use crate::domain::ports::{InviteMailer, InviteMailerError};
use crate::domain::{InviteEmail, InviteRole};

/// Relay, credentials, and sender for invite mail.
pub struct SmtpMailerConfig {
    /// Relay host; STARTTLS is required.
    pub relay: String,
    /// Relay port.
    pub port: u16,
    /// Optional login; without it the relay is used unauthenticated.
    pub username: Option<String>,
    /// Password for `username`.
    pub password: Option<Zeroizing<String>>,
    /// `From` header, e.g. `Tripboard <noreply@tripboard.example>`.
    pub from: String,
}

/// Errors raised while building the SMTP transport.
#[derive(Debug, thiserror::Error)]
pub enum SmtpMailerError {
    /// The sender address does not parse as a mailbox.
    #[error("invalid sender mailbox: {0}")]
    InvalidSender(String),
    /// The relay could not be configured.
    #[error("invalid smtp relay: {0}")]
    Relay(String),
}

/// Sends invite emails through an SMTP relay.
pub struct SmtpInviteMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpInviteMailer {
    /// Build a pooled STARTTLS transport for the configured relay.
    ///
    /// # Errors
    ///
    /// Returns [`SmtpMailerError`] when the sender or relay is invalid.
    pub fn new(config: SmtpMailerConfig) -> Result<Self, SmtpMailerError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|err| SmtpMailerError::InvalidSender(err.to_string()))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.relay)
            .map_err(|err| SmtpMailerError::Relay(err.to_string()))?
            .port(config.port);
        if let (Some(username), Some(password)) = (config.username, config.password) {
            let password = password.as_str().to_owned();
            builder = builder.credentials(Credentials::new(username, password));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

fn role_phrase(role: InviteRole) -> &'static str {
    match role {
        InviteRole::Editor => "plan it with them",
        InviteRole::Viewer => "follow along",
    }
}

fn render(email: &InviteEmail) -> (String, String) {
    let subject = format!("{} invited you to \"{}\"", email.inviter, email.project_title);
    let body = format!(
        "{inviter} invited you to {phrase} on Tripboard.\n\n\
         Trip: {title}\n\n\
         Accept the invitation:\n{url}\n\n\
         If you were not expecting this email you can ignore it.\n",
        inviter = email.inviter,
        phrase = role_phrase(email.role),
        title = email.project_title,
        url = email.accept_url,
    );
    (subject, body)
}

fn build_message(from: &Mailbox, email: &InviteEmail) -> Result<Message, InviteMailerError> {
    let to = email
        .to
        .as_str()
        .parse::<Mailbox>()
        .map_err(|err| InviteMailerError::message(err.to_string()))?;
    let (subject, body) = render(email);
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|err| InviteMailerError::message(err.to_string()))
}

#[async_trait]
impl InviteMailer for SmtpInviteMailer {
    async fn send(&self, email: &InviteEmail) -> Result<(), InviteMailerError> {
        let message = build_message(&self.from, email)?;
        self.transport
            .send(message)
            .await
            .map_err(|err| InviteMailerError::delivery(err.to_string()))?;
        tracing::debug!(to = %email.to, "invite email handed to relay");
        Ok(())
    }
}
