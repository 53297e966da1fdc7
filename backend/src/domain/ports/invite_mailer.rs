//! Driven port for delivering invite emails.
use async_trait::async_trait;

use crate::domain::InviteEmail;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while sending invite mail.
    pub enum InviteMailerError {
        /// The message could not be built from its parts.
        Message { message: String } => "invite email could not be built: {message}",
        /// The relay refused or failed to accept the message.
        Delivery { message: String } => "invite email delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InviteMailer: Send + Sync {
    /// Deliver one invite.
    async fn send(&self, email: &InviteEmail) -> Result<(), InviteMailerError>;
}

/// Mailer used when no relay is configured; messages are logged and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingInviteMailer;

#[async_trait]
impl InviteMailer for LoggingInviteMailer {
    async fn send(&self, email: &InviteEmail) -> Result<(), InviteMailerError> {
        tracing::info!(
            to = %email.to,
            accept_url = %email.accept_url,
            "no mail relay configured; invite email not sent"
        );
        Ok(())
    }
}
