//! Outbound mail adapters.

mod smtp_invite_mailer;

pub use smtp_invite_mailer::{SmtpInviteMailer, SmtpMailerConfig, SmtpMailerError};
