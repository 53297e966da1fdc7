//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **cache**: Redis-backed Places search cache
//! - **places**: Places text search over HTTP
//! - **identity**: verification of identity provider JWTs
//! - **mail**: SMTP delivery of project invites
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod identity;
pub mod mail;
pub mod persistence;
pub mod places;
