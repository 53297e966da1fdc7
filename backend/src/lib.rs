//! Tripboard backend library modules.
//!
//! - [`domain`]: entities, services, and the ports they depend on
//! - [`inbound`]: HTTP handlers translating requests into port calls
//! - [`outbound`]: PostgreSQL, Redis, SMTP, identity, and Places adapters
//! - [`middleware`]: request tracing

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
