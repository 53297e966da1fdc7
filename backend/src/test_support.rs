//! In-memory doubles and a wired-up harness for tests.
//!
//! Compiled for unit tests, and for `tests/` through the `test-support`
//! feature.

mod clock;
mod collaborators;
mod harness;
mod memory_plan;
mod memory_store;

pub use clock::MutableClock;
pub use collaborators::{
    InMemorySearchCache, RecordingMailer, StaticIdentityProvider, StubPlacesSource,
};
pub use harness::{TEST_BASE_URL, TestHarness};
pub use memory_store::InMemoryStore;
