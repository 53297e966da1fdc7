//! Driving port for reading the candidate pool.

use async_trait::async_trait;

use crate::domain::{CandidatePoolRow, Error, ProjectId, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateQuery: Send + Sync {
    /// Compute the pool as seen by `actor`.
    async fn pool(
        &self,
        actor: &UserId,
        project_id: &ProjectId,
    ) -> Result<Vec<CandidatePoolRow>, Error>;
}
