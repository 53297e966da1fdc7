//! Driving port for reading the selection board.

use async_trait::async_trait;

use crate::domain::{Error, ProjectId, SelectionBoard, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SelectionQuery: Send + Sync {
    /// Selections grouped by day.
    async fn board(&self, actor: &UserId, project_id: &ProjectId)
    -> Result<SelectionBoard, Error>;
}
