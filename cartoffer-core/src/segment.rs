use async_trait::async_trait;

use crate::{CoreResult, UserId};

/// Maps a user to the single segment label they belong to.
#[async_trait]
pub trait SegmentResolver: Send + Sync {
    /// `Ok(None)` when the user has no segment on record.
    async fn segment_of(&self, user_id: UserId) -> CoreResult<Option<String>>;
}
