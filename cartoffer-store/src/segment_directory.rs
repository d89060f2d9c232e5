use std::collections::HashMap;

use async_trait::async_trait;
use cartoffer_core::{CoreError, CoreResult, SegmentResolver, UserId};
use tokio::sync::RwLock;
use tracing::info;

/// In-process user → segment table.
///
/// Stands in for the external segment service in local runs and tests.
#[derive(Default)]
pub struct InMemorySegmentDirectory {
    segments: RwLock<HashMap<UserId, String>>,
}

impl InMemorySegmentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed<I>(seed: I) -> Self
    where
        I: IntoIterator<Item = (UserId, String)>,
    {
        Self {
            segments: RwLock::new(seed.into_iter().collect()),
        }
    }

    /// Assign `segment` to `user_id`, replacing any previous label.
    pub async fn set_segment(&self, user_id: UserId, segment: &str) -> CoreResult<()> {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(CoreError::Validation("segment must not be blank".into()));
        }
        self.segments.write().await.insert(user_id, segment.to_string());
        info!("User {} assigned to segment {}", user_id, segment);
        Ok(())
    }
}

#[async_trait]
impl SegmentResolver for InMemorySegmentDirectory {
    async fn segment_of(&self, user_id: UserId) -> CoreResult<Option<String>> {
        Ok(self.segments.read().await.get(&user_id).cloned())
    }
}
