use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use cartoffer_core::{OfferRepository, SegmentResolver};
use cartoffer_offer::OfferEvaluator;
use cartoffer_store::app_config::{Config, SegmentSource, StorageBackend};
use cartoffer_store::{
    HttpSegmentResolver, InMemoryOfferRepository, InMemorySegmentDirectory, RedisOfferRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub offers: Arc<dyn OfferRepository>,
    pub evaluator: OfferEvaluator,
    /// Present only when segments are served from the in-process directory.
    pub segment_directory: Option<Arc<InMemorySegmentDirectory>>,
}

impl AppState {
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        segments: Arc<dyn SegmentResolver>,
        segment_directory: Option<Arc<InMemorySegmentDirectory>>,
    ) -> Self {
        Self {
            evaluator: OfferEvaluator::new(offers.clone(), segments),
            offers,
            segment_directory,
        }
    }

    /// Fully in-process state: memory registry plus a writable segment directory.
    pub fn in_memory(directory: Arc<InMemorySegmentDirectory>) -> Self {
        Self::new(
            Arc::new(InMemoryOfferRepository::new()),
            directory.clone(),
            Some(directory),
        )
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let offers: Arc<dyn OfferRepository> = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!("Offer registry: in-memory");
                Arc::new(InMemoryOfferRepository::new())
            }
            StorageBackend::Redis => {
                tracing::info!("Offer registry: redis at {}", config.storage.redis_url);
                let repo = RedisOfferRepository::new(&config.storage.redis_url)
                    .await
                    .context("Failed to connect to Redis")?;
                Arc::new(repo)
            }
        };

        let state = match config.segments.source {
            SegmentSource::Memory => {
                let seed = config.segments.seed_entries()?;
                tracing::info!("Segment source: in-memory directory ({} seeded users)", seed.len());
                let directory = Arc::new(InMemorySegmentDirectory::with_seed(seed));
                Self::new(offers, directory.clone(), Some(directory))
            }
            SegmentSource::Http => {
                tracing::info!("Segment source: {}", config.segments.base_url);
                let resolver = HttpSegmentResolver::new(
                    &config.segments.base_url,
                    Duration::from_millis(config.segments.timeout_ms),
                    config.segments.failure_threshold,
                    Duration::from_secs(config.segments.reset_timeout_seconds),
                )
                .context("Failed to build segment service client")?;
                Self::new(offers, Arc::new(resolver), None)
            }
        };

        Ok(state)
    }
}
