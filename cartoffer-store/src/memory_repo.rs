use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cartoffer_core::{CoreResult, NewOffer, Offer, OfferRepository, RestaurantId};
use tokio::sync::RwLock;
use tracing::info;

type OfferList = Arc<RwLock<Vec<Offer>>>;

/// Process-local offer registry.
///
/// Each restaurant owns its own append-only list behind its own lock; the
/// outer map lock is only held long enough to find or create that list.
#[derive(Default)]
pub struct InMemoryOfferRepository {
    restaurants: RwLock<HashMap<RestaurantId, OfferList>>,
}

impl InMemoryOfferRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn list_for(&self, restaurant_id: RestaurantId) -> Option<OfferList> {
        self.restaurants.read().await.get(&restaurant_id).cloned()
    }

    async fn list_for_write(&self, restaurant_id: RestaurantId) -> OfferList {
        if let Some(list) = self.list_for(restaurant_id).await {
            return list;
        }
        let mut restaurants = self.restaurants.write().await;
        restaurants.entry(restaurant_id).or_default().clone()
    }
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn register(&self, offer: NewOffer) -> CoreResult<Offer> {
        offer.validate()?;
        let offer = Offer::from_new(offer);

        let list = self.list_for_write(offer.restaurant_id).await;
        list.write().await.push(offer.clone());

        info!(
            "Offer {} registered for restaurant {}: {} on {:?}",
            offer.id, offer.restaurant_id, offer.discount, offer.segments
        );
        Ok(offer)
    }

    async fn offers_for(&self, restaurant_id: RestaurantId) -> CoreResult<Vec<Offer>> {
        match self.list_for(restaurant_id).await {
            Some(list) => Ok(list.read().await.clone()),
            None => Ok(Vec::new()),
        }
    }
}
