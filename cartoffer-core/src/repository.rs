use async_trait::async_trait;

use crate::offer::{NewOffer, Offer};
use crate::{CoreResult, RestaurantId};

/// Storage for offer definitions, keyed by restaurant.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Validate and append an offer to its restaurant's list.
    async fn register(&self, offer: NewOffer) -> CoreResult<Offer>;

    /// All offers for a restaurant, in registration order. Empty when none.
    async fn offers_for(&self, restaurant_id: RestaurantId) -> CoreResult<Vec<Offer>>;
}
