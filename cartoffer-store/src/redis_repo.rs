use async_trait::async_trait;
use cartoffer_core::{CoreError, CoreResult, NewOffer, Offer, OfferRepository, RestaurantId};
use redis::AsyncCommands;
use tracing::{error, info};

/// Offer registry backed by one Redis list per restaurant.
///
/// `RPUSH` is atomic per key, so concurrent registrations for a restaurant
/// never interleave partial records and `LRANGE` always sees whole offers.
#[derive(Clone)]
pub struct RedisOfferRepository {
    client: redis::Client,
}

impl RedisOfferRepository {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub fn restaurant_key(restaurant_id: RestaurantId) -> String {
        format!("offers:restaurant:{}", restaurant_id)
    }

    async fn connection(&self) -> CoreResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(storage_error)
    }
}

fn storage_error(err: redis::RedisError) -> CoreError {
    CoreError::Storage(err.to_string())
}

#[async_trait]
impl OfferRepository for RedisOfferRepository {
    async fn register(&self, offer: NewOffer) -> CoreResult<Offer> {
        offer.validate()?;
        let offer = Offer::from_new(offer);
        let payload = serde_json::to_string(&offer)
            .map_err(|e| CoreError::Storage(format!("Failed to encode offer: {}", e)))?;

        let mut conn = self.connection().await?;
        let key = Self::restaurant_key(offer.restaurant_id);
        conn.rpush::<_, _, ()>(key, payload).await.map_err(storage_error)?;

        info!("Offer {} stored for restaurant {}", offer.id, offer.restaurant_id);
        Ok(offer)
    }

    async fn offers_for(&self, restaurant_id: RestaurantId) -> CoreResult<Vec<Offer>> {
        let mut conn = self.connection().await?;
        let key = Self::restaurant_key(restaurant_id);
        let raw: Vec<String> = conn.lrange(key, 0, -1).await.map_err(storage_error)?;

        decode_offers(restaurant_id, &raw)
    }
}

/// Decode a restaurant's stored list. A single unreadable entry fails the
/// whole read; callers never see a partial list.
fn decode_offers(restaurant_id: RestaurantId, raw: &[String]) -> CoreResult<Vec<Offer>> {
    raw.iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_str::<Offer>(entry).map_err(|e| {
                error!("Unreadable offer #{} for restaurant {}: {}", index, restaurant_id, e);
                CoreError::Storage(format!(
                    "offer #{} for restaurant {} is unreadable: {}",
                    index, restaurant_id, e
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restaurant_key() {
        assert_eq!(RedisOfferRepository::restaurant_key(13), "offers:restaurant:13");
        assert_eq!(RedisOfferRepository::restaurant_key(-1), "offers:restaurant:-1");
    }

    #[test]
    fn test_decode_offers_keeps_order() {
        let first = Offer::from_new(NewOffer::new(11, cartoffer_core::Discount::FlatPercent(10), ["p3"]));
        let second = Offer::from_new(NewOffer::new(11, cartoffer_core::Discount::FlatPercent(15), ["p3"]));
        let raw = vec![
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap(),
        ];

        let offers = decode_offers(11, &raw).unwrap();
        assert_eq!(offers, vec![first, second]);
        assert!(decode_offers(11, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_entry_fails_the_read() {
        let good = Offer::from_new(NewOffer::new(11, cartoffer_core::Discount::FlatPercent(10), ["p3"]));
        let raw = vec![serde_json::to_string(&good).unwrap(), "{\"id\": 42".to_string()];

        match decode_offers(11, &raw) {
            Err(CoreError::Storage(msg)) => assert!(msg.contains("#1")),
            other => panic!("expected a storage error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_invalid_offer_before_touching_redis() {
        // Nothing listens here; validation must fail first.
        let repo = RedisOfferRepository::new("redis://127.0.0.1:1/").await.unwrap();
        let result = repo
            .register(NewOffer::new(1, cartoffer_core::Discount::FlatX(-1), ["p1"]))
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
