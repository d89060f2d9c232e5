use std::sync::Arc;

use cartoffer_core::{
    ApplyOutcome, ApplyRequest, CoreResult, Offer, OfferRepository, SegmentResolver,
};
use tracing::{debug, info, warn};

use crate::discount::discounted_value;

/// Pick the offer targeting `segment` that leaves the lowest cart value.
///
/// Ties go to the offer registered first, so the choice is stable for a given
/// registry snapshot.
pub fn select_best<'a>(
    offers: &'a [Offer],
    segment: &str,
    cart_value: i64,
) -> Option<(&'a Offer, i64)> {
    let mut best: Option<(&Offer, i64)> = None;

    for offer in offers {
        if !offer.targets(segment) {
            continue;
        }

        let value = discounted_value(cart_value, &offer.discount);
        match best {
            Some((_, current)) if current <= value => {}
            _ => best = Some((offer, value)),
        }
    }

    best
}

/// Applies a restaurant's best matching offer to a cart.
///
/// Holds no state of its own; every call reads the registry and asks the
/// segment resolver once.
#[derive(Clone)]
pub struct OfferEvaluator {
    offers: Arc<dyn OfferRepository>,
    segments: Arc<dyn SegmentResolver>,
}

impl OfferEvaluator {
    pub fn new(offers: Arc<dyn OfferRepository>, segments: Arc<dyn SegmentResolver>) -> Self {
        Self { offers, segments }
    }

    pub async fn apply(&self, req: &ApplyRequest) -> CoreResult<ApplyOutcome> {
        req.validate()?;

        // A failed lookup means "no segment", never a failed request.
        let segment = match self.segments.segment_of(req.user_id).await {
            Ok(segment) => segment,
            Err(e) => {
                warn!("Segment lookup for user {} failed, applying no offer: {}", req.user_id, e);
                None
            }
        };

        let Some(segment) = segment else {
            debug!("User {} has no segment, cart unchanged", req.user_id);
            return Ok(ApplyOutcome::unchanged(req.cart_value, None));
        };

        let offers = self.offers.offers_for(req.restaurant_id).await?;

        match select_best(&offers, &segment, req.cart_value) {
            Some((offer, cart_value)) => {
                info!(
                    "Applied offer {} ({}) for user {} at restaurant {}: {} -> {}",
                    offer.id, offer.discount, req.user_id, req.restaurant_id, req.cart_value, cart_value
                );
                Ok(ApplyOutcome {
                    cart_value,
                    applied_offer: Some(offer.id),
                    segment: Some(segment),
                })
            }
            None => {
                debug!(
                    "No offer at restaurant {} targets segment {} ({} registered)",
                    req.restaurant_id,
                    segment,
                    offers.len()
                );
                Ok(ApplyOutcome::unchanged(req.cart_value, Some(segment)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cartoffer_core::{CoreError, Discount, NewOffer, RestaurantId, UserId};
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct VecRepository {
        offers: Mutex<Vec<Offer>>,
    }

    #[async_trait]
    impl OfferRepository for VecRepository {
        async fn register(&self, offer: NewOffer) -> CoreResult<Offer> {
            offer.validate()?;
            let offer = Offer::from_new(offer);
            self.offers.lock().await.push(offer.clone());
            Ok(offer)
        }

        async fn offers_for(&self, restaurant_id: RestaurantId) -> CoreResult<Vec<Offer>> {
            let offers = self.offers.lock().await;
            Ok(offers.iter().filter(|o| o.restaurant_id == restaurant_id).cloned().collect())
        }
    }

    struct BrokenRepository;

    #[async_trait]
    impl OfferRepository for BrokenRepository {
        async fn register(&self, _offer: NewOffer) -> CoreResult<Offer> {
            Err(CoreError::Storage("down".into()))
        }

        async fn offers_for(&self, _restaurant_id: RestaurantId) -> CoreResult<Vec<Offer>> {
            Err(CoreError::Storage("down".into()))
        }
    }

    struct FixedSegments(HashMap<UserId, String>);

    #[async_trait]
    impl SegmentResolver for FixedSegments {
        async fn segment_of(&self, user_id: UserId) -> CoreResult<Option<String>> {
            Ok(self.0.get(&user_id).cloned())
        }
    }

    struct FailingSegments;

    #[async_trait]
    impl SegmentResolver for FailingSegments {
        async fn segment_of(&self, _user_id: UserId) -> CoreResult<Option<String>> {
            Err(CoreError::SegmentLookup("connection refused".into()))
        }
    }

    fn segments(pairs: &[(UserId, &str)]) -> Arc<FixedSegments> {
        Arc::new(FixedSegments(pairs.iter().map(|(u, s)| (*u, s.to_string())).collect()))
    }

    fn request(user_id: UserId, restaurant_id: RestaurantId, cart_value: i64) -> ApplyRequest {
        ApplyRequest { user_id, restaurant_id, cart_value }
    }

    #[test]
    fn test_select_best_prefers_lowest_result() {
        let offers = vec![
            Offer::from_new(NewOffer::new(11, Discount::FlatPercent(10), ["p3"])),
            Offer::from_new(NewOffer::new(11, Discount::FlatPercent(15), ["p3"])),
            Offer::from_new(NewOffer::new(11, Discount::FlatX(100), ["p1"])),
        ];

        let (offer, value) = select_best(&offers, "p3", 200).expect("an offer should match");
        assert_eq!(value, 170);
        assert_eq!(offer.id, offers[1].id);
    }

    #[test]
    fn test_select_best_compares_across_discount_types() {
        let offers = vec![
            Offer::from_new(NewOffer::new(1, Discount::FlatX(25), ["p1"])),
            Offer::from_new(NewOffer::new(1, Discount::FlatPercent(10), ["p1"])),
        ];

        // 10% of 1000 beats 25 flat
        let (offer, value) = select_best(&offers, "p1", 1000).unwrap();
        assert_eq!((offer.id, value), (offers[1].id, 900));

        // but not on a small cart
        let (offer, value) = select_best(&offers, "p1", 100).unwrap();
        assert_eq!((offer.id, value), (offers[0].id, 75));
    }

    #[test]
    fn test_select_best_tie_goes_to_first_registered() {
        let offers = vec![
            Offer::from_new(NewOffer::new(1, Discount::FlatX(20), ["p1"])),
            Offer::from_new(NewOffer::new(1, Discount::FlatPercent(10), ["p1"])),
        ];

        let (offer, value) = select_best(&offers, "p1", 200).unwrap();
        assert_eq!(value, 180);
        assert_eq!(offer.id, offers[0].id);
    }

    #[test]
    fn test_select_best_without_match() {
        let offers = vec![Offer::from_new(NewOffer::new(3, Discount::FlatX(20), ["p1"]))];
        assert!(select_best(&offers, "p3", 200).is_none());
        assert!(select_best(&[], "p1", 200).is_none());
    }

    #[tokio::test]
    async fn test_apply_flat_x() {
        let repo = Arc::new(VecRepository::default());
        repo.register(NewOffer::new(1, Discount::FlatX(10), ["p1"])).await.unwrap();
        let evaluator = OfferEvaluator::new(repo, segments(&[(1, "p1")]));

        let outcome = evaluator.apply(&request(1, 1, 200)).await.unwrap();
        assert_eq!(outcome.cart_value, 190);
        assert!(outcome.applied_offer.is_some());
        assert_eq!(outcome.segment.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_apply_only_uses_requested_restaurant() {
        let repo = Arc::new(VecRepository::default());
        repo.register(NewOffer::new(1, Discount::FlatX(10), ["p1"])).await.unwrap();
        repo.register(NewOffer::new(2, Discount::FlatX(90), ["p1"])).await.unwrap();
        let evaluator = OfferEvaluator::new(repo, segments(&[(1, "p1")]));

        assert_eq!(evaluator.apply(&request(1, 1, 200)).await.unwrap().cart_value, 190);
        assert_eq!(evaluator.apply(&request(1, 2, 200)).await.unwrap().cart_value, 110);
        assert_eq!(evaluator.apply(&request(1, 99, 200)).await.unwrap().cart_value, 200);
    }

    #[tokio::test]
    async fn test_apply_unknown_user_leaves_cart_unchanged() {
        let repo = Arc::new(VecRepository::default());
        repo.register(NewOffer::new(1, Discount::FlatX(10), ["p1"])).await.unwrap();
        let evaluator = OfferEvaluator::new(repo, segments(&[]));

        let outcome = evaluator.apply(&request(42, 1, 200)).await.unwrap();
        assert_eq!(outcome, ApplyOutcome::unchanged(200, None));
    }

    #[tokio::test]
    async fn test_apply_segment_lookup_failure_degrades_to_no_offer() {
        let repo = Arc::new(VecRepository::default());
        repo.register(NewOffer::new(1, Discount::FlatX(10), ["p1"])).await.unwrap();
        let evaluator = OfferEvaluator::new(repo, Arc::new(FailingSegments));

        let outcome = evaluator.apply(&request(1, 1, 200)).await.unwrap();
        assert_eq!(outcome.cart_value, 200);
        assert!(outcome.applied_offer.is_none());
    }

    #[tokio::test]
    async fn test_apply_storage_failure_is_an_error() {
        let evaluator = OfferEvaluator::new(Arc::new(BrokenRepository), segments(&[(1, "p1")]));
        assert!(matches!(
            evaluator.apply(&request(1, 1, 200)).await,
            Err(CoreError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_apply_rejects_negative_cart() {
        let evaluator =
            OfferEvaluator::new(Arc::new(VecRepository::default()), segments(&[(1, "p1")]));
        assert!(matches!(
            evaluator.apply(&request(1, 1, -5)).await,
            Err(CoreError::Validation(_))
        ));
    }
}
