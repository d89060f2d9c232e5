use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use cartoffer_core::{CoreResult, Discount, NewOffer, Offer, RestaurantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct OfferRequest {
    pub restaurant_id: RestaurantId,
    pub offer_type: String,
    pub offer_value: i64,
    pub customer_segment: Vec<String>,
}

impl OfferRequest {
    pub fn into_new_offer(self) -> CoreResult<NewOffer> {
        let discount = Discount::from_parts(&self.offer_type, self.offer_value)?;
        let offer = NewOffer::new(self.restaurant_id, discount, self.customer_segment);
        offer.validate()?;
        Ok(offer)
    }
}

#[derive(Debug, Serialize)]
pub struct OfferCreatedResponse {
    pub response_msg: String,
    pub offer_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub restaurant_id: RestaurantId,
    pub offer_type: String,
    pub offer_value: i64,
    pub customer_segment: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Offer> for OfferResponse {
    fn from(offer: Offer) -> Self {
        Self {
            id: offer.id,
            restaurant_id: offer.restaurant_id,
            offer_type: offer.discount.kind().to_string(),
            offer_value: offer.discount.value(),
            customer_segment: offer.segments.into_iter().collect(),
            created_at: offer.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/offer", post(create_offer))
        .route("/api/v1/offer/{restaurant_id}", get(list_offers))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/offer
pub async fn create_offer(
    State(state): State<AppState>,
    payload: Result<Json<OfferRequest>, JsonRejection>,
) -> Result<Json<OfferCreatedResponse>, AppError> {
    let Json(req) = payload?;
    let new_offer = req.into_new_offer()?;
    let offer = state.offers.register(new_offer).await?;

    Ok(Json(OfferCreatedResponse {
        response_msg: "success".to_string(),
        offer_id: offer.id,
    }))
}

/// GET /api/v1/offer/{restaurant_id}
pub async fn list_offers(
    State(state): State<AppState>,
    path: Result<Path<RestaurantId>, PathRejection>,
) -> Result<Json<Vec<OfferResponse>>, AppError> {
    let Path(restaurant_id) = path?;
    let offers = state.offers.offers_for(restaurant_id).await?;
    Ok(Json(offers.into_iter().map(OfferResponse::from).collect()))
}
