use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use cartoffer_core::ApplyRequest;
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyOfferResponse {
    pub cart_value: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/cart/apply_offer", post(apply_offer))
}

/// POST /api/v1/cart/apply_offer
/// Price the cart with the best offer the user's segment qualifies for.
pub async fn apply_offer(
    State(state): State<AppState>,
    payload: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<Json<ApplyOfferResponse>, AppError> {
    let Json(req) = payload?;
    let outcome = state.evaluator.apply(&req).await?;

    Ok(Json(ApplyOfferResponse {
        cart_value: outcome.cart_value,
    }))
}
