use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult, RestaurantId, UserId};

/// A request to price a cart against a restaurant's offers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplyRequest {
    pub user_id: UserId,
    pub restaurant_id: RestaurantId,
    pub cart_value: i64,
}

impl ApplyRequest {
    pub fn validate(&self) -> CoreResult<()> {
        if self.cart_value < 0 {
            return Err(CoreError::Validation(format!(
                "cart_value must not be negative, got {}",
                self.cart_value
            )));
        }
        Ok(())
    }
}

/// Result of applying the best matching offer, if any.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub cart_value: i64,
    pub applied_offer: Option<Uuid>,
    pub segment: Option<String>,
}

impl ApplyOutcome {
    /// Cart left untouched.
    pub fn unchanged(cart_value: i64, segment: Option<String>) -> Self {
        Self {
            cart_value,
            applied_offer: None,
            segment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_request_deserialization() {
        let json = r#"{"cart_value":200,"user_id":1,"restaurant_id":1}"#;
        let req: ApplyRequest = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(req.cart_value, 200);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_negative_cart_rejected() {
        let req = ApplyRequest { user_id: 1, restaurant_id: 1, cart_value: -1 };
        assert!(matches!(req.validate(), Err(CoreError::Validation(_))));
    }
}
