use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, CoreResult, RestaurantId};

/// How an offer reduces the cart value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "offer_type", content = "offer_value")]
pub enum Discount {
    /// Fixed amount off the cart.
    #[serde(rename = "FLATX")]
    FlatX(i64),
    /// Percentage off the cart.
    #[serde(rename = "FLATPERCENT")]
    FlatPercent(i64),
}

impl Discount {
    /// Build a discount from its wire tag and value. Tags are case-sensitive.
    pub fn from_parts(offer_type: &str, value: i64) -> CoreResult<Self> {
        match offer_type {
            "FLATX" => Ok(Discount::FlatX(value)),
            "FLATPERCENT" => Ok(Discount::FlatPercent(value)),
            other => Err(CoreError::Validation(format!("unknown offer_type '{}'", other))),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Discount::FlatX(_) => "FLATX",
            Discount::FlatPercent(_) => "FLATPERCENT",
        }
    }

    pub fn value(&self) -> i64 {
        match self {
            Discount::FlatX(v) | Discount::FlatPercent(v) => *v,
        }
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.value())
    }
}

/// An offer awaiting registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOffer {
    pub restaurant_id: RestaurantId,
    pub discount: Discount,
    pub segments: BTreeSet<String>,
}

impl NewOffer {
    pub fn new<I, S>(restaurant_id: RestaurantId, discount: Discount, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            restaurant_id,
            discount,
            segments: segments
                .into_iter()
                .map(|s| Into::<String>::into(s).trim().to_string())
                .collect(),
        }
    }

    /// Registration policy: at least one non-blank segment, a non-negative
    /// value, and percentages no higher than 100.
    pub fn validate(&self) -> CoreResult<()> {
        if self.segments.is_empty() {
            return Err(CoreError::Validation("customer_segment must not be empty".into()));
        }
        if self.segments.iter().any(|s| s.trim().is_empty()) {
            return Err(CoreError::Validation("customer_segment contains a blank label".into()));
        }
        match self.discount {
            Discount::FlatX(v) | Discount::FlatPercent(v) if v < 0 => Err(CoreError::Validation(
                format!("offer_value must not be negative, got {}", v),
            )),
            Discount::FlatPercent(p) if p > 100 => Err(CoreError::Validation(format!(
                "FLATPERCENT offer_value must be at most 100, got {}",
                p
            ))),
            _ => Ok(()),
        }
    }
}

/// A registered offer. Never modified after the registry stores it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Offer {
    pub id: Uuid,
    pub restaurant_id: RestaurantId,
    pub discount: Discount,
    pub segments: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    pub fn from_new(new: NewOffer) -> Self {
        Self {
            id: Uuid::new_v4(),
            restaurant_id: new.restaurant_id,
            discount: new.discount,
            segments: new.segments,
            created_at: Utc::now(),
        }
    }

    /// Whether users in `segment` are eligible for this offer.
    pub fn targets(&self, segment: &str) -> bool {
        self.segments.contains(segment)
    }
}
