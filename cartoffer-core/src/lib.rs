pub mod cart;
pub mod offer;
pub mod repository;
pub mod segment;

pub use cart::{ApplyOutcome, ApplyRequest};
pub use offer::{Discount, NewOffer, Offer};
pub use repository::OfferRepository;
pub use segment::SegmentResolver;

pub type RestaurantId = i64;
pub type UserId = i64;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Offer storage error: {0}")]
    Storage(String),
    #[error("Segment lookup failed: {0}")]
    SegmentLookup(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
