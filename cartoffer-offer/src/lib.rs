pub mod discount;
pub mod evaluator;

pub use discount::discounted_value;
pub use evaluator::{select_best, OfferEvaluator};
