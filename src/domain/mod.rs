//! Domain Layer - Core business logic for the detection pipeline
//!
//! Pure domain types and logic with no external dependencies. All external
//! interactions happen through the ports layer.

pub mod age;
pub mod token;
pub mod validation;

pub use age::{age_from_created_at, format_age};
pub use token::{Chain, RiskAssessment, RiskSource, TokenRecord};
pub use validation::{
    is_fresh_enough, meets_threshold, quick_validate, valid_solana_address, CriteriaUpdate,
    Rejection, ValidationCriteria,
};
