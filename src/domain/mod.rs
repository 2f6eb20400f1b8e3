//! Scoreboard domain rules: category tree traversal and typed score handling.
//!
//! Everything in here is pure and synchronous; persistence and logging live in the callers.

pub mod category;
pub mod score;

use thiserror::Error;

use crate::dao::models::ScoreType;

/// Failures raised while building, validating or inserting a score.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// The raw value does not match the category's declared type or pattern.
    #[error("`{raw}` is not a valid {expected:?} score")]
    InvalidFormat { raw: String, expected: ScoreType },
    /// The score variant differs from the category's declared type.
    #[error("cannot record a {actual:?} score in a {expected:?} category")]
    TypeMismatch {
        expected: ScoreType,
        actual: ScoreType,
    },
    /// The category groups other categories and cannot hold scores.
    #[error("category `{category}` has subcategories and cannot hold scores")]
    NotLeaf { category: String },
    /// The declared score type is not one the scoreboard knows about.
    #[error("unsupported score type `{0}`")]
    UnsupportedScoreType(String),
    /// The time pattern contains specifiers that cannot be parsed or rendered.
    #[error("invalid time pattern `{0}`")]
    InvalidPattern(String),
}
