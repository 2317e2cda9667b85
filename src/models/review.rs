// src/models/review.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Column width of `reviews.name`, in characters.
pub const REVIEW_NAME_MAX_CHARS: u64 = 100;

/// Represents the 'reviews' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Review {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub text: String,

    /// The review being replied to, if any.
    #[serde(rename = "parent")]
    pub parent_id: Option<i64>,

    #[serde(rename = "movie")]
    pub movie_id: i64,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Minimal projection used to build a movie's review tree.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub text: String,
}

/// A rendered review with its replies nested inline.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReviewNode {
    pub name: String,
    pub text: String,
    #[schema(no_recursion)]
    pub children: Vec<ReviewNode>,
}

/// DTO for creating a new review.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(
        email(message = "Invalid email address"),
        length(max = 254, message = "Email must be at most 254 characters")
    )]
    pub email: String,

    #[validate(length(
        min = 1,
        max = REVIEW_NAME_MAX_CHARS,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 5000,
        message = "Review must be between 1 and 5000 characters"
    ))]
    pub text: String,

    /// Optional: the ID of the review being replied to.
    #[serde(default)]
    pub parent: Option<i64>,

    pub movie: i64,
}
