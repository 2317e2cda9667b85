// src/models/rating.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::config::{STAR_MAX, STAR_MIN};

/// Represents the 'ratings' table in the database.
/// At most one row exists per (ip, movie).
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Rating {
    pub id: i64,
    pub ip: String,
    pub star: i32,
    #[serde(rename = "movie")]
    pub movie_id: i64,
}

/// DTO for rating a movie. The client address is never taken from the body.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRatingRequest {
    #[validate(range(min = STAR_MIN, max = STAR_MAX, message = "Star must be between 1 and 5"))]
    pub star: i32,
    pub movie: i64,
}
