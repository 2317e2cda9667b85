// src/models/actor.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Represents the 'actors' table in the database.
/// The same row may star in one movie and direct another; the role lives
/// in the `movie_actors` / `movie_directors` join tables.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub description: String,

    /// Path or URL of the portrait image.
    pub image: String,
}

/// Compact actor/director entry used in listings and movie details.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct ActorListItem {
    pub id: i64,
    pub name: String,
    pub image: String,
}
