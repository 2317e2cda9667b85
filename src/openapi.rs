// src/openapi.rs

use axum::Json;
use utoipa::OpenApi;

use crate::handlers::{actor, movie, rating, review};

/// OpenAPI document for the public catalog endpoints.
#[derive(OpenApi)]
#[openapi(
    info(title = "Movie Catalog API"),
    paths(
        movie::list_movies,
        movie::get_movie,
        actor::list_actors,
        actor::get_actor,
        review::create_review,
        rating::create_rating,
    ),
    tags(
        (name = "movies", description = "Published movies with rating aggregates"),
        (name = "actors", description = "Actors and directors"),
        (name = "reviews", description = "Threaded movie reviews"),
        (name = "ratings", description = "Star ratings, one per client address and movie")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
