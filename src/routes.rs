// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{actor, movie, rating, review},
    openapi,
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (movies, actors, reviews, ratings).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let movie_routes = Router::new()
        .route("/", get(movie::list_movies))
        .route("/{id}", get(movie::get_movie));

    let actor_routes = Router::new()
        .route("/", get(actor::list_actors))
        .route("/{id}", get(actor::get_actor));

    Router::new()
        .nest("/api/movies", movie_routes)
        .nest("/api/actors", actor_routes)
        .route("/api/reviews", post(review::create_review))
        .route("/api/ratings", post(rating::create_rating))
        .route("/api/openapi.json", get(openapi::openapi_json))
        // Global Middleware (outermost first)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
