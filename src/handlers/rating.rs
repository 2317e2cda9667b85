// src/handlers/rating.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::rating::{CreateRatingRequest, Rating},
    utils::client_ip::ClientIp,
};

/// Records `star` for `(ip, movie)`, overwriting an earlier rating.
///
/// A single `INSERT .. ON CONFLICT` statement against the `(ip, movie_id)`
/// unique constraint, so concurrent submissions leave exactly one row and
/// the last write wins. Draft or missing movies produce no row.
pub async fn upsert_rating(
    pool: &PgPool,
    ip: &str,
    request: &CreateRatingRequest,
) -> Result<Rating, AppError> {
    let rating = sqlx::query_as::<_, Rating>(
        r#"
        INSERT INTO ratings (ip, star, movie_id)
        SELECT $1, $2, m.id
        FROM movies m
        WHERE m.id = $3 AND m.draft = FALSE
        ON CONFLICT (ip, movie_id) DO UPDATE SET star = EXCLUDED.star
        RETURNING id, ip, star, movie_id
        "#,
    )
    .bind(ip)
    .bind(request.star)
    .bind(request.movie)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert rating: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?
    .ok_or(AppError::BadRequest("Invalid movie".to_string()))?;

    tracing::debug!(
        rating_id = rating.id,
        movie_id = rating.movie_id,
        star = rating.star,
        "Rating stored"
    );

    Ok(rating)
}

/// Rate a movie. The client address comes from the request, never the body.
#[utoipa::path(
    post,
    path = "/api/ratings",
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating stored", body = Rating),
        (status = 400, description = "Invalid star, movie or client address")
    ),
    tag = "ratings"
)]
pub async fn create_rating(
    State(pool): State<PgPool>,
    ClientIp(ip): ClientIp,
    payload: Result<Json<CreateRatingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let ip = ip.ok_or(AppError::BadRequest(
        "Unable to determine client address".to_string(),
    ))?;

    let rating = upsert_rating(&pool, &ip, &payload).await?;

    Ok((StatusCode::CREATED, Json(rating)))
}
