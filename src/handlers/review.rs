// src/handlers/review.rs

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::MAX_REVIEW_DEPTH,
    error::AppError,
    models::review::{CreateReviewRequest, REVIEW_NAME_MAX_CHARS, Review},
    utils::{html::clean_html, review_tree::accepts_reply_at},
};

// Depth of review $1 in its tree (roots are 0), walking up at most $2 steps.
const PARENT_DEPTH_SQL: &str = r#"
    WITH RECURSIVE chain (id, parent_id, depth) AS (
        SELECT id, parent_id, 0
        FROM reviews
        WHERE id = $1
        UNION ALL
        SELECT r.id, r.parent_id, c.depth + 1
        FROM reviews r
        JOIN chain c ON r.id = c.parent_id
        WHERE c.depth < $2
    )
    SELECT MAX(depth) FROM chain
"#;

/// Create a new review, or a reply when `parent` is set.
/// The parent must belong to the same movie.
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid input or references")
    ),
    tag = "reviews"
)]
pub async fn create_review(
    State(pool): State<PgPool>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let name = clean_html(&payload.name);
    let text = clean_html(&payload.text);
    if name.is_empty() || text.is_empty() {
        return Err(AppError::BadRequest(
            "Review name and text must not be empty".to_string(),
        ));
    }
    // Escaping may lengthen the name past its column width
    if name.chars().count() as u64 > REVIEW_NAME_MAX_CHARS {
        return Err(AppError::BadRequest(format!(
            "Name must be at most {} characters after escaping",
            REVIEW_NAME_MAX_CHARS
        )));
    }

    let mut tx = pool.begin().await?;

    // 1. The movie must exist and be published
    let movie_exists = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM movies WHERE id = $1 AND draft = FALSE FOR SHARE",
    )
    .bind(payload.movie)
    .fetch_optional(&mut *tx)
    .await?
    .is_some();

    if !movie_exists {
        return Err(AppError::BadRequest("Invalid movie".to_string()));
    }

    // 2. A reply must stay within the parent's movie
    if let Some(parent_id) = payload.parent {
        let parent_movie = sqlx::query_scalar::<_, i64>(
            "SELECT movie_id FROM reviews WHERE id = $1 FOR SHARE",
        )
        .bind(parent_id)
        .fetch_optional(&mut *tx)
        .await?;

        match parent_movie {
            Some(movie_id) if movie_id == payload.movie => {}
            Some(_) => {
                return Err(AppError::BadRequest(
                    "Parent review belongs to another movie".to_string(),
                ));
            }
            None => {
                return Err(AppError::BadRequest(
                    "Parent review not found".to_string(),
                ));
            }
        }

        let parent_depth = sqlx::query_scalar::<_, Option<i32>>(PARENT_DEPTH_SQL)
            .bind(parent_id)
            .bind(MAX_REVIEW_DEPTH as i32)
            .fetch_one(&mut *tx)
            .await?
            .unwrap_or(0);

        if !accepts_reply_at(parent_depth as usize) {
            return Err(AppError::BadRequest(format!(
                "Replies may be nested at most {} levels deep",
                MAX_REVIEW_DEPTH
            )));
        }
    }

    // 3. Insert Review
    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (email, name, text, parent_id, movie_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, name, text, parent_id, movie_id, created_at
        "#,
    )
    .bind(payload.email.trim())
    .bind(&name)
    .bind(&text)
    .bind(payload.parent)
    .bind(payload.movie)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create review: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tx.commit().await?;

    tracing::info!(
        review_id = review.id,
        movie_id = review.movie_id,
        "Review created"
    );

    Ok((StatusCode::CREATED, Json(review)))
}
