// src/handlers/actor.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::actor::{Actor, ActorListItem},
};

/// Lists all actors and directors.
#[utoipa::path(
    get,
    path = "/api/actors",
    responses((status = 200, description = "Actors and directors", body = [ActorListItem])),
    tag = "actors"
)]
pub async fn list_actors(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let actors = sqlx::query_as::<_, ActorListItem>(
        r#"
        SELECT id, name, image
        FROM actors
        ORDER BY id
        "#,
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list actors: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(actors))
}

/// Retrieves a single actor or director by ID.
#[utoipa::path(
    get,
    path = "/api/actors/{id}",
    params(("id" = i64, Path, description = "Actor id")),
    responses(
        (status = 200, description = "Actor details", body = Actor),
        (status = 404, description = "Actor not found")
    ),
    tag = "actors"
)]
pub async fn get_actor(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let actor = sqlx::query_as::<_, Actor>(
        r#"
        SELECT id, name, age, description, image
        FROM actors
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Actor not found".to_string()))?;

    Ok(Json(actor))
}
