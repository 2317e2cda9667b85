// src/handlers/movie.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        actor::ActorListItem,
        movie::{MovieDetail, MovieDetailRow, MovieFilterParams, MovieListItem, MovieListRow},
        review::ReviewRow,
    },
    utils::{client_ip::ClientIp, review_tree::build_review_tree},
};

// $1 is the client address; a NULL address matches no rating.
const MOVIE_LIST_SQL: &str = r#"
    SELECT
        m.id, m.title, m.tagline,
        c.name AS category,
        COALESCE(BOOL_OR(r.ip = $1), FALSE) AS rating_user,
        SUM(r.star)::BIGINT AS star_sum,
        COUNT(r.id) AS star_count
    FROM movies m
    LEFT JOIN categories c ON c.id = m.category_id
    LEFT JOIN ratings r ON r.movie_id = m.id
    WHERE m.draft = FALSE
      AND ($2::TEXT[] IS NULL OR EXISTS (
            SELECT 1
            FROM movie_genres mg
            JOIN genres g ON g.id = mg.genre_id
            WHERE mg.movie_id = m.id AND g.name = ANY($2)
          ))
      AND ($3::INT IS NULL OR m.year >= $3)
      AND ($4::INT IS NULL OR m.year <= $4)
    GROUP BY m.id, c.name
    ORDER BY m.id
"#;

const MOVIE_DETAIL_SQL: &str = r#"
    SELECT
        m.id, m.title, m.tagline, m.description, m.poster, m.year, m.country,
        c.name AS category,
        m.fees::TEXT AS fees,
        COALESCE(BOOL_OR(r.ip = $2), FALSE) AS rating_user,
        SUM(r.star)::BIGINT AS star_sum,
        COUNT(r.id) AS star_count
    FROM movies m
    LEFT JOIN categories c ON c.id = m.category_id
    LEFT JOIN ratings r ON r.movie_id = m.id
    WHERE m.id = $1 AND m.draft = FALSE
    GROUP BY m.id, c.name
"#;

const DIRECTORS_SQL: &str = r#"
    SELECT a.id, a.name, a.image
    FROM actors a
    JOIN movie_directors md ON md.actor_id = a.id
    WHERE md.movie_id = $1
    ORDER BY a.id
"#;

const CAST_SQL: &str = r#"
    SELECT a.id, a.name, a.image
    FROM actors a
    JOIN movie_actors ma ON ma.actor_id = a.id
    WHERE ma.movie_id = $1
    ORDER BY a.id
"#;

const GENRES_SQL: &str = r#"
    SELECT g.name
    FROM genres g
    JOIN movie_genres mg ON mg.genre_id = g.id
    WHERE mg.movie_id = $1
    ORDER BY g.name
"#;

const REVIEWS_SQL: &str = r#"
    SELECT id, parent_id, name, text
    FROM reviews
    WHERE movie_id = $1
    ORDER BY id
"#;

/// Loads published movies annotated with `rating_user` and `middle_star`
/// in a single grouped query.
pub async fn fetch_movie_list(
    pool: &PgPool,
    client_ip: Option<&str>,
    params: &MovieFilterParams,
) -> Result<Vec<MovieListItem>, AppError> {
    let rows = sqlx::query_as::<_, MovieListRow>(MOVIE_LIST_SQL)
        .bind(client_ip)
        .bind(params.genre_names())
        .bind(params.year_min)
        .bind(params.year_max)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list movies: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(rows.into_iter().map(MovieListItem::from).collect())
}

/// Loads one published movie with its people, genres and review tree.
pub async fn fetch_movie_detail(
    pool: &PgPool,
    id: i64,
    client_ip: Option<&str>,
) -> Result<MovieDetail, AppError> {
    let row = sqlx::query_as::<_, MovieDetailRow>(MOVIE_DETAIL_SQL)
        .bind(id)
        .bind(client_ip)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch movie {}: {:?}", id, e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Movie not found".to_string()))?;

    let (directors, actors, genres, review_rows) = tokio::try_join!(
        sqlx::query_as::<_, ActorListItem>(DIRECTORS_SQL)
            .bind(id)
            .fetch_all(pool),
        sqlx::query_as::<_, ActorListItem>(CAST_SQL)
            .bind(id)
            .fetch_all(pool),
        sqlx::query_scalar::<_, String>(GENRES_SQL)
            .bind(id)
            .fetch_all(pool),
        sqlx::query_as::<_, ReviewRow>(REVIEWS_SQL)
            .bind(id)
            .fetch_all(pool),
    )
    .map_err(|e| {
        tracing::error!("Failed to load relations of movie {}: {:?}", id, e);
        AppError::InternalServerError(e.to_string())
    })?;

    let reviews = build_review_tree(&review_rows).map_err(|e| {
        tracing::error!("Review tree of movie {} is broken: {}", id, e);
        e
    })?;

    Ok(MovieDetail::assemble(row, directors, actors, genres, reviews))
}

/// Lists published movies, optionally filtered by genre and release year.
#[utoipa::path(
    get,
    path = "/api/movies",
    params(MovieFilterParams),
    responses(
        (status = 200, description = "Published movies", body = [MovieListItem]),
        (status = 400, description = "Invalid filter")
    ),
    tag = "movies"
)]
pub async fn list_movies(
    State(pool): State<PgPool>,
    ClientIp(ip): ClientIp,
    Query(params): Query<MovieFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    params.check()?;

    let movies = fetch_movie_list(&pool, ip.as_deref(), &params).await?;

    Ok(Json(movies))
}

/// Retrieves a single published movie by ID.
#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie details", body = MovieDetail),
        (status = 404, description = "Movie not found or unpublished")
    ),
    tag = "movies"
)]
pub async fn get_movie(
    State(pool): State<PgPool>,
    ClientIp(ip): ClientIp,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let movie = fetch_movie_detail(&pool, id, ip.as_deref()).await?;

    Ok(Json(movie))
}
