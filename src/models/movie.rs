// src/models/movie.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    models::{actor::ActorListItem, review::ReviewNode},
};

/// Average star value of a movie.
///
/// Returns `None` when the movie has no ratings, so "unrated" is never
/// confused with a real average.
pub fn middle_star(star_sum: Option<i64>, star_count: i64) -> Option<f64> {
    if star_count <= 0 {
        return None;
    }
    Some(star_sum.unwrap_or(0) as f64 / star_count as f64)
}

/// Row of the grouped movie listing query.
#[derive(Debug, Clone, FromRow)]
pub struct MovieListRow {
    pub id: i64,
    pub title: String,
    pub tagline: String,
    pub category: Option<String>,
    pub rating_user: bool,
    pub star_sum: Option<i64>,
    pub star_count: i64,
}

/// List-shaped movie record.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieListItem {
    pub id: i64,
    pub title: String,
    pub tagline: String,

    /// Category name.
    pub category: Option<String>,

    /// Whether the requesting client has rated this movie.
    pub rating_user: bool,

    /// Mean star value; `null` while the movie has no ratings.
    pub middle_star: Option<f64>,
}

impl From<MovieListRow> for MovieListItem {
    fn from(row: MovieListRow) -> Self {
        Self {
            middle_star: middle_star(row.star_sum, row.star_count),
            id: row.id,
            title: row.title,
            tagline: row.tagline,
            category: row.category,
            rating_user: row.rating_user,
        }
    }
}

/// Row of the single-movie query: persisted columns plus the rating aggregate.
#[derive(Debug, Clone, FromRow)]
pub struct MovieDetailRow {
    pub id: i64,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub poster: String,
    pub year: i32,
    pub country: String,
    pub category: Option<String>,
    pub fees: String,
    pub rating_user: bool,
    pub star_sum: Option<i64>,
    pub star_count: i64,
}

/// Detail-shaped movie record. The draft flag is never exposed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub poster: String,
    pub year: i32,
    pub country: String,
    pub category: Option<String>,

    /// Box-office fees as a fixed-point decimal string, e.g. "1500000.00".
    pub fees: String,

    pub directors: Vec<ActorListItem>,
    pub actors: Vec<ActorListItem>,

    /// Genre names.
    pub genres: Vec<String>,

    /// Root reviews with their replies nested.
    pub reviews: Vec<ReviewNode>,

    pub rating_user: bool,
    pub middle_star: Option<f64>,
}

impl MovieDetail {
    pub fn assemble(
        row: MovieDetailRow,
        directors: Vec<ActorListItem>,
        actors: Vec<ActorListItem>,
        genres: Vec<String>,
        reviews: Vec<ReviewNode>,
    ) -> Self {
        Self {
            middle_star: middle_star(row.star_sum, row.star_count),
            id: row.id,
            title: row.title,
            tagline: row.tagline,
            description: row.description,
            poster: row.poster,
            year: row.year,
            country: row.country,
            category: row.category,
            fees: row.fees,
            directors,
            actors,
            genres,
            reviews,
            rating_user: row.rating_user,
        }
    }
}

/// Query parameters for narrowing the movie list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovieFilterParams {
    /// Comma-separated genre names; a movie matches if it has any of them.
    pub genres: Option<String>,

    /// Earliest release year (inclusive).
    pub year_min: Option<i32>,

    /// Latest release year (inclusive).
    pub year_max: Option<i32>,
}

impl MovieFilterParams {
    /// Genre names to match, or `None` when the genre filter is absent or blank.
    pub fn genre_names(&self) -> Option<Vec<String>> {
        let names: Vec<String> = self
            .genres
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() { None } else { Some(names) }
    }

    pub fn check(&self) -> Result<(), AppError> {
        if let (Some(min), Some(max)) = (self.year_min, self.year_max) {
            if min > max {
                return Err(AppError::BadRequest(
                    "year_min must not be greater than year_max".to_string(),
                ));
            }
        }
        Ok(())
    }
}
