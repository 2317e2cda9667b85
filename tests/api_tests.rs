// tests/api_tests.rs
//
// End-to-end tests against a real Postgres named by DATABASE_URL.
// Run with `cargo test -- --ignored`.

use movie_catalog::{
    config::{Config, MAX_REVIEW_DEPTH},
    routes,
    state::AppState,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::{Ipv6Addr, SocketAddr};

struct TestApp {
    address: String,
    pool: PgPool,
    client: reqwest::Client,
}

/// Helper function to spawn the app on a random port for testing.
async fn spawn_app() -> TestApp {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    // 1. Create a pool
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url,
        rust_log: "error".to_string(),
        server_port: 0,
        cors_allowed_origins: Vec::new(),
        trust_proxy_headers: true,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        address,
        pool,
        client: reqwest::Client::new(),
    }
}

/// A client address nobody else uses.
fn unique_ip() -> String {
    Ipv6Addr::from(uuid::Uuid::new_v4().as_u128()).to_string()
}

fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

async fn seed_movie(pool: &PgPool, title: &str, year: i32, draft: bool) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO movies (title, tagline, description, year, country, fees, draft)
        VALUES ($1, 'tagline', 'description', $2, 'USA', 1500000, $3)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(year)
    .bind(draft)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_actor(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO actors (name, age, description, image) VALUES ($1, 40, 'bio', 'actors/x.jpg') RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn seed_genre(pool: &PgPool, movie_id: i64, name: &str) {
    let genre_id = sqlx::query_scalar::<_, i64>("INSERT INTO genres (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO movie_genres (movie_id, genre_id) VALUES ($1, $2)")
        .bind(movie_id)
        .bind(genre_id)
        .execute(pool)
        .await
        .unwrap();
}

impl TestApp {
    async fn list_movies(&self, ip: &str, query: &str) -> Vec<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/api/movies{}", self.address, query))
            .header("X-Forwarded-For", ip)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
        response.json().await.unwrap()
    }

    async fn get_movie(&self, ip: &str, id: i64) -> reqwest::Response {
        self.client
            .get(format!("{}/api/movies/{}", self.address, id))
            .header("X-Forwarded-For", ip)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn rate(&self, ip: &str, movie: i64, star: i32) -> reqwest::Response {
        self.client
            .post(format!("{}/api/ratings", self.address))
            .header("X-Forwarded-For", ip)
            .json(&serde_json::json!({ "star": star, "movie": movie }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn review(&self, movie: i64, name: &str, parent: Option<i64>) -> reqwest::Response {
        self.client
            .post(format!("{}/api/reviews", self.address))
            .json(&serde_json::json!({
                "email": "viewer@example.com",
                "name": name,
                "text": format!("{} says hi", name),
                "parent": parent,
                "movie": movie
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn rating_rows(&self, ip: &str, movie: i64) -> Vec<i32> {
        sqlx::query_scalar::<_, i32>("SELECT star FROM ratings WHERE ip = $1 AND movie_id = $2")
            .bind(ip)
            .bind(movie)
            .fetch_all(&self.pool)
            .await
            .unwrap()
    }
}

fn find(movies: &[serde_json::Value], id: i64) -> Option<&serde_json::Value> {
    movies.iter().find(|m| m["id"].as_i64() == Some(id))
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn draft_movies_are_never_public() {
    let app = spawn_app().await;
    let published = seed_movie(&app.pool, &unique_name("pub"), 2001, false).await;
    let draft = seed_movie(&app.pool, &unique_name("draft"), 2001, true).await;

    let movies = app.list_movies(&unique_ip(), "").await;
    assert!(find(&movies, published).is_some());
    assert!(find(&movies, draft).is_none());

    let response = app.get_movie(&unique_ip(), draft).await;
    assert_eq!(response.status().as_u16(), 404);

    let response = app.rate(&unique_ip(), draft, 3).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn rating_aggregates_follow_the_client() {
    let app = spawn_app().await;
    let movie = seed_movie(&app.pool, &unique_name("rated"), 1999, false).await;
    let (ip1, ip2, ip3) = (unique_ip(), unique_ip(), unique_ip());

    assert_eq!(app.rate(&ip1, movie, 3).await.status().as_u16(), 201);
    assert_eq!(app.rate(&ip2, movie, 5).await.status().as_u16(), 201);

    let as_ip1 = app.list_movies(&ip1, "").await;
    let entry = find(&as_ip1, movie).unwrap();
    assert_eq!(entry["rating_user"], true);
    assert_eq!(entry["middle_star"].as_f64(), Some(4.0));
    assert!(entry.get("draft").is_none());

    let as_ip3 = app.list_movies(&ip3, "").await;
    let entry = find(&as_ip3, movie).unwrap();
    assert_eq!(entry["rating_user"], false);
    assert_eq!(entry["middle_star"].as_f64(), Some(4.0));

    let detail: serde_json::Value = app.get_movie(&ip1, movie).await.json().await.unwrap();
    assert_eq!(detail["rating_user"], true);
    assert_eq!(detail["middle_star"].as_f64(), Some(4.0));
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn unrated_movie_has_null_middle_star() {
    let app = spawn_app().await;
    let movie = seed_movie(&app.pool, &unique_name("unrated"), 1980, false).await;

    let movies = app.list_movies(&unique_ip(), "").await;
    let entry = find(&movies, movie).unwrap();
    assert!(entry["middle_star"].is_null());
    assert_eq!(entry["rating_user"], false);
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn repeated_rating_overwrites_the_single_row() {
    let app = spawn_app().await;
    let movie = seed_movie(&app.pool, &unique_name("rerated"), 2010, false).await;
    let ip = unique_ip();

    let first: serde_json::Value = app.rate(&ip, movie, 3).await.json().await.unwrap();
    let second: serde_json::Value = app.rate(&ip, movie, 5).await.json().await.unwrap();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["star"], 5);
    assert_eq!(second["movie"], movie);
    assert_eq!(second["ip"], ip.as_str());
    assert_eq!(app.rating_rows(&ip, movie).await, vec![5]);
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn concurrent_ratings_leave_one_row() {
    let app = spawn_app().await;
    let movie = seed_movie(&app.pool, &unique_name("race"), 2015, false).await;
    let ip = unique_ip();

    let mut submissions = tokio::task::JoinSet::new();
    for star in 1..=5 {
        let client = app.client.clone();
        let url = format!("{}/api/ratings", app.address);
        let ip = ip.clone();
        submissions.spawn(async move {
            client
                .post(url)
                .header("X-Forwarded-For", ip)
                .json(&serde_json::json!({ "star": star, "movie": movie }))
                .send()
                .await
                .expect("Failed to execute request")
                .status()
                .as_u16()
        });
    }
    while let Some(status) = submissions.join_next().await {
        assert_eq!(status.unwrap(), 201);
    }

    let rows = app.rating_rows(&ip, movie).await;
    assert_eq!(rows.len(), 1);
    assert!((1..=5).contains(&rows[0]));
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn replies_are_nested_in_movie_detail() {
    let app = spawn_app().await;
    let movie = seed_movie(&app.pool, &unique_name("reviewed"), 2005, false).await;

    let root: serde_json::Value = app.review(movie, "Alice", None).await.json().await.unwrap();
    let root_id = root["id"].as_i64().unwrap();
    assert_eq!(root["movie"], movie);
    assert!(root["parent"].is_null());

    let reply = app.review(movie, "Bob", Some(root_id)).await;
    assert_eq!(reply.status().as_u16(), 201);
    let reply: serde_json::Value = reply.json().await.unwrap();
    let reply_id = reply["id"].as_i64().unwrap();
    assert_eq!(reply["parent"], root_id);

    app.review(movie, "Carol", Some(reply_id)).await;
    app.review(movie, "Dave", None).await;

    let detail: serde_json::Value = app
        .get_movie(&unique_ip(), movie)
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(
        detail["reviews"],
        serde_json::json!([
            {
                "name": "Alice",
                "text": "Alice says hi",
                "children": [{
                    "name": "Bob",
                    "text": "Bob says hi",
                    "children": [{ "name": "Carol", "text": "Carol says hi", "children": [] }]
                }]
            },
            { "name": "Dave", "text": "Dave says hi", "children": [] }
        ])
    );
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn reply_to_another_movies_review_is_rejected() {
    let app = spawn_app().await;
    let first = seed_movie(&app.pool, &unique_name("first"), 2005, false).await;
    let second = seed_movie(&app.pool, &unique_name("second"), 2005, false).await;

    let root: serde_json::Value = app.review(first, "Alice", None).await.json().await.unwrap();
    let root_id = root["id"].as_i64().unwrap();

    let response = app.review(second, "Bob", Some(root_id)).await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app.review(second, "Bob", Some(i64::MAX)).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn movie_detail_exposes_people_genres_and_category() {
    let app = spawn_app().await;
    let movie = seed_movie(&app.pool, &unique_name("detail"), 1995, false).await;
    let other = seed_movie(&app.pool, &unique_name("other"), 1996, false).await;

    let category = unique_name("cat");
    sqlx::query(
        "WITH c AS (INSERT INTO categories (name) VALUES ($1) RETURNING id) \
         UPDATE movies SET category_id = (SELECT id FROM c) WHERE id = $2",
    )
    .bind(&category)
    .bind(movie)
    .execute(&app.pool)
    .await
    .unwrap();

    // One person directs this movie and acts in another.
    let director = seed_actor(&app.pool, &unique_name("director")).await;
    let actor = seed_actor(&app.pool, &unique_name("actor")).await;
    for (table, movie_id, actor_id) in [
        ("movie_directors", movie, director),
        ("movie_actors", movie, actor),
        ("movie_actors", other, director),
    ] {
        sqlx::query(&format!(
            "INSERT INTO {} (movie_id, actor_id) VALUES ($1, $2)",
            table
        ))
        .bind(movie_id)
        .bind(actor_id)
        .execute(&app.pool)
        .await
        .unwrap();
    }

    let genre = unique_name("genre");
    seed_genre(&app.pool, movie, &genre).await;

    let response = app.get_movie(&unique_ip(), movie).await;
    assert_eq!(response.status().as_u16(), 200);
    let detail: serde_json::Value = response.json().await.unwrap();

    assert_eq!(detail["category"], category.as_str());
    assert_eq!(detail["fees"], "1500000.00");
    assert_eq!(detail["year"], 1995);
    assert_eq!(detail["genres"], serde_json::json!([genre]));
    assert_eq!(detail["directors"][0]["id"], director);
    assert_eq!(detail["actors"][0]["id"], actor);
    assert_eq!(detail["actors"].as_array().unwrap().len(), 1);
    assert!(detail["actors"][0].get("age").is_none());
    assert!(detail.get("draft").is_none());

    let other_detail: serde_json::Value = app
        .get_movie(&unique_ip(), other)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(other_detail["actors"][0]["id"], director);
    assert!(other_detail["directors"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn list_filters_by_genre_and_year() {
    let app = spawn_app().await;
    let old = seed_movie(&app.pool, &unique_name("old"), 1950, false).await;
    let new = seed_movie(&app.pool, &unique_name("new"), 2020, false).await;
    let genre = unique_name("noir");
    seed_genre(&app.pool, old, &genre).await;

    let by_genre = app
        .list_movies(&unique_ip(), &format!("?genres={},unused", genre))
        .await;
    assert!(find(&by_genre, old).is_some());
    assert!(find(&by_genre, new).is_none());

    let by_year = app.list_movies(&unique_ip(), "?year_max=1950").await;
    assert!(find(&by_year, old).is_some());
    assert!(find(&by_year, new).is_none());

    let by_range = app
        .list_movies(&unique_ip(), "?year_min=2020&year_max=2020")
        .await;
    assert!(find(&by_range, new).is_some());
    assert!(find(&by_range, old).is_none());
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn actors_list_and_detail() {
    let app = spawn_app().await;
    let name = unique_name("star");
    let actor = seed_actor(&app.pool, &name).await;

    let list: Vec<serde_json::Value> = app
        .client
        .get(format!("{}/api/actors", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = find(&list, actor).unwrap();
    assert_eq!(entry["name"], name.as_str());
    assert!(entry.get("age").is_none());

    let detail: serde_json::Value = app
        .client
        .get(format!("{}/api/actors/{}", app.address, actor))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["age"], 40);
    assert_eq!(detail["description"], "bio");

    let missing = app
        .client
        .get(format!("{}/api/actors/{}", app.address, i64::MAX))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "requires a Postgres DATABASE_URL"]
async fn reply_chain_is_capped_and_movie_stays_readable() {
    let app = spawn_app().await;
    let movie = seed_movie(&app.pool, &unique_name("thread"), 2012, false).await;

    // Seed a chain reaching depth MAX_REVIEW_DEPTH - 2 directly.
    let mut parent: Option<i64> = None;
    for _ in 0..MAX_REVIEW_DEPTH - 1 {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO reviews (email, name, text, parent_id, movie_id)
            VALUES ('viewer@example.com', 'Viewer', 'again', $1, $2)
            RETURNING id
            "#,
        )
        .bind(parent)
        .bind(movie)
        .fetch_one(&app.pool)
        .await
        .unwrap();
        parent = Some(id);
    }

    // The last allowed level is still accepted.
    let response = app.review(movie, "Last", parent).await;
    assert_eq!(response.status().as_u16(), 201);
    let last: serde_json::Value = response.json().await.unwrap();

    // One more level would make the tree unrenderable.
    let response = app.review(movie, "TooDeep", last["id"].as_i64()).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("nested"));

    let response = app.get_movie(&unique_ip(), movie).await;
    assert_eq!(response.status().as_u16(), 200);

    // Too deeply nested for serde_json's default parse limit; check the raw body.
    let body = response.text().await.unwrap();
    assert_eq!(body.matches("\"name\":").count(), MAX_REVIEW_DEPTH);
    assert!(body.contains(r#"{"name":"Last","text":"Last says hi","children":[]}"#));
    assert!(!body.contains("TooDeep"));
}
