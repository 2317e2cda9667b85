// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Lowest accepted star value for a rating.
pub const STAR_MIN: i32 = 1;

/// Highest accepted star value for a rating.
pub const STAR_MAX: i32 = 5;

/// Deepest reply chain rendered in a movie's review tree.
pub const MAX_REVIEW_DEPTH: usize = 256;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub server_port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Honour `X-Forwarded-For` / `X-Real-IP` when resolving the client address.
    /// Off unless explicitly enabled; only safe behind a proxy that overwrites them.
    pub trust_proxy_headers: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(3000);

        let cors_allowed_origins = parse_origins(
            &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
        );

        let trust_proxy_headers =
            proxy_headers_trusted(env::var("TRUST_PROXY_HEADERS").ok().as_deref());

        Ok(Self {
            database_url,
            rust_log,
            server_port,
            cors_allowed_origins,
            trust_proxy_headers,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn proxy_headers_trusted(raw: Option<&str>) -> bool {
    raw.map(parse_flag).unwrap_or(false)
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        let origins = parse_origins(" http://a.test , ,http://b.test");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("False"));
        assert!(!parse_flag(" off "));
    }

    #[test]
    fn proxy_headers_are_untrusted_by_default() {
        assert!(!proxy_headers_trusted(None));
        assert!(proxy_headers_trusted(Some("true")));
        assert!(!proxy_headers_trusted(Some("false")));
    }
}
