use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime};
use tokio_postgres::NoTls;

use crate::services::post_services::DEFAULT_PER_PAGE;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct PgSettings {
    pub host: String,
    pub user: String,
    pub password: Option<String>,
    pub dbname: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub allowed_origins: Vec<String>,
    pub image_dir: String,
    pub posts_per_page: u64,
    pub max_image_bytes: usize,
    /// `None` selects the in-memory store.
    pub pg: Option<PgSettings>,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value '{}': {}", key, raw, e)),
        _ => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET not set")?;

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Postgres only when host, user and db are all present
        let pg = match (lookup("PG_HOST"), lookup("PG_USER"), lookup("PG_DB")) {
            (Some(host), Some(user), Some(dbname)) => Some(PgSettings {
                host,
                user,
                password: lookup("PG_PASS"),
                dbname,
            }),
            (None, None, None) => None,
            _ => return Err(anyhow!("PG_HOST, PG_USER and PG_DB must be set together")),
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", 8080)?,
            jwt_secret,
            allowed_origins,
            image_dir: lookup("IMAGE_DIR").unwrap_or_else(|| "images".into()),
            posts_per_page: parse_or(&lookup, "POSTS_PER_PAGE", DEFAULT_PER_PAGE)?.max(1),
            max_image_bytes: parse_or(&lookup, "MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            pg,
        })
    }
}

pub fn get_pg_pool(settings: &PgSettings) -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(settings.host.clone());
    cfg.user = Some(settings.user.clone());
    cfg.password = settings.password.clone();
    cfg.dbname = Some(settings.dbname.clone());

    let mut pool = PoolConfig::default();
    pool.max_size = 16;
    cfg.pool = Some(pool);

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .context("failed to create postgres pool")
}
