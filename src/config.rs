use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Where and how the intake forms reach the authentication backend.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub sign_in_path: String,
    pub register_path: String,
    pub timeout_ms: u64,
    /// Extra attempts after a transient failure.
    pub retries: u32,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".into(),
            sign_in_path: "/auth/login".into(),
            register_path: "/auth/register".into(),
            timeout_ms: 10_000,
            retries: 1,
        }
    }
}

impl EndpointConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("AUTH_API_BASE_URL").unwrap_or(defaults.base_url),
            sign_in_path: std::env::var("AUTH_API_SIGN_IN_PATH").unwrap_or(defaults.sign_in_path),
            register_path: std::env::var("AUTH_API_REGISTER_PATH")
                .unwrap_or(defaults.register_path),
            timeout_ms: env_or("AUTH_API_TIMEOUT_MS", defaults.timeout_ms),
            retries: env_or("AUTH_API_RETRIES", defaults.retries),
        }
    }

    pub fn sign_in_url(&self) -> String {
        join_url(&self.base_url, &self.sign_in_path)
    }

    pub fn register_url(&self) -> String {
        join_url(&self.base_url, &self.register_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub endpoint: EndpointConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        Ok(Self {
            database_url,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
            endpoint: EndpointConfig::from_env(),
        })
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok(), default)
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
