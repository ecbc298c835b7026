//! Startup configuration read from the process environment (and `.env`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::limiter::RateLimit;

const DEFAULT_HEALTH_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TELEGRAM_BOT_TOKEN (or TELOXIDE_TOKEN) should be set")]
    MissingToken,

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("WEBHOOK_URL and WEBHOOK_ADDR must be set together")]
    IncompleteWebhook,

    #[error("quiz file {path}: {reason}")]
    QuizFile { path: String, reason: String },
}

/// Webhook listener settings; long polling is used when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Webhook {
    pub url: Url,
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub log_level: String,
    pub health_addr: SocketAddr,
    pub webhook: Option<Webhook>,
    pub rate_limit: Option<RateLimit>,
    pub quiz_file: Option<PathBuf>,
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn positive<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let parsed = parse(key, value)?;
    if parsed == T::default() {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(parsed)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("TELEGRAM_BOT_TOKEN")
            .or_else(|| lookup("TELOXIDE_TOKEN"))
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.into());

        let health_addr = parse(
            "HEALTH_ADDR",
            &lookup("HEALTH_ADDR").unwrap_or_else(|| DEFAULT_HEALTH_ADDR.into()),
        )?;

        let webhook = match (lookup("WEBHOOK_URL"), lookup("WEBHOOK_ADDR")) {
            (Some(url), Some(addr)) => Some(Webhook {
                url: parse("WEBHOOK_URL", &url)?,
                addr: parse("WEBHOOK_ADDR", &addr)?,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteWebhook),
        };

        let rate_limit = match lookup("RATE_LIMIT_MAX") {
            Some(max) => {
                let window_secs = match lookup("RATE_LIMIT_WINDOW_SECS") {
                    Some(secs) => positive("RATE_LIMIT_WINDOW_SECS", &secs)?,
                    None => DEFAULT_RATE_LIMIT_WINDOW_SECS,
                };
                Some(RateLimit {
                    max_events: positive("RATE_LIMIT_MAX", &max)?,
                    window: Duration::from_secs(window_secs),
                })
            }
            None => None,
        };

        Ok(Self {
            token,
            log_level,
            health_addr,
            webhook,
            rate_limit,
            quiz_file: lookup("QUIZ_FILE").map(PathBuf::from),
        })
    }
}
