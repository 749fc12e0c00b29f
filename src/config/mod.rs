//! Configuration module for the note pool backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::errors::AppError;

/// Optional capabilities of the note pool.
///
/// One schema backs every deployment; these switches decide which
/// routes and request fields are honoured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Features {
    /// Store tags on submit, filter random fetch by tag, expose `/admin/updateTags`.
    pub tags: bool,
    /// Expose `/admin/resetReports`.
    pub report_reset: bool,
    /// Reject submissions without a title.
    pub require_title: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            tags: true,
            report_reset: true,
            require_title: false,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared admin secret. `None` locks every admin route.
    pub admin_password: Option<String>,
    /// sqlx connection string for the note store
    pub database_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Directory holding static assets and the two HTML shells
    pub public_dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub features: Features,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_password = lookup("ADMIN_PASSWORD")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let database_url = lookup("DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "sqlite:./data/notes.sqlite?mode=rwc".to_string());

        let host: IpAddr = lookup("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid HOST: {}", e)))?;

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid PORT {:?}: {}", raw, e)))?,
            None => 3000,
        };

        let public_dir = lookup("PUBLIC_DIR")
            .unwrap_or_else(|| "./public".to_string())
            .into();

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let defaults = Features::default();
        let features = Features {
            tags: flag(&lookup, "NOTES_TAGS", defaults.tags)?,
            report_reset: flag(&lookup, "NOTES_REPORT_RESET", defaults.report_reset)?,
            require_title: flag(&lookup, "NOTES_REQUIRE_TITLE", defaults.require_title)?,
        };

        Ok(Self {
            admin_password,
            database_url,
            bind_addr: SocketAddr::new(host, port),
            public_dir,
            log_level,
            features,
        })
    }
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::Config(format!("Invalid {}: {:?}", key, other))),
    }
}
