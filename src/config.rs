//! Configuration management for spotofile.
//!
//! Values come from environment variables, optionally seeded from `.env`
//! files. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the working directory
//! 3. `.env` in the local data directory (`spotofile/.env`)
//! 4. Application defaults (where applicable)

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use rand::{Rng, distr::Alphanumeric};
use thiserror::Error;

use crate::spotify::{ApiError, DEFAULT_API_URL, PageSize};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8000";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/callback";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SCOPE: &str = "user-read-private playlist-read-private playlist-read-collaborative user-follow-read user-library-read";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot create {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot load {path}: {source}")]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Loads environment variables from `.env` files.
///
/// A `.env` in the working directory is read first, then the one in the
/// platform-specific local data directory:
/// - Linux: `~/.local/share/spotofile/.env`
/// - macOS: `~/Library/Application Support/spotofile/.env`
/// - Windows: `%LOCALAPPDATA%/spotofile/.env`
///
/// Missing files are skipped. Variables that are already set are never
/// overridden.
pub async fn load_env() -> Result<(), ConfigError> {
    load_env_file(Path::new(".env"))?;

    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|source| ConfigError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    load_env_file(&path)
}

fn load_env_file(path: &Path) -> Result<(), ConfigError> {
    if !path.is_file() {
        return Ok(());
    }
    dotenv::from_path(path).map_err(|source| ConfigError::Dotenv {
        path: path.to_path_buf(),
        source,
    })
}

pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotofile");
    path
}

/// Runtime settings of the server and the library export.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `SERVER_ADDRESS`
    pub server_address: String,
    /// `SPOTIFY_ID`, required for the oauth flow only.
    pub client_id: Option<String>,
    /// `SPOTIFY_SECRET`, required for the oauth flow only.
    pub client_secret: Option<String>,
    /// `SPOTIFY_REDIRECT_URI`
    pub redirect_uri: String,
    /// `SPOTIFY_SCOPE`
    pub scope: String,
    /// `STATE_SALT`, random when unset.
    pub state_salt: String,
    /// `SPOTIFY_API_URL`
    pub api_url: String,
    /// `SPOTIFY_AUTH_URL`
    pub auth_url: String,
    /// `SPOTIFY_TOKEN_URL`
    pub token_url: String,
    /// `LIBRARY_PAGE_SIZE`
    pub page_size: PageSize,
    /// `LIBRARY_TIMEOUT_SECS`, no deadline when unset.
    pub timeout: Option<Duration>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the settings from an arbitrary key lookup. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let page_size = match get("LIBRARY_PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => PageSize::default(),
        };

        let timeout = match get("LIBRARY_TIMEOUT_SECS") {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        Ok(Self {
            server_address: or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            client_id: get("SPOTIFY_ID"),
            client_secret: get("SPOTIFY_SECRET"),
            redirect_uri: or("SPOTIFY_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scope: or("SPOTIFY_SCOPE", DEFAULT_SCOPE),
            state_salt: get("STATE_SALT").unwrap_or_else(random_salt),
            api_url: or("SPOTIFY_API_URL", DEFAULT_API_URL),
            auth_url: or("SPOTIFY_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: or("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL),
            page_size,
            timeout,
        })
    }
}

pub fn parse_page_size(raw: &str) -> Result<PageSize, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: "LIBRARY_PAGE_SIZE",
        value: raw.to_string(),
        reason,
    };

    let size = raw.trim().parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    PageSize::new(size).map_err(|e: ApiError| invalid(e.to_string()))
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: "LIBRARY_TIMEOUT_SECS",
            value: raw.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::Invalid {
            key: "LIBRARY_TIMEOUT_SECS",
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn random_salt() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}
