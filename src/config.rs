//! Configuration management for the Spotify feed extension.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the per-user data directory. Every value except the client secret
//! has a working default, so an unconfigured install runs the PKCE flow
//! against the public Spotify endpoints.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in defaults

use std::{env, path::PathBuf};

/// Public client id registered for the extension's PKCE flow.
pub const DEFAULT_CLIENT_ID: &str = "afe692b6116c4eeca210be215bc88d62";
pub const DEFAULT_REDIRECT_URI: &str = "gpodder://spotify-extension/callback/";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

const APP_DIR: &str = "spofeed";
const CACHE_FILE_NAME: &str = "spotify_cache";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory if needed. A missing `.env` file is fine; a file
/// that exists but cannot be parsed is reported.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spofeed/.env`
/// - macOS: `~/Library/Application Support/spofeed/.env`
/// - Windows: `%LOCALAPPDATA%/spofeed/.env`
pub fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        log::debug!("No .env file at {}", path.display());
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

/// Per-user data directory of the extension.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Client id used for the authorization and token endpoints.
pub fn spotify_client_id() -> String {
    var_or("SPOTIFY_CLIENT_ID", DEFAULT_CLIENT_ID)
}

/// Client secret. When present, the app-only client-credentials flow is
/// used instead of PKCE.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> Option<String> {
    optional_var("SPOTIFY_CLIENT_SECRET")
}

pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

pub fn spotify_auth_url() -> String {
    var_or("SPOTIFY_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_token_url() -> String {
    var_or("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL)
}

pub fn spotify_api_url() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

/// Market (ISO 3166-1 alpha-2) sent with show requests.
pub fn spotify_market() -> Option<String> {
    optional_var("SPOTIFY_MARKET")
}

pub fn spotify_scope() -> Option<String> {
    optional_var("SPOTIFY_SCOPE")
}

/// Location of the single cache document holding show metadata and the
/// user credential.
pub fn cache_file() -> PathBuf {
    optional_var("SPOFEED_CACHE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join(CACHE_FILE_NAME))
}

/// Which token flow a deployment runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFlow {
    /// User-delegated authorization code with PKCE.
    Pkce,
    /// App-only client credentials.
    ClientCredentials { client_secret: String },
}

/// Resolved configuration, passed by value into the components that need it.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub flow: AuthFlow,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub market: Option<String>,
    pub scope: Option<String>,
    pub cache_file: PathBuf,
}

impl SpotifyConfig {
    pub fn from_env() -> Self {
        let flow = match spotify_client_secret() {
            Some(client_secret) => AuthFlow::ClientCredentials { client_secret },
            None => AuthFlow::Pkce,
        };

        Self {
            client_id: spotify_client_id(),
            flow,
            redirect_uri: spotify_redirect_uri(),
            auth_url: spotify_auth_url(),
            token_url: spotify_token_url(),
            api_url: spotify_api_url(),
            market: spotify_market(),
            scope: spotify_scope(),
            cache_file: cache_file(),
        }
    }

    /// Defaults with the cache document at `cache_file`.
    pub fn with_cache_file(cache_file: impl Into<PathBuf>) -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            flow: AuthFlow::Pkce,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            market: None,
            scope: None,
            cache_file: cache_file.into(),
        }
    }
}
