//! # Spotify Integration Module
//!
//! Client side of the Spotify Web API as far as podcast feeds need it:
//! the token endpoint (three grant types), show metadata and the first page
//! of a show's episodes.
//!
//! ## Architecture
//!
//! ```text
//! Feed / Extension layer
//!          ↓
//! SpotifyClient (bearer token stitching)
//!     ├── auth   (authorization URL, redirect validation, token grants)
//!     └── shows  (show metadata, episode page)
//!          ↓
//! HttpTransport (blocking reqwest)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Error Types
//!
//! - [`http::ApiError`] for transport, status, decode and authentication failures
//! - [`auth::AuthorizationError`] for rejected authorization redirects
//!
//! There is no retry or backoff: a failure aborts the current call and the
//! next fetch cycle starts clean.

pub mod auth;
pub mod http;
pub mod shows;

use crate::{
    config::SpotifyConfig,
    management::{CredentialStore, TokenProvider},
    spotify::http::{ApiError, HttpResponse, HttpTransport, ReqwestTransport},
};

/// Issues API calls with a bearer token from its [`TokenProvider`].
pub struct SpotifyClient {
    api_url: String,
    market: Option<String>,
    transport: Box<dyn HttpTransport>,
    tokens: TokenProvider,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig, transport: Box<dyn HttpTransport>) -> Self {
        Self {
            api_url: config.api_url.clone(),
            market: config.market.clone(),
            transport,
            tokens: TokenProvider::new(config),
        }
    }

    /// A client talking to the real API through `reqwest`.
    pub fn from_config(config: SpotifyConfig) -> Self {
        Self::new(config, Box::new(ReqwestTransport::new()))
    }

    pub fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    pub fn tokens(&self) -> &TokenProvider {
        &self.tokens
    }

    pub fn get_token(&mut self, store: &mut CredentialStore) -> Result<String, ApiError> {
        let token = self
            .tokens
            .get_token(self.transport.as_ref(), store)
            .inspect_err(|e| log::error!("Cannot do API request. No token available: {}", e))?;
        Ok(token)
    }

    fn api_get(
        &mut self,
        store: &mut CredentialStore,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<HttpResponse, ApiError> {
        let token = self.get_token(store)?;
        let request = self.show_request(path, query).bearer_auth(&token);

        log::debug!("Sending API request.");
        self.transport
            .perform(&request)?
            .error_for_status(&request.url)
    }
}
