use std::time::{Duration, Instant};

use crate::{
    config::{AuthFlow, SpotifyConfig},
    management::CredentialStore,
    spotify::{
        self,
        auth::AuthorizationError,
        http::{ApiError, HttpTransport},
    },
    types::{AuthorizationSession, Credential, TokenResponse},
    utils,
};

/// Why no bearer token is available right now. None of these are retried:
/// the next fetch cycle starts over.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Not authorized yet, no refresh token stored")]
    NotAuthorized,
    #[error("Server response did not contain an access token")]
    MissingAccessToken,
    #[error("Token endpoint failed: {0}")]
    Api(#[source] Box<ApiError>),
}

impl From<ApiError> for TokenError {
    fn from(err: ApiError) -> Self {
        TokenError::Api(Box::new(err))
    }
}

/// True when the credential has no expiry or `now` has reached it.
pub fn is_token_expired(user: &Credential, now: i64) -> bool {
    let Some(expires_at) = user.expires_at else {
        return true;
    };

    let expired = now >= expires_at;
    if expired {
        log::debug!("Token is expired.");
    }
    expired
}

/// App-only token held in memory.
#[derive(Debug, Clone)]
struct AppToken {
    access_token: String,
    expires_in: Duration,
    refreshed_at: Instant,
}

impl AppToken {
    fn is_expired(&self) -> bool {
        self.refreshed_at.elapsed() >= self.expires_in
    }
}

enum Strategy {
    AuthorizationCode,
    ClientCredentials {
        client_secret: String,
        cached: Option<AppToken>,
    },
}

/// Hands out bearer tokens, refreshing them when they run out.
///
/// With PKCE the credential lives in the [`CredentialStore`] and is renewed
/// with the stored refresh token. With client credentials the token stays in
/// memory and is simply requested again once its lifetime has elapsed.
pub struct TokenProvider {
    config: SpotifyConfig,
    strategy: Strategy,
}

impl TokenProvider {
    pub fn new(config: SpotifyConfig) -> Self {
        let strategy = match &config.flow {
            AuthFlow::Pkce => Strategy::AuthorizationCode,
            AuthFlow::ClientCredentials { client_secret } => Strategy::ClientCredentials {
                client_secret: client_secret.clone(),
                cached: None,
            },
        };

        Self { config, strategy }
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    pub fn uses_user_authorization(&self) -> bool {
        matches!(self.strategy, Strategy::AuthorizationCode)
    }

    pub fn get_token(
        &mut self,
        transport: &dyn HttpTransport,
        store: &mut CredentialStore,
    ) -> Result<String, TokenError> {
        match &mut self.strategy {
            Strategy::AuthorizationCode => user_token(transport, &self.config, store),
            Strategy::ClientCredentials {
                client_secret,
                cached,
            } => {
                if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
                    return Ok(token.access_token.clone());
                }

                let response =
                    spotify::auth::client_credentials(transport, &self.config, client_secret)?;
                let Some(access_token) = response.access_token else {
                    log::error!("Server response did not contain an access token.");
                    return Err(TokenError::MissingAccessToken);
                };

                let expires_in = response.expires_in.unwrap_or(0).max(0) as u64;
                *cached = Some(AppToken {
                    access_token: access_token.clone(),
                    expires_in: Duration::from_secs(expires_in),
                    refreshed_at: Instant::now(),
                });

                Ok(access_token)
            }
        }
    }

    /// Exchanges an authorization code and persists the resulting credential.
    pub fn exchange_code(
        &self,
        transport: &dyn HttpTransport,
        store: &mut CredentialStore,
        code: &str,
        session: &AuthorizationSession,
    ) -> Result<(), ApiError> {
        let response =
            spotify::auth::exchange_code_pkce(transport, &self.config, code, &session.code_verifier)?;
        log::debug!("Received access token.");

        store.set_user_info(&response);
        Ok(())
    }
}

fn user_token(
    transport: &dyn HttpTransport,
    config: &SpotifyConfig,
    store: &mut CredentialStore,
) -> Result<String, TokenError> {
    let user = store.get_user();
    if !is_token_expired(user, utils::now_seconds()) {
        if let Some(access_token) = &user.access_token {
            return Ok(access_token.clone());
        }
    }

    let Some(refresh_token) = user.refresh_token.clone() else {
        log::error!("No refresh token stored. Authorize the extension first.");
        return Err(TokenError::NotAuthorized);
    };

    let response: TokenResponse = spotify::auth::refresh_token(transport, config, &refresh_token)?;
    let Some(access_token) = response.access_token.clone() else {
        log::error!("Server response did not contain an access token.");
        return Err(TokenError::MissingAccessToken);
    };

    store.set_user_info(&response);
    log::debug!("Refreshed the access token.");

    Ok(access_token)
}

/// Owns the one pending authorization attempt of the settings flow.
///
/// The verifier and state are created on first use and reused until an
/// exchange succeeds, so re-opening the authorization page keeps the same
/// challenge. Starting over replaces whatever was pending.
#[derive(Debug, Default)]
pub struct Authorizer {
    pending: Option<AuthorizationSession>,
}

impl Authorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending session, created if there is none.
    pub fn session(&mut self) -> &AuthorizationSession {
        self.pending.get_or_insert_with(AuthorizationSession::generate)
    }

    pub fn pending(&self) -> Option<&AuthorizationSession> {
        self.pending.as_ref()
    }

    pub fn authorization_url(&mut self, config: &SpotifyConfig) -> String {
        let session = self.session();
        spotify::auth::authorization_url(config, session)
    }

    /// Validates the redirect, exchanges the code and forgets the session.
    ///
    /// Nothing is sent to the token endpoint unless the redirect carries the
    /// pending state, no `error` and a code.
    pub fn complete(
        &mut self,
        redirect_uri: &str,
        tokens: &TokenProvider,
        transport: &dyn HttpTransport,
        store: &mut CredentialStore,
    ) -> Result<(), AuthorizationError> {
        let session = self
            .pending
            .as_ref()
            .ok_or(AuthorizationError::NoPendingSession)?;

        let code = spotify::auth::parse_redirect(redirect_uri, session)?;
        log::debug!("Received authorization code.");

        tokens.exchange_code(transport, store, &code, session)?;
        self.reset();
        Ok(())
    }

    /// Forgets the pending verifier and state. Safe when nothing is pending.
    pub fn reset(&mut self) {
        self.pending = None;
    }
}
