use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use url::Url;

use crate::{
    config::SpotifyConfig,
    spotify::http::{ApiError, HttpRequest, HttpTransport},
    types::{AuthorizationSession, TokenResponse},
};

#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    #[error("No authorization is pending")]
    NoPendingSession,
    #[error("Redirect is not a valid URI: {0}")]
    MalformedRedirect(String),
    #[error("State missing in response")]
    MissingState,
    #[error("State in response does not match sent state")]
    StateMismatch,
    #[error("Authorization denied: {0}")]
    Denied(String),
    #[error("No authorization code received in response")]
    MissingCode,
    #[error("Token exchange failed: {0}")]
    Exchange(#[from] ApiError),
}

/// Builds the provider authorization URL for `session`.
///
/// Parameters are client id, response type, redirect URI, the S256 challenge
/// derived from the session verifier, the session state and the scope when
/// one is configured.
pub fn authorization_url(config: &SpotifyConfig, session: &AuthorizationSession) -> String {
    let challenge = session.code_challenge();
    let mut params = vec![
        ("response_type", "code"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code_challenge_method", "S256"),
        ("code_challenge", challenge.as_str()),
        ("state", session.state.as_str()),
    ];
    if let Some(scope) = config.scope.as_deref() {
        params.push(("scope", scope));
    }

    match Url::parse_with_params(&config.auth_url, &params) {
        Ok(url) => url.to_string(),
        Err(e) => {
            log::warn!("Invalid authorization endpoint {}: {}", config.auth_url, e);
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&params)
                .finish();
            format!("{}?{}", config.auth_url, query)
        }
    }
}

/// Validates a redirect against the pending session and returns the
/// authorization code.
///
/// Every failure is checked before the code is looked at: a missing or
/// foreign `state` and an `error` parameter all reject the redirect.
pub fn parse_redirect(
    redirect_uri: &str,
    session: &AuthorizationSession,
) -> Result<String, AuthorizationError> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| AuthorizationError::MalformedRedirect(e.to_string()))?;

    let mut query: HashMap<String, String> = HashMap::new();
    for (key, value) in url.query_pairs() {
        query.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }

    match query.get("state") {
        Some(state) if *state == session.state => {}
        Some(_) => return Err(AuthorizationError::StateMismatch),
        None => return Err(AuthorizationError::MissingState),
    }

    if let Some(error) = query.get("error") {
        return Err(AuthorizationError::Denied(error.clone()));
    }

    query
        .remove("code")
        .filter(|code| !code.is_empty())
        .ok_or(AuthorizationError::MissingCode)
}

fn request_token(
    transport: &dyn HttpTransport,
    request: HttpRequest,
) -> Result<TokenResponse, ApiError> {
    let url = request.url.clone();
    let response = transport.perform(&request)?.error_for_status(&url)?;
    response.json()
}

/// Exchanges an authorization code plus the session verifier for a token.
pub fn exchange_code_pkce(
    transport: &dyn HttpTransport,
    config: &SpotifyConfig,
    code: &str,
    verifier: &str,
) -> Result<TokenResponse, ApiError> {
    log::debug!("Requesting access token.");

    let request = HttpRequest::post_form(
        &config.token_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", config.redirect_uri.as_str()),
        ],
    );

    request_token(transport, request)
}

/// Trades a stored refresh token for a new access token.
pub fn refresh_token(
    transport: &dyn HttpTransport,
    config: &SpotifyConfig,
    refresh_token: &str,
) -> Result<TokenResponse, ApiError> {
    log::debug!("Refreshing access token...");

    let request = HttpRequest::post_form(
        &config.token_url,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", config.client_id.as_str()),
        ],
    );

    request_token(transport, request)
}

/// App-only token: client id and secret sent as HTTP Basic credentials.
pub fn client_credentials(
    transport: &dyn HttpTransport,
    config: &SpotifyConfig,
    client_secret: &str,
) -> Result<TokenResponse, ApiError> {
    log::debug!("Requesting client credentials token.");

    let basic = STANDARD.encode(format!("{}:{}", config.client_id, client_secret));
    let request = HttpRequest::post_form(&config.token_url, &[("grant_type", "client_credentials")])
        .header("Authorization", format!("Basic {basic}"));

    request_token(transport, request)
}
