use std::fmt;

use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::api::ApiError;

/// Number of leading token characters shown in logs.
const TOKEN_LOG_PREFIX: usize = 8;

/// Access and refresh token as issued together by the server.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    /// May be empty when the server does not issue one.
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// Keep tokens out of debug output
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &mask_token(&self.access_token))
            .field("refresh_token", &mask_token(&self.refresh_token))
            .finish()
    }
}

/// Shorten a token for logging.
pub fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return "<empty>".to_string();
    }
    let prefix: String = token.chars().take(TOKEN_LOG_PREFIX).collect();
    if prefix.len() == token.len() {
        "****".to_string()
    } else {
        format!("{}…({} chars)", prefix, token.chars().count())
    }
}

/// Mutable session state shared by every request a client sends.
///
/// Tokens live in one `Option<TokenPair>` so they can only be set and
/// cleared together. The authorization header is derived from it on every
/// request, which keeps the header and the stored token from drifting apart.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    tokens: Option<TokenPair>,
    logged_on: bool,
}

impl SessionState {
    /// State for a caller-supplied token: trusted as logged on without a round trip.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: Some(tokens),
            logged_on: true,
        }
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    pub fn is_logged_on(&self) -> bool {
        self.logged_on
    }

    pub fn set_logged_on(&mut self, logged_on: bool) {
        self.logged_on = logged_on;
    }

    /// Install a freshly issued token pair. Optimistically marks the session
    /// logged on; callers reconcile against the server right after.
    pub fn update(&mut self, tokens: TokenPair) {
        self.tokens = Some(tokens);
        self.logged_on = true;
    }

    /// Drop tokens and mark logged off.
    pub fn clear(&mut self) {
        self.tokens = None;
        self.logged_on = false;
    }

    /// Authorization header value, absent when no token is held.
    pub fn authorization(&self) -> Option<String> {
        self.tokens
            .as_ref()
            .filter(|t| !t.access_token.is_empty())
            .map(TokenPair::bearer)
    }

    pub fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(bearer) = self.authorization() {
            let value = HeaderValue::from_str(&bearer).map_err(|_| {
                ApiError::Authentication("access token is not a valid header value".to_string())
            })?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }
}
