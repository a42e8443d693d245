//! API client for communicating with the VersaTrak REST API.
//!
//! This module provides the `SessionClient` struct, which owns the session
//! (token pair and logged-on flag) and sends every request through a single
//! `send` primitive that attaches the bearer token.

use parking_lot::RwLock;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{mask_token, SessionState, TokenPair};
use crate::config::ClientConfig;
use crate::models::instance::InstanceListResponse;
use crate::models::{HistoryQuery, Instance};

use super::{ApiError, Endpoint, Resource};

#[derive(Debug, Deserialize)]
struct LogonResponse {
    #[serde(alias = "accessToken")]
    jwt: Option<String>,
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(rename = "authToken")]
    auth_token: Option<String>,
    #[serde(rename = "refreshToken")]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoggedOnResponse {
    #[serde(rename = "isLoggedOn", default)]
    is_logged_on: bool,
}

/// Map a rejection from the logon or refresh endpoint to an authentication error.
fn credential_rejection(err: ApiError) -> ApiError {
    match err {
        ApiError::Request { status, body } if matches!(status.as_u16(), 400 | 401 | 403) => {
            ApiError::rejected_credentials(status, &body)
        }
        other => other,
    }
}

/// Clears the session when dropped, so logoff cleanup also runs if the
/// request future errors out or is dropped mid-flight.
struct ClearSessionGuard<'a> {
    session: &'a RwLock<SessionState>,
}

impl Drop for ClearSessionGuard<'_> {
    fn drop(&mut self) {
        self.session.write().clear();
    }
}

macro_rules! resource_methods {
    ($($(#[$doc:meta])* $name:ident => $resource:ident;)*) => {
        $(
            $(#[$doc])*
            pub async fn $name(&self) -> Result<String, ApiError> {
                self.fetch(Resource::$resource).await
            }
        )*
    };
}

/// Session-holding client for one VersaTrak account.
///
/// Session state sits behind a lock that is only held for reads and writes
/// of the state itself, never across a request. Two tasks that both find the
/// session logged off will both log in; whichever response lands last wins.
/// Use one client per account.
pub struct SessionClient {
    client: Client,
    base_url: Url,
    config: ClientConfig,
    instance_id: String,
    session: RwLock<SessionState>,
}

impl SessionClient {
    /// Build a client without touching the network.
    ///
    /// A token pair in `config` is trusted as a live session and attached to
    /// every request straight away.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let base_url = config.parsed_base_url()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        let session = match config.tokens.clone() {
            Some(tokens) => {
                debug!(access = %mask_token(&tokens.access_token), "Using supplied token pair");
                SessionState::with_tokens(tokens)
            }
            None => SessionState::default(),
        };
        let instance_id = config.instance_id.clone().unwrap_or_default();

        debug!(base_url = %base_url, "SessionClient created");

        Ok(Self {
            client,
            base_url,
            config,
            instance_id,
            session: RwLock::new(session),
        })
    }

    /// Build a client, resolve the instance and log in if possible.
    ///
    /// Instance resolution and automatic login failures are logged and
    /// swallowed: the returned client may be logged off, with an empty
    /// instance id. Only an unusable configuration is an error.
    pub async fn connect(config: ClientConfig) -> Result<Self, ApiError> {
        let mut client = Self::new(config)?;
        client.bootstrap().await;
        Ok(client)
    }

    async fn bootstrap(&mut self) {
        if self.instance_id.is_empty() {
            match self.get_first_instance_id().await {
                Ok(Some(id)) => {
                    debug!(instance = %id, "No instance specified, using first instance id");
                    self.instance_id = id;
                }
                Ok(None) => warn!("Instance list is empty, continuing without an instance"),
                Err(e) => warn!(error = %e, "Failed to fetch instance list, continuing without an instance"),
            }
        }

        if self.is_logged_on_cached() {
            return;
        }
        let Some((username, _)) = self.config.credentials() else {
            debug!("No credentials specified");
            return;
        };
        if self.instance_id.is_empty() {
            warn!(username, "Credentials supplied but no instance resolved, skipping login");
            return;
        }

        debug!(username, "Logging in during construction");
        match self.login().await {
            Ok(true) => {}
            Ok(false) => warn!("Server did not confirm the session after automatic login"),
            Err(e) => warn!(error = %e, "Automatic login failed, client remains logged off"),
        }
    }

    // ===== Accessors =====

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Instance id, empty when none was supplied or resolved.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn set_instance_id(&mut self, instance_id: impl Into<String>) {
        self.instance_id = instance_id.into();
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.session.read().tokens().cloned()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens().map(|t| t.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens().map(|t| t.refresh_token)
    }

    /// The `Authorization` header value attached to outgoing requests.
    pub fn authorization_header(&self) -> Option<String> {
        self.session.read().authorization()
    }

    /// Local belief about the session, without asking the server.
    pub fn is_logged_on_cached(&self) -> bool {
        self.session.read().is_logged_on()
    }

    // ===== Transport =====

    fn url(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
        self.base_url.join(&endpoint.path).map_err(|e| {
            ApiError::Configuration(format!("invalid request path '{}': {}", endpoint.path, e))
        })
    }

    /// Send one request, retrying GETs on transient statuses.
    ///
    /// The bearer token is read from the session on every attempt. A 401 on
    /// an endpoint that needs a session drops the local session.
    async fn send<B>(&self, endpoint: &Endpoint, form: Option<&B>) -> Result<Response, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(endpoint)?;
        let mut retries = 0;
        let mut backoff = self.config.initial_backoff;

        loop {
            let headers = self.session.read().auth_headers()?;
            let mut request = self
                .client
                .request(endpoint.method.clone(), url.clone())
                .headers(headers);
            if let Some(form) = form {
                request = request.form(form);
            }

            debug!(method = %endpoint.method, path = %endpoint.path, attempt = retries + 1, "Sending request");
            let response = request.send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if endpoint.is_retryable() && ApiError::is_transient_status(status) {
                if retries < self.config.max_retries {
                    retries += 1;
                    warn!(path = %endpoint.path, %status, retry = retries, backoff_ms = backoff.as_millis() as u64, "Transient server error, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    continue;
                }
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::transient(status, retries + 1, &body));
            }

            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED && endpoint.requires_auth {
                warn!(path = %endpoint.path, "Server rejected the session, clearing local tokens");
                self.session.write().clear();
            }
            return Err(ApiError::from_status(status, &body));
        }
    }

    async fn send_text<B>(&self, endpoint: &Endpoint, form: Option<&B>) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send(endpoint, form).await?;
        Ok(response.text().await?)
    }

    async fn send_json<T, B>(&self, endpoint: &Endpoint, form: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let text = self.send_text(endpoint, form).await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("failed to parse response from {}: {}", endpoint.path, e))
        })
    }

    /// Send through the login guard when the endpoint needs a session.
    async fn authenticated_text<B>(&self, endpoint: &Endpoint, form: Option<&B>) -> Result<String, ApiError>
    where
        B: Serialize + ?Sized,
    {
        if endpoint.requires_auth {
            self.ensure_logged_in().await?;
        }
        self.send_text(endpoint, form).await.inspect_err(|e| {
            warn!(path = %endpoint.path, error = %e, "Request failed");
        })
    }

    // ===== Session =====

    /// List the instances available on the server.
    pub async fn get_instances(&self) -> Result<Vec<Instance>, ApiError> {
        let response: InstanceListResponse =
            self.send_json(&Endpoint::INSTANCE_LIST, None::<&()>).await?;
        Ok(response.into_instances())
    }

    pub async fn get_first_instance_id(&self) -> Result<Option<String>, ApiError> {
        let instances = self.get_instances().await?;
        Ok(instances.into_iter().next().map(|i| i.id))
    }

    /// Log on with the configured credentials.
    ///
    /// Returns the logged-on state reported by the server after the new
    /// token is attached. A rejected logon is an `ApiError::Authentication`.
    pub async fn login(&self) -> Result<bool, ApiError> {
        let (username, password) = self.config.credentials().ok_or_else(|| {
            ApiError::Configuration("no username and password configured".to_string())
        })?;
        if self.instance_id.is_empty() {
            return Err(ApiError::Configuration(
                "no instance id configured or resolved".to_string(),
            ));
        }

        info!(username, instance = %self.instance_id, "Logging on");
        let form = [
            ("username", username),
            ("password", password),
            ("instance", self.instance_id.as_str()),
        ];
        let response: LogonResponse = self
            .send_json(&Endpoint::LOGON, Some(&form))
            .await
            .map_err(credential_rejection)?;

        let access_token = response.jwt.filter(|t| !t.is_empty()).ok_or_else(|| {
            ApiError::Authentication("logon response did not include an access token".to_string())
        })?;
        let tokens = TokenPair::new(access_token, response.refresh_token.unwrap_or_default());
        self.install_tokens(tokens).await
    }

    /// Ask the server whether the current session is live.
    pub async fn is_logged_on(&self) -> Result<bool, ApiError> {
        let response: LoggedOnResponse =
            self.send_json(&Endpoint::IS_LOGGED_ON, None::<&()>).await?;
        self.session.write().set_logged_on(response.is_logged_on);
        debug!(logged_on = response.is_logged_on, "Session status");
        Ok(response.is_logged_on)
    }

    /// Exchange the current token pair for a new one.
    ///
    /// On rejection the stored pair is left exactly as it was.
    pub async fn refresh_auth_token(&self) -> Result<bool, ApiError> {
        let current = self
            .tokens()
            .ok_or_else(|| ApiError::Authentication("no token pair to refresh".to_string()))?;

        let form = [
            ("authToken", current.access_token.as_str()),
            ("refreshToken", current.refresh_token.as_str()),
        ];
        let response: RefreshResponse = self
            .send_json(&Endpoint::REFRESH_AUTH_TOKEN, Some(&form))
            .await
            .map_err(credential_rejection)?;

        let access_token = response.auth_token.filter(|t| !t.is_empty()).ok_or_else(|| {
            ApiError::Authentication("refresh response did not include an access token".to_string())
        })?;
        info!("Refreshed auth token");
        let tokens = TokenPair::new(access_token, response.refresh_token.unwrap_or_default());
        self.install_tokens(tokens).await
    }

    async fn install_tokens(&self, tokens: TokenPair) -> Result<bool, ApiError> {
        debug!(
            access = %mask_token(&tokens.access_token),
            refresh = %mask_token(&tokens.refresh_token),
            "Received token pair"
        );
        self.session.write().update(tokens);
        let logged_on = self.is_logged_on().await?;
        debug!(logged_on, "Logged on");
        Ok(logged_on)
    }

    /// Log off on the server and drop the local session.
    ///
    /// The local session is cleared whatever the server answers; a failed
    /// request is still returned to the caller afterwards.
    pub async fn logoff(&self) -> Result<String, ApiError> {
        let guard = ClearSessionGuard {
            session: &self.session,
        };
        let result = self.send_text(&Endpoint::LOGOFF, None::<&()>).await;
        drop(guard);

        match &result {
            Ok(_) => info!("Logged off"),
            Err(e) => warn!(error = %e, "Logoff request failed, local session cleared"),
        }
        result
    }

    /// Log in first if the session is not believed to be live.
    ///
    /// Checks only the local flag; it does not ask the server.
    pub async fn ensure_logged_in(&self) -> Result<(), ApiError> {
        let logged_on = self.is_logged_on_cached();
        if !logged_on {
            debug!("Not logged on, logging in before request");
            self.login().await?;
        }
        Ok(())
    }

    // ===== Data Fetching Methods =====

    /// Fetch one of the read-only resource collections as raw text.
    pub async fn fetch(&self, resource: Resource) -> Result<String, ApiError> {
        self.authenticated_text(&resource.endpoint(), None::<&()>).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<String, ApiError> {
        self.authenticated_text(&Endpoint::user(user_id), None::<&()>).await
    }

    /// Fetch history for a monitored object as raw text.
    pub async fn get_history_data(
        &self,
        object_id: &str,
        query: &HistoryQuery,
    ) -> Result<String, ApiError> {
        self.authenticated_text(&Endpoint::history_data(object_id), Some(&query.form()))
            .await
    }

    resource_methods! {
        user_roles => UserRoles;
        functions => Functions;
        watchlist => Watchlist;
        edit_users_list => EditUsersList;
        users => Users;
        current_status => CurrentStatus;
        monitored_objects => MonitoredObjects;
        departments => Departments;
        locations => Locations;
        units_of_measure => UnitsOfMeasure;
        policies => Policies;
        monitored_object_types => MonitoredObjectTypes;
        monitor_point_types => MonitorPointTypes;
        probe_types => ProbeTypes;
        system_info => SystemInfo;
    }
}
