//! Blocking wrapper around the async [`SessionClient`](crate::SessionClient).
//!
//! Each call is driven to completion on a current-thread tokio runtime owned
//! by the wrapper. Do not call these methods from inside an async context;
//! use the async client there instead.

use reqwest::Url;
use tokio::runtime::{Builder, Runtime};

use crate::api::{ApiError, Resource, SessionClient as AsyncClient};
use crate::auth::TokenPair;
use crate::config::ClientConfig;
use crate::models::{HistoryQuery, Instance};

macro_rules! blocking_methods {
    ($($(#[$doc:meta])* $name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self, $($arg: $ty),*) -> Result<$ret, ApiError> {
                self.runtime.block_on(self.inner.$name($($arg),*))
            }
        )*
    };
}

pub struct SessionClient {
    inner: AsyncClient,
    runtime: Runtime,
}

fn build_runtime() -> Result<Runtime, ApiError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ApiError::Configuration(format!("failed to start runtime: {}", e)))
}

impl SessionClient {
    /// See [`crate::SessionClient::new`].
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let runtime = build_runtime()?;
        let inner = AsyncClient::new(config)?;
        Ok(Self { inner, runtime })
    }

    /// See [`crate::SessionClient::connect`].
    pub fn connect(config: ClientConfig) -> Result<Self, ApiError> {
        let runtime = build_runtime()?;
        let inner = runtime.block_on(AsyncClient::connect(config))?;
        Ok(Self { inner, runtime })
    }

    /// The async client this wrapper drives.
    pub fn inner(&self) -> &AsyncClient {
        &self.inner
    }

    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    pub fn instance_id(&self) -> &str {
        self.inner.instance_id()
    }

    pub fn set_instance_id(&mut self, instance_id: impl Into<String>) {
        self.inner.set_instance_id(instance_id);
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.inner.tokens()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.access_token()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner.refresh_token()
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.inner.authorization_header()
    }

    pub fn is_logged_on_cached(&self) -> bool {
        self.inner.is_logged_on_cached()
    }

    blocking_methods! {
        get_instances() -> Vec<Instance>;
        get_first_instance_id() -> Option<String>;
        login() -> bool;
        is_logged_on() -> bool;
        refresh_auth_token() -> bool;
        logoff() -> String;
        ensure_logged_in() -> ();
        fetch(resource: Resource) -> String;
        get_user(user_id: &str) -> String;
        get_history_data(object_id: &str, query: &HistoryQuery) -> String;
        user_roles() -> String;
        functions() -> String;
        watchlist() -> String;
        edit_users_list() -> String;
        users() -> String;
        current_status() -> String;
        monitored_objects() -> String;
        departments() -> String;
        locations() -> String;
        units_of_measure() -> String;
        policies() -> String;
        monitored_object_types() -> String;
        monitor_point_types() -> String;
        probe_types() -> String;
        system_info() -> String;
    }
}
