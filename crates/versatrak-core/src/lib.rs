//! VersaTrak client library
//!
//! A Rust client for the VersaTrak remote monitoring REST API.
//!
//! This crate provides:
//! - `SessionClient`: logon, token refresh, logoff and bearer-token attachment
//! - Thin methods for the instance list, read-only resources and history data
//! - `blocking::SessionClient`: the same client driven on its own runtime
//!
//! # Example
//!
//! ```no_run
//! use versatrak::{ClientConfig, HistoryQuery, SessionClient};
//!
//! # async fn example() -> Result<(), versatrak::ApiError> {
//! let config = ClientConfig::new("https://vt.example.org/vtwebapi2/api/")
//!     .with_credentials("operator", "secret");
//!
//! // Resolves the first instance and logs in; failures only leave the
//! // client logged off.
//! let client = SessionClient::connect(config).await?;
//!
//! let departments = client.departments().await?;
//! let history = client
//!     .get_history_data("1234", &HistoryQuery::new().include_events(true))
//!     .await?;
//! client.logoff().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
#[cfg(feature = "blocking")]
pub mod blocking;
pub mod config;
pub mod models;

pub use api::{ApiError, Endpoint, Resource, SessionClient};
pub use auth::{SessionState, TokenPair};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use models::{HistoryQuery, Instance};
