//! REST API client module for the VersaTrak monitoring platform.
//!
//! This module provides the `SessionClient` for authenticating against a
//! VersaTrak instance and fetching instances, resources and history data.
//!
//! The API uses JWT bearer token authentication obtained through the
//! `usersession/action/logon` endpoint.

pub mod client;
pub mod endpoint;
pub mod error;

pub use client::SessionClient;
pub use endpoint::{Endpoint, Resource};
pub use error::ApiError;
