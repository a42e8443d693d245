//! Session state for the VersaTrak API.
//!
//! This module provides:
//! - `TokenPair`: access and refresh token, always stored together
//! - `SessionState`: token pair plus the locally cached logged-on flag
//!
//! Nothing here is persisted; a session lives as long as its client.

pub mod session;

pub use session::{mask_token, SessionState, TokenPair};
