//! Data models for VersaTrak entities.
//!
//! - `Instance`: a tenant/deployment the API can operate against
//! - `HistoryQuery`: parameters for monitored-object history retrieval

pub mod history;
pub mod instance;

pub use history::HistoryQuery;
pub use instance::Instance;
