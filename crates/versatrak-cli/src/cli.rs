//! Command-line arguments.
//!
//! Every connection setting can come from a flag or from the environment
//! (including a `.env` file loaded at startup); flags win.

use std::time::Duration;

use clap::{Parser, Subcommand};
use versatrak::{ClientConfig, HistoryQuery, Resource, DEFAULT_BASE_URL};

#[derive(Debug, Parser)]
#[command(name = "versatrak", version, about = "Query a VersaTrak monitoring server")]
pub struct Cli {
    /// API root, e.g. https://host/vtwebapi2/api/
    #[arg(long, env = "API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Instance to log on to; the first listed instance when omitted
    #[arg(long, env = "INSTANCE_ID")]
    pub instance: Option<String>,

    #[arg(long, env = "USERNAME")]
    pub username: Option<String>,

    /// Prompted for when a username is given without one
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Existing access token; skips the logon request
    #[arg(long, env = "VT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "VT_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List instances as JSON
    Instances,
    /// Ask the server whether the session is live
    Status,
    /// Log on explicitly
    Login,
    /// Log on, then exchange the token pair for a fresh one
    Refresh,
    /// Log on and off again
    Logoff,
    /// Fetch a read-only resource collection
    Resource {
        /// One of: user-roles, functions, watchlist, edit-users-list, users,
        /// current-status, monitored-objects, departments, locations,
        /// units-of-measure, policies, monitored-object-types,
        /// monitor-point-types, probe-types, system-info
        name: Resource,
    },
    /// Fetch a single user
    User { id: String },
    /// Fetch history data for a monitored object
    History {
        object_id: String,
        /// Start, milliseconds since the epoch (0 = server default)
        #[arg(long, default_value_t = 0)]
        start: i64,
        /// End, milliseconds since the epoch (0 = server default)
        #[arg(long, default_value_t = 0)]
        end: i64,
        /// Aggregation period
        #[arg(long, default_value = versatrak::models::history::DEFAULT_PERIOD)]
        period: String,
        #[arg(long)]
        include_events: bool,
    },
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(&self.base_url)
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(ref instance) = self.instance {
            config = config.with_instance(instance.as_str());
        }
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            config = config.with_credentials(username.as_str(), password.as_str());
        }
        if let Some(ref token) = self.token {
            config = config.with_tokens(
                token.as_str(),
                self.refresh_token.as_deref().unwrap_or_default(),
            );
        }
        config
    }
}

impl Command {
    pub fn history_query(start: i64, end: i64, period: &str, include_events: bool) -> HistoryQuery {
        HistoryQuery {
            start_ms: start,
            end_ms: end,
            ..HistoryQuery::new()
        }
        .period(period)
        .include_events(include_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("versatrak").chain(args.iter().copied()))
            .expect("Failed to parse test arguments")
    }

    #[test]
    fn test_flags_build_config() {
        let cli = parse(&[
            "--base-url",
            "https://vt.example.org/api",
            "--instance",
            "abc",
            "--username",
            "operator",
            "--password",
            "secret",
            "--timeout",
            "5",
            "status",
        ]);
        let config = cli.client_config();
        assert_eq!(config.base_url, "https://vt.example.org/api");
        assert_eq!(config.instance_id.as_deref(), Some("abc"));
        assert_eq!(config.credentials(), Some(("operator", "secret")));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(matches!(cli.command, Command::Status));
    }

    #[test]
    fn test_token_flags() {
        let cli = parse(&["--token", "tok", "--refresh-token", "ref", "login"]);
        let tokens = cli.client_config().tokens.expect("token pair");
        assert_eq!(tokens.access_token, "tok");
        assert_eq!(tokens.refresh_token, "ref");
    }

    #[test]
    fn test_resource_names_parse() {
        let cli = parse(&["resource", "probe-types"]);
        match cli.command {
            Command::Resource { name } => assert_eq!(name, Resource::ProbeTypes),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["versatrak", "resource", "sensors"]).is_err());
    }

    #[test]
    fn test_history_defaults() {
        let cli = parse(&["history", "5150"]);
        match cli.command {
            Command::History {
                object_id,
                start,
                end,
                period,
                include_events,
            } => {
                assert_eq!(object_id, "5150");
                let query = Command::history_query(start, end, &period, include_events);
                assert_eq!(query, HistoryQuery::new());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
