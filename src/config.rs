//! Runtime configuration: CLI flags with environment-variable fallbacks.

use std::time::Duration;

use clap::Args;

use crate::services::DEFAULT_PROXIMITY_METERS;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_REPORT_ENDPOINT: &str = "https://formspree.io/f/xzzjjqaj";

/// Settings shared by the CLI, the HTTP server and the collaborators.
#[derive(Debug, Clone)]
pub struct Config {
    pub nominatim_url: String,
    pub user_agent: String,
    pub http_timeout: Duration,
    /// Minimum spacing between two geocoding requests.
    pub geocode_interval: Duration,
    pub report_endpoint: String,
    pub proximity_meters: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: default_user_agent(),
            http_timeout: Duration::from_secs(10),
            geocode_interval: Duration::from_millis(1000),
            report_endpoint: DEFAULT_REPORT_ENDPOINT.to_string(),
            proximity_meters: DEFAULT_PROXIMITY_METERS,
        }
    }
}

fn default_user_agent() -> String {
    format!("FamilyPlus/{} (stadium-family-services)", env!("CARGO_PKG_VERSION"))
}

/// Global flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Nominatim base URL.
    #[arg(long, global = true, env = "FAMILYPLUS_NOMINATIM_URL", default_value = DEFAULT_NOMINATIM_URL)]
    pub nominatim_url: String,

    /// User-Agent sent to the geocoding provider.
    #[arg(long, global = true, env = "FAMILYPLUS_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Per-request HTTP timeout in seconds (geocoding and reports).
    #[arg(long, global = true, env = "FAMILYPLUS_HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// Minimum milliseconds between geocoding requests.
    #[arg(long, global = true, env = "FAMILYPLUS_GEOCODE_INTERVAL_MS", default_value_t = 1000)]
    pub geocode_interval_ms: u64,

    /// Form endpoint receiving user reports.
    #[arg(long, global = true, env = "FAMILYPLUS_REPORT_ENDPOINT", default_value = DEFAULT_REPORT_ENDPOINT)]
    pub report_endpoint: String,

    /// Services closer than this many meters are treated as one place.
    #[arg(long, global = true, env = "FAMILYPLUS_PROXIMITY_METERS", default_value_t = DEFAULT_PROXIMITY_METERS)]
    pub proximity_meters: f64,
}

impl From<ConfigArgs> for Config {
    fn from(args: ConfigArgs) -> Self {
        Self {
            nominatim_url: args.nominatim_url,
            user_agent: args.user_agent.unwrap_or_else(default_user_agent),
            http_timeout: Duration::from_secs(args.http_timeout_secs),
            geocode_interval: Duration::from_millis(args.geocode_interval_ms),
            report_endpoint: args.report_endpoint,
            proximity_meters: args.proximity_meters,
        }
    }
}
