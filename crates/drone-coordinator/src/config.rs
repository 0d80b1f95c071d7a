//! Environment-based configuration for the coordinator process, in the
//! same `Config::from_env()` shape as the teacher's API service config.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Coordinator's outbound (dispatch) UDP port.
    pub send_port: u16,
    /// Coordinator's inbound (telemetry/event) UDP port.
    pub receive_port: u16,

    /// Path to the zone definitions file; falls back to the default grid
    /// when absent or empty, per spec §6.
    pub zone_file_path: Option<String>,

    /// Cleanup timer: initial delay then period, spec §4.4.
    pub cleanup_initial_delay: Duration,
    pub cleanup_period: Duration,

    /// Proactive reconciliation timer: initial delay then period, spec §4.4.
    pub proactive_initial_delay: Duration,
    pub proactive_period: Duration,

    /// Number of workers draining the idle-reassignment queue, spec §5.
    pub idle_worker_pool_size: usize,

    /// Logging level passed to `tracing_subscriber::EnvFilter`.
    pub log_level: String,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            send_port: env_parse("COORDINATOR_SEND_PORT", drone_protocol::ports::COORDINATOR_SEND_PORT),
            receive_port: env_parse(
                "COORDINATOR_RECEIVE_PORT",
                drone_protocol::ports::COORDINATOR_RECEIVE_PORT,
            ),
            zone_file_path: env::var("ZONE_FILE_PATH").ok(),
            cleanup_initial_delay: Duration::from_secs(env_parse("CLEANUP_INITIAL_DELAY_SECS", 5)),
            cleanup_period: Duration::from_secs(env_parse("CLEANUP_PERIOD_SECS", 15)),
            proactive_initial_delay: Duration::from_secs(env_parse(
                "PROACTIVE_INITIAL_DELAY_SECS",
                3,
            )),
            proactive_period: Duration::from_secs(env_parse("PROACTIVE_PERIOD_SECS", 3)),
            idle_worker_pool_size: env_parse("IDLE_WORKER_POOL_SIZE", 4),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
