//! Queue, line-length and timeout limits.

use serde::Deserialize;
use std::time::Duration;

/// Per-connection resource limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Outbound queue capacity per session (default: 10).
    /// A peer whose queue fills is disconnected with "SendQ exceeded".
    #[serde(default = "default_send_queue")]
    pub send_queue: usize,
    /// Longest accepted input line including CRLF (default: 512).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Seconds the writer may block on a single socket write (default: 30).
    #[serde(default = "default_write_timeout")]
    pub write_timeout: u64,
    /// Seconds to let writers flush during shutdown (default: 5).
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace: u64,
    /// Ping/pong keepalive and registration deadlines.
    #[serde(default)]
    pub idle_timeouts: IdleTimeoutsConfig,
}

impl LimitsConfig {
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            send_queue: default_send_queue(),
            max_line_len: default_max_line_len(),
            write_timeout: default_write_timeout(),
            shutdown_grace: default_shutdown_grace(),
            idle_timeouts: IdleTimeoutsConfig::default(),
        }
    }
}

fn default_send_queue() -> usize {
    10
}

fn default_max_line_len() -> usize {
    anonirc_proto::MAX_LINE_LEN
}

fn default_write_timeout() -> u64 {
    30
}

fn default_shutdown_grace() -> u64 {
    5
}

/// Idle timeout configuration for client connection keepalive.
///
/// - `ping`: seconds of silence before the server sends PING (default: 90)
/// - `timeout`: seconds to wait for any traffic after that PING (default: 120)
/// - `registration`: seconds allowed for NICK/USER (default: 60)
#[derive(Debug, Clone, Deserialize)]
pub struct IdleTimeoutsConfig {
    #[serde(default = "default_ping_interval")]
    pub ping: u64,
    #[serde(default = "default_ping_timeout")]
    pub timeout: u64,
    #[serde(default = "default_registration_timeout")]
    pub registration: u64,
}

impl Default for IdleTimeoutsConfig {
    fn default() -> Self {
        Self {
            ping: default_ping_interval(),
            timeout: default_ping_timeout(),
            registration: default_registration_timeout(),
        }
    }
}

fn default_ping_interval() -> u64 {
    90
}

fn default_ping_timeout() -> u64 {
    120
}

fn default_registration_timeout() -> u64 {
    60
}
