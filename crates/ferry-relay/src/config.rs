//! Relay configuration.

use std::time::Duration;

/// Configuration for the relay server.
///
/// Created once at startup and read-only afterwards; sessions only ever see
/// the idle timeout.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address to bind the listener to. A hostname is accepted and resolved
    /// at bind time.
    /// Default: `localhost`
    pub bind_host: String,

    /// Port to bind the listener to.
    /// Default: `8000`
    pub bind_port: u16,

    /// Idle timeout applied to every session read and write, including the
    /// handshake. A session with no progress for this long is torn down.
    /// Default: 5 minutes
    pub idle_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_host: "localhost".to_string(),
            bind_port: 8000,
            idle_timeout: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.bind_host, "localhost");
        assert_eq!(config.bind_port, 8000);
        assert_eq!(config.idle_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_config_override_preserves_rest() {
        let config = RelayConfig {
            bind_port: 1080,
            ..Default::default()
        };
        assert_eq!(config.bind_host, "localhost");
        assert_eq!(config.bind_port, 1080);
    }
}
