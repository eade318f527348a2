//! Minimal SOCKS5 relay for transparent TCP tunneling.
//!
//! `ferry-relay` implements the no-authentication subset of SOCKS5 with the
//! CONNECT command only. A client negotiates, names a destination, and the
//! relay pipes bytes in both directions until either side closes or the
//! idle timeout fires.
//!
//! # Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! Server (accept loop, one task per connection)
//!   |
//!   +-- handshake: method negotiation + CONNECT request
//!   |        |
//!   |        +-- violation? --> close, no reply
//!   |
//!   +-- dial destination (10 s connect timeout)
//!   |        |
//!   |        +-- unreachable? --> close, no reply
//!   |
//!   +-- success reply, then bidirectional relay
//!            (64 KiB chunks, idle timeout per read/write)
//! ```
//!
//! # Components
//!
//! - [`TimedStream`]: deadline-bounded typed reads/writes over one socket
//! - [`TargetAddr`]: destination parsed from the CONNECT request
//! - [`Server`]: listener that spawns one session per connection
//!
//! # Protocol notes
//!
//! The relay always selects the no-authentication method, even when the
//! client did not offer it, and the CONNECT success reply always carries a
//! zeroed bound address (`0.0.0.0:0`). Failures never produce a SOCKS5
//! error reply; the connection is simply closed.

mod config;
mod handshake;
mod relay;
mod server;
mod session;
mod stream;

pub use config::RelayConfig;
pub use handshake::{HostAddr, TargetAddr};
pub use server::Server;
pub use stream::{TimedReader, TimedStream, TimedWriter};

/// Result type for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Errors that can occur in relay operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Failed to bind the listening socket.
    #[error("Failed to bind to {host}:{port}: {source}")]
    Bind {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Client sent a malformed or unsupported handshake.
    #[error("Protocol violation: {0}")]
    Protocol(&'static str),

    /// Dialing the requested destination failed.
    #[error("Connect to {dest} failed: {source}")]
    Connect {
        dest: TargetAddr,
        #[source]
        source: std::io::Error,
    },

    /// No progress within the idle timeout.
    #[error("Idle timeout elapsed")]
    IdleTimeout,

    /// Any other I/O failure on an established connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_bind() {
        let err = RelayError::Bind {
            host: "localhost".to_string(),
            port: 8000,
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(err.to_string().contains("localhost:8000"));
    }

    #[test]
    fn test_error_display_connect_carries_destination() {
        let err = RelayError::Connect {
            dest: TargetAddr {
                host: HostAddr::Domain("example.com".to_string()),
                port: 443,
            },
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.to_string().contains("example.com:443"));
    }

    #[test]
    fn test_error_from_io() {
        let err: RelayError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(matches!(err, RelayError::Io(_)));
    }
}
