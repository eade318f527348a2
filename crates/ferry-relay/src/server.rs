//! Accept loop.
//!
//! Binds the configured address and spawns one detached session task per
//! accepted connection. Sessions share nothing but the read-only idle
//! timeout; a failing session never affects the listener or its siblings.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::session;
use crate::{RelayError, Result};

/// SOCKS5 relay server.
pub struct Server {
    listener: TcpListener,
    config: RelayConfig,
}

impl Server {
    /// Bind the listener described by the configuration.
    pub async fn bind(config: RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind((config.bind_host.as_str(), config.bind_port))
            .await
            .map_err(|e| RelayError::Bind {
                host: config.bind_host.clone(),
                port: config.bind_port,
                source: e,
            })?;
        if let Ok(addr) = listener.local_addr() {
            info!(address = %addr, "listening");
        }
        Ok(Self { listener, config })
    }

    /// Create a server from a pre-bound listener. Lets callers bind to port
    /// 0 and learn the OS-assigned port via [`Server::local_addr`].
    pub fn from_listener(listener: TcpListener, config: RelayConfig) -> Self {
        Self { listener, config }
    }

    /// The address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, one session task per connection.
    /// Accept errors are logged and do not stop the loop.
    pub async fn run(self) -> Result<()> {
        loop {
            let stream: TcpStream = match self.listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!(error = %e, "accept error");
                    continue;
                }
            };
            tokio::spawn(session::handle(stream, self.config.idle_timeout));
        }
    }
}
