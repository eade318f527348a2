//! Per-connection session orchestration.
//!
//! One session per accepted connection: handshake, dial the destination,
//! send the success reply, relay. Every failure is classified and logged
//! here and never escalates past the session task. Both sockets are owned
//! by the session future, so any exit path drops (and closes) them.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::handshake::{self, HostAddr, TargetAddr};
use crate::relay;
use crate::stream::TimedStream;
use crate::{RelayError, Result};

/// Fixed timeout for dialing the destination. Independent of the
/// configurable idle timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Run one client session to completion, absorbing every failure.
pub(crate) async fn handle(client: TcpStream, idle_timeout: Duration) {
    let peer = client
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    info!(client = %peer, "new client");

    match drive(TimedStream::new(client, idle_timeout), idle_timeout).await {
        Ok(()) => debug!(client = %peer, "session finished"),
        Err(RelayError::Protocol(reason)) => {
            info!(client = %peer, reason, "session aborted: protocol violation");
        }
        Err(RelayError::Connect { dest, source }) => {
            warn!(client = %peer, dest = %dest, error = %source, "connect to destination failed");
        }
        Err(RelayError::IdleTimeout) => {
            info!(client = %peer, "session aborted: idle timeout");
        }
        Err(e) => {
            warn!(client = %peer, error = %e, "session aborted");
        }
    }
}

/// The happy path; any error aborts the session with no reply beyond what
/// was already written.
async fn drive(mut client: TimedStream<TcpStream>, idle_timeout: Duration) -> Result<()> {
    let target = handshake::run(&mut client).await?;
    let upstream = connect_upstream(&target).await?;
    info!(dest = %target, "connected to destination");

    handshake::send_success(&mut client).await?;
    relay::run(client, TimedStream::new(upstream, idle_timeout)).await
}

/// Dial the destination, single attempt, bounded by [`CONNECT_TIMEOUT`].
/// Domain names are resolved by the connect call itself.
async fn connect_upstream(target: &TargetAddr) -> Result<TcpStream> {
    let attempt = async {
        match &target.host {
            HostAddr::Ipv4(ip) => {
                TcpStream::connect(SocketAddr::new((*ip).into(), target.port)).await
            }
            HostAddr::Ipv6(ip) => {
                TcpStream::connect(SocketAddr::new((*ip).into(), target.port)).await
            }
            HostAddr::Domain(name) => TcpStream::connect((name.as_str(), target.port)).await,
        }
    };

    match tokio::time::timeout(CONNECT_TIMEOUT, attempt).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(RelayError::Connect {
            dest: target.clone(),
            source: e,
        }),
        Err(_) => Err(RelayError::Connect {
            dest: target.clone(),
            source: io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
        }),
    }
}
