//! SOCKS5 handshake: method negotiation and the CONNECT request.
//!
//! Only the no-authentication method and the CONNECT command are supported.
//! The method list a client offers is never inspected; no-auth is selected
//! unconditionally. Failures close the connection without any reply — no
//! SOCKS5 error code is ever transmitted.
//!
//! ```text
//! client                                relay
//!   | VER NMETHODS METHODS...            |
//!   |----------------------------------->|
//!   |                        VER 0x00    |
//!   |<-----------------------------------|
//!   | VER CMD RSV ATYP DST.ADDR DST.PORT |
//!   |----------------------------------->|
//!   |      VER 0x00 0x00 0x01 0.0.0.0:0  |   (only after upstream connect)
//!   |<-----------------------------------|
//! ```

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use tokio::io::{AsyncRead, AsyncWrite};

use crate::stream::TimedStream;
use crate::{RelayError, Result};

const SOCKS_VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const CMD_CONNECT: u8 = 0x01;

const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

/// Fixed CONNECT success reply. The bound address is always reported as
/// `0.0.0.0:0`, never the real local address; clients key off the success
/// code alone.
const SUCCESS_REPLY: [u8; 10] = [SOCKS_VERSION, 0x00, 0x00, ATYP_IPV4, 0, 0, 0, 0, 0, 0];

/// Destination host as encoded in the CONNECT request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAddr {
    Ipv4(Ipv4Addr),
    /// Unresolved domain name; resolution happens at connect time.
    Domain(String),
    Ipv6(Ipv6Addr),
}

/// Destination of a CONNECT request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAddr {
    pub host: HostAddr,
    pub port: u16,
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            HostAddr::Ipv4(ip) => write!(f, "{}:{}", ip, self.port),
            HostAddr::Domain(name) => write!(f, "{}:{}", name, self.port),
            HostAddr::Ipv6(ip) => write!(f, "[{}]:{}", ip, self.port),
        }
    }
}

/// Run the client-facing handshake up to address resolution.
///
/// On success the connection is ready for the success reply and the relay;
/// on any violation the caller closes the connection without replying.
pub(crate) async fn run<S>(client: &mut TimedStream<S>) -> Result<TargetAddr>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    negotiate_method(client).await?;
    read_request(client).await
}

/// Consume the method negotiation message and select no-auth.
async fn negotiate_method<S>(client: &mut TimedStream<S>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let version = client.read_u8().await?;
    let method_count = client.read_u8().await?;
    if version != SOCKS_VERSION {
        return Err(RelayError::Protocol("bad negotiation version"));
    }
    if method_count == 0 {
        return Err(RelayError::Protocol("empty method list"));
    }

    // The offered methods are irrelevant: no-auth is always selected.
    client.discard(method_count as usize).await?;
    client.write_all(&[SOCKS_VERSION, METHOD_NO_AUTH]).await
}

/// Consume the request message and parse the destination.
async fn read_request<S>(client: &mut TimedStream<S>) -> Result<TargetAddr>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut header = [0u8; 4];
    client.read_exact(&mut header).await?;

    if header[0] != SOCKS_VERSION {
        return Err(RelayError::Protocol("bad request version"));
    }
    if header[1] != CMD_CONNECT {
        return Err(RelayError::Protocol("unsupported command"));
    }

    let host = match header[3] {
        ATYP_IPV4 => HostAddr::Ipv4(client.read_ipv4().await?),
        ATYP_DOMAIN => {
            let len = client.read_u8().await?;
            HostAddr::Domain(client.read_domain(len as usize).await?)
        }
        ATYP_IPV6 => HostAddr::Ipv6(client.read_ipv6().await?),
        _ => return Err(RelayError::Protocol("unsupported address type")),
    };
    let port = client.read_u16().await?;

    Ok(TargetAddr { host, port })
}

/// Send the fixed CONNECT success reply.
pub(crate) async fn send_success<S>(client: &mut TimedStream<S>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    client.write_all(&SUCCESS_REPLY).await
}
