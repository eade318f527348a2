//! Deadline-bounded socket façade.
//!
//! [`TimedStream`] wraps one exclusively-owned connection and applies the
//! session idle timeout to every read and write. It provides the exact-length
//! typed field readers the SOCKS5 handshake needs, and splits into a
//! reader/writer pair for the relay loops.
//!
//! Timeout expiry surfaces as [`RelayError::IdleTimeout`]; a stream that ends
//! mid-field surfaces as [`RelayError::Protocol`]. Closing is RAII: dropping
//! the stream (or its last half) closes the underlying socket exactly once.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};

use crate::{RelayError, Result};

/// One connection with an idle timeout applied to every operation.
///
/// Generic over the transport so tests can drive it with in-memory pipes;
/// production code instantiates it with [`tokio::net::TcpStream`].
pub struct TimedStream<S> {
    inner: S,
    timeout: Duration,
}

impl<S: AsyncRead + AsyncWrite + Unpin> TimedStream<S> {
    /// Wrap a connection with the given idle timeout.
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The idle timeout this stream was created with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Read exactly `buf.len()` bytes.
    ///
    /// A stream that ends before the buffer is full is a protocol violation:
    /// every message field in the handshake has a known exact length.
    pub async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.inner.read_exact(buf)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(RelayError::Protocol("unexpected end of stream"))
            }
            Ok(Err(e)) => Err(RelayError::Io(e)),
            Err(_) => Err(RelayError::IdleTimeout),
        }
    }

    /// Read a single byte.
    pub async fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf).await?;
        Ok(buf[0])
    }

    /// Read a big-endian unsigned 16-bit integer.
    pub async fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf).await?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Read a 4-byte IPv4 address.
    pub async fn read_ipv4(&mut self) -> Result<Ipv4Addr> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf).await?;
        Ok(Ipv4Addr::from(buf))
    }

    /// Read a 16-byte IPv6 address.
    pub async fn read_ipv6(&mut self) -> Result<Ipv6Addr> {
        let mut buf = [0u8; 16];
        self.read_exact(&mut buf).await?;
        Ok(Ipv6Addr::from(buf))
    }

    /// Read `len` bytes and decode them as a UTF-8 domain name.
    pub async fn read_domain(&mut self, len: usize) -> Result<String> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf).await?;
        String::from_utf8(buf).map_err(|_| RelayError::Protocol("domain name is not valid UTF-8"))
    }

    /// Read and throw away exactly `n` bytes.
    pub async fn discard(&mut self, n: usize) -> Result<()> {
        let mut buf = vec![0u8; n];
        self.read_exact(&mut buf).await
    }

    /// Write the whole buffer.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.inner.write_all(data)).await {
            Ok(result) => result.map_err(RelayError::Io),
            Err(_) => Err(RelayError::IdleTimeout),
        }
    }

    /// Split into independently-owned read and write halves, each keeping
    /// the idle timeout.
    pub fn into_split(self) -> (TimedReader<S>, TimedWriter<S>) {
        let (read_half, write_half) = tokio::io::split(self.inner);
        (
            TimedReader {
                inner: read_half,
                timeout: self.timeout,
            },
            TimedWriter {
                inner: write_half,
                timeout: self.timeout,
            },
        )
    }
}

/// Read half of a split [`TimedStream`].
pub struct TimedReader<S> {
    inner: ReadHalf<S>,
    timeout: Duration,
}

impl<S: AsyncRead + AsyncWrite + Unpin> TimedReader<S> {
    /// Read up to `buf.len()` bytes. `Ok(0)` is end-of-stream.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match tokio::time::timeout(self.timeout, self.inner.read(buf)).await {
            Ok(result) => result.map_err(RelayError::Io),
            Err(_) => Err(RelayError::IdleTimeout),
        }
    }
}

/// Write half of a split [`TimedStream`].
pub struct TimedWriter<S> {
    inner: WriteHalf<S>,
    timeout: Duration,
}

impl<S: AsyncRead + AsyncWrite + Unpin> TimedWriter<S> {
    /// Write the whole buffer.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.inner.write_all(data)).await {
            Ok(result) => result.map_err(RelayError::Io),
            Err(_) => Err(RelayError::IdleTimeout),
        }
    }
}
