//! Bidirectional byte relay between the client and the destination.
//!
//! Two pump loops run concurrently, one per direction, over disjoint socket
//! halves. A direction ends normally on EOF; the session as a whole ends
//! when both have, or immediately when either direction fails (idle timeout
//! or I/O error) — `try_join!` drops the surviving pump, and dropping the
//! halves closes both sockets. There is no half-duplex continuation after
//! one side errors.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::stream::{TimedReader, TimedStream, TimedWriter};
use crate::Result;

/// Per-read chunk size. Payload is forwarded verbatim, never reframed.
const COPY_CHUNK: usize = 64 * 1024;

/// Relay bytes between the two connections until both directions reach EOF
/// or either fails.
pub(crate) async fn run<A, B>(client: TimedStream<A>, upstream: TimedStream<B>) -> Result<()>
where
    A: AsyncRead + AsyncWrite + Unpin,
    B: AsyncRead + AsyncWrite + Unpin,
{
    let (client_rx, client_tx) = client.into_split();
    let (upstream_rx, upstream_tx) = upstream.into_split();

    tokio::try_join!(
        pump(client_rx, upstream_tx),
        pump(upstream_rx, client_tx),
    )?;
    Ok(())
}

/// Copy one direction until EOF. The destination socket stays open until
/// the whole session ends; EOF on one direction does not half-close the
/// other.
async fn pump<R, W>(mut src: TimedReader<R>, mut dst: TimedWriter<W>) -> Result<()>
where
    R: AsyncRead + AsyncWrite + Unpin,
    W: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; COPY_CHUNK];
    loop {
        let n = src.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        dst.write_all(&buf[..n]).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RelayError;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_relay_is_byte_transparent_both_ways() {
        let (client_near, mut client_far) = tokio::io::duplex(256);
        let (upstream_near, mut upstream_far) = tokio::io::duplex(256);

        let relay = tokio::spawn(run(
            TimedStream::new(client_near, TIMEOUT),
            TimedStream::new(upstream_near, TIMEOUT),
        ));

        client_far.write_all(b"request bytes").await.unwrap();
        let mut buf = [0u8; 13];
        upstream_far.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"request bytes");

        upstream_far.write_all(b"response").await.unwrap();
        let mut buf = [0u8; 8];
        client_far.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"response");

        // Close both ends; the relay finishes cleanly.
        client_far.shutdown().await.unwrap();
        upstream_far.shutdown().await.unwrap();
        relay.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_relay_preserves_order_across_chunks() {
        let (client_near, mut client_far) = tokio::io::duplex(64 * 1024);
        let (upstream_near, mut upstream_far) = tokio::io::duplex(64 * 1024);

        let relay = tokio::spawn(run(
            TimedStream::new(client_near, TIMEOUT),
            TimedStream::new(upstream_near, TIMEOUT),
        ));

        let payload: Vec<u8> = (0..200_000).map(|i| (i % 251) as u8).collect();
        let expected = payload.clone();
        let writer = tokio::spawn(async move {
            client_far.write_all(&payload).await.unwrap();
            client_far.shutdown().await.unwrap();
            client_far
        });

        let mut received = vec![0u8; expected.len()];
        upstream_far.read_exact(&mut received).await.unwrap();
        assert_eq!(received, expected);

        drop(writer.await.unwrap());
        upstream_far.shutdown().await.unwrap();
        relay.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_relay_finishes_when_both_directions_eof() {
        let (client_near, client_far) = tokio::io::duplex(256);
        let (upstream_near, upstream_far) = tokio::io::duplex(256);

        let relay = tokio::spawn(run(
            TimedStream::new(client_near, TIMEOUT),
            TimedStream::new(upstream_near, TIMEOUT),
        ));

        drop(client_far);
        drop(upstream_far);
        relay.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_idle_direction_aborts_whole_relay() {
        let (client_near, mut client_far) = tokio::io::duplex(256);
        let (upstream_near, _upstream_far) = tokio::io::duplex(256);

        let result = run(
            TimedStream::new(client_near, Duration::from_millis(50)),
            TimedStream::new(upstream_near, Duration::from_millis(50)),
        )
        .await;
        assert!(matches!(result, Err(RelayError::IdleTimeout)));

        // Both halves are gone; the client end observes EOF.
        let mut buf = [0u8; 1];
        let n = client_far.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }
}
