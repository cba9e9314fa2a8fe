//! Outbound connections to the remote address.
//!
//! The remote `host:port` is resolved on every dial, then each resolved
//! address is tried in order until one connects.  Successful connections
//! get TCP keep-alive and `TCP_NODELAY`: the relay forwards whatever a read
//! returns straight away, so Nagle batching would only add latency.

use std::io;
use std::net::SocketAddr;

use tokio::net::{lookup_host, TcpSocket, TcpStream};
use tracing::debug;

use crate::infrastructure::error::RelayError;

/// Resolves `addr` and connects to the first address that accepts.
///
/// # Errors
///
/// - [`RelayError::Resolve`] if name resolution fails.
/// - [`RelayError::NoAddresses`] if it returns nothing.
/// - [`RelayError::Dial`] with the last connect error if every address fails.
pub async fn dial(addr: &str) -> Result<TcpStream, RelayError> {
    let candidates: Vec<SocketAddr> = lookup_host(addr)
        .await
        .map_err(|source| RelayError::Resolve {
            addr: addr.to_string(),
            source,
        })?
        .collect();

    let mut last_err = None;
    for candidate in candidates {
        match connect_with_options(candidate).await {
            Ok(stream) => {
                debug!("connected to {addr} ({candidate})");
                return Ok(stream);
            }
            Err(e) => {
                debug!("connect to {candidate} failed: {e}");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(source) => Err(RelayError::Dial {
            addr: addr.to_string(),
            source,
        }),
        None => Err(RelayError::NoAddresses {
            addr: addr.to_string(),
        }),
    }
}

async fn connect_with_options(addr: SocketAddr) -> io::Result<TcpStream> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_keepalive(true)?;

    let stream = socket.connect(addr).await?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_dial_connects_to_listening_socket() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        // Act
        let stream = dial(&addr).await.unwrap();

        // Assert
        assert!(stream.nodelay().unwrap());
        let (_accepted, peer) = listener.accept().await.unwrap();
        assert_eq!(peer, stream.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_dial_refused_port_returns_dial_error() {
        // Arrange: bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        // Act
        let result = dial(&addr).await;

        // Assert
        assert!(matches!(result, Err(RelayError::Dial { .. })));
    }

    #[tokio::test]
    async fn test_dial_malformed_address_returns_resolve_error() {
        let result = dial("no-port-here").await;
        assert!(matches!(result, Err(RelayError::Resolve { .. })));
    }
}
