//! Relay server: accept loop and per-session task management.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured local address.
//! 2. Accepting client connections and giving each a [`SessionId`].
//! 3. Dialling the remote address for each accepted connection.
//! 4. Running one [`pipe`] per session until either side hangs up.
//! 5. Stopping the accept loop when the `running` flag is cleared.
//!
//! # Scalability
//!
//! Each session runs in its own Tokio task, and the accept loop never waits
//! on a session: it assigns the id, spawns, and goes back to `accept()`.
//! There is no cap on concurrent sessions.
//!
//! # Failure isolation
//!
//! Only binding the listener can fail the server.  A failed dial drops that
//! one client connection without reading from it; a failed accept is logged
//! and the loop continues.

use std::io;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use relay_core::{SessionCounter, SessionId};

use crate::application::pipe::{pipe, PipeContext};
use crate::application::sink::RecordSink;
use crate::domain::config::RelayConfig;
use crate::infrastructure::console_sink::ConsoleSink;
use crate::infrastructure::dialer::dial;
use crate::infrastructure::error::RelayError;

/// How often the accept loop wakes up to check the shutdown flag.
const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(200);

// ── Public API ────────────────────────────────────────────────────────────────

/// Builds the console sink, binds the listener, announces the addresses on
/// stdout and runs the accept loop until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the listen address cannot be resolved or bound.
pub async fn run_server(config: RelayConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let sink: Arc<dyn RecordSink> = Arc::new(ConsoleSink::open(config.log_file.as_deref()));

    let server = RelayServer::bind(config, sink)
        .await
        .context("ERROR: couldn't start listening")?;

    println!(
        "listen on {} ,remote address -> {}",
        server.config.local_addr, server.config.remote_addr
    );

    server.run(running).await;
    Ok(())
}

/// A bound listener plus the state shared by its sessions.
pub struct RelayServer {
    listener: TcpListener,
    config: Arc<RelayConfig>,
    sink: Arc<dyn RecordSink>,
    sessions: SessionCounter,
}

impl RelayServer {
    /// Binds `config.local_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Bind`] if the address cannot be resolved or
    /// bound (already in use, missing permission, unknown host).
    pub async fn bind(config: RelayConfig, sink: Arc<dyn RecordSink>) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(config.local_addr.as_str())
            .await
            .map_err(|source| RelayError::Bind {
                addr: config.local_addr.clone(),
                source,
            })?;

        info!(
            "listening on {} ({}), forwarding to {}",
            config.local_addr,
            listener
                .local_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "unknown".into()),
            config.remote_addr
        );

        Ok(Self {
            listener,
            config: Arc::new(config),
            sink,
            sessions: SessionCounter::new(),
        })
    }

    /// The address actually bound (useful when the port was `0`).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until `running` is set to `false`.
    pub async fn run(self, running: Arc<AtomicBool>) {
        loop {
            if !running.load(Ordering::Relaxed) {
                info!("shutdown flag set; stopping accept loop");
                break;
            }

            // Bounded wait so the flag is re-checked even with no traffic.
            match timeout(SHUTDOWN_POLL_INTERVAL, self.listener.accept()).await {
                Ok(Ok((stream, peer))) => self.dispatch(stream, peer),
                Ok(Err(e)) => {
                    // Transient (e.g. too many open files): keep serving.
                    error!("couldn't accept: {e}");
                }
                Err(_) => {}
            }
        }
    }

    /// Assigns a session id and spawns the session task.
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let id = self.sessions.next();
        match stream.local_addr() {
            Ok(local) => info!("{id}: {local} <-> {peer}"),
            Err(_) => info!("{id}: <-> {peer}"),
        }

        let config = Arc::clone(&self.config);
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            handle_session(stream, peer, id, config, sink).await;
        });
    }
}

// ── Per-session handler ───────────────────────────────────────────────────────

/// Dials the remote and pipes the pair.  Never returns an error: every
/// failure is logged here and only ends this session.
async fn handle_session(
    inbound: TcpStream,
    peer: SocketAddr,
    id: SessionId,
    config: Arc<RelayConfig>,
    sink: Arc<dyn RecordSink>,
) {
    let outbound = match dial(&config.remote_addr).await {
        Ok(stream) => stream,
        Err(e) => {
            // `inbound` is dropped unread, closing the client connection.
            warn!(session = %id, "{e}; dropping client {peer}");
            sink.emit_error(&e.to_string());
            return;
        }
    };

    if let Err(e) = inbound.set_nodelay(true) {
        debug!(session = %id, "set_nodelay on client socket failed: {e}");
    }

    debug!(session = %id, "piping {peer} <-> {}", config.remote_addr);

    let ctx = PipeContext {
        session: id,
        format: config.log_format,
        sink,
    };
    let summary = pipe(inbound, outbound, ctx).await;

    if summary.is_clean() {
        info!(session = %id, "session closed: {summary}");
    } else {
        warn!(session = %id, "session closed: {summary}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
