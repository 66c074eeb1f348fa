//! MCP server lifecycle.
//!
//! One [`McpServer`] drives one session over one transport:
//!
//! 1. **Initialisation**: `initialize` / `initialized` handshake
//! 2. **Operation**: requests are read, dispatched and answered strictly in
//!    order, one at a time
//! 3. **Shutdown**: end of stream, or a signal in stdio mode
//!
//! In TCP mode, [`listen`] accepts connections and runs an independent
//! server per connection; every session shares the same registries.

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::mcp::dispatcher::Dispatcher;
use crate::mcp::session::Session;
use crate::mcp::transport::{Frame, StdioTransport, Transport};

/// A single MCP session bound to a transport.
pub struct McpServer<R, W> {
    transport: Transport<R, W>,
    dispatcher: Dispatcher,
    session: Session,
}

impl McpServer<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Creates a server over stdin and stdout.
    #[must_use]
    pub fn stdio(dispatcher: Dispatcher) -> Self {
        Self::new(StdioTransport::stdio(), dispatcher)
    }

    /// Runs the stdio session until EOF or a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        tracing::info!("Serving MCP over stdio");

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                signal = &mut shutdown => {
                    let signal = signal?;
                    tracing::info!(signal, "Received signal, initiating graceful shutdown");
                    return Ok(());
                }

                frame = self.transport.receive() => {
                    if self.handle_frame(frame?).await? {
                        tracing::info!("stdin closed, shutting down");
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl<R, W> McpServer<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a server with a fresh, unnegotiated session.
    #[must_use]
    pub const fn new(transport: Transport<R, W>, dispatcher: Dispatcher) -> Self {
        Self::with_session(transport, dispatcher, Session::new())
    }

    #[must_use]
    pub const fn with_session(
        transport: Transport<R, W>,
        dispatcher: Dispatcher,
        session: Session,
    ) -> Self {
        Self {
            transport,
            dispatcher,
            session,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Serves this session until the peer closes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve(&mut self) -> io::Result<()> {
        loop {
            let frame = self.transport.receive().await?;
            if self.handle_frame(frame).await? {
                return Ok(());
            }
        }
    }

    /// Handles one frame.
    ///
    /// Returns `true` if the stream has ended.
    async fn handle_frame(&mut self, frame: Frame) -> io::Result<bool> {
        match frame {
            Frame::Closed => Ok(true),
            Frame::Invalid(error) => {
                self.transport.write_error(&error).await?;
                Ok(false)
            }
            Frame::Message(message) => {
                if let Some(reply) = self.dispatcher.handle(message, &mut self.session) {
                    self.transport.send(&reply).await?;
                }
                Ok(false)
            }
        }
    }
}

/// Accepts TCP connections and serves one session per connection.
///
/// Runs until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if binding fails. A failed accept is logged and the
/// listener keeps running.
pub async fn listen(addr: impl ToSocketAddrs, dispatcher: Dispatcher) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Serving MCP over TCP");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                tracing::info!(signal = signal?, "Received signal, initiating graceful shutdown");
                return Ok(());
            }

            accepted = listener.accept() => {
                if let Some((stream, peer)) = admit(accepted) {
                    tokio::spawn(serve_connection(stream, peer, dispatcher.clone()));
                }
            }
        }
    }
}

/// Unwraps an accept result, logging the failure instead of propagating it.
fn admit<T>(accepted: io::Result<T>) -> Option<T> {
    match accepted {
        Ok(connection) => Some(connection),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to accept connection");
            None
        }
    }
}

/// Serves a single accepted connection to completion.
pub async fn serve_connection(stream: TcpStream, peer: SocketAddr, dispatcher: Dispatcher) {
    tracing::info!(%peer, "Session opened");

    let (read_half, write_half): (OwnedReadHalf, OwnedWriteHalf) = stream.into_split();
    let transport = Transport::new(BufReader::new(read_half), write_half);
    let mut server = McpServer::new(transport, dispatcher);

    match server.serve().await {
        Ok(()) => tracing::info!(%peer, "Session closed"),
        Err(e) => tracing::warn!(%peer, error = %e, "Session ended with I/O error"),
    }
}

/// Completes when the process is asked to stop.
#[cfg(unix)]
async fn shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => Ok("SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

/// Completes when the process is asked to stop.
#[cfg(windows)]
async fn shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
