//! Line-delimited transport for MCP messages.
//!
//! This module implements the stdio framing used by MCP, over any byte
//! stream:
//!
//! - Messages are UTF-8 encoded JSON-RPC
//! - Messages are delimited by newlines
//! - Messages must not contain embedded newlines
//! - Blank lines between messages are ignored
//!
//! When serving stdio, stdout carries nothing but protocol frames; logging
//! goes to stderr.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::mcp::dispatcher::Reply;
use crate::mcp::protocol::{parse_message, IncomingMessage, JsonRpcError, JsonRpcResponse};

/// One unit read from the stream.
#[derive(Debug)]
pub enum Frame {
    /// A well-formed request or notification.
    Message(IncomingMessage),
    /// A line that could not be parsed; the error is ready to send back.
    Invalid(JsonRpcError),
    /// The peer closed the stream.
    Closed,
}

/// A newline-framed JSON-RPC transport over a reader/writer pair.
pub struct Transport<R, W> {
    reader: R,
    writer: W,
}

/// The transport used when serving over the process's stdin and stdout.
pub type StdioTransport = Transport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Creates a transport over stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    #[must_use]
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next line, without its terminator.
    ///
    /// Returns `None` at end of stream. Invalid UTF-8 is replaced rather
    /// than treated as an I/O failure, so it surfaces as a parse error.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the stream fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        let bytes_read = self.reader.read_until(b'\n', &mut buf).await?;

        if bytes_read == 0 {
            return Ok(None);
        }

        if buf.ends_with(b"\n") {
            buf.pop();
            if buf.ends_with(b"\r") {
                buf.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Reads until a non-blank line or end of stream and parses it.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the stream fails.
    pub async fn receive(&mut self) -> io::Result<Frame> {
        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(Frame::Closed);
            };

            if line.trim().is_empty() {
                continue;
            }

            return Ok(match parse_message(&line) {
                Ok(message) => Frame::Message(message),
                Err((id, failure)) => {
                    tracing::debug!(error = %failure, "Rejected unparseable frame");
                    Frame::Invalid(failure.into_response(id))
                }
            });
        }
    }

    /// Writes either side of a reply.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn send(&mut self, reply: &Reply) -> io::Result<()> {
        match reply {
            Ok(response) => self.write_response(response).await,
            Err(error) => self.write_error(error).await,
        }
    }

    /// Writes a JSON-RPC response.
    ///
    /// The response is serialised to JSON and terminated with a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_raw(&json).await
    }

    /// Writes a JSON-RPC error.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_error(&mut self, error: &JsonRpcError) -> io::Result<()> {
        let json = serde_json::to_string(error)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_raw(&json).await
    }

    async fn write_raw(&mut self, json: &str) -> io::Result<()> {
        // Compact serde_json output never contains raw newlines
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }
}
