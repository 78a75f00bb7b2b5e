//! Error types for httpterm
//!
//! Each layer has its own enum so callers can match on exactly the failures
//! that layer can produce:
//! - [`TransportError`] - raw socket operations (always fatal to the call)
//! - [`ConnectionError`] - connection manager (addressing, framing)
//! - [`ParseError`] - response parsing
//! - [`ClientError`] - request orchestration
//! - [`HttptermError`] - process setup (config, I/O)

use std::io;
use thiserror::Error;

/// Failures of a single OS socket operation.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to create socket: {0}")]
    SocketCreate(#[source] io::Error),

    #[error("Invalid socket descriptor: {0}")]
    InvalidDescriptor(i32),

    #[error("Failed to change socket flags: {0}")]
    SocketControl(#[source] io::Error),

    #[error("Connection timed out after {0} ms")]
    ConnectTimeout(u64),

    #[error("Poll error during connect: {0}")]
    Poll(#[source] io::Error),

    #[error("connect() failed: {0}")]
    ConnectFailed(#[source] io::Error),

    #[error("Failed to send data: {0}")]
    Send(#[source] io::Error),

    #[error("Failed to receive data: {0}")]
    Recv(#[source] io::Error),
}

/// Failures reported by the connection manager.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Not connected")]
    NotConnected,

    #[error("Host and port must not be empty")]
    EmptyAddress,

    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Connection closed by peer")]
    PeerClosed,

    #[error("Socket stopped being readable before the message was framed")]
    FramingIncomplete,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Reasons a raw response cannot be turned into a [`crate::message::Response`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed response: missing start line end")]
    MissingStartLineTerminator,

    #[error("Malformed start line: {0}")]
    MalformedStartLine(String),

    #[error("Invalid status code: {0}")]
    InvalidStatusCode(String),

    #[error("Malformed response: missing headers end")]
    MissingHeaderDelimiter,

    #[error("Invalid Content-Length header: {0}")]
    InvalidContentLength(String),

    #[error("Incomplete response body: expected {expected} bytes, got {available}")]
    TruncatedBody { expected: usize, available: usize },
}

/// Failures while processing one request end to end.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: String,
        #[source]
        source: ConnectionError,
    },

    #[error("Failed to send request: {0}")]
    Send(#[source] ConnectionError),

    #[error("Failed to receive response: {0}")]
    Receive(#[source] ConnectionError),

    #[error("Failed to parse HTTP response: {0}")]
    Parse(#[from] ParseError),
}

impl ClientError {
    /// Whether the process can no longer make progress.
    ///
    /// Only running out of descriptors (socket creation failing) qualifies;
    /// everything else is reported and the user may try again.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::Connect {
                source: ConnectionError::Transport(TransportError::SocketCreate(_)),
                ..
            }
        )
    }
}

/// Top-level error for process setup.
#[derive(Error, Debug)]
pub enum HttptermError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub type Result<T> = std::result::Result<T, HttptermError>;
