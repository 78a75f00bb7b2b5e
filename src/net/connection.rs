//! Connection manager
//!
//! Owns at most one [`Socket`] and frames HTTP messages on top of it: headers
//! are read up to the blank line, then the body up to `Content-Length`.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::socket::{Interest, Socket};
use crate::errors::ConnectionError;

/// Separator between the header block and the body.
pub const HEADER_DELIMITER: &[u8] = b"\r\n\r\n";

/// Size of the scratch buffer used for each read.
const BUFFER_SIZE: usize = 128 * 1024;

/// Timing knobs for a [`ConnectionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Upper bound for the TCP handshake.
    pub connect_timeout: Duration,
    /// Wait used by [`ConnectionManager::is_readable`] / [`ConnectionManager::is_writable`].
    pub poll_timeout: Duration,
    /// Wait for more bytes on each iteration of [`ConnectionManager::receive`].
    pub read_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(5000),
            poll_timeout: Duration::from_millis(50),
            read_timeout: Duration::from_millis(2000),
        }
    }
}

/// Manages the lifetime of the connection to the selected server.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    socket: Option<Socket>,
    connected: bool,
    settings: ConnectionSettings,
}

impl ConnectionManager {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            socket: None,
            connected: false,
            settings,
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Check whether the connection is still usable.
    ///
    /// The tracked flag is only trusted after a non-destructive peek shows
    /// the peer has not closed the connection.
    pub fn is_connected(&mut self) -> bool {
        let Some(socket) = self.socket.as_ref() else {
            return false;
        };

        match socket.peek() {
            Ok(Some(0)) => {
                debug!("Peer closed the connection");
                self.connected = false;
            }
            Err(e) => {
                debug!(error = %e, "Connection is broken");
                self.connected = false;
            }
            Ok(_) => {}
        }

        self.connected
    }

    /// Open a fresh connection to `host:port`, dropping any previous one.
    pub fn connect(&mut self, host: &str, port: &str) -> Result<(), ConnectionError> {
        if host.is_empty() || port.is_empty() {
            return Err(ConnectionError::EmptyAddress);
        }

        if self.socket.is_some() {
            self.disconnect();
        }

        let ip: IpAddr = host.parse().map_err(|_| {
            error!("Invalid IP address: {}", host);
            ConnectionError::InvalidAddress(host.to_string())
        })?;
        let port_num: u16 = port.parse().map_err(|_| {
            error!("Invalid port: {}", port);
            ConnectionError::InvalidPort(port.to_string())
        })?;
        let addr = SocketAddr::new(ip, port_num);

        info!("Attempting to connect to {}...", addr);
        let socket = Socket::stream_for(&addr)?;
        if let Err(e) = socket.connect(addr, self.settings.connect_timeout) {
            error!("Connection failed: {}", e);
            return Err(e.into());
        }

        info!("Connection successful.");
        self.socket = Some(socket);
        self.connected = true;
        Ok(())
    }

    /// Release the socket, if any. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        self.socket = None;
        self.connected = false;
    }

    /// Send `data` in full.
    pub fn send(&self, data: &[u8]) -> Result<usize, ConnectionError> {
        let socket = self.socket.as_ref().ok_or(ConnectionError::NotConnected)?;
        Ok(socket.send(data)?)
    }

    /// Read one framed HTTP message.
    ///
    /// Fails if the header block cannot be completed. The body is read on a
    /// best-effort basis: if the socket goes quiet before `Content-Length`
    /// bytes have arrived, whatever was received is returned and the parser
    /// decides whether that is acceptable.
    pub fn receive(&self) -> Result<Vec<u8>, ConnectionError> {
        let socket = self.socket.as_ref().ok_or(ConnectionError::NotConnected)?;
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut head = Vec::new();

        let header_end = loop {
            if let Some(pos) = find_subsequence(&head, HEADER_DELIMITER) {
                break pos;
            }
            if !self.wait_readable(socket) {
                error!("Socket stopped being readable before headers were complete.");
                return Err(ConnectionError::FramingIncomplete);
            }
            match socket.recv(&mut buffer)? {
                Some(0) => {
                    error!("Failed to read headers: connection closed.");
                    return Err(ConnectionError::PeerClosed);
                }
                Some(n) => head.extend_from_slice(&buffer[..n]),
                None => {
                    error!("Failed to read headers.");
                    return Err(ConnectionError::FramingIncomplete);
                }
            }
        };

        let mut body = head.split_off(header_end + HEADER_DELIMITER.len());
        head.truncate(header_end);

        if let Some(content_length) = content_length(&head) {
            while body.len() < content_length {
                if !self.wait_readable(socket) {
                    warn!(
                        expected = content_length,
                        received = body.len(),
                        "Body incomplete, returning what was received"
                    );
                    break;
                }
                match socket.recv(&mut buffer) {
                    Ok(Some(n)) if n > 0 => body.extend_from_slice(&buffer[..n]),
                    Ok(Some(_)) => {
                        warn!(
                            expected = content_length,
                            received = body.len(),
                            "Peer closed before the body was complete"
                        );
                        break;
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(
                            error = %e,
                            expected = content_length,
                            received = body.len(),
                            "Body read failed, returning what was received"
                        );
                        break;
                    }
                }
            }
        }

        head.extend_from_slice(HEADER_DELIMITER);
        head.append(&mut body);
        Ok(head)
    }

    pub fn is_writable(&self) -> bool {
        self.poll_held(Interest::Writable, self.settings.poll_timeout)
    }

    pub fn is_readable(&self) -> bool {
        self.poll_held(Interest::Readable, self.settings.poll_timeout)
    }

    fn wait_readable(&self, socket: &Socket) -> bool {
        poll_socket(socket, Interest::Readable, self.settings.read_timeout)
    }

    fn poll_held(&self, interest: Interest, timeout: Duration) -> bool {
        match self.socket.as_ref() {
            Some(socket) => poll_socket(socket, interest, timeout),
            None => false,
        }
    }
}

fn poll_socket(socket: &Socket, interest: Interest, timeout: Duration) -> bool {
    match socket.poll(interest, timeout) {
        Ok(true) => true,
        Ok(false) | Err(_) => {
            let what = match interest {
                Interest::Readable => "reading",
                Interest::Writable => "writing",
            };
            debug!("Socket not ready for {}.", what);
            false
        }
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Value of the `Content-Length` header in a raw header block, if it parses.
fn content_length(head: &[u8]) -> Option<usize> {
    let text = String::from_utf8_lossy(head);
    text.split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
}
