//! Request orchestration
//!
//! [`HttpClient`] drives one request/response exchange over a
//! [`ConnectionManager`]: connect if needed, serialize, send, receive,
//! parse, and drop the connection unless the server asked to keep it.

use tracing::{debug, error, info};

use crate::encoding::form_content_type;
use crate::errors::ClientError;
use crate::http::Method;
use crate::message::{Request, Response};
use crate::net::ConnectionManager;

/// `User-Agent` sent when the configuration does not name one.
pub const DEFAULT_USER_AGENT: &str = "HTTP Client/1.1";

/// Build a request with the headers every menu request carries.
///
/// All requests get `Host`, `User-Agent` and `Accept`. GET asks to keep the
/// connection open; POST carries `body` as a form and asks to close.
pub fn build_request(
    method: Method,
    uri: &str,
    body: &str,
    host: &str,
    port: &str,
    user_agent: &str,
) -> Request {
    let mut request = Request::new(method, uri);
    request
        .set_header("Host", &format!("{}:{}", host, port))
        .set_header("User-Agent", user_agent)
        .set_header("Accept", "*/*");

    match method {
        Method::Get => {
            request.set_header("Connection", "keep-alive");
        }
        Method::Post => {
            request
                .set_body(body)
                .set_header("Content-Type", form_content_type().as_ref())
                .set_header("Content-Length", &body.len().to_string())
                .set_header("Connection", "close");
        }
        _ => {}
    }
    request
}

/// Sends requests over an owned [`ConnectionManager`].
#[derive(Debug)]
pub struct HttpClient {
    connection: ConnectionManager,
    user_agent: String,
}

impl HttpClient {
    pub fn new(connection: ConnectionManager, user_agent: impl Into<String>) -> Self {
        Self {
            connection,
            user_agent: user_agent.into(),
        }
    }

    pub fn connection(&mut self) -> &mut ConnectionManager {
        &mut self.connection
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// [`build_request`] with this client's user agent.
    pub fn build_request(
        &self,
        method: Method,
        uri: &str,
        body: &str,
        host: &str,
        port: &str,
    ) -> Request {
        build_request(method, uri, body, host, port, &self.user_agent)
    }

    /// Perform one exchange with `host:port`.
    ///
    /// A lost connection is re-established once before sending. The
    /// connection is closed afterwards unless the response carries
    /// `Connection: keep-alive`. A failed exchange always closes it, so
    /// late or leftover bytes never answer the next request.
    pub fn process_request(
        &mut self,
        request: &Request,
        host: &str,
        port: &str,
    ) -> Result<Response, ClientError> {
        if !self.connection.is_connected() {
            self.connection.connect(host, port).map_err(|source| {
                error!("Failed to connect to {}:{}", host, port);
                ClientError::Connect {
                    host: host.to_string(),
                    port: port.to_string(),
                    source,
                }
            })?;
        }
        info!("Connected to {}:{}", host, port);

        let response = match self.exchange(request, host, port) {
            Ok(response) => response,
            Err(e) => {
                info!("Exchange failed. Disconnecting.");
                self.connection.disconnect();
                return Err(e);
            }
        };

        if !response.is_keep_alive() {
            info!("Connection not kept alive. Disconnecting.");
            self.connection.disconnect();
        }
        Ok(response)
    }

    /// Send, receive and parse over the open connection.
    fn exchange(&self, request: &Request, host: &str, port: &str) -> Result<Response, ClientError> {
        let data = request.to_bytes();
        debug!(bytes = data.len(), "Serialized request.");
        self.connection.send(&data).map_err(|e| {
            error!("Failed to send request to {}:{}", host, port);
            ClientError::Send(e)
        })?;

        let raw = self.connection.receive().map_err(|e| {
            error!("Failed to receive response from {}:{}", host, port);
            ClientError::Receive(e)
        })?;
        debug!(bytes = raw.len(), "Raw response received. Parsing...");

        Ok(Response::parse(&raw)?)
    }
}
