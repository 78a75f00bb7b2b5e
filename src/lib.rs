//! httpterm library interface
//!
//! An interactive HTTP/1.1 client over raw TCP sockets.
//!
//! # Module Organization
//!
//! - [`net`] - Non-blocking sockets and the connection manager
//! - [`message`] - Request/response model, serialization and parsing
//! - [`client`] - Request orchestration
//! - [`menu`] - Interactive menu state machine
//! - [`signals`] - Interrupt handling (was_interrupted, set_interrupted)
//! - [`errors`] - Error types (TransportError, ConnectionError, ParseError, ...)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Main execution logic

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod display;
pub mod encoding;
pub mod errors;
pub mod http;
pub mod logging;
pub mod menu;
pub mod message;
pub mod net;
pub mod signals;
pub mod status;
