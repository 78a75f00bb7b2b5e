//! TCP transport
//!
//! - [`socket`] - owned descriptor with timeout-bounded connect
//! - [`connection`] - reconnectable connection with HTTP message framing

pub mod connection;
pub mod socket;

pub use connection::{ConnectionManager, ConnectionSettings};
pub use socket::{Interest, Socket};
