//! HTTP protocol tables
//!
//! Method tokens and status-code reason phrases.

mod method;
mod status;

pub use method::*;
pub use status::*;
