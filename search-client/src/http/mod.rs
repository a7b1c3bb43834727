//! HTTP implementation of the transport.
//!
//! This module provides a concrete implementation of `ApiTransport` using
//! `reqwest`.

mod transport;

pub use transport::{HttpTransport, API_KEY_HEADER};
