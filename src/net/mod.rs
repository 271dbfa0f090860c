//! Network layer: the HTTP client and its TLS certificate handling.

pub mod client;

#[cfg(feature = "tls")]
pub mod tls;
