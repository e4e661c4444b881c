//! Transport layer
//!
//! Turns a [`ConnectionPlan`](crate::routing::ConnectionPlan) into an open
//! TCP stream (direct, HTTP CONNECT tunnel or SOCKS5 tunnel) and fetches
//! documents over it.

pub mod connector;
pub mod http_client;
pub mod http_connect;
pub mod socks5;

pub use connector::{Connection, connect};
