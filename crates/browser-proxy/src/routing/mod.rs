// Routing - Proxy configuration, bypass matching and per-connection plans
//
// Everything in this module is pure and synchronous; the transport in
// `server` consumes the plans and drives the authenticator.

pub mod auth;
pub mod bypass;
pub mod config;
pub mod router;

pub use auth::{AuthAction, AuthState, PROXY_AUTHENTICATION_REQUIRED, ProxyAuthenticator};
pub use bypass::{BypassMatcher, BypassRule};
pub use config::{Credentials, ProxyConfig, ProxyScheme, ProxyServer};
pub use router::{ConnectionPlan, ProxyRouter, plan_for, plan_for_host};
