// Public API types module
//
// Launch-level options. ProxySettings is re-exported here so launch and
// context configuration can be imported from one place.

pub mod launch_options;

pub use crate::protocol::ProxySettings;
pub use launch_options::LaunchOptions;
