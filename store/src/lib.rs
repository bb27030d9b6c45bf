//! Load, edit and persist the `app-config.json` consumed by the ProxiFyre
//! SOCKS5 router, plus a bounded TCP reachability probe for the configured
//! proxy endpoint. The GUI/CLI front-end is expected to hold one
//! [`ProxySettings`] between load and save; everything here is stateless
//! between calls.

mod config;
pub mod error;
mod probe;

pub use config::{
    CONFIG_FILE, ConfigDocument, DEFAULT_ENDPOINT, LOG_LEVELS, ProtocolChoice, ProxyEntry,
    ProxySettings, effective_endpoint, validate_syntax,
};
pub use error::{Error, Result};
pub use probe::{PROBE_TIMEOUT, parse_endpoint, probe_endpoint};
