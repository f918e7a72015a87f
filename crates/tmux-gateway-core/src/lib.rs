//! # tmux-gateway-core
//!
//! Core types for tmux-gateway.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other tmux-gateway crates. It provides:
//!
//! - Identifier types (ConnectionId, SessionId, TabId, WindowId)
//! - Protocol messages (TmuxRequest, TmuxResponse) and the TmuxStatus code set
//! - Error types
//! - Configuration loaded from YAML
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - the connection manager in
//! `tmux-gateway` depends on this crate, never the other way around.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod ids;
pub mod protocol;

// Re-export commonly used types
pub use config::{DelegateSettings, GatewayConfig, RpcSettings};
pub use error::{Error, Result};
pub use ids::{ConnectionId, SessionId, TabId, WindowId};
pub use protocol::{ConnectionEntry, TmuxRequest, TmuxResponse, TmuxResponsePayload, TmuxStatus};
