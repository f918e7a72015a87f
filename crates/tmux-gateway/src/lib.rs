//! # tmux-gateway
//!
//! tmux integration for a terminal application's automation API.
//!
//! This crate provides:
//! - Discovery of live tmux integration connections (`tmux -CC` gateways)
//! - Per-connection command dispatch: send commands, show/hide and create windows
//! - The delegate capability that supplies session/window lookups, resolved
//!   lazily through a factory registered at startup
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on tmux-gateway-core for
//! identifiers, protocol messages and errors. The host application layer sits
//! above it and supplies the [`Delegate`].
//!
//! ## Usage
//!
//! ```ignore
//! // At startup, before any tmux call
//! tmux_gateway::register_delegate_factory(|transport| async move {
//!     let app = App::connect(transport).await?;
//!     Ok(Arc::new(app) as Arc<dyn Delegate>)
//! })?;
//!
//! // Later
//! if let Some(tmux) = tmux_gateway::find_connection(&transport, "user@host").await? {
//!     let sessions = tmux.send_command("list-sessions").await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod delegate;
pub mod registry;
pub mod testing;
pub mod transport;

// Re-export commonly used types
pub use connection::TmuxConnection;
#[cfg(any(test, feature = "testing"))]
pub use delegate::reset_global_delegate;
pub use delegate::{
    ensure_delegate, global_slot, register_delegate_factory, Delegate, DelegateFactory,
    DelegateFuture, DelegateSlot, Session, Window,
};
pub use registry::{find_connection, list_connections, ConnectionRegistry};
pub use transport::{TimeoutTransport, Transport};

pub use tmux_gateway_core::{
    ConnectionEntry, ConnectionId, Error, GatewayConfig, Result, SessionId, TabId, TmuxRequest,
    TmuxResponse, TmuxResponsePayload, TmuxStatus, WindowId,
};
