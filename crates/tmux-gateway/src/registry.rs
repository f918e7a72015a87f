//! Discovery of live tmux integration connections.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use tmux_gateway_core::{DelegateSettings, Error, Result, TmuxRequest, TmuxResponsePayload};

use crate::connection::TmuxConnection;
use crate::delegate::{global_slot, DelegateSlot};
use crate::transport::Transport;

/// Builds [`TmuxConnection`]s from what the host reports, resolving the
/// shared delegate on first use.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionRegistry<'a> {
    slot: &'a DelegateSlot,
    resolve_timeout: Option<Duration>,
}

impl ConnectionRegistry<'static> {
    /// Registry backed by the process-wide delegate slot.
    pub fn global() -> Self {
        Self::new(global_slot())
    }
}

impl<'a> ConnectionRegistry<'a> {
    /// Registry backed by `slot`.
    pub fn new(slot: &'a DelegateSlot) -> Self {
        Self {
            slot,
            resolve_timeout: None,
        }
    }

    /// Registry backed by `slot` with configured resolution deadline.
    pub fn with_settings(slot: &'a DelegateSlot, settings: &DelegateSettings) -> Self {
        Self {
            slot,
            resolve_timeout: settings.resolve_timeout(),
        }
    }

    /// Fetch the current tmux connections, in the order the host reports them.
    ///
    /// # Errors
    ///
    /// [`Error::NoDelegateFactory`] when the delegate is unresolved and no
    /// factory was registered; [`Error::Protocol`] for a non-OK status.
    #[instrument(skip_all)]
    pub async fn list_connections(
        &self,
        transport: &Arc<dyn Transport>,
    ) -> Result<Vec<TmuxConnection>> {
        let delegate = self
            .slot
            .ensure_delegate_with_timeout(transport, self.resolve_timeout)
            .await?;

        debug!("Listing tmux connections");
        let response = transport.send(TmuxRequest::ListConnections).await?;
        let entries = match response.into_payload() {
            Ok(Some(TmuxResponsePayload::ListConnections { connections })) => connections,
            Ok(None) => Vec::new(),
            Ok(Some(_)) => {
                return Err(Error::MalformedSuccess {
                    expected: "connection list",
                })
            }
            Err(e) => {
                warn!("Listing tmux connections failed: {}", e);
                return Err(e);
            }
        };

        info!("Found {} tmux connection(s)", entries.len());
        Ok(entries
            .into_iter()
            .map(|entry| {
                TmuxConnection::new(
                    entry.connection_id,
                    entry.owning_session_id,
                    Arc::clone(&delegate),
                )
            })
            .collect())
    }

    /// Find a connection by ID. `Ok(None)` when no live connection matches.
    pub async fn find_connection(
        &self,
        transport: &Arc<dyn Transport>,
        connection_id: &str,
    ) -> Result<Option<TmuxConnection>> {
        let connections = self.list_connections(transport).await?;
        Ok(connections
            .into_iter()
            .find(|candidate| candidate.connection_id() == connection_id))
    }
}

/// Fetch the current tmux connections using the process-wide delegate.
pub async fn list_connections(transport: &Arc<dyn Transport>) -> Result<Vec<TmuxConnection>> {
    ConnectionRegistry::global().list_connections(transport).await
}

/// Find a tmux connection by ID using the process-wide delegate.
pub async fn find_connection(
    transport: &Arc<dyn Transport>,
    connection_id: &str,
) -> Result<Option<TmuxConnection>> {
    ConnectionRegistry::global()
        .find_connection(transport, connection_id)
        .await
}
