//! A live tmux integration connection and its command dispatch.
//!
//! None of these operations may be issued from inside a host transaction on
//! the same connection: the host serializes transactions and the round trip
//! would wait behind the transaction that issued it.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use tmux_gateway_core::{
    ConnectionId, Error, Result, SessionId, TmuxRequest, TmuxResponsePayload, WindowId,
};

use crate::delegate::{Delegate, Session, Window};
use crate::transport::Transport;

/// One tmux integration connection, i.e. one `tmux -CC` gateway.
///
/// Obtained from [`ConnectionRegistry::list_connections`](crate::ConnectionRegistry::list_connections)
/// or [`find_connection`](crate::find_connection); never constructed directly.
#[derive(Clone)]
pub struct TmuxConnection {
    connection_id: ConnectionId,
    owning_session_id: SessionId,
    delegate: Arc<dyn Delegate>,
}

impl TmuxConnection {
    pub(crate) fn new(
        connection_id: ConnectionId,
        owning_session_id: SessionId,
        delegate: Arc<dyn Delegate>,
    ) -> Self {
        Self {
            connection_id,
            owning_session_id,
            delegate,
        }
    }

    /// Unique connection ID, which doubles as a human-readable description.
    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// ID of the gateway session where `tmux -CC` was run.
    pub fn owning_session_id(&self) -> &SessionId {
        &self.owning_session_id
    }

    /// The shared delegate this connection borrows.
    pub fn delegate(&self) -> &Arc<dyn Delegate> {
        &self.delegate
    }

    /// The gateway session, or `None` if the host no longer has it.
    pub fn owning_session(&self) -> Option<Arc<dyn Session>> {
        self.delegate.session_by_id(&self.owning_session_id)
    }

    async fn round_trip(&self, request: TmuxRequest) -> Result<Option<TmuxResponsePayload>> {
        let kind = request.kind();
        debug!("Sending tmux {} request", kind);

        let response = self.delegate.transport().send(request).await?;
        response.into_payload().map_err(|e| {
            warn!("tmux {} request on {} failed: {}", kind, self.connection_id, e);
            e
        })
    }

    /// Send a command (e.g. `list-sessions`) to the tmux server and return
    /// its output.
    ///
    /// # Errors
    ///
    /// [`Error::Protocol`] for a non-OK status, such as an unknown connection;
    /// [`Error::MalformedSuccess`] if tmux reported an error for the command
    /// itself, which arrives as OK without output.
    #[instrument(skip_all, fields(connection_id = %self.connection_id))]
    pub async fn send_command(&self, command: &str) -> Result<String> {
        let request = TmuxRequest::SendCommand {
            connection_id: self.connection_id.clone(),
            command: command.to_string(),
        };

        match self.round_trip(request).await? {
            Some(TmuxResponsePayload::SendCommand {
                output: Some(output),
            }) => Ok(output),
            _ => Err(Error::MalformedSuccess {
                expected: "command output",
            }),
        }
    }

    /// Show or hide a tmux window. Tmux windows appear as tabs in the host.
    #[instrument(skip_all, fields(connection_id = %self.connection_id))]
    pub async fn set_window_visible(
        &self,
        window_id: impl Into<WindowId>,
        visible: bool,
    ) -> Result<()> {
        let request = TmuxRequest::SetWindowVisible {
            connection_id: self.connection_id.clone(),
            window_id: window_id.into(),
            visible,
        };

        self.round_trip(request).await?;
        Ok(())
    }

    /// Create a new tmux window and return the host window that holds it.
    ///
    /// `Ok(None)` means the window was created but the host has not caught up
    /// with it yet; that is not a failure.
    pub async fn create_window(&self) -> Result<Option<Arc<dyn Window>>> {
        self.create_window_with_affinity(None).await
    }

    /// Like [`create_window`](Self::create_window), but places the new tab
    /// next to the tmux window `affinity` when given.
    #[instrument(skip_all, fields(connection_id = %self.connection_id))]
    pub async fn create_window_with_affinity(
        &self,
        affinity: Option<&WindowId>,
    ) -> Result<Option<Arc<dyn Window>>> {
        let request = TmuxRequest::CreateWindow {
            connection_id: self.connection_id.clone(),
            affinity: affinity.cloned(),
        };

        let tab_id = match self.round_trip(request).await? {
            Some(TmuxResponsePayload::CreateWindow { tab_id }) => tab_id,
            None => {
                debug!("tmux window created but no tab id reported");
                return Ok(None);
            }
            Some(_) => return Err(Error::MalformedSuccess { expected: "tab id" }),
        };

        debug!("tmux window created in tab {}", tab_id);
        let window = self.delegate.window_for_tab_id(&tab_id).await;
        if window.is_none() {
            debug!("Tab {} not yet visible to the host", tab_id);
        }
        Ok(window)
    }
}

impl fmt::Debug for TmuxConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmuxConnection")
            .field("connection_id", &self.connection_id)
            .field("owning_session_id", &self.owning_session_id)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TmuxConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.connection_id)
    }
}
