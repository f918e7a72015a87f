//! Request/response messages for the host's tmux RPC surface.
//!
//! These model the structured messages a transport carries. Their byte
//! encoding belongs to the transport; the serde derives only name the fields.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{ConnectionId, Error, Result, SessionId, TabId, WindowId};

/// Outcome code carried on every tmux response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TmuxStatus {
    /// The request succeeded.
    Ok,
    /// The request was malformed or not understood.
    InvalidRequest,
    /// No tmux connection has the given ID.
    InvalidConnectionId,
    /// No tmux window has the given ID.
    InvalidWindowId,
}

impl TmuxStatus {
    /// Every non-OK status, in code order.
    pub const FAILURES: [TmuxStatus; 3] = [
        TmuxStatus::InvalidRequest,
        TmuxStatus::InvalidConnectionId,
        TmuxStatus::InvalidWindowId,
    ];

    /// Symbolic name, as the host spells it.
    pub fn name(&self) -> &'static str {
        match self {
            TmuxStatus::Ok => "OK",
            TmuxStatus::InvalidRequest => "INVALID_REQUEST",
            TmuxStatus::InvalidConnectionId => "INVALID_CONNECTION_ID",
            TmuxStatus::InvalidWindowId => "INVALID_WINDOW_ID",
        }
    }

    /// Numeric wire code.
    pub fn code(&self) -> i32 {
        match self {
            TmuxStatus::Ok => 0,
            TmuxStatus::InvalidRequest => 1,
            TmuxStatus::InvalidConnectionId => 2,
            TmuxStatus::InvalidWindowId => 3,
        }
    }

    /// Map a numeric wire code back to a status.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(TmuxStatus::Ok),
            1 => Some(TmuxStatus::InvalidRequest),
            2 => Some(TmuxStatus::InvalidConnectionId),
            3 => Some(TmuxStatus::InvalidWindowId),
            _ => None,
        }
    }

    /// Whether this is the success code.
    pub fn is_ok(&self) -> bool {
        matches!(self, TmuxStatus::Ok)
    }
}

impl std::fmt::Display for TmuxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A tmux request sent to the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TmuxRequest {
    /// Enumerate live tmux integration connections.
    ListConnections,

    /// Run a tmux command on a connection.
    SendCommand {
        /// Target connection
        connection_id: ConnectionId,
        /// Command text, e.g. `list-sessions`
        command: String,
    },

    /// Show or hide a tmux window.
    SetWindowVisible {
        /// Target connection
        connection_id: ConnectionId,
        /// tmux window to show or hide
        window_id: WindowId,
        /// `true` to show, `false` to hide
        visible: bool,
    },

    /// Open a new tmux window.
    CreateWindow {
        /// Target connection
        connection_id: ConnectionId,
        /// When set, the new tab joins the native window holding this tmux window
        #[serde(default, skip_serializing_if = "Option::is_none")]
        affinity: Option<WindowId>,
    },
}

impl TmuxRequest {
    /// Short name of the request kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TmuxRequest::ListConnections => "list_connections",
            TmuxRequest::SendCommand { .. } => "send_command",
            TmuxRequest::SetWindowVisible { .. } => "set_window_visible",
            TmuxRequest::CreateWindow { .. } => "create_window",
        }
    }
}

/// One live connection as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionEntry {
    /// Connection identifier
    pub connection_id: ConnectionId,
    /// Session running `tmux -CC`
    pub owning_session_id: SessionId,
}

impl ConnectionEntry {
    /// Create a new entry.
    pub fn new(connection_id: impl Into<ConnectionId>, owning_session_id: impl Into<SessionId>) -> Self {
        Self {
            connection_id: connection_id.into(),
            owning_session_id: owning_session_id.into(),
        }
    }
}

/// Request-specific part of a successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TmuxResponsePayload {
    /// Reply to [`TmuxRequest::ListConnections`].
    ListConnections {
        /// Connections in the order the host reported them
        #[serde(default)]
        connections: Vec<ConnectionEntry>,
    },

    /// Reply to [`TmuxRequest::SendCommand`].
    SendCommand {
        /// Command output; absent when tmux reported an error
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },

    /// Reply to [`TmuxRequest::SetWindowVisible`].
    SetWindowVisible,

    /// Reply to [`TmuxRequest::CreateWindow`].
    CreateWindow {
        /// Tab that now represents the new tmux window
        tab_id: TabId,
    },
}

/// A tmux response from the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TmuxResponse {
    /// Outcome code
    pub status: TmuxStatus,
    /// Request-specific payload; only meaningful when `status` is OK
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<TmuxResponsePayload>,
}

impl TmuxResponse {
    /// A successful response carrying `payload`.
    pub fn ok(payload: TmuxResponsePayload) -> Self {
        Self {
            status: TmuxStatus::Ok,
            payload: Some(payload),
        }
    }

    /// A successful response with no payload at all.
    pub fn ok_empty() -> Self {
        Self {
            status: TmuxStatus::Ok,
            payload: None,
        }
    }

    /// A failed response.
    pub fn failure(status: TmuxStatus) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    /// Translate the status into a result.
    ///
    /// OK yields the payload (which may still be absent); every other status
    /// becomes [`Error::Protocol`]. All status handling funnels through here.
    pub fn into_payload(self) -> Result<Option<TmuxResponsePayload>> {
        if self.status.is_ok() {
            Ok(self.payload)
        } else {
            Err(Error::Protocol(self.status))
        }
    }
}
