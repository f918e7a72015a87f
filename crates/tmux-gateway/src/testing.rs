//! Testing utilities for tmux-gateway.
//!
//! In-memory stand-ins for the host: a scripted transport that records what
//! it was asked and a delegate backed by fixed session/window tables.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use tmux_gateway_core::{
    ConnectionEntry, Error, Result, SessionId, TabId, TmuxRequest, TmuxResponse, TmuxResponsePayload,
    TmuxStatus,
};

use crate::delegate::{Delegate, Session, Window};
use crate::transport::Transport;

type Responder = Box<dyn Fn(&TmuxRequest) -> Result<TmuxResponse> + Send + Sync>;

/// Transport that answers from a closure or a reply queue and records every
/// request.
pub struct ScriptedTransport {
    responder: Responder,
    requests: Mutex<Vec<TmuxRequest>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    /// Answer each request with `responder`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&TmuxRequest) -> Result<TmuxResponse> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Answer every request with a copy of `response`.
    pub fn replying(response: TmuxResponse) -> Self {
        Self::new(move |_| Ok(response.clone()))
    }

    /// Answer requests with `replies` in order. Once the queue is drained
    /// every further request fails with [`Error::Transport`].
    pub fn queued(replies: impl IntoIterator<Item = TmuxResponse>) -> Self {
        let queue = Mutex::new(replies.into_iter().collect::<VecDeque<_>>());
        Self::new(move |_| {
            queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .ok_or_else(|| Error::Transport("no scripted reply left".to_string()))
        })
    }

    /// Report `entries` for list requests; reject everything else with
    /// `INVALID_REQUEST`.
    pub fn with_connections(entries: Vec<ConnectionEntry>) -> Self {
        Self::new(move |request| match request {
            TmuxRequest::ListConnections => Ok(TmuxResponse::ok(TmuxResponsePayload::ListConnections {
                connections: entries.clone(),
            })),
            _ => Ok(TmuxResponse::failure(TmuxStatus::InvalidRequest)),
        })
    }

    /// Sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<TmuxRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TmuxRequest) -> Result<TmuxResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.responder)(&request)
    }
}

/// A session known to [`StaticDelegate`].
#[derive(Debug, Clone)]
pub struct StaticSession {
    id: SessionId,
}

impl Session for StaticSession {
    fn session_id(&self) -> &SessionId {
        &self.id
    }
}

/// A window known to [`StaticDelegate`].
#[derive(Debug, Clone)]
pub struct StaticWindow {
    id: String,
}

impl Window for StaticWindow {
    fn window_id(&self) -> &str {
        &self.id
    }
}

/// Delegate with fixed session and tab tables.
pub struct StaticDelegate {
    transport: Arc<dyn Transport>,
    sessions: HashMap<SessionId, Arc<StaticSession>>,
    windows: HashMap<TabId, Arc<StaticWindow>>,
}

impl StaticDelegate {
    /// Delegate that knows no sessions or windows.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            sessions: HashMap::new(),
            windows: HashMap::new(),
        }
    }

    /// Add a session.
    pub fn with_session(mut self, session_id: impl Into<SessionId>) -> Self {
        let id = session_id.into();
        self.sessions
            .insert(id.clone(), Arc::new(StaticSession { id }));
        self
    }

    /// Map `tab_id` to a window.
    pub fn with_window(mut self, tab_id: impl Into<TabId>, window_id: impl Into<String>) -> Self {
        self.windows.insert(
            tab_id.into(),
            Arc::new(StaticWindow {
                id: window_id.into(),
            }),
        );
        self
    }
}

#[async_trait]
impl Delegate for StaticDelegate {
    async fn window_for_tab_id(&self, tab_id: &TabId) -> Option<Arc<dyn Window>> {
        self.windows
            .get(tab_id)
            .map(|window| Arc::clone(window) as Arc<dyn Window>)
    }

    fn session_by_id(&self, session_id: &SessionId) -> Option<Arc<dyn Session>> {
        self.sessions
            .get(session_id)
            .map(|session| Arc::clone(session) as Arc<dyn Session>)
    }

    fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }
}
