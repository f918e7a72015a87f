//! Delegate capability and its process-wide, lazily resolved slot.
//!
//! tmux connections need session/window lookups that normally come from the
//! host application object, but that object is built on top of this crate
//! and may not exist yet when the first connection is requested. The
//! embedder therefore registers a factory at startup, and the first
//! discovery call runs it to produce the [`Delegate`] everyone shares.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use tmux_gateway_core::{Error, Result, SessionId, TabId};

use crate::transport::Transport;

/// A host terminal session.
pub trait Session: Send + Sync + fmt::Debug {
    /// The session's identifier.
    fn session_id(&self) -> &SessionId;
}

/// A host window.
pub trait Window: Send + Sync + fmt::Debug {
    /// The window's identifier.
    fn window_id(&self) -> &str;
}

/// Lookups and transport access the connection manager borrows from the host.
#[async_trait]
pub trait Delegate: Send + Sync {
    /// Find the window containing `tab_id`, refreshing host state first if
    /// needed. `None` when the host has not caught up yet.
    async fn window_for_tab_id(&self, tab_id: &TabId) -> Option<Arc<dyn Window>>;

    /// Find a session by ID.
    fn session_by_id(&self, session_id: &SessionId) -> Option<Arc<dyn Session>>;

    /// The transport used for tmux round trips.
    fn transport(&self) -> Arc<dyn Transport>;
}

/// Future produced by a [`DelegateFactory`].
pub type DelegateFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn Delegate>>> + Send>>;

/// Builds the delegate on first use.
pub type DelegateFactory = Arc<dyn Fn(Arc<dyn Transport>) -> DelegateFuture + Send + Sync>;

/// Holder for one registered factory and the delegate it produced.
///
/// Once a delegate is installed it is returned as-is forever; the factory
/// never runs again. Concurrent first callers are serialized so the factory
/// runs exactly once.
pub struct DelegateSlot {
    factory: RwLock<Option<DelegateFactory>>,
    delegate: RwLock<Option<Arc<dyn Delegate>>>,
    init: Mutex<()>,
}

impl DelegateSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            factory: RwLock::new(None),
            delegate: RwLock::new(None),
            init: Mutex::new(()),
        }
    }

    /// Register the factory. Only one registration is accepted.
    ///
    /// # Errors
    ///
    /// [`Error::DelegateFactoryAlreadyRegistered`] on a second call.
    pub fn register_factory<F, Fut>(&self, factory: F) -> Result<()>
    where
        F: Fn(Arc<dyn Transport>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn Delegate>>> + Send + 'static,
    {
        let mut slot = self.factory.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(Error::DelegateFactoryAlreadyRegistered);
        }
        let boxed: DelegateFactory =
            Arc::new(move |transport: Arc<dyn Transport>| -> DelegateFuture {
                Box::pin(factory(transport))
            });
        *slot = Some(boxed);
        debug!("tmux delegate factory registered");
        Ok(())
    }

    /// Whether a factory has been registered.
    pub fn has_factory(&self) -> bool {
        self.factory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The installed delegate, if resolution already happened.
    pub fn get(&self) -> Option<Arc<dyn Delegate>> {
        self.delegate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a delegate is installed.
    pub fn is_resolved(&self) -> bool {
        self.get().is_some()
    }

    /// Return the delegate, running the factory with `transport` if none is
    /// installed yet.
    ///
    /// # Errors
    ///
    /// - [`Error::NoDelegateFactory`] if resolution is needed and nothing was
    ///   registered. Nothing is sent in that case.
    /// - Whatever the factory returns. The slot stays empty, so a later call
    ///   runs the factory again.
    pub async fn ensure_delegate(
        &self,
        transport: &Arc<dyn Transport>,
    ) -> Result<Arc<dyn Delegate>> {
        if let Some(delegate) = self.get() {
            return Ok(delegate);
        }

        let factory = self
            .factory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                error!("tmux delegate requested but no delegate factory is registered");
                Error::NoDelegateFactory
            })?;

        let _guard = self.init.lock().await;

        // Another caller may have finished while we waited for the lock
        if let Some(delegate) = self.get() {
            return Ok(delegate);
        }

        debug!("Resolving tmux delegate");
        let delegate = factory(Arc::clone(transport)).await.map_err(|e| {
            warn!("tmux delegate factory failed: {}", e);
            e
        })?;

        *self.delegate.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::clone(&delegate));
        info!("tmux delegate installed");

        Ok(delegate)
    }

    /// [`ensure_delegate`](Self::ensure_delegate) bounded by `timeout`.
    ///
    /// An expired resolution fails with [`Error::DelegateResolutionTimeout`]
    /// and leaves the slot empty.
    pub async fn ensure_delegate_with_timeout(
        &self,
        transport: &Arc<dyn Transport>,
        timeout: Option<Duration>,
    ) -> Result<Arc<dyn Delegate>> {
        let Some(timeout) = timeout else {
            return self.ensure_delegate(transport).await;
        };

        match tokio::time::timeout(timeout, self.ensure_delegate(transport)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("tmux delegate resolution timed out after {:?}", timeout);
                let millis = timeout.as_millis() as u64;
                Err(Error::DelegateResolutionTimeout(millis))
            }
        }
    }

    #[cfg(any(test, feature = "testing"))]
    fn reset(&self) {
        *self.factory.write().unwrap_or_else(PoisonError::into_inner) = None;
        *self.delegate.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Default for DelegateSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DelegateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateSlot")
            .field("has_factory", &self.has_factory())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

lazy_static! {
    static ref GLOBAL_SLOT: DelegateSlot = DelegateSlot::new();
}

/// The process-wide slot used by [`list_connections`](crate::list_connections)
/// and [`find_connection`](crate::find_connection).
pub fn global_slot() -> &'static DelegateSlot {
    &GLOBAL_SLOT
}

/// Register the process-wide delegate factory. Call once at embedder startup.
pub fn register_delegate_factory<F, Fut>(factory: F) -> Result<()>
where
    F: Fn(Arc<dyn Transport>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn Delegate>>> + Send + 'static,
{
    GLOBAL_SLOT.register_factory(factory)
}

/// Resolve the process-wide delegate.
pub async fn ensure_delegate(transport: &Arc<dyn Transport>) -> Result<Arc<dyn Delegate>> {
    GLOBAL_SLOT.ensure_delegate(transport).await
}

/// Clear the process-wide factory and delegate.
#[cfg(any(test, feature = "testing"))]
pub fn reset_global_delegate() {
    GLOBAL_SLOT.reset();
}
