//! Shared helpers for tmux-gateway integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tmux_gateway::testing::{ScriptedTransport, StaticDelegate};
use tmux_gateway::{Delegate, DelegateSlot, Transport};

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Wrap a scripted transport, keeping a typed handle for assertions.
pub fn shared(transport: ScriptedTransport) -> (Arc<dyn Transport>, Arc<ScriptedTransport>) {
    let scripted = Arc::new(transport);
    (scripted.clone(), scripted)
}

/// Register a factory on `slot` that counts its invocations and builds a
/// `StaticDelegate` after `delay`.
pub fn counting_factory(slot: &DelegateSlot, delay: Duration) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    slot.register_factory(move |transport| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            Ok(Arc::new(StaticDelegate::new(transport).with_window("42", "window-42"))
                as Arc<dyn Delegate>)
        }
    })
    .expect("fresh slot accepts a factory");
    calls
}
