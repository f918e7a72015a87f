//! End-to-end discovery and dispatch against a scripted host.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tmux_gateway::testing::ScriptedTransport;
use tmux_gateway::{
    ConnectionEntry, ConnectionRegistry, Delegate, DelegateSlot, Error, Result, TabId,
    TmuxRequest, TmuxResponse, TmuxResponsePayload, TmuxStatus, Transport, Window,
};

use common::{counting_factory, init_tracing, shared};

/// A host with connections A and B; commands on A echo, B is gone.
fn host(request: &TmuxRequest) -> Result<TmuxResponse> {
    let response = match request {
        TmuxRequest::ListConnections => TmuxResponse::ok(TmuxResponsePayload::ListConnections {
            connections: vec![
                ConnectionEntry::new("A", "s1"),
                ConnectionEntry::new("B", "s2"),
            ],
        }),
        TmuxRequest::SendCommand {
            connection_id,
            command,
        } if connection_id == "A" => TmuxResponse::ok(TmuxResponsePayload::SendCommand {
            output: Some(format!("ran {command}")),
        }),
        TmuxRequest::SetWindowVisible {
            connection_id,
            window_id,
            ..
        } if connection_id == "A" => {
            if window_id == "@1" {
                TmuxResponse::ok(TmuxResponsePayload::SetWindowVisible)
            } else {
                TmuxResponse::failure(TmuxStatus::InvalidWindowId)
            }
        }
        TmuxRequest::CreateWindow { connection_id, .. } if connection_id == "A" => {
            TmuxResponse::ok(TmuxResponsePayload::CreateWindow {
                tab_id: TabId::new("42"),
            })
        }
        _ => TmuxResponse::failure(TmuxStatus::InvalidConnectionId),
    };
    Ok(response)
}

#[tokio::test]
async fn test_discover_then_dispatch() {
    init_tracing();
    let slot = DelegateSlot::new();
    let calls = counting_factory(&slot, Duration::ZERO);
    let (transport, scripted) = shared(ScriptedTransport::new(host));
    let registry = ConnectionRegistry::new(&slot);

    let connections = registry.list_connections(&transport).await.unwrap();
    let ids: Vec<&str> = connections
        .iter()
        .map(|c| c.connection_id().as_str())
        .collect();
    assert_eq!(ids, ["A", "B"]);

    let a = registry
        .find_connection(&transport, "A")
        .await
        .unwrap()
        .expect("A is live");
    assert_eq!(a.send_command("list-windows").await.unwrap(), "ran list-windows");
    a.set_window_visible("@1", true).await.unwrap();

    let window = a.create_window().await.unwrap().expect("tab 42 is known");
    assert_eq!(window.window_id(), "window-42");

    let err = a.set_window_visible("@7", false).await.unwrap_err();
    assert_eq!(err.status_name(), Some("INVALID_WINDOW_ID"));

    // The connection B is listed but the host rejects commands for it
    let b = &connections[1];
    let err = b.send_command("list-windows").await.unwrap_err();
    assert_eq!(err.status_name(), Some("INVALID_CONNECTION_ID"));

    assert!(registry
        .find_connection(&transport, "Z")
        .await
        .unwrap()
        .is_none());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(scripted
        .requests()
        .iter()
        .any(|r| matches!(r, TmuxRequest::CreateWindow { .. })));
}

#[tokio::test]
async fn test_every_failure_status_surfaces_by_name() {
    init_tracing();
    for status in TmuxStatus::FAILURES {
        let slot = DelegateSlot::new();
        counting_factory(&slot, Duration::ZERO);
        let (transport, _) = shared(ScriptedTransport::new(move |request| match request {
            TmuxRequest::ListConnections => {
                Ok(TmuxResponse::ok(TmuxResponsePayload::ListConnections {
                    connections: vec![ConnectionEntry::new("A", "s1")],
                }))
            }
            _ => Ok(TmuxResponse::failure(status)),
        }));

        let connections = ConnectionRegistry::new(&slot)
            .list_connections(&transport)
            .await
            .unwrap();
        let connection = &connections[0];

        let err = connection.send_command("list-sessions").await.unwrap_err();
        assert!(matches!(err, Error::Protocol(s) if s == status));
        assert_eq!(err.status_name(), Some(status.name()));

        let err = connection.set_window_visible("@1", true).await.unwrap_err();
        assert_eq!(err.status_name(), Some(status.name()));

        let err = connection.create_window().await.unwrap_err();
        assert_eq!(err.status_name(), Some(status.name()));
    }
}

#[tokio::test]
async fn test_discovery_failure_status_surfaces_by_name() {
    for status in TmuxStatus::FAILURES {
        let slot = DelegateSlot::new();
        counting_factory(&slot, Duration::ZERO);
        let (transport, _) = shared(ScriptedTransport::replying(TmuxResponse::failure(status)));

        let err = ConnectionRegistry::new(&slot)
            .list_connections(&transport)
            .await
            .unwrap_err();
        assert_eq!(err.status_name(), Some(status.name()));
    }
}

#[tokio::test]
async fn test_dispatch_uses_delegate_transport() {
    let slot = DelegateSlot::new();
    counting_factory(&slot, Duration::ZERO);
    let (discovery, _) = shared(ScriptedTransport::new(host));

    let connection = ConnectionRegistry::new(&slot)
        .find_connection(&discovery, "A")
        .await
        .unwrap()
        .unwrap();

    // The factory captured `discovery`, so dispatch goes through the same transport
    let delegate_transport: Arc<dyn Transport> = connection.delegate().transport();
    assert!(Arc::ptr_eq(&delegate_transport, &discovery));
}

#[tokio::test]
async fn test_ok_without_output_is_malformed() {
    let slot = DelegateSlot::new();
    counting_factory(&slot, Duration::ZERO);
    let (transport, _) = shared(ScriptedTransport::new(|request| match request {
        TmuxRequest::ListConnections => Ok(TmuxResponse::ok(
            TmuxResponsePayload::ListConnections {
                connections: vec![ConnectionEntry::new("A", "s1")],
            },
        )),
        _ => Ok(TmuxResponse::ok(TmuxResponsePayload::SendCommand { output: None })),
    }));

    let connection = ConnectionRegistry::new(&slot)
        .find_connection(&transport, "A")
        .await
        .unwrap()
        .unwrap();

    let err = connection.send_command("no-such-command").await.unwrap_err();
    assert!(matches!(err, Error::MalformedSuccess { .. }));
    assert_eq!(err.status_name(), None);
}

#[tokio::test]
async fn test_create_window_without_tab_id_yields_no_window() {
    let slot = DelegateSlot::new();
    counting_factory(&slot, Duration::ZERO);
    let (transport, scripted) = shared(ScriptedTransport::new(|request| match request {
        TmuxRequest::ListConnections => Ok(TmuxResponse::ok(
            TmuxResponsePayload::ListConnections {
                connections: vec![ConnectionEntry::new("A", "s1")],
            },
        )),
        _ => Ok(TmuxResponse::ok_empty()),
    }));

    let connection = ConnectionRegistry::new(&slot)
        .find_connection(&transport, "A")
        .await
        .unwrap()
        .unwrap();

    let window = connection.create_window().await.unwrap();
    assert!(window.is_none());
    assert_eq!(scripted.call_count(), 2);
}
