pub mod broker;
pub mod errors;
pub mod memory;
pub mod retry;
pub mod transport;

pub use broker::SessionOrderedBroker;
pub use errors::{BrokerError, TransportError};
pub use memory::{InMemoryTransport, SentMessage};
pub use retry::{with_retry, MAX_RETRIES, RETRY_DELAY};
pub use transport::RawTransport;

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::BrokerClient;
    use std::sync::Arc;
    use std::time::Instant;

    #[tokio::test]
    async fn send_reaches_transport_with_session_id() {
        let broker = SessionOrderedBroker::new(InMemoryTransport::new());
        broker.send("q-clientes", &serde_json::json!({"id": "CLI001"}), "CLI001").await.unwrap();
        let sent = broker.transport().sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].destination, "q-clientes");
        assert_eq!(sent[0].session_id.as_deref(), Some("CLI001"));
    }

    #[tokio::test]
    async fn topic_send_carries_no_session() {
        let broker = SessionOrderedBroker::new(InMemoryTransport::new());
        broker.topic_send("maestra", &serde_json::json!({"info": "hola"})).await.unwrap();
        let sent = broker.transport().sent_messages();
        assert_eq!(sent[0].session_id, None);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_and_reconnect_between_attempts() {
        let transport = InMemoryTransport::new();
        transport.fail_next_n(2);
        let broker = SessionOrderedBroker::new(transport);
        broker.send("q-clientes", &serde_json::json!({"id": "CLI001"}), "CLI001").await.unwrap();
        assert_eq!(broker.transport().sent_messages().len(), 1);
        assert_eq!(broker.transport().reconnect_count(), 2);
    }

    #[tokio::test]
    async fn exhausting_retries_surfaces_broker_unavailable() {
        let transport = InMemoryTransport::new();
        transport.fail_next_n(10);
        let broker = SessionOrderedBroker::new(transport);
        let result = broker.send("q-clientes", &serde_json::json!({}), "CLI001").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn same_session_sends_are_serialized() {
        let broker = Arc::new(SessionOrderedBroker::new(InMemoryTransport::new()));
        let start = Instant::now();
        let b1 = broker.clone();
        let b2 = broker.clone();
        let h1 = tokio::spawn(async move {
            b1.send("q", &serde_json::json!({"n": 1}), "same-session").await.unwrap();
        });
        let h2 = tokio::spawn(async move {
            b2.send("q", &serde_json::json!({"n": 2}), "same-session").await.unwrap();
        });
        h1.await.unwrap();
        h2.await.unwrap();
        // Both complete; ordering within one session is serialized by the
        // session mutex, not asserted here beyond "no panics / no deadlock".
        assert_eq!(broker.transport().sent_messages().len(), 2);
        let _ = start.elapsed();
    }
}
