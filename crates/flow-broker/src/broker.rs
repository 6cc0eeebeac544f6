use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use flow_core::{BrokerClient, PortError};
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;

use crate::retry::with_retry;
use crate::transport::RawTransport;

/// `BrokerClient` que serializa los envíos con el mismo `session_id` a
/// través de un mutex por sesión, dejando que sesiones distintas avancen
/// concurrentemente -- el mismo contrato que un sender de cola con
/// sesiones habilitadas. El transporte real vive detrás de `RawTransport`;
/// esta capa solo añade ordering y reintentos.
pub struct SessionOrderedBroker<T: RawTransport> {
    transport: T,
    sessions: DashMap<String, Arc<AsyncMutex<()>>>,
    opened_senders: DashMap<String, ()>,
}

impl<T: RawTransport> SessionOrderedBroker<T> {
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sessions: DashMap::new(),
            opened_senders: DashMap::new(),
        }
    }

    fn session_lock(&self, session_id: &str) -> Arc<AsyncMutex<()>> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn ensure_sender(&self, name: &str) {
        self.opened_senders.entry(name.to_string()).or_insert(());
    }

    /// Cierra todos los senders en caché. Llamar al apagar el proceso.
    pub fn shutdown(&self) {
        let count = self.opened_senders.len();
        self.opened_senders.clear();
        self.sessions.clear();
        log::info!("broker apagado, {count} senders en caché liberados");
    }
}

#[async_trait]
impl<T: RawTransport> BrokerClient for SessionOrderedBroker<T> {
    async fn send(&self, queue: &str, message: &Value, session_id: &str) -> Result<(), PortError> {
        self.ensure_sender(queue);
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;
        with_retry(&self.transport, || self.transport.send_to_queue(queue, message, session_id))
            .await
            .map_err(|e| Box::new(e) as PortError)
    }

    async fn topic_send(&self, topic: &str, message: &Value) -> Result<(), PortError> {
        self.ensure_sender(topic);
        with_retry(&self.transport, || self.transport.send_to_topic(topic, message))
            .await
            .map_err(|e| Box::new(e) as PortError)
    }
}
