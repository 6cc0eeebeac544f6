use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::TransportError;
use crate::transport::RawTransport;

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub destination: String,
    pub message: Value,
    pub session_id: Option<String>,
}

/// Transporte de prueba: no habla con ningún bus real, solo registra lo que
/// se le pidió enviar. `fail_next` permite simular N fallos transitorios
/// consecutivos antes de aceptar el envío, para ejercitar `with_retry`.
#[derive(Default)]
pub struct InMemoryTransport {
    sent: Mutex<Vec<SentMessage>>,
    fail_next: Mutex<u32>,
    reconnect_count: Mutex<u32>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_n(&self, n: u32) {
        *self.fail_next.lock().unwrap() = n;
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn reconnect_count(&self) -> u32 {
        *self.reconnect_count.lock().unwrap()
    }

    fn maybe_fail(&self) -> Result<(), TransportError> {
        let mut remaining = self.fail_next.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(TransportError::Transient("fallo simulado".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RawTransport for InMemoryTransport {
    async fn send_to_queue(
        &self,
        queue: &str,
        message: &Value,
        session_id: &str,
    ) -> Result<(), TransportError> {
        self.maybe_fail()?;
        self.sent.lock().unwrap().push(SentMessage {
            destination: queue.to_string(),
            message: message.clone(),
            session_id: Some(session_id.to_string()),
        });
        Ok(())
    }

    async fn send_to_topic(&self, topic: &str, message: &Value) -> Result<(), TransportError> {
        self.maybe_fail()?;
        self.sent.lock().unwrap().push(SentMessage {
            destination: topic.to_string(),
            message: message.clone(),
            session_id: None,
        });
        Ok(())
    }

    async fn reconnect(&self) -> Result<(), TransportError> {
        *self.reconnect_count.lock().unwrap() += 1;
        Ok(())
    }
}
