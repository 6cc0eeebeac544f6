use std::marker::PhantomData;
use std::sync::Arc;

use flow_core::BrokerClient;
use flow_domain::{CompositeId, EventoBase};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AdapterError;
use crate::processor::EventProcessor;

type ValidationHook = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;
type LogHook = Box<dyn Fn(&Value) + Send + Sync>;

/// Receptor HTTP genérico: recibe un cuerpo JSON, lo valida y transforma en
/// uno o más eventos de dominio, y los publica en la cola configurada
/// usando el Composite-ID renderizado de cada evento como `session_id`.
///
/// Equivalente al registro de blueprint de un receptor de funciones HTTP,
/// sin acoplarse a ningún framework web concreto: el llamador decide cómo
/// llega `body` (handler de axum, de actix, una prueba unitaria, etc.) y
/// solo invoca [`PushAdapter::handle`].
pub struct PushAdapter<B, P, E> {
    broker: Arc<B>,
    queue_name: String,
    processor: P,
    validate: Option<ValidationHook>,
    log_event: Option<LogHook>,
    _event: PhantomData<E>,
}

impl<B, P, E> PushAdapter<B, P, E>
where
    B: BrokerClient,
    P: EventProcessor<E>,
    E: EventoBase + Serialize,
{
    pub fn new(broker: Arc<B>, queue_name: impl Into<String>, processor: P) -> Self {
        Self {
            broker,
            queue_name: queue_name.into(),
            processor,
            validate: None,
            log_event: None,
            _event: PhantomData,
        }
    }

    /// Hook opcional ejecutado antes de `process_event`; un `Some(reason)`
    /// rechaza el mensaje sin tocar el broker.
    pub fn with_validation<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.validate = Some(Box::new(hook));
        self
    }

    pub fn with_logging<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.log_event = Some(Box::new(hook));
        self
    }

    /// Procesa un único cuerpo entrante. Devuelve cuántos eventos se
    /// publicaron.
    pub async fn handle(&self, body: Value) -> Result<usize, AdapterError> {
        if let Some(validate) = &self.validate {
            if let Some(reason) = validate(&body) {
                return Err(AdapterError::Validation(reason));
            }
        }
        if let Some(log_event) = &self.log_event {
            log_event(&body);
        }

        let events = self
            .processor
            .process_event(body)
            .map_err(AdapterError::Validation)?;

        for event in &events {
            let session_id = event.id().render();
            let message = serde_json::to_value(event)
                .map_err(|e| AdapterError::Validation(e.to_string()))?;
            self.broker
                .send(&self.queue_name, &message, &session_id)
                .await
                .map_err(AdapterError::Broker)?;
        }
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flow_core::PortError;
    use flow_domain::composite_id;
    use std::sync::Mutex;

    composite_id! {
        pub struct ClienteId { cuenta: String }
    }

    #[derive(Debug, Clone, Serialize, serde::Deserialize)]
    struct ClienteEvent {
        id: ClienteId,
        info: String,
    }

    impl EventoBase for ClienteEvent {
        type Id = ClienteId;
        fn id(&self) -> &ClienteId {
            &self.id
        }
    }

    struct EchoProcessor;
    impl EventProcessor<ClienteEvent> for EchoProcessor {
        fn process_event(&self, raw: Value) -> Result<Vec<ClienteEvent>, String> {
            serde_json::from_value(raw).map(|e| vec![e]).map_err(|e| e.to_string())
        }
    }

    #[derive(Default)]
    struct RecordingBroker {
        sent: Mutex<Vec<(String, String, Value)>>,
    }

    #[async_trait]
    impl BrokerClient for RecordingBroker {
        async fn send(&self, queue: &str, message: &Value, session_id: &str) -> Result<(), PortError> {
            self.sent.lock().unwrap().push((queue.to_string(), session_id.to_string(), message.clone()));
            Ok(())
        }
        async fn topic_send(&self, _topic: &str, _message: &Value) -> Result<(), PortError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn publishes_with_rendered_id_as_session() {
        let broker = Arc::new(RecordingBroker::default());
        let adapter = PushAdapter::new(broker.clone(), "q-clientes", EchoProcessor);
        let body = serde_json::json!({"id": "CLI001", "info": "hola"});
        let published = adapter.handle(body).await.unwrap();
        assert_eq!(published, 1);
        let sent = broker.sent.lock().unwrap();
        assert_eq!(sent[0].0, "q-clientes");
        assert_eq!(sent[0].1, "CLI001");
    }

    #[tokio::test]
    async fn validation_hook_rejects_before_touching_broker() {
        let broker = Arc::new(RecordingBroker::default());
        let adapter = PushAdapter::new(broker.clone(), "q-clientes", EchoProcessor)
            .with_validation(|_| Some("falta firma".to_string()));
        let body = serde_json::json!({"id": "CLI001", "info": "hola"});
        let result = adapter.handle(body).await;
        assert!(matches!(result, Err(AdapterError::Validation(_))));
        assert!(broker.sent.lock().unwrap().is_empty());
    }
}
