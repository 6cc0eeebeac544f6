use std::marker::PhantomData;
use std::sync::Arc;

use flow_core::BrokerClient;
use flow_domain::{CompositeId, EventoBase};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AdapterError;
use crate::processor::EventProcessor;

/// Fuente de datos consultada en cada disparo del temporizador. La
/// secuencia debe ser finita: el adaptador la agota por completo en cada
/// `run_once`.
pub trait PullSource: Send + Sync {
    fn get_data(&self) -> Vec<Value>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PullRunSummary {
    pub published: usize,
    pub skipped: usize,
}

/// Productor accionado por temporizador: en cada ejecución agota
/// [`PullSource::get_data`], valida/transforma cada elemento y publica el
/// resultado en la cola configurada. A diferencia de [`crate::push::PushAdapter`],
/// un fallo de validación en un elemento no aborta el lote -- se registra
/// y se continúa con el siguiente.
pub struct PullAdapter<B, P, S, E> {
    broker: Arc<B>,
    queue_name: String,
    processor: P,
    source: S,
    _event: PhantomData<E>,
}

impl<B, P, S, E> PullAdapter<B, P, S, E>
where
    B: BrokerClient,
    P: EventProcessor<E>,
    S: PullSource,
    E: EventoBase + Serialize,
{
    pub fn new(broker: Arc<B>, queue_name: impl Into<String>, processor: P, source: S) -> Self {
        Self {
            broker,
            queue_name: queue_name.into(),
            processor,
            source,
            _event: PhantomData,
        }
    }

    pub async fn run_once(&self) -> Result<PullRunSummary, AdapterError> {
        let mut summary = PullRunSummary::default();
        for raw in self.source.get_data() {
            let events = match self.processor.process_event(raw) {
                Ok(events) => events,
                Err(reason) => {
                    log::warn!("elemento descartado del lote por fallo de validación: {reason}");
                    summary.skipped += 1;
                    continue;
                }
            };
            for event in &events {
                let session_id = event.id().render();
                let message = serde_json::to_value(event)
                    .map_err(|e| AdapterError::Validation(e.to_string()))?;
                self.broker
                    .send(&self.queue_name, &message, &session_id)
                    .await
                    .map_err(AdapterError::Broker)?;
                summary.published += 1;
            }
        }
        Ok(summary)
    }
}
