//! Ejemplo de extremo a extremo: un único subesquema ("maestra") de un
//! registro de cliente, pasando por el motor de reglas, el almacén en
//! memoria y un broker en memoria con ordering por sesión. Sirve como
//! smoke test de la composición completa y como referencia de cómo se
//! ensamblan los crates del workspace.
use std::collections::HashSet;

use flow_core::{EngineError, RuleProcessor, RuleSelector, TypedRule, UpdateProcessor};
use flow_domain::{composite_id, subschema, unified_record, EventoBase};
use flow_broker::{InMemoryTransport, SessionOrderedBroker};
use flow_store::InMemoryStore;
use serde::{Deserialize, Serialize};

composite_id! {
    pub struct ClienteId { cuenta: String }
}

subschema! {
    pub struct Maestra { info: String }
}

unified_record! {
    pub struct Cliente {
        id: ClienteId,
        maestra: Maestra,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaestraEvent {
    pub id: ClienteId,
    pub info: String,
}

impl EventoBase for MaestraEvent {
    type Id = ClienteId;
    fn id(&self) -> &ClienteId {
        &self.id
    }
}

pub struct MaestraProcessor;

impl UpdateProcessor<Cliente> for MaestraProcessor {
    type Event = MaestraEvent;

    fn process_message(&self, event: Self::Event, _current: Option<Cliente>) -> Result<Cliente, EngineError> {
        Ok(Cliente { id: event.id, maestra: Maestra { info: event.info } })
    }
}

pub type DemoBroker = SessionOrderedBroker<InMemoryTransport>;
pub type DemoStore = InMemoryStore<Cliente>;
pub type DemoProcessor = RuleProcessor<Cliente, DemoStore, DemoBroker>;

fn build_selector() -> Result<RuleSelector<Cliente>, EngineError> {
    let mut selector = RuleSelector::<Cliente>::new()?;
    let topics: HashSet<String> = std::iter::once("maestra".to_string()).collect();
    selector.register_rule(Box::new(TypedRule::new("MaestraEvent", topics, MaestraProcessor)))?;
    Ok(selector)
}

/// Construye un `RuleProcessor` con una única regla ("maestra") registrada,
/// un almacén en memoria y un broker en memoria.
pub fn build_processor(include_root: bool) -> Result<DemoProcessor, EngineError> {
    let selector = build_selector()?;
    let store = DemoStore::new();
    let broker = DemoBroker::new(InMemoryTransport::new());
    Ok(RuleProcessor::new(selector, store, broker, include_root))
}

#[cfg(feature = "postgres_demo")]
pub type PgDemoProcessor = RuleProcessor<Cliente, flow_store::PgStore<Cliente>, DemoBroker>;

/// Misma regla y broker que [`build_processor`], pero respaldada por
/// Postgres vía `DATABASE_URL` en lugar del almacén en memoria. Crea el
/// esquema si todavía no existe.
#[cfg(feature = "postgres_demo")]
pub async fn build_processor_pg(include_root: bool) -> Result<PgDemoProcessor, crate::AppError> {
    let config = flow_store::StoreConfig::from_env();
    let pool = flow_store::build_pool(&config)
        .await
        .map_err(|e| crate::AppError::Store(flow_store::StoreError::from(e)))?;
    let store = flow_store::PgStore::<Cliente>::new(pool);
    store
        .ensure_schema()
        .await
        .map_err(|e| crate::AppError::Store(flow_store::StoreError::from(e)))?;

    let selector = build_selector()?;
    let broker = DemoBroker::new(InMemoryTransport::new());
    Ok(RuleProcessor::new(selector, store, broker, include_root))
}
