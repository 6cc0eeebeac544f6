//! El motor de reglas: selecciona la estrategia de merge correcta para un
//! evento entrante, materializa el registro unificado actualizado, calcula
//! un diff estructurado contra la versión anterior, persiste, audita, y
//! reparte sólo a los tópicos cuyo subesquema realmente cambió.

pub mod diff;
pub mod errors;
pub mod ports;
pub mod processor;
pub mod selector;

pub use diff::diff as compute_diff;
pub use errors::EngineError;
pub use ports::{BrokerClient, DocumentStore, IntegrationAuditStore, PortError};
pub use processor::RuleProcessor;
pub use selector::{get_topics_by_changes, DynRule, RuleSelector, Selection, TypedRule, UpdateProcessor};
