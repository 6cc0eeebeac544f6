//! Errores del motor de reglas.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("ningún rule coincide con el mensaje")]
    NoMatchingRule,

    #[error("el tópico '{0}' no pertenece al esquema del registro unificado")]
    TopicNotInSchema(String),

    #[error(transparent)]
    Schema(#[from] flow_domain::SchemaDefinitionError),

    #[error("error de (de)serialización: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("error del almacén de documentos: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("error del broker: {0}")]
    Broker(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("el merge de usuario falló: {0}")]
    Merge(String),
}
