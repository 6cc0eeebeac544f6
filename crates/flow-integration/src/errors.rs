use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntegrationError {
    /// El mensaje entrante no cumple con el modelo unificado. Nunca se
    /// absorbe silenciosamente -- siempre se propaga al llamador.
    #[error("mensaje no válido contra el esquema unificado: {0}")]
    UnifiedValidation(Value),

    /// Falla de validación ocurrida dentro de `integrate`; a diferencia de
    /// `UnifiedValidation`, esta se sintetiza en un `IntegrationResult`
    /// fallido si persiste tras agotar los reintentos, en vez de
    /// propagarse.
    #[error("validación fallida durante la integración: {0}")]
    Validation(Value),

    #[error("llamada HTTP fallida: {0}")]
    Http(#[from] reqwest::Error),

    #[error("el recurso destino respondió con estado {0}: {1}")]
    HttpStatus(u16, Value),

    #[error("token de OAuth rechazado: {0}")]
    OAuth(String),

    #[error("violación de contrato de la regla de integración: {0}")]
    ContractViolation(String),

    #[error("error al escribir la auditoría de integración: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}
