use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("cuerpo de evento inválido: {0}")]
    Validation(String),

    #[error("error al publicar en el broker: {0}")]
    Broker(#[source] Box<dyn std::error::Error + Send + Sync>),
}
