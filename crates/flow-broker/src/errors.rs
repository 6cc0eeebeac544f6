use thiserror::Error;

/// Error que produce el transporte subyacente de un envío individual.
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    #[error("error transitorio de transporte: {0}")]
    Transient(String),

    #[error("error irrecuperable de transporte: {0}")]
    Fatal(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Transient(_))
    }
}

/// Error final reportado a través de `BrokerClient` tras agotar reintentos.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker no disponible tras {attempts} intentos: {source}")]
    Unavailable { attempts: u32, source: TransportError },
}
