use async_trait::async_trait;
use serde_json::Value;

use crate::errors::TransportError;

/// El borde real con el bus de mensajes. `SessionOrderedBroker` (en
/// `broker.rs`) se ocupa del ordering por sesión y de los reintentos;
/// una implementación de `RawTransport` solo necesita saber enviar un
/// mensaje y reconectar tras un fallo transitorio.
#[async_trait]
pub trait RawTransport: Send + Sync {
    async fn send_to_queue(
        &self,
        queue: &str,
        message: &Value,
        session_id: &str,
    ) -> Result<(), TransportError>;

    async fn send_to_topic(&self, topic: &str, message: &Value) -> Result<(), TransportError>;

    /// Reinicializa el cliente subyacente tras fallos transitorios repetidos.
    /// Invocado entre reintentos; el transporte decide si esto implica algo
    /// (p. ej. recrear una conexión TCP) o es un no-op.
    async fn reconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
