use std::future::Future;
use std::time::Duration;

use crate::errors::{BrokerError, TransportError};
use crate::transport::RawTransport;

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Reintenta `attempt` hasta `MAX_RETRIES` veces con una demora fija entre
/// intentos. Antes de cada reintento, pide al transporte que se reconecte
/// -- ante fallos de conexión/autenticación repetidos, un cliente nuevo
/// puede tener éxito donde el viejo seguía fallando.
pub async fn with_retry<F, Fut, T>(transport: &dyn RawTransport, mut attempt: F) -> Result<T, BrokerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut attempts = 0;
    loop {
        match attempt().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() && attempts < MAX_RETRIES => {
                attempts += 1;
                log::warn!("envío fallido (intento {attempts}/{MAX_RETRIES}): {e} -> reintentando en {RETRY_DELAY:?}");
                let _ = transport.reconnect().await;
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(e) => {
                return Err(BrokerError::Unavailable { attempts, source: e });
            }
        }
    }
}
