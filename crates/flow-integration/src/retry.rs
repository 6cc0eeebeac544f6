use std::future::Future;
use std::time::Duration;

pub const MAX_RETRIES: u32 = 3;
pub const BASE_DELAY: Duration = Duration::from_secs(1);

/// Reintenta `f` hasta `max_retries` veces con backoff exponencial
/// (`base_delay * 2^intento`). Cualquier error se considera reintentable;
/// tras el último intento, el último error se devuelve tal cual.
pub async fn retry_with_backoff<F, Fut, T, E>(max_retries: u32, base_delay: Duration, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt + 1 < max_retries => {
                let delay = base_delay * 2u32.pow(attempt);
                log::warn!("reintentando por error: {e}. Intento {}/{}. Esperando {delay:?}...", attempt + 1, max_retries);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                log::error!("reintentos agotados, último error: {e}");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Dos 500 consecutivos y luego un 200: tres intentos en total, con
    /// backoff de 1s y luego 2s entre ellos.
    #[tokio::test(start_paused = true)]
    async fn s6_two_transient_failures_then_success() {
        let attempts = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = retry_with_backoff(MAX_RETRIES, BASE_DELAY, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("500 Internal Server Error".to_string())
                } else {
                    Ok(serde_json::json!({"status": "ok"}))
                }
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(result.unwrap(), serde_json::json!({"status": "ok"}));
        // 1s + 2s de espera acumulada entre el primer y el tercer intento.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausting_all_retries_returns_last_error() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), String> = retry_with_backoff(MAX_RETRIES, BASE_DELAY, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err("siempre falla".to_string()) }
        })
        .await;
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_RETRIES);
        assert_eq!(result.unwrap_err(), "siempre falla");
    }
}
