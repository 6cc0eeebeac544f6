use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::errors::IntegrationError;

/// Configuración de un flujo OAuth2 password-grant contra un destino REST.
#[derive(Debug, Clone)]
pub struct OAuthConfigPassFlow {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub token_resource: String,
    pub api_url: String,
    pub use_url_params_for_auth: bool,
}

fn deserialize_issued_at<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IssuedAt {
        Int(i64),
        Str(String),
    }
    match IssuedAt::deserialize(deserializer)? {
        IssuedAt::Int(n) => Ok(n),
        IssuedAt::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn default_expires_in() -> u64 {
    1800
}

/// Token devuelto por el endpoint de grant. `issued_at` llega a veces como
/// cadena desde el proveedor -- se coacciona a entero siempre.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthTokenPass {
    pub access_token: String,
    #[serde(default)]
    pub instance_url: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(deserialize_with = "deserialize_issued_at")]
    pub issued_at: i64,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

impl OAuthTokenPass {
    /// `issued_at` llega en segundos desde época.
    fn is_expired(&self) -> bool {
        let age = Utc::now().timestamp() - self.issued_at;
        age >= self.expires_in as i64
    }
}

/// Caché del token protegida por un `RwLock`: múltiples llamadas
/// concurrentes leen el token vigente sin bloquearse entre sí; cuando el
/// token falta o expiró, una sola llamada lo renueva mientras las demás
/// esperan la escritura (el patrón "un escritor, muchos lectores" que
/// describe la concurrencia del token OAuth).
pub struct OAuthClient {
    http: reqwest::Client,
    config: OAuthConfigPassFlow,
    token: RwLock<Option<(OAuthTokenPass, Instant)>>,
}

impl OAuthClient {
    pub fn new(config: OAuthConfigPassFlow) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("construir cliente HTTP"),
            config,
            token: RwLock::new(None),
        }
    }

    /// Devuelve un token vigente, autenticando o renovando si hace falta.
    pub async fn token(&self) -> Result<String, IntegrationError> {
        {
            let guard = self.token.read().await;
            if let Some((token, _)) = guard.as_ref() {
                if !token.is_expired() {
                    return Ok(token.access_token.clone());
                }
            }
        }
        self.refresh().await
    }

    /// Fuerza una renovación, p. ej. tras recibir un 4xx del recurso.
    pub async fn refresh(&self) -> Result<String, IntegrationError> {
        let mut guard = self.token.write().await;
        if let Some((token, _)) = guard.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        let grant = [
            ("grant_type", "password"),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("username", &self.config.username),
            ("password", &self.config.password),
        ];

        let url = format!("{}/{}", self.config.api_url.trim_end_matches('/'), self.config.token_resource);
        let request = if self.config.use_url_params_for_auth {
            self.http.post(&url).query(&grant)
        } else {
            self.http.post(&url).form(&grant)
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(IntegrationError::OAuth(format!(
                "autenticación rechazada con estado {}",
                response.status()
            )));
        }
        let token: OAuthTokenPass = response.json().await?;
        let access_token = token.access_token.clone();
        *guard = Some((token, Instant::now()));
        Ok(access_token)
    }
}

/// Fuente de tokens de acceso -- el seam que permite a `RestIntegrationRule`
/// probar su rama de reautenticación sin pasar por `OAuthClient` real.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, IntegrationError>;
    async fn refresh(&self) -> Result<String, IntegrationError>;
}

#[async_trait::async_trait]
impl TokenProvider for OAuthClient {
    async fn token(&self) -> Result<String, IntegrationError> {
        OAuthClient::token(self).await
    }

    async fn refresh(&self) -> Result<String, IntegrationError> {
        OAuthClient::refresh(self).await
    }
}

/// Excluye campos `null` de un cuerpo JSON antes de enviarlo, como hace el
/// modelo de salida en la regla de integración concreta.
pub fn drop_null_fields(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.retain(|_, v| !v.is_null());
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_json(issued_at: Value, expires_in: Option<Value>) -> Value {
        let mut body = serde_json::json!({
            "access_token": "test_access_token",
            "instance_url": "https://example.com",
            "id": "test_id",
            "token_type": "Bearer",
            "issued_at": issued_at,
            "signature": "test_signature",
        });
        if let Some(expires_in) = expires_in {
            body["expires_in"] = expires_in;
        }
        body
    }

    #[test]
    fn oauth_token_pass_issued_at_int() {
        let token: OAuthTokenPass = serde_json::from_value(token_json(serde_json::json!(1694600000), None)).unwrap();
        assert_eq!(token.issued_at, 1694600000);
    }

    #[test]
    fn oauth_token_pass_issued_at_string() {
        let token: OAuthTokenPass = serde_json::from_value(token_json(serde_json::json!("1694600000"), None)).unwrap();
        assert_eq!(token.issued_at, 1694600000);
    }

    #[test]
    fn oauth_token_pass_expires_in_default() {
        let token: OAuthTokenPass = serde_json::from_value(token_json(serde_json::json!(1694600000), None)).unwrap();
        assert_eq!(token.expires_in, 1800);
    }

    #[test]
    fn oauth_token_pass_expires_in_explicit_overrides_default() {
        let token: OAuthTokenPass =
            serde_json::from_value(token_json(serde_json::json!(1694600000), Some(serde_json::json!(3600)))).unwrap();
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn is_expired_compares_issued_at_as_seconds_not_milliseconds() {
        // Un token recién emitido con una ventana amplia no debe reportarse
        // como vencido -- de dividir `issued_at` por 1000 esto fallaría
        // siempre, porque `issued_at` ya viene en segundos.
        let token = OAuthTokenPass {
            access_token: "tok".to_string(),
            instance_url: None,
            id: None,
            token_type: None,
            issued_at: Utc::now().timestamp(),
            signature: None,
            expires_in: 1800,
        };
        assert!(!token.is_expired());
    }

    #[test]
    fn is_expired_true_once_age_exceeds_expires_in() {
        let token = OAuthTokenPass {
            access_token: "tok".to_string(),
            instance_url: None,
            id: None,
            token_type: None,
            issued_at: Utc::now().timestamp() - 2000,
            signature: None,
            expires_in: 1800,
        };
        assert!(token.is_expired());
    }
}
