use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flow_domain::UnifiedRecord;
use reqwest::Method;
use serde_json::Value;

use crate::errors::IntegrationError;
use crate::oauth::{drop_null_fields, OAuthClient, TokenProvider};
use crate::result::IntegrationResult;
use crate::rule::IntegrationRule;

/// Traduce un registro unificado al payload JSON esperado por el sistema
/// destino.
pub trait OutputMapper<R>: Send + Sync {
    fn map(&self, record: &R) -> Value;
}

impl<R, F> OutputMapper<R> for F
where
    F: Fn(&R) -> Value + Send + Sync,
{
    fn map(&self, record: &R) -> Value {
        self(record)
    }
}

/// Post-procesa el cuerpo de la respuesta del sistema destino en el valor
/// que termina en `IntegrationResult.response`. El procesador por defecto
/// simplemente devuelve el JSON ya parseado.
pub trait ResponseProcessor: Send + Sync {
    fn process(&self, body: Value) -> Value;
}

pub struct DefaultResponseProcessor;

impl ResponseProcessor for DefaultResponseProcessor {
    fn process(&self, body: Value) -> Value {
        body
    }
}

/// Respuesta cruda de una llamada a [`HttpResource`], antes del
/// post-procesamiento de `ResponseProcessor`.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

/// Abstrae la llamada HTTP real al recurso destino -- el seam que permite
/// probar el camino de reautenticación ante un 4xx sin red real, igual que
/// `OutputMapper`/`ResponseProcessor` abstraen el resto de la estrategia.
#[async_trait]
pub trait HttpResource: Send + Sync {
    async fn call(&self, method: Method, url: &str, bearer_token: &str, body: &Value) -> Result<RawResponse, IntegrationError>;
}

/// Implementación de producción de [`HttpResource`] sobre `reqwest`.
pub struct ReqwestResource {
    http: reqwest::Client,
}

impl ReqwestResource {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder().timeout(timeout).build().expect("construir cliente HTTP"),
        }
    }
}

#[async_trait]
impl HttpResource for ReqwestResource {
    async fn call(&self, method: Method, url: &str, bearer_token: &str, body: &Value) -> Result<RawResponse, IntegrationError> {
        let response = self
            .http
            .request(method, url)
            .bearer_auth(bearer_token)
            .json(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok(RawResponse { status, body })
    }
}

/// Estrategia concreta de integración REST bajo OAuth2 password-grant: un
/// `IntegrationRule` que mapea el registro, llama al recurso con el token
/// vigente, renueva el token una vez ante un 4xx, y post-procesa la
/// respuesta.
pub struct RestIntegrationRule<R, M, P = DefaultResponseProcessor, C = ReqwestResource, O = OAuthClient> {
    name: String,
    api_url: String,
    resource: String,
    method: Method,
    oauth: Arc<O>,
    client: C,
    mapper: M,
    response_processor: P,
    _record: PhantomData<R>,
}

impl<R, M> RestIntegrationRule<R, M, DefaultResponseProcessor, ReqwestResource, OAuthClient> {
    pub fn new(name: impl Into<String>, api_url: impl Into<String>, resource: impl Into<String>, method: Method, oauth: Arc<OAuthClient>, mapper: M) -> Self {
        Self {
            name: name.into(),
            api_url: api_url.into(),
            resource: resource.into(),
            method,
            oauth,
            client: ReqwestResource::new(Duration::from_secs(300)),
            mapper,
            response_processor: DefaultResponseProcessor,
            _record: PhantomData,
        }
    }
}

impl<R, M, P, C, O> RestIntegrationRule<R, M, P, C, O> {
    pub fn with_response_processor<P2>(self, response_processor: P2) -> RestIntegrationRule<R, M, P2, C, O> {
        RestIntegrationRule {
            name: self.name,
            api_url: self.api_url,
            resource: self.resource,
            method: self.method,
            oauth: self.oauth,
            client: self.client,
            mapper: self.mapper,
            response_processor,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R, M, P, C, O> IntegrationRule<R> for RestIntegrationRule<R, M, P, C, O>
where
    R: UnifiedRecord,
    M: OutputMapper<R>,
    P: ResponseProcessor,
    C: HttpResource,
    O: TokenProvider,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn integrate(&self, record: &R) -> Result<IntegrationResult, IntegrationError> {
        let body_sent = drop_null_fields(self.mapper.map(record));
        let url = format!("{}/{}", self.api_url.trim_end_matches('/'), self.resource);

        let token = self.oauth.token().await?;
        let mut response = self.client.call(self.method.clone(), &url, &token, &body_sent).await?;

        if (400..500).contains(&response.status) {
            let fresh = self.oauth.refresh().await?;
            response = self.client.call(self.method.clone(), &url, &fresh, &body_sent).await?;
        }

        if response.status >= 400 {
            return Err(IntegrationError::HttpStatus(response.status, response.body));
        }

        let processed = self.response_processor.process(response.body);
        IntegrationResult::new(true, processed, body_sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_domain::{composite_id, subschema, unified_record};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

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

    /// Recurso falso: agota una cola de respuestas preparadas en orden y
    /// registra con qué token se llamó cada vez.
    struct ScriptedResource {
        responses: Mutex<Vec<RawResponse>>,
        tokens_seen: Mutex<Vec<String>>,
        calls: AtomicU32,
    }

    impl ScriptedResource {
        fn new(responses: Vec<RawResponse>) -> Self {
            Self { responses: Mutex::new(responses), tokens_seen: Mutex::new(Vec::new()), calls: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl HttpResource for ScriptedResource {
        async fn call(&self, _method: Method, _url: &str, bearer_token: &str, _body: &Value) -> Result<RawResponse, IntegrationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.tokens_seen.lock().unwrap().push(bearer_token.to_string());
            Ok(self.responses.lock().unwrap().remove(0))
        }
    }

    /// Proveedor de tokens falso: `token()` siempre devuelve el token
    /// vigente, `refresh()` cambia a uno nuevo y cuenta cuántas veces se
    /// invocó -- sin ninguna llamada de red.
    struct FixedTokenProvider {
        current: Mutex<String>,
        refreshes: AtomicU32,
    }

    #[async_trait]
    impl TokenProvider for FixedTokenProvider {
        async fn token(&self) -> Result<String, IntegrationError> {
            Ok(self.current.lock().unwrap().clone())
        }

        async fn refresh(&self) -> Result<String, IntegrationError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            let mut current = self.current.lock().unwrap();
            *current = "token-nuevo".to_string();
            Ok(current.clone())
        }
    }

    fn cliente_mapper(record: &Cliente) -> Value {
        serde_json::json!({"info": record.maestra.info})
    }

    #[tokio::test]
    async fn reauth_on_4xx_retries_once_with_a_fresh_token_and_succeeds() {
        let client = ScriptedResource::new(vec![
            RawResponse { status: 401, body: serde_json::json!({"error": "expired"}) },
            RawResponse { status: 200, body: serde_json::json!({"status": "ok"}) },
        ]);
        let oauth = Arc::new(FixedTokenProvider {
            current: Mutex::new("token-viejo".to_string()),
            refreshes: AtomicU32::new(0),
        });

        let rule = RestIntegrationRule {
            name: "destino-crm".to_string(),
            api_url: "https://example.com".to_string(),
            resource: "clientes".to_string(),
            method: Method::POST,
            oauth: oauth.clone(),
            client,
            mapper: cliente_mapper as fn(&Cliente) -> Value,
            response_processor: DefaultResponseProcessor,
            _record: PhantomData::<Cliente>,
        };

        let record = Cliente { id: ClienteId::new("CLI001".to_string()), maestra: Maestra { info: "hola".to_string() } };
        let result = rule.integrate(&record).await.unwrap();

        assert!(result.success);
        assert_eq!(result.response, serde_json::json!({"status": "ok"}));
        assert_eq!(rule.client.calls.load(Ordering::SeqCst), 2);
        assert_eq!(oauth.refreshes.load(Ordering::SeqCst), 1);

        let tokens = rule.client.tokens_seen.lock().unwrap();
        assert_eq!(tokens[0], "token-viejo");
        assert_eq!(tokens[1], "token-nuevo");
    }

    #[tokio::test]
    async fn success_on_first_attempt_never_triggers_reauth() {
        let client = ScriptedResource::new(vec![RawResponse { status: 200, body: serde_json::json!({"status": "ok"}) }]);
        let oauth = Arc::new(FixedTokenProvider {
            current: Mutex::new("token-viejo".to_string()),
            refreshes: AtomicU32::new(0),
        });

        let rule = RestIntegrationRule {
            name: "destino-crm".to_string(),
            api_url: "https://example.com".to_string(),
            resource: "clientes".to_string(),
            method: Method::POST,
            oauth: oauth.clone(),
            client,
            mapper: cliente_mapper as fn(&Cliente) -> Value,
            response_processor: DefaultResponseProcessor,
            _record: PhantomData::<Cliente>,
        };

        let record = Cliente { id: ClienteId::new("CLI001".to_string()), maestra: Maestra { info: "hola".to_string() } };
        rule.integrate(&record).await.unwrap();

        assert_eq!(rule.client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(oauth.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn persistent_4xx_after_reauth_surfaces_http_status_error() {
        let client = ScriptedResource::new(vec![
            RawResponse { status: 401, body: serde_json::json!({"error": "expired"}) },
            RawResponse { status: 403, body: serde_json::json!({"error": "forbidden"}) },
        ]);
        let oauth = Arc::new(FixedTokenProvider {
            current: Mutex::new("token-viejo".to_string()),
            refreshes: AtomicU32::new(0),
        });

        let rule = RestIntegrationRule {
            name: "destino-crm".to_string(),
            api_url: "https://example.com".to_string(),
            resource: "clientes".to_string(),
            method: Method::POST,
            oauth,
            client,
            mapper: cliente_mapper as fn(&Cliente) -> Value,
            response_processor: DefaultResponseProcessor,
            _record: PhantomData::<Cliente>,
        };

        let record = Cliente { id: ClienteId::new("CLI001".to_string()), maestra: Maestra { info: "hola".to_string() } };
        let err = rule.integrate(&record).await.unwrap_err();
        assert!(matches!(err, IntegrationError::HttpStatus(403, _)));
    }
}
