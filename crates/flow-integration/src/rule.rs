use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use flow_core::IntegrationAuditStore;
use flow_domain::{AuditIntegration, CompositeId, UnifiedRecord};
use serde_json::Value;

use crate::errors::IntegrationError;
use crate::retry::{retry_with_backoff, BASE_DELAY, MAX_RETRIES};
use crate::result::IntegrationResult;
use crate::validation::build_validation_error_body;

/// Transforma un registro unificado en una llamada al sistema destino.
/// El único método que el usuario implementa; todo el manejo de
/// reintentos y auditoría vive en [`IntegrationRunner`].
#[async_trait]
pub trait IntegrationRule<R: UnifiedRecord>: Send + Sync {
    /// Nombre de la regla -- también el nombre del topic del que consume.
    fn name(&self) -> &str;

    async fn integrate(&self, record: &R) -> Result<IntegrationResult, IntegrationError>;
}

/// Orquesta la ejecución de una [`IntegrationRule`]: valida el mensaje
/// entrante contra el modelo unificado, ejecuta `integrate` con
/// reintentos exponenciales, sintetiza un resultado fallido si la
/// integración reporta un error de validación persistente, y registra
/// todo en la auditoría de integración.
pub struct IntegrationRunner<R, Rule, Store> {
    rule: Rule,
    audit: Store,
    _record: PhantomData<R>,
}

impl<R, Rule, Store> IntegrationRunner<R, Rule, Store>
where
    R: UnifiedRecord,
    Rule: IntegrationRule<R>,
    Store: IntegrationAuditStore,
{
    pub fn new(rule: Rule, audit: Store) -> Self {
        Self { rule, audit, _record: PhantomData }
    }

    pub fn audit(&self) -> &Store {
        &self.audit
    }

    pub async fn run(&self, message: Value) -> Result<IntegrationResult, IntegrationError> {
        let record: R = serde_json::from_value(message).map_err(|e| {
            let body = build_validation_error_body(
                &e.to_string(),
                "Mensaje no cumple con el esquema unificado",
            );
            log::error!("error en validación del modelo unificado: {body}");
            IntegrationError::UnifiedValidation(body)
        })?;

        let id_rendered = record.id().render();

        let outcome = retry_with_backoff(MAX_RETRIES, BASE_DELAY, || self.rule.integrate(&record)).await;

        let result = match outcome {
            Ok(r) => r,
            Err(IntegrationError::Validation(detail)) => {
                log::error!("error de validación en integración: {detail}");
                IntegrationResult::new(
                    false,
                    serde_json::json!({ "error_validacion": detail }),
                    serde_json::json!({ "error_validacion": true }),
                )?
            }
            Err(other) => {
                log::error!("error en integración tras agotar reintentos: {other}");
                return Err(other);
            }
        };

        self.audit
            .append_audit_integration(&AuditIntegration::new(
                &id_rendered,
                self.rule.name(),
                result.body_sent.clone(),
                result.success,
                result.response.clone(),
                Utc::now(),
            ))
            .await
            .map_err(IntegrationError::Store)?;

        Ok(result)
    }
}
