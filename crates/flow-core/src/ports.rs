//! Puertos que el motor necesita del mundo exterior: un almacén de
//! documentos y un cliente de broker. El motor sólo conoce estos contratos;
//! `flow-store` y `flow-broker` proveen implementaciones concretas.

use async_trait::async_trait;
use flow_domain::{AuditChange, AuditIntegration, UnifiedRecord};
use serde_json::Value;

pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Acceso al contenedor `unified` y al contenedor `audit-change`.
#[async_trait]
pub trait DocumentStore<R: UnifiedRecord>: Send + Sync {
    async fn get_unified(&self, id_rendered: &str) -> Result<Option<R>, PortError>;
    async fn upsert_unified(&self, id_rendered: &str, record: &R) -> Result<(), PortError>;
    async fn append_audit_change(&self, entry: &AuditChange) -> Result<(), PortError>;
}

/// Acceso al contenedor `audit-integration`, usado por el framework de
/// reglas de integración. Separado de `DocumentStore` porque no está
/// parametrizado por un tipo de registro unificado.
#[async_trait]
pub trait IntegrationAuditStore: Send + Sync {
    async fn append_audit_integration(&self, entry: &AuditIntegration) -> Result<(), PortError>;
}

/// Envío a colas (con sesión) y a tópicos (sin sesión).
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn send(&self, queue: &str, message: &Value, session_id: &str) -> Result<(), PortError>;
    async fn topic_send(&self, topic: &str, message: &Value) -> Result<(), PortError>;
}
