//! Almacén en memoria: backend por defecto, usado en pruebas y cuando no
//! hay `DATABASE_URL` configurado. Tres contenedores lógicos -- `unified`,
//! `audit-change`, `audit-integration` -- cada uno un mapa concurrente
//! simple.

use async_trait::async_trait;
use dashmap::DashMap;
use flow_core::{DocumentStore, IntegrationAuditStore, PortError};
use flow_domain::{AuditChange, AuditIntegration, UnifiedRecord};
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore<R: UnifiedRecord> {
    unified: DashMap<String, R>,
    audit_change: DashMap<Uuid, AuditChange>,
    audit_integration: DashMap<Uuid, AuditIntegration>,
}

impl<R: UnifiedRecord> InMemoryStore<R> {
    pub fn new() -> Self {
        Self {
            unified: DashMap::new(),
            audit_change: DashMap::new(),
            audit_integration: DashMap::new(),
        }
    }

    /// Lectura de diagnóstico/pruebas: todas las entradas de auditoría de
    /// cambio registradas hasta ahora, sin orden garantizado.
    pub fn audit_change_entries(&self) -> Vec<AuditChange> {
        self.audit_change.iter().map(|e| e.value().clone()).collect()
    }

    pub fn audit_integration_entries(&self) -> Vec<AuditIntegration> {
        self.audit_integration.iter().map(|e| e.value().clone()).collect()
    }
}

#[async_trait]
impl<R: UnifiedRecord> DocumentStore<R> for InMemoryStore<R> {
    async fn get_unified(&self, id_rendered: &str) -> Result<Option<R>, PortError> {
        Ok(self.unified.get(id_rendered).map(|r| r.clone()))
    }

    async fn upsert_unified(&self, id_rendered: &str, record: &R) -> Result<(), PortError> {
        self.unified.insert(id_rendered.to_string(), record.clone());
        Ok(())
    }

    async fn append_audit_change(&self, entry: &AuditChange) -> Result<(), PortError> {
        self.audit_change.insert(Uuid::new_v4(), entry.clone());
        Ok(())
    }
}

#[async_trait]
impl<R: UnifiedRecord> IntegrationAuditStore for InMemoryStore<R> {
    async fn append_audit_integration(&self, entry: &AuditIntegration) -> Result<(), PortError> {
        self.audit_integration.insert(Uuid::new_v4(), entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_domain::{composite_id, subschema, unified_record};

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

    #[tokio::test]
    async fn upsert_then_get_roundtrips() {
        let store = InMemoryStore::<Cliente>::new();
        let c = Cliente { id: ClienteId::new("CLI001".to_string()), maestra: Maestra { info: "hi".to_string() } };
        store.upsert_unified("CLI001", &c).await.unwrap();
        let fetched = store.get_unified("CLI001").await.unwrap().unwrap();
        assert_eq!(fetched.maestra.info, "hi");
    }

    #[tokio::test]
    async fn missing_id_returns_none() {
        let store = InMemoryStore::<Cliente>::new();
        assert!(store.get_unified("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn audit_change_entries_get_unique_ids() {
        let store = InMemoryStore::<Cliente>::new();
        let now = chrono::Utc::now();
        store
            .append_audit_change(&AuditChange::new("CLI001", "maestra", "info", serde_json::Value::Null, serde_json::json!("hi"), now))
            .await
            .unwrap();
        store
            .append_audit_change(&AuditChange::no_changes("CLI002", now))
            .await
            .unwrap();
        assert_eq!(store.audit_change_entries().len(), 2);
    }
}
