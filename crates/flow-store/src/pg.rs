//! Backend de Postgres: un documento JSON por fila, vía `sqlx` contra
//! columnas `JSONB`. Tres tablas, una por contenedor lógico.

use std::marker::PhantomData;

use async_trait::async_trait;
use flow_core::{DocumentStore, IntegrationAuditStore, PortError};
use flow_domain::{AuditChange, AuditIntegration, UnifiedRecord};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, Row};
use uuid::Uuid;

use crate::config::StoreConfig;

/// Crea un pool de conexiones a partir de `StoreConfig`, creando la base de
/// datos destino si todavía no existe (útil en entornos de desarrollo
/// donde la base se levanta junto con el servicio).
pub async fn build_pool(config: &StoreConfig) -> Result<sqlx::Pool<sqlx::Postgres>, sqlx::Error> {
    match PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
    {
        Ok(pool) => Ok(pool),
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("3D000") => {
            log::warn!("la base de datos destino no existe, intentando crearla");
            ensure_database_exists(&config.url).await?;
            PgPoolOptions::new()
                .min_connections(config.min_connections)
                .max_connections(config.max_connections)
                .connect(&config.url)
                .await
        }
        Err(e) => Err(e),
    }
}

async fn ensure_database_exists(full_url: &str) -> Result<(), sqlx::Error> {
    let Some(pos) = full_url.rfind('/') else { return Ok(()) };
    let (base, tail) = full_url.split_at(pos);
    let db_part = &tail[1..];
    let db_name = db_part.split('?').next().unwrap_or(db_part).to_string();
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let admin_url = format!("{base}/postgres");
    let admin_pool = PgPoolOptions::new().max_connections(1).connect(&admin_url).await?;
    let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pg_database WHERE datname = $1")
        .bind(&db_name)
        .fetch_one(&admin_pool)
        .await?;
    if exists.0 == 0 && db_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        let stmt = format!("CREATE DATABASE \"{db_name}\"");
        admin_pool.execute(stmt.as_str()).await?;
        log::info!("base de datos '{db_name}' creada automáticamente");
    }
    Ok(())
}

/// Implementación Postgres de `DocumentStore`/`IntegrationAuditStore`,
/// compartiendo un único pool entre las tres tablas lógicas.
pub struct PgStore<R: UnifiedRecord> {
    pool: sqlx::Pool<sqlx::Postgres>,
    _marker: PhantomData<R>,
}

impl<R: UnifiedRecord> PgStore<R> {
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self { pool, _marker: PhantomData }
    }

    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS unified_records (id TEXT PRIMARY KEY, body JSONB NOT NULL)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS audit_change (id UUID PRIMARY KEY, body JSONB NOT NULL, fecha_evento TIMESTAMPTZ NOT NULL)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS audit_integration (id UUID PRIMARY KEY, body JSONB NOT NULL, fecha_evento TIMESTAMPTZ NOT NULL)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

#[async_trait]
impl<R: UnifiedRecord> DocumentStore<R> for PgStore<R> {
    async fn get_unified(&self, id_rendered: &str) -> Result<Option<R>, PortError> {
        let row = sqlx::query("SELECT body FROM unified_records WHERE id = $1")
            .bind(id_rendered)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else { return Ok(None) };
        let body: serde_json::Value = row.try_get("body")?;
        Ok(Some(serde_json::from_value(body)?))
    }

    async fn upsert_unified(&self, id_rendered: &str, record: &R) -> Result<(), PortError> {
        let body = serde_json::to_value(record)?;
        sqlx::query(
            "INSERT INTO unified_records (id, body) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET body = EXCLUDED.body",
        )
        .bind(id_rendered)
        .bind(body)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_audit_change(&self, entry: &AuditChange) -> Result<(), PortError> {
        let body = serde_json::to_value(entry)?;
        sqlx::query("INSERT INTO audit_change (id, body, fecha_evento) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(body)
            .bind(entry.fecha_evento)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<R: UnifiedRecord> IntegrationAuditStore for PgStore<R> {
    async fn append_audit_integration(&self, entry: &AuditIntegration) -> Result<(), PortError> {
        let body = serde_json::to_value(entry)?;
        sqlx::query("INSERT INTO audit_integration (id, body, fecha_evento) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(body)
            .bind(entry.fecha_evento)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
