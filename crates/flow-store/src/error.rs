//! Errores del almacén de documentos.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error de (de)serialización: {0}")]
    Serde(#[from] serde_json::Error),

    #[cfg(feature = "postgres")]
    #[error("error de base de datos: {0}")]
    Database(#[from] sqlx::Error),
}
