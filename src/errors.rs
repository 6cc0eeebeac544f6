//! Error de nivel de aplicación para el binario de demostración. Cada
//! crate del workspace tiene su propio tipo de error tipado
//! (`EngineError`, `StoreError`, `BrokerError`, `AdapterError`,
//! `IntegrationError`); este enum solo los agrupa para que `main.rs`
//! tenga un único tipo de retorno.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("error interno: {0}")]
    Internal(String),

    #[error("error de configuración: {0}")]
    Config(String),

    #[error("error del motor de reglas: {0}")]
    Engine(#[from] flow_core::EngineError),

    #[error("error de almacenamiento: {0}")]
    Store(#[from] flow_store::StoreError),

    #[error("error del adaptador de ingreso: {0}")]
    Adapter(#[from] flow_adapters::AdapterError),

    #[error("error de integración: {0}")]
    Integration(#[from] flow_integration::IntegrationError),
}
