//! Configuración del binario de demostración: nombres de cola/tópico y la
//! política de fan-out de cambios "root". Usa la misma convención de carga
//! perezosa de `.env` que `flow_store::config`.
use std::env;

use once_cell::sync::Lazy;

pub struct AppConfig {
    pub queue_name: String,
    pub include_root: bool,
}

pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    flow_store::init_dotenv();
    let queue_name = env::var("QUEUE_NAME").unwrap_or_else(|_| "q-clientes".to_string());
    let include_root = env::var("INCLUDE_ROOT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);
    AppConfig { queue_name, include_root }
});
