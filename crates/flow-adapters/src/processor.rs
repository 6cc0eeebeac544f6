use flow_domain::EventoBase;
use serde_json::Value;

/// Valida y construye uno o más eventos de dominio a partir de un cuerpo
/// JSON crudo. Devuelve una lista porque un solo mensaje entrante puede
/// representar varios eventos de dominio (p. ej. un lote).
pub trait EventProcessor<E: EventoBase>: Send + Sync {
    fn process_event(&self, raw: Value) -> Result<Vec<E>, String>;
}
