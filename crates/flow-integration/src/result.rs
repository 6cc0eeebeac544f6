use serde_json::Value;

use crate::errors::IntegrationError;

/// Resultado de una integración. `response` y `body_sent` deben ser
/// objetos JSON no vacíos -- un `body_sent` vacío significa que la regla
/// olvidó registrar qué envió, lo cual es un defecto de la regla, no un
/// resultado válido.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationResult {
    pub success: bool,
    pub response: Value,
    pub body_sent: Value,
}

impl IntegrationResult {
    pub fn new(success: bool, response: Value, body_sent: Value) -> Result<Self, IntegrationError> {
        if is_empty_object(&body_sent) {
            return Err(IntegrationError::ContractViolation(
                "body_sent no puede ser un objeto vacío".to_string(),
            ));
        }
        if is_empty_object(&response) {
            return Err(IntegrationError::ContractViolation(
                "response no puede ser un objeto vacío".to_string(),
            ));
        }
        Ok(Self { success, response, body_sent })
    }
}

fn is_empty_object(v: &Value) -> bool {
    matches!(v, Value::Object(m) if m.is_empty()) || v.is_null()
}
