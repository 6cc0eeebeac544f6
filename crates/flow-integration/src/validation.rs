use serde_json::Value;

/// Serializa una lista de errores de validación a una cadena JSON apta
/// para almacenarse en un campo de auditoría de texto.
pub fn serialize_validation_errors(errors: &[Value]) -> String {
    serde_json::to_string(errors).unwrap_or_else(|_| "[]".to_string())
}

/// Construye el cuerpo `{error_validacion, error_validacion_detalle}` usado
/// tanto al rechazar un mensaje contra el esquema unificado como al
/// sintetizar un `IntegrationResult` fallido.
pub fn build_validation_error_body(error_message: &str, additional_info: &str) -> Value {
    let mut obj = serde_json::Map::new();
    obj.insert("error_validacion".to_string(), Value::String(error_message.to_string()));
    if !additional_info.is_empty() {
        obj.insert(
            "error_validacion_detalle".to_string(),
            Value::String(additional_info.to_string()),
        );
    }
    Value::Object(obj)
}
