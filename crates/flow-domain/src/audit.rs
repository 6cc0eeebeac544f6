//! Entradas de auditoría: un registro de cambio por campo modificado, y un
//! registro por intento de integración. Ambas son write-once -- se añaden,
//! nunca se editan ni se borran.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Nombre reservado para el subesquema sintético emitido cuando un merge
/// no produce ningún cambio.
pub const NO_CHANGES_SUBSCHEMA: &str = "No Changes";

/// Una entrada de cambio de campo, o el centinela "No Changes" cuando un
/// merge no alteró nada.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditChange {
    pub id_entrada: String,
    pub subesquema: String,
    pub campo: String,
    pub old_value: Value,
    pub new_value: Value,
    pub fecha_evento: DateTime<Utc>,
}

impl AuditChange {
    pub fn new(
        id_entrada: impl Into<String>,
        subesquema: impl Into<String>,
        campo: impl Into<String>,
        old_value: Value,
        new_value: Value,
        fecha_evento: DateTime<Utc>,
    ) -> Self {
        Self {
            id_entrada: id_entrada.into(),
            subesquema: subesquema.into(),
            campo: campo.into(),
            old_value,
            new_value,
            fecha_evento,
        }
    }

    /// El centinela único emitido cuando un merge no produjo ningún cambio.
    pub fn no_changes(id_entrada: impl Into<String>, fecha_evento: DateTime<Utc>) -> Self {
        Self {
            id_entrada: id_entrada.into(),
            subesquema: NO_CHANGES_SUBSCHEMA.to_string(),
            campo: "Ninguno".to_string(),
            old_value: Value::String("No cambios".to_string()),
            new_value: Value::String("No cambios".to_string()),
            fecha_evento,
        }
    }

    /// `true` si esta entrada es el centinela de "no hubo cambios".
    pub fn is_no_changes(&self) -> bool {
        self.subesquema == NO_CHANGES_SUBSCHEMA
    }
}

/// Un intento de integración (éxito o fallo terminal), hacia un destino
/// externo concreto, asociado a una regla con nombre.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditIntegration {
    pub id: String,
    pub regla: String,
    pub contenido: Value,
    pub success: bool,
    pub response: Value,
    pub fecha_evento: DateTime<Utc>,
}

impl AuditIntegration {
    pub fn new(
        id: impl Into<String>,
        regla: impl Into<String>,
        contenido: Value,
        success: bool,
        response: Value,
        fecha_evento: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            regla: regla.into(),
            contenido,
            success,
            response,
            fecha_evento,
        }
    }
}
