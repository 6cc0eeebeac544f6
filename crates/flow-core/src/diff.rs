//! El algoritmo de diff: compara `current` (si existe) contra `updated`,
//! campo a campo, con exactamente un nivel de recursión estructurada
//! (raíz → subesquema → hojas).

use chrono::Utc;
use flow_domain::{AuditChange, UnifiedRecord, ROOT_SUBSCHEMA};
use serde_json::Value;

use crate::errors::EngineError;

/// Produce una entrada por cada campo hoja que cambió, en el orden
/// declarado de `updated`; si no hubo ningún cambio, produce el único
/// centinela "No Changes".
pub fn diff<R: UnifiedRecord>(
    current: Option<&R>,
    updated: &R,
    id_rendered: &str,
) -> Result<Vec<AuditChange>, EngineError> {
    let now = Utc::now();
    let updated_value = serde_json::to_value(updated)?;
    let current_value = current.map(serde_json::to_value).transpose()?;

    let updated_obj = updated_value
        .as_object()
        .expect("UnifiedRecord siempre serializa a un objeto JSON");
    let current_obj = current_value.as_ref().and_then(Value::as_object);

    let mut changes = Vec::new();

    for (name, new_value) in updated_obj.iter() {
        if name == "id" {
            continue;
        }
        let old_value_top = current_obj.and_then(|o| o.get(name));

        if let Some(new_sub) = new_value.as_object() {
            let old_sub = old_value_top.and_then(Value::as_object);
            for (campo, sub_new) in new_sub.iter() {
                let sub_old = old_sub.and_then(|o| o.get(campo));
                let differs = sub_old.map(|v| v != sub_new).unwrap_or(true);
                if differs {
                    changes.push(AuditChange::new(
                        id_rendered,
                        name.clone(),
                        campo.clone(),
                        sub_old.cloned().unwrap_or(Value::Null),
                        sub_new.clone(),
                        now,
                    ));
                }
            }
        } else {
            let differs = old_value_top.map(|v| v != new_value).unwrap_or(true);
            if differs {
                changes.push(AuditChange::new(
                    id_rendered,
                    ROOT_SUBSCHEMA,
                    name.clone(),
                    old_value_top.cloned().unwrap_or(Value::Null),
                    new_value.clone(),
                    now,
                ));
            }
        }
    }

    if changes.is_empty() {
        changes.push(AuditChange::no_changes(id_rendered, now));
    }

    Ok(changes)
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

    subschema! {
        pub struct Contacto { telefono: String }
    }

    unified_record! {
        pub struct Cliente {
            id: ClienteId,
            maestra: Maestra,
            contacto: Contacto,
        }
    }

    fn cliente(cuenta: &str, info: &str, telefono: &str) -> Cliente {
        Cliente {
            id: ClienteId::new(cuenta.to_string()),
            maestra: Maestra { info: info.to_string() },
            contacto: Contacto { telefono: telefono.to_string() },
        }
    }

    #[test]
    fn s1_new_record_emits_one_change_per_set_field() {
        let updated = cliente("CLI001", "hello", "555");
        let changes = diff(None, &updated, "CLI001").unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].subesquema, "maestra");
        assert_eq!(changes[0].campo, "info");
        assert_eq!(changes[0].old_value, Value::Null);
        assert_eq!(changes[0].new_value, serde_json::json!("hello"));
    }

    #[test]
    fn s2_idempotent_replay_emits_no_changes_sentinel() {
        let current = cliente("CLI001", "hello", "555");
        let updated = cliente("CLI001", "hello", "555");
        let changes = diff(Some(&current), &updated, "CLI001").unwrap();
        assert_eq!(changes.len(), 1);
        assert!(changes[0].is_no_changes());
    }

    #[test]
    fn s3_subschema_field_update_emits_single_change() {
        let current = cliente("CLI001", "hello", "555");
        let updated = cliente("CLI001", "world", "555");
        let changes = diff(Some(&current), &updated, "CLI001").unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].subesquema, "maestra");
        assert_eq!(changes[0].campo, "info");
        assert_eq!(changes[0].old_value, serde_json::json!("hello"));
        assert_eq!(changes[0].new_value, serde_json::json!("world"));
    }

    composite_id! {
        pub struct EntidadId { slug: String }
    }

    // Una identidad compuesta secundaria: serializa como cadena, no como
    // objeto, así que el diff la trata bajo el tag sintético "root" igual
    // que un escalar -- el caso "(scalar or Composite-ID)" del algoritmo.
    composite_id! {
        pub struct EtiquetaId { valor: String }
    }

    subschema! {
        pub struct Datos { valor: String }
    }

    unified_record! {
        pub struct EntidadConRaiz {
            id: EntidadId,
            etiqueta: EtiquetaId,
            datos: Datos,
        }
    }

    #[test]
    fn s4_root_level_composite_id_change_is_tagged_root() {
        let current = EntidadConRaiz {
            id: EntidadId::new("e1".to_string()),
            etiqueta: EtiquetaId::new("a".to_string()),
            datos: Datos { valor: "x".to_string() },
        };
        let updated = EntidadConRaiz {
            id: EntidadId::new("e1".to_string()),
            etiqueta: EtiquetaId::new("b".to_string()),
            datos: Datos { valor: "x".to_string() },
        };
        let changes = diff(Some(&current), &updated, "e1").unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].subesquema, ROOT_SUBSCHEMA);
        assert_eq!(changes[0].campo, "etiqueta");
    }
}
