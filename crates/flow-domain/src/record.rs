//! Núcleo de esquema del registro unificado: una entidad raíz identificada
//! por un `CompositeId`, cuyos demás campos declarados deben ser, cada uno,
//! un subesquema estructurado (nunca un escalar suelto).
//!
//! `"root"` es un nombre reservado: no puede declararse como subesquema,
//! se usa como etiqueta sintética en los cambios de auditoría cuando un
//! campo de nivel superior resulta ser escalar (o, de forma notable, otra
//! identidad compuesta -- que serializa como cadena, no como objeto).

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::SchemaDefinitionError;
use crate::id::CompositeId;

/// Nombre reservado para cambios de campos escalares de nivel superior.
pub const ROOT_SUBSCHEMA: &str = "root";

/// Marca de tipo para un subesquema: un registro estructurado (nunca un
/// escalar) que puede anidarse un nivel dentro de un `UnifiedRecord`.
///
/// Se implementa sólo vía el macro `subschema!`, que además garantiza
/// en tiempo de compilación que el tipo serializa a un objeto JSON.
pub trait Subschema: Serialize + DeserializeOwned + Clone + std::fmt::Debug {}

/// Registro raíz: identificado por `Id`, con una lista declarada (y
/// ordenada) de nombres de subesquema.
pub trait UnifiedRecord: Serialize + DeserializeOwned + Clone + std::fmt::Debug {
    type Id: CompositeId;

    /// Nombres de los subesquemas declarados, en el orden de declaración.
    /// No incluye el campo `id`.
    const SUBSCHEMAS: &'static [&'static str];

    fn id(&self) -> &Self::Id;

    /// Valida que el esquema no reutilice el nombre reservado `"root"` y
    /// que declare al menos un subesquema. Se invoca una vez al registrar
    /// una regla, no en cada operación.
    fn validate_schema() -> Result<(), SchemaDefinitionError> {
        if Self::SUBSCHEMAS.is_empty() {
            return Err(SchemaDefinitionError::EmptySchema);
        }
        if Self::SUBSCHEMAS.iter().any(|s| *s == ROOT_SUBSCHEMA) {
            return Err(SchemaDefinitionError::ReservedName(ROOT_SUBSCHEMA.to_string()));
        }
        Ok(())
    }
}

/// Declara un subesquema: una struct serde normal que implementa `Subschema`.
#[macro_export]
macro_rules! subschema {
    (
        $(#[$meta:meta])*
        pub struct $name:ident { $($field:ident : $fty:ty),* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $name {
            $(pub $field: $fty,)*
        }

        impl $crate::record::Subschema for $name {}
    };
}

/// Declara un registro unificado: la identidad compuesta más una lista de
/// campos de subesquema, cada uno con un tipo que debe implementar
/// `Subschema` (violación = error de compilación, el equivalente a un
/// `SchemaDefinitionError` en tiempo de definición).
#[macro_export]
macro_rules! unified_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            id: $idty:ty,
            $($field:ident : $fty:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $name {
            pub id: $idty,
            $(pub $field: $fty,)+
        }

        impl $name {
            #[allow(dead_code)]
            fn _assert_fields_are_subschemas() {
                fn assert_impl<T: $crate::record::Subschema>() {}
                $(assert_impl::<$fty>();)+
            }
        }

        impl $crate::record::UnifiedRecord for $name {
            type Id = $idty;
            const SUBSCHEMAS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn id(&self) -> &Self::Id {
                &self.id
            }
        }
    };
}
