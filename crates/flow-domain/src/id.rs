//! Identidad compuesta: una clave ordenada de varios campos, con
//! serialización como una única cadena (`campo1-campo2-...`) y ruta de
//! parseo inversa.
//!
//! El separador y el orden de campos los declara cada aplicación concreta
//! mediante `CompositeId`; `render`/`parse` son simétricos por construcción
//! (`parse(render(x)) == x`) siempre que los tipos de campo impriman y
//! parseen de forma estable.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::errors::IdError;

/// Clave compuesta de un registro unificado.
///
/// `new`/los campos concretos los provee el macro `composite_id!`; este
/// trait sólo fija el contrato de render/parse/igualdad que toda
/// implementación comparte.
pub trait CompositeId: Sized + Clone + fmt::Debug {
    /// Separador usado al unir los valores de campo en una sola cadena.
    const SEPARATOR: &'static str;
    /// Nombres declarados de los campos, en el orden en que se renderizan.
    const FIELDS: &'static [&'static str];

    /// Representación en cadena de cada campo, en el orden declarado.
    fn field_strings(&self) -> Vec<String>;

    /// Reconstruye la identidad a partir de las partes ya separadas.
    fn from_field_strings(parts: Vec<String>) -> Result<Self, IdError>;

    /// Cadena final: los campos unidos por `SEPARATOR`.
    fn render(&self) -> String {
        self.field_strings().join(Self::SEPARATOR)
    }

    /// Parsea la cadena producida por `render`.
    ///
    /// Una cadena vacía se rechaza como `UnderspecifiedId` -- no se
    /// suministró ningún campo. Un número de partes distinto al número de
    /// campos declarados es un `FormatError`.
    fn parse(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::UnderspecifiedId);
        }
        let parts: Vec<String> = s.split(Self::SEPARATOR).map(str::to_string).collect();
        if parts.len() != Self::FIELDS.len() {
            return Err(IdError::FormatError(format!(
                "se esperaban {} campo(s) ({}), se recibieron {}",
                Self::FIELDS.len(),
                Self::FIELDS.join(", "),
                parts.len()
            )));
        }
        Self::from_field_strings(parts)
    }
}

/// Igualdad y hash definidos sobre la cadena renderizada: dos identidades
/// del mismo tipo concreto son iguales si y sólo si rinden la misma cadena.
pub fn composite_eq<T: CompositeId>(a: &T, b: &T) -> bool {
    a.render() == b.render()
}

pub fn composite_hash<T: CompositeId, H: Hasher>(id: &T, state: &mut H) {
    id.render().hash(state);
}

/// Serializa cualquier `CompositeId` como la cadena renderizada (no como
/// un objeto con sus campos), igual que el `model_serializer` del origen.
pub fn serialize_as_str<T: CompositeId, S: Serializer>(
    id: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.render())
}

/// Deserializa desde la cadena renderizada, invocando `CompositeId::parse`.
pub fn deserialize_from_str<'de, T: CompositeId, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<T, D::Error> {
    let s = String::deserialize(deserializer)?;
    T::parse(&s).map_err(de::Error::custom)
}

/// Declara un tipo de identidad compuesta.
///
/// ```ignore
/// composite_id! {
///     pub struct ClienteId { tenant: String, cuenta: i64 }
/// }
/// ```
///
/// genera una struct con esos campos en ese orden, `ClienteId::new(...)`,
/// y la implementación de `CompositeId` (separador `-` salvo que se indique
/// `separator: "..."`).
#[macro_export]
macro_rules! composite_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident { $($field:ident : $fty:ty),+ $(,)? }
    ) => {
        $crate::composite_id! {
            $(#[$meta])*
            pub struct $name { $($field : $fty),+ } separator: "-"
        }
    };
    (
        $(#[$meta:meta])*
        pub struct $name:ident { $($field:ident : $fty:ty),+ $(,)? } separator: $sep:expr
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        pub struct $name {
            $(pub $field: $fty,)+
        }

        impl $name {
            pub fn new($($field: $fty),+) -> Self {
                Self { $($field),+ }
            }
        }

        impl $crate::id::CompositeId for $name {
            const SEPARATOR: &'static str = $sep;
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn field_strings(&self) -> Vec<String> {
                vec![$(self.$field.to_string()),+]
            }

            fn from_field_strings(parts: Vec<String>) -> Result<Self, $crate::errors::IdError> {
                let mut iter = parts.into_iter();
                $(
                    let raw = iter.next().expect("longitud ya validada por parse()");
                    let $field: $fty = raw.parse().map_err(|_| {
                        $crate::errors::IdError::FormatError(format!(
                            "campo '{}' inválido: '{}'", stringify!($field), raw
                        ))
                    })?;
                )+
                Ok(Self { $($field),+ })
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", <Self as $crate::id::CompositeId>::render(self))
            }
        }

        impl ::std::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                $crate::id::composite_eq(self, other)
            }
        }
        impl ::std::cmp::Eq for $name {}

        impl ::std::hash::Hash for $name {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                $crate::id::composite_hash(self, state)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                $crate::id::serialize_as_str(self, serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                $crate::id::deserialize_from_str(deserializer)
            }
        }

        // Una identidad compuesta serializa como una cadena simple, nunca
        // como un objeto -- puede por tanto aparecer como campo de nivel
        // superior de un registro unificado sin violar "todo campo que no
        // sea `id` es un registro estructurado": el algoritmo de diff la
        // trata bajo el tag sintético "root", igual que un escalar.
        impl $crate::record::Subschema for $name {}
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    composite_id! {
        pub struct DosAtrs { tenant: String, cuenta: i64 }
    }

    composite_id! {
        pub struct UnAtr { slug: String }
    }

    #[test]
    fn render_then_parse_roundtrips() {
        let id = DosAtrs::new("acme".to_string(), 42);
        let rendered = id.render();
        assert_eq!(rendered, "acme-42");
        let parsed = DosAtrs::parse(&rendered).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn empty_string_is_underspecified() {
        let err = DosAtrs::parse("").unwrap_err();
        assert_eq!(err, IdError::UnderspecifiedId);
    }

    #[test]
    fn wrong_arity_is_format_error() {
        let err = DosAtrs::parse("solo-un-campo-de-mas").unwrap_err();
        assert!(matches!(err, IdError::FormatError(_)));
    }

    #[test]
    fn single_field_roundtrips() {
        let id = UnAtr::new("xyz123".to_string());
        assert_eq!(UnAtr::parse(&id.render()).unwrap(), id);
    }

    #[test]
    fn equality_is_by_rendered_string() {
        let a = DosAtrs::new("acme".to_string(), 1);
        let b = DosAtrs::new("acme".to_string(), 1);
        assert_eq!(a, b);
    }

    #[test]
    fn serde_roundtrip_via_json_string() {
        let id = DosAtrs::new("acme".to_string(), 7);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"acme-7\"");
        let back: DosAtrs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn type_coercion_failure_is_format_error() {
        let err = DosAtrs::parse("acme-not-a-number").unwrap_err();
        assert!(matches!(err, IdError::FormatError(_)));
    }
}
