//! Errores del dominio: identidad compuesta y definición de esquema.

use thiserror::Error;

/// Errores al renderizar/parsear un `CompositeId`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("formato de ID inválido: {0}")]
    FormatError(String),

    #[error("ID subespecificado: no se suministró ningún campo")]
    UnderspecifiedId,
}

/// Errores de definición de esquema del registro unificado.
///
/// En este puerto la mayoría de violaciones (campo no estructurado en un
/// subesquema) se atrapan en tiempo de compilación gracias al macro
/// `subschema!`/`unified_record!` -- ver `record::Subschema`. Este tipo cubre
/// las violaciones que sólo pueden detectarse en tiempo de registro (nombres
/// reservados, tópicos repetidos, etc.).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaDefinitionError {
    #[error("el subesquema '{0}' usa un nombre reservado")]
    ReservedName(String),

    #[error("el esquema unificado no declara ningún subesquema")]
    EmptySchema,
}
