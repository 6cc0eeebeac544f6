//! Tipos de dominio compartidos por todo el pipeline: identidad compuesta,
//! el núcleo de esquema del registro unificado, eventos de entrada y las
//! entradas de auditoría que produce un merge o un intento de integración.
//!
//! Nada aquí habla con una cola, una base de datos o una API externa --
//! ese trabajo vive en `flow-broker`, `flow-store`, `flow-core` y
//! `flow-integration`, todos construidos sobre estos tipos.

pub mod audit;
pub mod errors;
pub mod event;
pub mod id;
pub mod record;

pub use audit::{AuditChange, AuditIntegration, NO_CHANGES_SUBSCHEMA};
pub use errors::{IdError, SchemaDefinitionError};
pub use event::EventoBase;
pub use id::CompositeId;
pub use record::{Subschema, UnifiedRecord, ROOT_SUBSCHEMA};
