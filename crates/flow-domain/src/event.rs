//! Mensaje de entrada: lleva una identidad compuesta y un payload arbitrario.
//! La identidad determina qué registro unificado se actualiza.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::id::CompositeId;

/// Un evento de origen. Cada regla declara un `model: EventType` concreto;
/// el selector intenta deserializar el mensaje crudo contra cada modelo
/// registrado, en orden, hasta que uno tenga éxito.
pub trait EventoBase: Serialize + DeserializeOwned + Clone + std::fmt::Debug {
    type Id: CompositeId;

    fn id(&self) -> &Self::Id;
}
