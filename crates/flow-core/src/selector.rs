//! `RuleSelector`: dispatch dinámico por validación de prueba. Las reglas
//! se registran una vez al inicio y se consultan en orden de inserción;
//! la primera cuyo modelo deserializa el mensaje crudo gana.

use std::collections::HashSet;
use std::sync::Arc;

use flow_domain::{EventoBase, UnifiedRecord, ROOT_SUBSCHEMA};
use serde_json::Value;

use crate::errors::EngineError;

/// Estrategia de merge de un rule: pura respecto a sus entradas (el motor
/// ya entrega copias de `event` y `current`), siempre devuelve un registro
/// unificado completo, y puede construir desde cero cuando `current` es
/// `None`.
pub trait UpdateProcessor<R: UnifiedRecord>: Send + Sync {
    type Event: EventoBase<Id = R::Id>;

    fn process_message(&self, event: Self::Event, current: Option<R>) -> Result<R, EngineError>;
}

/// Forma con el tipo borrado de un rule registrado: conserva su nombre y
/// tópicos, y sabe intentar parsear un mensaje crudo contra su propio
/// modelo de evento sin exponer ese tipo concreto al selector.
pub trait DynRule<R: UnifiedRecord>: Send + Sync {
    fn name(&self) -> &str;
    fn topics(&self) -> &HashSet<String>;

    /// Intenta parsear `raw` como el modelo de este rule. `None` significa
    /// "no es mi modelo" (validación de prueba), no un error duro.
    /// En éxito, devuelve la identidad renderizada del evento y una
    /// función diferida que completa el merge una vez se conoce el
    /// registro actual.
    #[allow(clippy::type_complexity)]
    fn try_select(
        &self,
        raw: &Value,
    ) -> Option<(String, Box<dyn FnOnce(Option<R>) -> Result<R, EngineError> + Send>)>;
}

/// Adaptador genérico: une un modelo de evento y un `UpdateProcessor`
/// concretos a la forma homogénea `DynRule` que vive en la lista del
/// selector.
pub struct TypedRule<R: UnifiedRecord, P: UpdateProcessor<R>> {
    name: String,
    topics: HashSet<String>,
    processor: Arc<P>,
    _marker: std::marker::PhantomData<R>,
}

impl<R: UnifiedRecord, P: UpdateProcessor<R>> TypedRule<R, P> {
    pub fn new(name: impl Into<String>, topics: HashSet<String>, processor: P) -> Self {
        Self {
            name: name.into(),
            topics,
            processor: Arc::new(processor),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<R, P> DynRule<R> for TypedRule<R, P>
where
    R: UnifiedRecord + 'static,
    P: UpdateProcessor<R> + 'static,
    P::Event: 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn topics(&self) -> &HashSet<String> {
        &self.topics
    }

    fn try_select(
        &self,
        raw: &Value,
    ) -> Option<(String, Box<dyn FnOnce(Option<R>) -> Result<R, EngineError> + Send>)> {
        let event: P::Event = serde_json::from_value(raw.clone()).ok()?;
        let id_rendered = event.id().render();
        let processor = Arc::clone(&self.processor);
        let apply: Box<dyn FnOnce(Option<R>) -> Result<R, EngineError> + Send> =
            Box::new(move |current| processor.process_message(event, current));
        Some((id_rendered, apply))
    }
}

/// El resultado de una selección exitosa: todo lo que `RuleProcessor`
/// necesita para terminar el merge y decidir el fan-out.
pub struct Selection<R: UnifiedRecord> {
    pub id_rendered: String,
    pub rule_name: String,
    pub topics: HashSet<String>,
    apply: Box<dyn FnOnce(Option<R>) -> Result<R, EngineError> + Send>,
}

impl<R: UnifiedRecord> Selection<R> {
    pub fn apply(self, current: Option<R>) -> Result<R, EngineError> {
        (self.apply)(current)
    }
}

pub struct RuleSelector<R: UnifiedRecord> {
    rules: Vec<Box<dyn DynRule<R>>>,
}

impl<R: UnifiedRecord> RuleSelector<R> {
    pub fn new() -> Result<Self, EngineError> {
        R::validate_schema()?;
        Ok(Self { rules: Vec::new() })
    }

    /// Valida `rule.topics ⊆ {"root"} ∪ subschema-names(R)` y lo añade al
    /// final de la lista de selección.
    pub fn register_rule(&mut self, rule: Box<dyn DynRule<R>>) -> Result<(), EngineError> {
        let allowed: HashSet<&str> = std::iter::once(ROOT_SUBSCHEMA)
            .chain(R::SUBSCHEMAS.iter().copied())
            .collect();
        for topic in rule.topics() {
            if !allowed.contains(topic.as_str()) {
                return Err(EngineError::TopicNotInSchema(topic.clone()));
            }
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Itera los rules registrados en orden de inserción; devuelve la
    /// primera selección exitosa.
    pub fn select(&self, raw: &Value) -> Result<Selection<R>, EngineError> {
        for rule in &self.rules {
            if let Some((id_rendered, apply)) = rule.try_select(raw) {
                return Ok(Selection {
                    id_rendered,
                    rule_name: rule.name().to_string(),
                    topics: rule.topics().clone(),
                    apply,
                });
            }
        }
        Err(EngineError::NoMatchingRule)
    }
}

/// El conjunto (deduplicado) de tópicos a los que hay que enviar: aquellos
/// en `topics` para los que algún cambio tiene ese `subesquema`. Las
/// entradas con `subesquema = "root"` sólo se incluyen si `include_root`.
pub fn get_topics_by_changes(
    topics: &HashSet<String>,
    changes: &[flow_domain::AuditChange],
    include_root: bool,
) -> HashSet<String> {
    changes
        .iter()
        .filter(|c| include_root || c.subesquema != ROOT_SUBSCHEMA)
        .map(|c| c.subesquema.clone())
        .filter(|s| topics.contains(s))
        .collect()
}
