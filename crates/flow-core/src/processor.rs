//! `RuleProcessor`: el manejador de mensaje de cola. Selecciona el rule,
//! recupera el registro actual, aplica el merge, calcula el diff y, según
//! el resultado, o bien sólo audita "No Changes", o bien persiste, audita
//! todos los cambios y reparte a los tópicos afectados.

use std::collections::HashSet;

use flow_domain::UnifiedRecord;
use serde_json::Value;

use crate::diff::diff;
use crate::errors::EngineError;
use crate::ports::{BrokerClient, DocumentStore};
use crate::selector::{get_topics_by_changes, RuleSelector};

pub struct RuleProcessor<R, S, B>
where
    R: UnifiedRecord,
    S: DocumentStore<R>,
    B: BrokerClient,
{
    selector: RuleSelector<R>,
    store: S,
    broker: B,
    /// Si `true`, los cambios etiquetados "root" también disparan un envío
    /// al tópico "root" cuando ese tópico está entre los del rule.
    include_root: bool,
}

impl<R, S, B> RuleProcessor<R, S, B>
where
    R: UnifiedRecord,
    S: DocumentStore<R>,
    B: BrokerClient,
{
    pub fn new(selector: RuleSelector<R>, store: S, broker: B, include_root: bool) -> Self {
        Self { selector, store, broker, include_root }
    }

    pub fn selector(&self) -> &RuleSelector<R> {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut RuleSelector<R> {
        &mut self.selector
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    /// Procesa un mensaje ya deserializado a JSON. No hace ack por sí
    /// mismo -- el llamador (el adaptador de cola) decide cuándo
    /// confirmar, basado en si este método devuelve `Ok`.
    pub async fn handle_message(&self, raw: &Value) -> Result<(), EngineError> {
        let selection = self.selector.select(raw)?;
        let id_rendered = selection.id_rendered.clone();
        let rule_name = selection.rule_name.clone();
        let topics: HashSet<String> = selection.topics.clone();

        let current = self
            .store
            .get_unified(&id_rendered)
            .await
            .map_err(EngineError::Store)?;

        let updated = selection.apply(current.clone())?;
        let changes = diff(current.as_ref(), &updated, &id_rendered)?;

        if changes.len() == 1 && changes[0].is_no_changes() {
            self.store
                .append_audit_change(&changes[0])
                .await
                .map_err(EngineError::Store)?;
            log::debug!("rule '{rule_name}' produjo 'No Changes' para {id_rendered}");
            return Ok(());
        }

        self.store
            .upsert_unified(&id_rendered, &updated)
            .await
            .map_err(EngineError::Store)?;

        for change in &changes {
            self.store
                .append_audit_change(change)
                .await
                .map_err(EngineError::Store)?;
        }

        let fanout_topics = get_topics_by_changes(&topics, &changes, self.include_root);
        let body = serde_json::to_value(&updated)?;
        for topic in &fanout_topics {
            self.broker
                .topic_send(topic, &body)
                .await
                .map_err(EngineError::Broker)?;
        }

        log::info!(
            "rule '{rule_name}' actualizó {id_rendered}: {} cambio(s), {} tópico(s)",
            changes.len(),
            fanout_topics.len()
        );
        Ok(())
    }
}
