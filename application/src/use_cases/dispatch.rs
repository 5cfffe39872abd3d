//! Parallel dispatch of one prompt to many models
//!
//! Each model's call runs in its own tokio task. Results are joined with
//! wait-for-all semantics: a failed or panicked task only empties its own
//! slot.

use crate::gateway::{ModelClient, QueryFailure};
use crate::ports::llm_gateway::{CompletionResponse, LlmGateway, QueryOptions};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use council_domain::{CouncilStage, Message, Model};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use tracing::{debug, warn};

/// Roster-ordered results of one dispatch
///
/// Holds exactly one slot per requested model. A `None` slot has a
/// matching entry in [`failures`](Self::failures).
#[derive(Debug, Clone, Default)]
pub struct DispatchResults {
    slots: Vec<(Model, Option<CompletionResponse>)>,
    failures: Vec<QueryFailure>,
}

impl DispatchResults {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot for `model`; `None` if the model was not dispatched to
    pub fn get(&self, model: &Model) -> Option<&Option<CompletionResponse>> {
        self.slots.iter().find(|(m, _)| m == model).map(|(_, r)| r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Model, Option<&CompletionResponse>)> {
        self.slots.iter().map(|(m, r)| (m, r.as_ref()))
    }

    /// Successful responses, in roster order
    pub fn successes(&self) -> impl Iterator<Item = (&Model, &CompletionResponse)> {
        self.slots
            .iter()
            .filter_map(|(m, r)| r.as_ref().map(|r| (m, r)))
    }

    /// Models whose call failed, in roster order
    pub fn failed_models(&self) -> Vec<Model> {
        self.failures.iter().map(|f| f.model.clone()).collect()
    }

    /// Failure details, in roster order
    pub fn failures(&self) -> &[QueryFailure] {
        &self.failures
    }
}

/// Fans a message sequence out to many models through one [`ModelClient`]
pub struct ParallelDispatcher<G: LlmGateway + 'static> {
    client: Arc<ModelClient<G>>,
}

impl<G: LlmGateway + 'static> Clone for ParallelDispatcher<G> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<G: LlmGateway + 'static> ParallelDispatcher<G> {
    pub fn new(client: Arc<ModelClient<G>>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ModelClient<G> {
        &self.client
    }

    /// Query every model concurrently and wait for all of them
    pub async fn dispatch_all(
        &self,
        models: &[Model],
        messages: &[Message],
        options: &QueryOptions,
    ) -> DispatchResults {
        self.dispatch_with_progress(CouncilStage::Collect, models, messages, options, &NoProgress)
            .await
    }

    /// Like [`dispatch_all`](Self::dispatch_all), reporting each completion
    /// against `stage`
    pub async fn dispatch_with_progress(
        &self,
        stage: CouncilStage,
        models: &[Model],
        messages: &[Message],
        options: &QueryOptions,
        progress: &dyn ProgressNotifier,
    ) -> DispatchResults {
        let messages: Arc<[Message]> = messages.into();
        let mut pending = FuturesUnordered::new();

        for (slot, model) in models.iter().enumerate() {
            let client = Arc::clone(&self.client);
            let messages = Arc::clone(&messages);
            let options = options.clone();
            let task_model = model.clone();

            let handle = tokio::spawn(async move {
                client.query(&task_model, &messages, &options).await
            });
            let model = model.clone();
            pending.push(async move { (slot, model, handle.await) });
        }

        let mut slots: Vec<Option<Result<CompletionResponse, QueryFailure>>> =
            vec![None; models.len()];

        while let Some((slot, model, joined)) = pending.next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    warn!(model = %model, "Task join error: {}", e);
                    Err(QueryFailure::unknown(model.clone(), e))
                }
            };
            progress.on_task_complete(&stage, &model, result.is_ok());
            slots[slot] = Some(result);
        }

        let mut results = DispatchResults::default();
        for (model, result) in models.iter().zip(slots) {
            match result {
                Some(Ok(response)) => results.slots.push((model.clone(), Some(response))),
                Some(Err(failure)) => {
                    results.slots.push((model.clone(), None));
                    results.failures.push(failure);
                }
                None => {
                    results.slots.push((model.clone(), None));
                    results
                        .failures
                        .push(QueryFailure::unknown(model.clone(), "task never completed"));
                }
            }
        }

        debug!(
            stage = stage.as_str(),
            succeeded = results.successes().count(),
            failed = results.failures.len(),
            "dispatch complete"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::FailureKind;
    use crate::ports::llm_gateway::GatewayError;
    use crate::testing::{Script, ScriptedGateway, fast_policy, model, models};

    fn dispatcher(gateway: &Arc<ScriptedGateway>) -> ParallelDispatcher<ScriptedGateway> {
        let client = ModelClient::new(Arc::clone(gateway)).with_policy(fast_policy());
        ParallelDispatcher::new(Arc::new(client))
    }

    fn unauthorized() -> Script {
        Script::fail(GatewayError::Http {
            status: 401,
            body: String::new(),
        })
    }

    #[tokio::test]
    async fn test_one_slot_per_model_in_roster_order() {
        let gateway = Arc::new(ScriptedGateway::new());
        let roster = models(&["a", "b", "c"]);

        let results = dispatcher(&gateway)
            .dispatch_all(&roster, &[Message::user("q")], &QueryOptions::default())
            .await;

        assert_eq!(results.len(), 3);
        let order: Vec<_> = results.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(
            results.get(&model("b")).unwrap().as_ref().unwrap().text(),
            "answer from b"
        );
        assert!(results.failures().is_empty());
    }

    #[tokio::test]
    async fn test_failures_fill_their_own_slot() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.script("b", vec![unauthorized()]);
        let roster = models(&["a", "b", "c"]);

        let results = dispatcher(&gateway)
            .dispatch_all(&roster, &[Message::user("q")], &QueryOptions::default())
            .await;

        assert_eq!(results.len(), 3);
        assert!(results.get(&model("b")).unwrap().is_none());
        assert_eq!(results.failed_models(), vec![model("b")]);
        assert_eq!(results.failures()[0].kind, FailureKind::AuthError);
        assert_eq!(results.successes().count(), 2);
    }

    #[tokio::test]
    async fn test_panicking_task_is_isolated() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.script("b", vec![Script::Panic]);
        let roster = models(&["a", "b", "c"]);

        let results = dispatcher(&gateway)
            .dispatch_all(&roster, &[Message::user("q")], &QueryOptions::default())
            .await;

        assert_eq!(results.len(), 3);
        assert!(results.get(&model("a")).unwrap().is_some());
        assert!(results.get(&model("b")).unwrap().is_none());
        assert!(results.get(&model("c")).unwrap().is_some());
        assert_eq!(results.failures()[0].model, model("b"));
        assert_eq!(results.failures()[0].kind, FailureKind::Unknown);
    }

    #[tokio::test]
    async fn test_all_fail_still_one_slot_each() {
        let gateway = Arc::new(ScriptedGateway::new());
        for id in ["a", "b", "c", "d"] {
            gateway.always(id, unauthorized());
        }
        let roster = models(&["a", "b", "c", "d"]);

        let results = dispatcher(&gateway)
            .dispatch_all(&roster, &[Message::user("q")], &QueryOptions::default())
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(results.successes().count(), 0);
        assert_eq!(results.failed_models(), roster);
    }

    #[tokio::test]
    async fn test_options_passed_to_every_call() {
        let gateway = Arc::new(ScriptedGateway::new());
        let roster = models(&["a", "b"]);
        let options = QueryOptions::default().with_web_search(true);

        dispatcher(&gateway)
            .dispatch_all(&roster, &[Message::user("q")], &options)
            .await;

        let calls = gateway.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.options.web_search));
        assert!(calls.iter().all(|c| c.messages == vec![Message::user("q")]));
    }

    #[tokio::test]
    async fn test_empty_roster() {
        let gateway = Arc::new(ScriptedGateway::new());
        let results = dispatcher(&gateway)
            .dispatch_all(&[], &[Message::user("q")], &QueryOptions::default())
            .await;
        assert!(results.is_empty());
        assert_eq!(gateway.total_calls(), 0);
    }
}
