//! Scripted in-memory gateway shared by the use case tests

use crate::gateway::RetryPolicy;
use crate::ports::llm_gateway::{CompletionResponse, GatewayError, LlmGateway, QueryOptions};
use async_trait::async_trait;
use council_domain::{Message, Model};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn model(id: &str) -> Model {
    Model::new(id).unwrap()
}

pub fn models(ids: &[&str]) -> Vec<Model> {
    ids.iter().map(|id| model(id)).collect()
}

/// Retry policy with millisecond delays so tests don't wait
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        multiplier: Duration::from_millis(1),
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    }
}

/// One scripted gateway result
#[derive(Debug, Clone)]
pub enum Script {
    Reply(CompletionResponse),
    Fail(GatewayError),
    Panic,
}

impl Script {
    pub fn reply(text: &str) -> Self {
        Script::Reply(CompletionResponse::from_text(text))
    }

    pub fn fail(err: GatewayError) -> Self {
        Script::Fail(err)
    }
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: Model,
    pub messages: Vec<Message>,
    pub options: QueryOptions,
}

/// Gateway returning scripted results per model, in order
///
/// Once a model's script runs out it falls back to its `always` entry if
/// one was set, otherwise to `answer from <model>`.
pub struct ScriptedGateway {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    always: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<RecordedCall>>,
    total: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            always: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            total: AtomicUsize::new(0),
        }
    }

    /// Append results for `model`, consumed one per call
    pub fn script(&self, model: &str, results: Vec<Script>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .extend(results);
    }

    /// Result used for `model` whenever its script is empty
    pub fn always(&self, model: &str, result: Script) {
        self.always
            .lock()
            .unwrap()
            .insert(model.to_string(), result);
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, model: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.model.as_str() == model)
            .count()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, model: &Model) -> Script {
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model.as_str())
            .and_then(VecDeque::pop_front);
        scripted
            .or_else(|| self.always.lock().unwrap().get(model.as_str()).cloned())
            .unwrap_or_else(|| Script::reply(&format!("answer from {model}")))
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn query(
        &self,
        model: &Model,
        messages: &[Message],
        options: &QueryOptions,
    ) -> Result<CompletionResponse, GatewayError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.clone(),
            messages: messages.to_vec(),
            options: options.clone(),
        });

        match self.next(model) {
            Script::Reply(response) => Ok(response),
            Script::Fail(err) => Err(err),
            Script::Panic => panic!("scripted panic for {model}"),
        }
    }
}
