//! Run Council use case
//!
//! Orchestrates the three-stage council flow: collect, rank, synthesize.

use crate::config::{CouncilConfig, CouncilConfigError};
use crate::gateway::ModelClient;
use crate::ports::llm_gateway::{LlmGateway, QueryOptions};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::dispatch::ParallelDispatcher;
use council_domain::{
    AnonymizationLabel, CouncilMetadata, CouncilOutcome, CouncilStage, CouncilState, LabelMap,
    MIN_MODELS_FOR_RANKING, Message, Model, PromptTemplate, Question, StageOneResult,
    StageThreeResult, StageTwoResult, aggregate_rankings, parse_ranking,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Input for the RunCouncil use case
#[derive(Debug, Clone)]
pub struct RunCouncilInput {
    /// The question to ask
    pub question: Question,
    /// Enable provider web search for Stage 1
    pub web_search: bool,
}

impl RunCouncilInput {
    pub fn new(question: Question) -> Self {
        Self {
            question,
            web_search: false,
        }
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }
}

/// Use case for running a council
///
/// Never fails once constructed: every model failure degrades into
/// partial output recorded in [`CouncilMetadata`].
pub struct RunCouncilUseCase<G: LlmGateway + 'static> {
    dispatcher: ParallelDispatcher<G>,
    config: Arc<CouncilConfig>,
}

impl<G: LlmGateway + 'static> RunCouncilUseCase<G> {
    pub fn new(gateway: Arc<G>, config: CouncilConfig) -> Result<Self, CouncilConfigError> {
        config.validate()?;
        let client = ModelClient::new(gateway)
            .with_policy(config.retry.clone())
            .with_timeout(config.timeout);
        Ok(Self {
            dispatcher: ParallelDispatcher::new(Arc::new(client)),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &CouncilConfig {
        &self.config
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunCouncilInput) -> CouncilOutcome {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> CouncilOutcome {
        let roster = &self.config.models;
        info!("Starting council with {} models", roster.len());
        let mut state = CouncilState::Stage1;
        debug!(?state, "council state");

        // Stage 1: Collect
        let (stage1, stage1_failed) = self.stage_collect(&input, progress).await;

        state = CouncilState::after_collect(stage1.len(), MIN_MODELS_FOR_RANKING);
        debug!(?state, "council state");
        match state {
            CouncilState::AllFailed => {
                warn!("All {} council models failed in Stage 1", roster.len());
                return CouncilOutcome::all_failed(stage1_failed);
            }
            CouncilState::InsufficientQuorum => {
                warn!(
                    "Only {} model(s) responded in Stage 1, need {} to rank",
                    stage1.len(),
                    MIN_MODELS_FOR_RANKING
                );
                return CouncilOutcome::insufficient_quorum(stage1, stage1_failed);
            }
            _ => {}
        }

        // Stage 2: Rank
        let (labels, stage2, stage2_failed) =
            self.stage_rank(input.question.content(), &stage1, progress).await;
        let aggregate = aggregate_rankings(&stage2, &labels);
        state = state.advance();
        debug!(?state, "council state");

        // Stage 3: Synthesize
        let (stage3, chairman_failed) = self
            .stage_synthesize(input.question.content(), &stage1, &stage2, progress)
            .await;
        state = state.advance();
        debug!(?state, "council state");

        let failures = stage1_failed
            .into_iter()
            .chain(stage2_failed)
            .chain(chairman_failed);
        let metadata = CouncilMetadata::completed(labels, aggregate, failures);
        if let Some(warning) = &metadata.warning {
            warn!("{}", warning);
        }

        info!("Council complete");
        let outcome = CouncilOutcome::completed(stage1, stage2, stage3, metadata);
        debug_assert_eq!(outcome.state, state);
        outcome
    }

    /// Stage 1: every council member answers the question
    async fn stage_collect(
        &self,
        input: &RunCouncilInput,
        progress: &dyn ProgressNotifier,
    ) -> (Vec<StageOneResult>, Vec<Model>) {
        let stage = CouncilStage::Collect;
        info!("{}", stage);
        progress.on_stage_start(&stage, self.config.models.len());

        let messages = [Message::user(input.question.content())];
        let options = QueryOptions::default().with_web_search(input.web_search);
        let results = self
            .dispatcher
            .dispatch_with_progress(stage, &self.config.models, &messages, &options, progress)
            .await;

        progress.on_stage_complete(&stage);

        let stage1 = results
            .successes()
            .map(|(model, response)| StageOneResult::new(model.clone(), response.text()))
            .collect();
        (stage1, results.failed_models())
    }

    /// Stage 2: every council member ranks the anonymized answers
    ///
    /// Goes to the full roster, including members that failed Stage 1.
    async fn stage_rank(
        &self,
        question: &str,
        stage1: &[StageOneResult],
        progress: &dyn ProgressNotifier,
    ) -> (LabelMap, Vec<StageTwoResult>, Vec<Model>) {
        let stage = CouncilStage::Rank;
        info!("{}", stage);

        // The roster is capped at the label capacity, so every answer gets a label
        let labels = LabelMap::assign(stage1);

        let anonymized: Vec<(AnonymizationLabel, &str)> = labels
            .iter()
            .zip(stage1)
            .map(|((label, _), result)| (*label, result.response.as_str()))
            .collect();
        let messages = [Message::user(PromptTemplate::ranking_prompt(
            question,
            &anonymized,
        ))];

        progress.on_stage_start(&stage, self.config.models.len());
        let results = self
            .dispatcher
            .dispatch_with_progress(
                stage,
                &self.config.models,
                &messages,
                &QueryOptions::default(),
                progress,
            )
            .await;
        progress.on_stage_complete(&stage);

        let stage2: Vec<StageTwoResult> = results
            .successes()
            .map(|(model, response)| {
                let text = response.text();
                let parsed = parse_ranking(text);
                debug!(model = %model, labels = parsed.len(), "parsed ranking");
                StageTwoResult::new(model.clone(), text, parsed)
            })
            .collect();

        (labels, stage2, results.failed_models())
    }

    /// Stage 3: the chairman synthesizes a final answer
    ///
    /// Returns the chairman as the second element when its call failed.
    async fn stage_synthesize(
        &self,
        question: &str,
        stage1: &[StageOneResult],
        stage2: &[StageTwoResult],
        progress: &dyn ProgressNotifier,
    ) -> (StageThreeResult, Option<Model>) {
        let stage = CouncilStage::Synthesize;
        let chairman = &self.config.chairman;
        info!("{} ({})", stage, chairman);
        progress.on_stage_start(&stage, 1);

        let messages = [Message::user(PromptTemplate::chairman_prompt(
            question, stage1, stage2,
        ))];
        let result = self
            .dispatcher
            .client()
            .query(chairman, &messages, &QueryOptions::default())
            .await;

        progress.on_task_complete(&stage, chairman, result.is_ok());
        progress.on_stage_complete(&stage);

        match result {
            Ok(response) => (StageThreeResult::new(chairman.clone(), response.text()), None),
            Err(_) => (
                StageThreeResult::synthesis_failed(chairman.clone()),
                Some(chairman.clone()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use crate::testing::{Script, ScriptedGateway, fast_policy, model, models};
    use std::sync::Mutex;

    const CHAIR: &str = "chair/model";

    fn unauthorized() -> Script {
        Script::fail(GatewayError::Http {
            status: 401,
            body: String::new(),
        })
    }

    fn use_case(gateway: &Arc<ScriptedGateway>, roster: &[&str]) -> RunCouncilUseCase<ScriptedGateway> {
        let config = CouncilConfig::new(models(roster), model(CHAIR)).with_retry(fast_policy());
        RunCouncilUseCase::new(Arc::clone(gateway), config).unwrap()
    }

    fn input(q: &str) -> RunCouncilInput {
        RunCouncilInput::new(Question::new(q).unwrap())
    }

    // The chairman prompt quotes Stage 2 replies, so match on the prompt opening
    fn is_ranking_prompt(content: &str) -> bool {
        content.starts_with("You are evaluating")
    }

    fn ranking_calls(gateway: &ScriptedGateway) -> Vec<Model> {
        gateway
            .calls()
            .into_iter()
            .filter(|c| is_ranking_prompt(&c.messages[0].content))
            .map(|c| c.model)
            .collect()
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let gateway = Arc::new(ScriptedGateway::new());
        let config = CouncilConfig::new(vec![], model(CHAIR));
        assert!(matches!(
            RunCouncilUseCase::new(gateway, config),
            Err(CouncilConfigError::EmptyRoster)
        ));
    }

    #[tokio::test]
    async fn test_happy_path() {
        let gateway = Arc::new(ScriptedGateway::new());
        let ranking = "Analysis...\nFINAL RANKING:\n1. Response B\n2. Response A\n3. Response C";
        for id in ["x", "y", "z"] {
            gateway.script(id, vec![Script::reply(&format!("{id} says hi")), Script::reply(ranking)]);
        }
        gateway.script(CHAIR, vec![Script::reply("The council concludes.")]);

        let outcome = use_case(&gateway, &["x", "y", "z"]).execute(input("Why?")).await;

        assert_eq!(outcome.state, CouncilState::Done);
        assert_eq!(outcome.stage1.len(), 3);
        assert_eq!(outcome.stage1[1].response, "y says hi");
        assert_eq!(outcome.stage2.len(), 3);
        assert_eq!(outcome.stage2[0].parsed_ranking.len(), 3);
        assert_eq!(outcome.stage3.model, model(CHAIR));
        assert_eq!(outcome.stage3.response, "The council concludes.");

        let agg = &outcome.metadata.aggregate_rankings;
        assert_eq!(agg[0].model, model("y"));
        assert_eq!(agg[0].average_rank, 1.0);
        assert_eq!(agg[0].rankings_count, 3);

        assert!(outcome.metadata.failed_models.is_empty());
        assert!(outcome.metadata.warning.is_none());
        assert_eq!(outcome.metadata.label_to_model.len(), 3);
        assert_eq!(gateway.total_calls(), 7);
    }

    #[tokio::test]
    async fn test_stage1_carries_web_search_and_later_stages_do_not() {
        let gateway = Arc::new(ScriptedGateway::new());
        use_case(&gateway, &["x", "y"])
            .execute(input("q").with_web_search(true))
            .await;

        let calls = gateway.calls();
        let (stage1, rest): (Vec<_>, Vec<_>) = calls
            .iter()
            .partition(|c| c.messages[0].content == "q");
        assert_eq!(stage1.len(), 2);
        assert!(stage1.iter().all(|c| c.options.web_search));
        assert_eq!(rest.len(), 3);
        assert!(rest.iter().all(|c| !c.options.web_search));
    }

    #[tokio::test]
    async fn test_all_failed_makes_no_further_calls() {
        let gateway = Arc::new(ScriptedGateway::new());
        for id in ["a", "b", "c", "d"] {
            gateway.always(id, unauthorized());
        }

        let outcome = use_case(&gateway, &["a", "b", "c", "d"]).execute(input("q")).await;

        assert_eq!(outcome.state, CouncilState::AllFailed);
        assert!(outcome.stage1.is_empty());
        assert!(outcome.stage2.is_empty());
        assert_eq!(outcome.stage3.model.as_str(), "error");
        assert_eq!(outcome.metadata.failed_models, models(&["a", "b", "c", "d"]));
        assert!(outcome.metadata.warning.is_none());
        assert_eq!(gateway.total_calls(), 4);
        assert_eq!(gateway.calls_for(CHAIR), 0);
    }

    #[tokio::test]
    async fn test_single_success_is_insufficient_quorum() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.always("b", unauthorized());
        gateway.always("c", unauthorized());

        let outcome = use_case(&gateway, &["a", "b", "c"]).execute(input("q")).await;

        assert_eq!(outcome.state, CouncilState::InsufficientQuorum);
        assert_eq!(outcome.stage1.len(), 1);
        assert!(outcome.stage2.is_empty());
        assert!(outcome.metadata.partial_stage1);
        assert_eq!(outcome.metadata.failed_models, models(&["b", "c"]));
        assert_eq!(
            outcome.stage3.response,
            "Only 1 model(s) responded (a). At least 2 models are needed for ranking. The remaining models failed: b, c."
        );
        // Stage 1 only: no ranking or chairman calls
        assert_eq!(gateway.total_calls(), 3);
        assert!(ranking_calls(&gateway).is_empty());
    }

    #[tokio::test]
    async fn test_ranking_dispatched_to_model_that_failed_stage1() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.script("c", vec![unauthorized()]);

        let outcome = use_case(&gateway, &["a", "b", "c"]).execute(input("q")).await;

        assert_eq!(outcome.stage1.len(), 2);
        assert_eq!(ranking_calls(&gateway), models(&["a", "b", "c"]));
        // c recovered in Stage 2, so its ranking counts
        assert!(outcome.stage2.iter().any(|r| r.model == model("c")));
        assert_eq!(outcome.metadata.failed_models, models(&["c"]));
    }

    #[tokio::test]
    async fn test_partial_failures_end_to_end() {
        let gateway = Arc::new(ScriptedGateway::new());
        let ranking = "FINAL RANKING:\n1. Response A\n2. Response C\n3. Response B";
        gateway.script("m1", vec![Script::reply("one"), Script::reply(ranking)]);
        gateway.script("m2", vec![unauthorized(), unauthorized()]);
        gateway.script("m3", vec![Script::reply("three"), unauthorized()]);
        gateway.script("m4", vec![Script::reply("four"), Script::reply(ranking)]);
        gateway.script(CHAIR, vec![Script::reply("final")]);

        let outcome = use_case(&gateway, &["m1", "m2", "m3", "m4"])
            .execute(input("q"))
            .await;

        assert_eq!(outcome.state, CouncilState::Done);
        assert_eq!(outcome.stage1.len(), 3);
        assert_eq!(ranking_calls(&gateway).len(), 4);
        assert_eq!(gateway.calls_for(CHAIR), 1);
        assert_eq!(gateway.total_calls(), 9);
        assert_eq!(outcome.stage2.len(), 2);
        assert_eq!(outcome.stage3.response, "final");
        assert_eq!(outcome.metadata.failed_models, models(&["m2", "m3"]));
        assert_eq!(
            outcome.metadata.warning.as_deref(),
            Some("Some models failed during the council process: m2, m3")
        );

        // Labels follow Stage 1 success order: A=m1, B=m3, C=m4
        let agg = &outcome.metadata.aggregate_rankings;
        assert_eq!(agg[0].model, model("m1"));
        assert_eq!(agg[1].model, model("m4"));
        assert_eq!(agg[2].model, model("m3"));
    }

    #[tokio::test]
    async fn test_chairman_failure_degrades() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.always(CHAIR, unauthorized());

        let outcome = use_case(&gateway, &["a", "b"]).execute(input("q")).await;

        assert_eq!(outcome.state, CouncilState::Done);
        assert_eq!(outcome.stage3.model, model(CHAIR));
        assert_eq!(outcome.stage3.response, "Error: Unable to generate final synthesis.");
        assert_eq!(outcome.metadata.failed_models, models(&[CHAIR]));
        assert!(outcome.metadata.warning.is_some());
        assert_eq!(outcome.stage2.len(), 2);
    }

    #[tokio::test]
    async fn test_ranking_prompt_is_anonymized() {
        let gateway = Arc::new(ScriptedGateway::new());
        use_case(&gateway, &["vendor/alpha", "vendor/beta"])
            .execute(input("q"))
            .await;

        let prompt = &gateway
            .calls()
            .into_iter()
            .find(|c| is_ranking_prompt(&c.messages[0].content))
            .unwrap()
            .messages[0]
            .content
            .clone();
        assert!(prompt.contains("Response A:\nanswer from vendor/alpha"));
        assert!(prompt.contains("Response B:\nanswer from vendor/beta"));
        assert!(!prompt.contains("Model: vendor/alpha"));

        let chairman = gateway
            .calls()
            .into_iter()
            .find(|c| c.model == model(CHAIR))
            .unwrap();
        assert!(chairman.messages[0].content.contains("Model: vendor/alpha"));
    }

    #[tokio::test]
    async fn test_malformed_rankings_tolerated() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.script("a", vec![Script::reply("one"), Script::reply("I refuse to rank.")]);
        gateway.script("b", vec![Script::reply("two"), Script::reply("")]);

        let outcome = use_case(&gateway, &["a", "b"]).execute(input("q")).await;

        assert_eq!(outcome.stage2.len(), 2);
        assert!(outcome.stage2.iter().all(|r| r.parsed_ranking.is_empty()));
        assert!(outcome.metadata.aggregate_rankings.is_empty());
        assert_eq!(outcome.stage3.model, model(CHAIR));
    }

    #[tokio::test]
    async fn test_progress_reports_each_stage() {
        #[derive(Default)]
        struct Recorder {
            events: Mutex<Vec<String>>,
        }

        impl ProgressNotifier for Recorder {
            fn on_stage_start(&self, stage: &CouncilStage, total: usize) {
                self.events
                    .lock()
                    .unwrap()
                    .push(format!("start {} {}", stage.as_str(), total));
            }
            fn on_task_complete(&self, stage: &CouncilStage, _model: &Model, success: bool) {
                self.events
                    .lock()
                    .unwrap()
                    .push(format!("task {} {}", stage.as_str(), success));
            }
            fn on_stage_complete(&self, stage: &CouncilStage) {
                self.events
                    .lock()
                    .unwrap()
                    .push(format!("done {}", stage.as_str()));
            }
        }

        let gateway = Arc::new(ScriptedGateway::new());
        let recorder = Recorder::default();
        use_case(&gateway, &["a", "b"])
            .execute_with_progress(input("q"), &recorder)
            .await;

        let events = recorder.events.lock().unwrap();
        assert_eq!(events.first().map(String::as_str), Some("start collect 2"));
        assert!(events.contains(&"start rank 2".to_string()));
        assert!(events.contains(&"start synthesize 1".to_string()));
        assert_eq!(events.last().map(String::as_str), Some("done synthesize"));
        assert_eq!(events.iter().filter(|e| e.starts_with("task")).count(), 5);
    }
}
