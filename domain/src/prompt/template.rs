//! Prompt templates for the council flow

use crate::council::label::AnonymizationLabel;
use crate::council::value_objects::{StageOneResult, StageTwoResult};

/// Templates for generating prompts at each stage
///
/// Stage 1 sends the question as-is, so it has no template here.
pub struct PromptTemplate;

impl PromptTemplate {
    /// Stage 2 prompt: evaluate anonymized answers and end with a ranking
    ///
    /// Takes `(label, answer)` pairs only, so model identities cannot leak
    /// into the prompt.
    pub fn ranking_prompt(question: &str, responses: &[(AnonymizationLabel, &str)]) -> String {
        let responses_text = responses
            .iter()
            .map(|(label, content)| format!("{}:\n{}", label, content))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are evaluating different responses to the following question:

Question: {question}

Here are the responses from different models (anonymized):

{responses_text}

Your task:
1. First, evaluate each response individually. For each response, explain what it does well and what it does poorly.
2. Then, at the very end of your response, provide a final ranking.

IMPORTANT: Your final ranking MUST be formatted EXACTLY as follows:
- Start with the line "FINAL RANKING:" (all caps, with colon)
- Then list the responses from best to worst as a numbered list
- Each line should be: number, period, space, then ONLY the response label (e.g., "1. Response A")
- Do not add any other text or explanations in the ranking section

Example of the correct format for your ENTIRE response:

Response A provides good detail on X but misses Y...
Response B is accurate but lacks depth on Z...
Response C offers the most comprehensive answer...

FINAL RANKING:
1. Response C
2. Response A
3. Response B

Now provide your evaluation and ranking:"#
        )
    }

    /// Stage 3 prompt: the chairman sees every answer and ranking with
    /// model identities attached
    pub fn chairman_prompt(
        question: &str,
        responses: &[StageOneResult],
        rankings: &[StageTwoResult],
    ) -> String {
        let stage1_text = responses
            .iter()
            .map(|r| format!("Model: {}\nResponse: {}", r.model, r.response))
            .collect::<Vec<_>>()
            .join("\n\n");

        let stage2_text = rankings
            .iter()
            .map(|r| format!("Model: {}\nRanking: {}", r.model, r.ranking))
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            r#"You are the Chairman of an LLM Council. Multiple AI models have provided responses to a user's question, and then ranked each other's responses.

Original Question: {question}

STAGE 1 - Individual Responses:
{stage1_text}

STAGE 2 - Peer Rankings:
{stage2_text}

Your task as Chairman is to synthesize all of this information into a single, comprehensive, accurate answer to the user's original question. Consider:
- The individual responses and their insights
- The peer rankings and what they reveal about response quality
- Any patterns of agreement or disagreement

Provide a clear, well-reasoned final answer that represents the council's collective wisdom:"#
        )
    }

    /// Prompt asking for a 3-5 word conversation title
    pub fn title_prompt(question: &str) -> String {
        format!(
            r#"Generate a very short title (3-5 words maximum) that summarizes the following question.
The title should be concise and descriptive. Do not use quotes or punctuation in the title.

Question: {question}

Title:"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Model;

    fn label(i: usize) -> AnonymizationLabel {
        AnonymizationLabel::for_index(i).unwrap()
    }

    #[test]
    fn test_ranking_prompt_lists_labels_in_order() {
        let prompt = PromptTemplate::ranking_prompt(
            "What is Rust?",
            &[
                (label(0), "Rust is a systems programming language."),
                (label(1), "Rust focuses on safety and performance."),
            ],
        );
        assert!(prompt.contains("Question: What is Rust?"));
        assert!(prompt.contains(
            "Response A:\nRust is a systems programming language.\n\nResponse B:\nRust focuses"
        ));
        assert!(prompt.contains("FINAL RANKING:"));
        assert!(prompt.ends_with("Now provide your evaluation and ranking:"));
    }

    #[test]
    fn test_ranking_prompt_has_no_model_identities() {
        let prompt = PromptTemplate::ranking_prompt("q", &[(label(0), "an answer")]);
        assert!(!prompt.contains("Model:"));
    }

    #[test]
    fn test_chairman_prompt_attributes_models() {
        let gpt = Model::new("openai/gpt-5.1").unwrap();
        let grok = Model::new("x-ai/grok-4").unwrap();
        let responses = vec![
            StageOneResult::new(gpt.clone(), "Answer one"),
            StageOneResult::new(grok.clone(), "Answer two"),
        ];
        let rankings = vec![StageTwoResult::new(
            grok,
            "FINAL RANKING:\n1. Response A",
            vec![label(0)],
        )];

        let prompt = PromptTemplate::chairman_prompt("Why?", &responses, &rankings);
        assert!(prompt.contains("Original Question: Why?"));
        assert!(prompt.contains("Model: openai/gpt-5.1\nResponse: Answer one"));
        assert!(prompt.contains("Model: x-ai/grok-4\nRanking: FINAL RANKING:\n1. Response A"));
        assert!(prompt.contains("STAGE 2 - Peer Rankings:"));
    }

    #[test]
    fn test_chairman_prompt_with_no_rankings() {
        let responses = vec![StageOneResult::new(Model::new("a").unwrap(), "x")];
        let prompt = PromptTemplate::chairman_prompt("q", &responses, &[]);
        assert!(prompt.contains("STAGE 2 - Peer Rankings:\n\n"));
    }

    #[test]
    fn test_title_prompt() {
        let prompt = PromptTemplate::title_prompt("How do tides work?");
        assert!(prompt.contains("Question: How do tides work?"));
        assert!(prompt.ends_with("Title:"));
    }
}
