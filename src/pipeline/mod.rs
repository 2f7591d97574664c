//! RAG orchestration: question → keywords → PubMed retrieval → grounded
//! answer. The five stages run as a fixed, statically ordered sequence of
//! calls; each stage's output is the next stage's sole input.

mod document;
mod fetcher;
pub(crate) mod prompt;

pub use document::{Document, DocumentMeta, documentize};
pub use fetcher::fetch_literature;

use tracing::{debug, info};

use crate::pubmed::LiteratureSearch;
use crate::tgi::{DecodeConfig, Generator, TgiError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("question is blank")]
    BlankQuestion,

    #[error("the model returned no replies")]
    EmptyReply,

    #[error("keyword generation failed: {0}")]
    KeywordGeneration(#[source] TgiError),

    #[error("answer generation failed: {0}")]
    AnswerGeneration(#[source] TgiError),
}

/// The fixed question-answering flow over warmed collaborator handles.
/// Holds no mutable state, so one instance can serve concurrent `ask`
/// calls from independent callers.
pub struct Pipeline<K, A, L> {
    keyword_llm: K,
    answer_llm: A,
    literature: L,
    max_results: u32,
    answer_overrides: DecodeConfig,
}

impl<K, A, L> Pipeline<K, A, L>
where
    K: Generator,
    A: Generator,
    L: LiteratureSearch,
{
    pub fn new(
        keyword_llm: K,
        answer_llm: A,
        literature: L,
        max_results: u32,
        answer_overrides: DecodeConfig,
    ) -> Self {
        Self {
            keyword_llm,
            answer_llm,
            literature,
            max_results,
            answer_overrides,
        }
    }

    /// Run one question through the pipeline. Consumes the first candidate
    /// reply at both generation stages. Blank input is rejected before any
    /// collaborator is called.
    pub async fn ask(&self, question: &str) -> Result<String, PipelineError> {
        if question.trim().is_empty() {
            return Err(PipelineError::BlankQuestion);
        }

        let keyword_replies = self
            .keyword_llm
            .generate(&prompt::keyword_prompt(question), &DecodeConfig::new())
            .await
            .map_err(PipelineError::KeywordGeneration)?;
        let keywords = keyword_replies.first().ok_or(PipelineError::EmptyReply)?;

        let queries = prompt::parse_keyword_lines(keywords);
        debug!(?queries, "derived search terms");

        let documents = fetch_literature(&self.literature, &queries, self.max_results).await;
        info!(documents = documents.len(), "literature retrieval complete");

        let answer_replies = self
            .answer_llm
            .generate(
                &prompt::answer_prompt(question, &documents),
                &self.answer_overrides,
            )
            .await
            .map_err(PipelineError::AnswerGeneration)?;
        answer_replies
            .into_iter()
            .next()
            .ok_or(PipelineError::EmptyReply)
    }
}

#[cfg(test)]
pub(crate) mod stubs {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::pubmed::{LiteratureSearch, PubMedError, RawArticle};
    use crate::tgi::{DecodeConfig, Generator, TgiError};

    /// Scripted generator: pops one response per call, records prompts.
    pub(crate) struct MockGenerator {
        responses: Mutex<VecDeque<Result<Vec<String>, TgiError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl MockGenerator {
        pub(crate) fn with_replies(replies: Vec<Vec<String>>) -> Self {
            Self {
                responses: Mutex::new(replies.into_iter().map(Ok).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(error: TgiError) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from([Err(error)])),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn captured_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl Generator for MockGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _overrides: &DecodeConfig,
        ) -> Result<Vec<String>, TgiError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// Scripted literature search: pops one result per call, records the
    /// terms and result caps it was invoked with.
    pub(crate) struct MockSearch {
        responses: Mutex<VecDeque<Result<Vec<RawArticle>, PubMedError>>>,
        terms: Mutex<Vec<String>>,
        caps: Mutex<Vec<u32>>,
    }

    impl MockSearch {
        pub(crate) fn with_results(
            results: Vec<Result<Vec<RawArticle>, PubMedError>>,
        ) -> Self {
            Self {
                responses: Mutex::new(results.into()),
                terms: Mutex::new(Vec::new()),
                caps: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn captured_terms(&self) -> Vec<String> {
            self.terms.lock().unwrap().clone()
        }

        pub(crate) fn captured_caps(&self) -> Vec<u32> {
            self.caps.lock().unwrap().clone()
        }

        pub(crate) fn calls(&self) -> usize {
            self.terms.lock().unwrap().len()
        }
    }

    impl LiteratureSearch for MockSearch {
        async fn query(
            &self,
            term: &str,
            max_results: u32,
        ) -> Result<Vec<RawArticle>, PubMedError> {
            self.terms.lock().unwrap().push(term.to_string());
            self.caps.lock().unwrap().push(max_results);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}
