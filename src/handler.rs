//! Caller-facing wrapper around the pipeline: timing, footer, and failure
//! translation. Always returns a user-safe string, never an error.

use std::time::Instant;

use tracing::{error, info};

use crate::pipeline::{Pipeline, PipelineError};
use crate::pubmed::LiteratureSearch;
use crate::text::truncate_at_boundary;
use crate::tgi::Generator;

pub const VALIDATION_MESSAGE: &str = "Please enter a valid medical question.";
pub const EMPTY_REPLY_MESSAGE: &str =
    "No response generated. Please try again with a different question.";
const ERROR_GUIDANCE: &str =
    "Error processing your question. Please try again or rephrase your question.";
const DISCLAIMER: &str = "Disclaimer: This information is for educational purposes only. \
     Consult healthcare professionals for medical advice.";

/// Upper bound on raw error text surfaced to the caller.
const MAX_ERROR_DETAIL: usize = 200;

/// Answer a question, producing either a formatted answer with footer, a
/// validation message, or a bounded error message.
pub async fn answer<K, A, L>(
    pipeline: &Pipeline<K, A, L>,
    answer_model: &str,
    question: &str,
) -> String
where
    K: Generator,
    A: Generator,
    L: LiteratureSearch,
{
    info!(question = %question, "processing question");
    let start = Instant::now();

    match pipeline.ask(question).await {
        Ok(text) => {
            let elapsed = start.elapsed().as_secs_f64();
            info!(elapsed_s = elapsed, "processing complete");
            format!(
                "{text}\n\n---\n*Response generated in {elapsed:.1}s using PubMed search and {answer_model}.*\n*{DISCLAIMER}*"
            )
        }
        Err(PipelineError::BlankQuestion) => VALIDATION_MESSAGE.to_string(),
        Err(PipelineError::EmptyReply) => EMPTY_REPLY_MESSAGE.to_string(),
        Err(e) => {
            error!(error = %e, "pipeline failed");
            format!(
                "{ERROR_GUIDANCE}\n\nError details: {}",
                truncate_at_boundary(&e.to_string(), MAX_ERROR_DETAIL)
            )
        }
    }
}
