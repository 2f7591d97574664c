//! Prompt templates for the two generation stages, plus the keyword-line
//! parser that couples them.

use std::fmt::Write;

use super::document::Document;

/// Prompt for the keyword-extraction stage. The one-term-per-line output
/// format is load-bearing: `parse_keyword_lines` consumes it.
pub fn keyword_prompt(question: &str) -> String {
    format!(
        "\
Your task is to convert the following question into 3 keywords that can be used to find relevant medical research papers on PubMed.

IMPORTANT RULES:
1. Use Medical Subject Headings (MeSH) terms when possible
2. Be specific and precise
3. Focus on medical/clinical terminology
4. Output exactly 3 keywords, one per line
5. No explanations, just keywords

Here is an example:
question: \"What are the latest treatments for major depressive disorder?\"
keywords:
Antidepressive Agents
Depressive Disorder, Major
Treatment-Resistant depression

---
question: {question}
keywords:
"
    )
}

/// Prompt for the answer-synthesis stage, grounding the model in the
/// retrieved articles. Zero documents renders an empty article section.
pub fn answer_prompt(question: &str, documents: &[Document]) -> String {
    let mut out = format!(
        "\
Answer the question truthfully based on the given documents.
If the documents don't contain enough information, use your existing knowledge but clearly indicate what comes from documents vs general knowledge.

CRITICAL INSTRUCTIONS:
1. Base your answer primarily on the provided documents
2. If using general knowledge, state it explicitly
3. Be accurate and concise
4. Use medical terminology appropriately
5. Format your answer with clear sections if helpful

Question: {question}

Retrieved PubMed Articles:
"
    );

    for (i, document) in documents.iter().enumerate() {
        let _ = write!(
            out,
            "\n---\nArticle {}:\nTitle: {}\nKeywords: {}\nPublication Date: {}\n\nAbstract:\n{}\n",
            i + 1,
            document.meta.title,
            document.meta.keywords.join(", "),
            document.meta.publication_date,
            document.content,
        );
    }

    out.push_str("\nBased on the above information, provide a comprehensive answer:\n");
    out
}

/// Split a keyword-stage reply into a query batch: one term per line,
/// surrounding whitespace trimmed, blank lines dropped, order preserved.
/// An all-blank reply yields an empty batch, which is valid.
pub fn parse_keyword_lines(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
