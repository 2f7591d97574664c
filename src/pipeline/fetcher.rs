use tracing::{debug, warn};

use super::document::{Document, documentize};
use crate::pubmed::LiteratureSearch;

/// Fetch and normalize literature for a batch of search terms.
///
/// Queries run sequentially in input order and per-query result order is
/// preserved. A failing query is logged and skipped; one failure never
/// aborts the batch, and an all-fail batch yields an empty list rather
/// than an error.
pub async fn fetch_literature(
    client: &impl LiteratureSearch,
    queries: &[String],
    max_results: u32,
) -> Vec<Document> {
    let mut documents = Vec::new();
    for query in queries.iter().filter(|q| !q.trim().is_empty()) {
        match client.query(query, max_results).await {
            Ok(articles) => {
                debug!(query = %query, hits = articles.len(), "fetched articles");
                documents.extend(articles.into_iter().map(documentize));
            }
            Err(e) => {
                warn!(query = %query, error = %e, "PubMed query failed (continuing with remaining queries)");
            }
        }
    }
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::stubs::MockSearch;
    use crate::pubmed::{PubMedError, RawArticle};

    fn article(title: &str) -> RawArticle {
        RawArticle {
            title: Some(title.to_string()),
            ..RawArticle::default()
        }
    }

    fn queries(terms: &[&str]) -> Vec<String> {
        terms.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn aggregates_results_in_query_order() {
        let search = MockSearch::with_results(vec![
            Ok(vec![article("A1"), article("A2")]),
            Ok(vec![article("B1")]),
        ]);

        let documents =
            fetch_literature(&search, &queries(&["alpha", "beta"]), 3).await;

        let titles: Vec<&str> = documents.iter().map(|d| d.meta.title.as_str()).collect();
        assert_eq!(titles, vec!["A1", "A2", "B1"]);
        assert_eq!(search.captured_terms(), vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn one_failing_query_does_not_abort_the_batch() {
        let search = MockSearch::with_results(vec![
            Ok(vec![article("A1")]),
            Err(PubMedError::RateLimited),
            Ok(vec![article("C1")]),
        ]);

        let documents =
            fetch_literature(&search, &queries(&["alpha", "beta", "gamma"]), 3).await;

        let titles: Vec<&str> = documents.iter().map(|d| d.meta.title.as_str()).collect();
        assert_eq!(titles, vec!["A1", "C1"]);
        assert_eq!(search.captured_terms(), vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn all_failures_yield_empty_list() {
        let search = MockSearch::with_results(vec![
            Err(PubMedError::RateLimited),
            Err(PubMedError::RateLimited),
        ]);

        let documents = fetch_literature(&search, &queries(&["alpha", "beta"]), 3).await;
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn blank_queries_are_skipped() {
        let search = MockSearch::with_results(vec![Ok(vec![article("A1")])]);

        let documents =
            fetch_literature(&search, &queries(&["", "  ", "alpha"]), 3).await;

        assert_eq!(documents.len(), 1);
        assert_eq!(search.captured_terms(), vec!["alpha"]);
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let search = MockSearch::with_results(vec![]);
        let documents = fetch_literature(&search, &[], 3).await;
        assert!(documents.is_empty());
        assert!(search.captured_terms().is_empty());
    }

    #[tokio::test]
    async fn passes_result_cap_through() {
        let search = MockSearch::with_results(vec![Ok(vec![])]);
        fetch_literature(&search, &queries(&["alpha"]), 7).await;
        assert_eq!(search.captured_caps(), vec![7]);
    }
}
