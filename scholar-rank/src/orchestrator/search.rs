//! Search fan-out: one provider call per query variant, run concurrently.
//!
//! Variant calls are staggered by a fixed pacing delay (variant *i* starts
//! after *i* × delay) to stay under provider rate limits, but otherwise run
//! concurrently inside the calling task. A failing variant is logged and
//! contributes nothing; only the failure of every variant is an error.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use crate::config::RerankConfig;
use crate::error::{Result, SearchError};
use crate::provider::{SearchProvider, SearchRequest};
use crate::types::{SearchResult, SearchResultSet};

/// Dispatches query variants to a [`SearchProvider`].
pub struct SearchFanout {
    provider: Arc<dyn SearchProvider>,
    config: RerankConfig,
}

impl SearchFanout {
    pub fn new(provider: Arc<dyn SearchProvider>, config: &RerankConfig) -> Self {
        Self {
            provider,
            config: config.clone(),
        }
    }

    /// Results requested from each variant.
    ///
    /// Uses the number of variants supplied, before capping, so long
    /// expansion lists lower the per-call budget.
    pub fn per_variant_budget(&self, target: usize, variant_count: usize) -> usize {
        let share = target / variant_count.max(1);
        share.max(self.config.min_results_per_variant)
    }

    /// Run the fan-out for `topic`.
    ///
    /// `variants` is the expander output; an empty list searches the topic
    /// alone. The returned set holds every hit in variant order, duplicates
    /// included.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::AllVariantsFailed`] if every dispatched
    /// variant call fails.
    pub async fn search(
        &self,
        topic: &str,
        target: usize,
        variants: &[String],
    ) -> Result<SearchResultSet> {
        let started = Instant::now();
        let fallback = [topic.to_owned()];
        let variants = if variants.is_empty() {
            &fallback[..]
        } else {
            variants
        };

        let budget = self.per_variant_budget(target, variants.len());
        let include_domains = self.config.effective_include_domains();
        let dispatched: Vec<&String> = variants
            .iter()
            .take(self.config.max_query_variants)
            .collect();
        let pacing = Duration::from_millis(self.config.dispatch_delay_ms);

        tracing::debug!(
            variants = dispatched.len(),
            supplied = variants.len(),
            budget,
            "dispatching query variants"
        );

        let calls = dispatched.iter().enumerate().map(|(i, query)| {
            let request = SearchRequest {
                query: (*query).clone(),
                max_results: budget,
                depth: self.config.search_depth.clone(),
                include_domains: include_domains.clone(),
                exclude_domains: self.config.exclude_domains.clone(),
            };
            let delay = pacing * i as u32;
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                tracing::trace!(query = %request.query, "variant search");
                self.provider.search(&request).await
            }
        });
        let outcomes = futures::future::join_all(calls).await;

        let mut results: Vec<SearchResult> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        for (query, outcome) in dispatched.iter().zip(outcomes) {
            match outcome {
                Ok(hits) => {
                    tracing::debug!(count = hits.len(), "variant returned results");
                    results.extend(hits.into_iter().map(|hit| {
                        SearchResult::new(hit.title, hit.url, hit.content, hit.score, hit.published_date)
                    }));
                }
                Err(err) => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        error = %err,
                        "variant search failed"
                    );
                    errors.push(format!("'{query}': {err}"));
                }
            }
        }

        if errors.len() == dispatched.len() {
            return Err(SearchError::AllVariantsFailed(errors.join("; ")));
        }

        let mut filters = BTreeMap::new();
        filters.insert("max_results".to_owned(), json!(target));
        filters.insert("search_depth".to_owned(), json!(self.config.search_depth));
        filters.insert("include_domains".to_owned(), json!(include_domains));
        filters.insert("exclude_domains".to_owned(), json!(self.config.exclude_domains));
        filters.insert("academic_only".to_owned(), json!(self.config.academic_only));
        filters.insert("query_variants".to_owned(), json!(dispatched));

        Ok(SearchResultSet::new(topic, results, started.elapsed(), filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderHit;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns three hits per query and fails for queries containing "fail".
    struct RecordingProvider {
        requests: Mutex<Vec<(SearchRequest, Duration)>>,
        started: Instant,
    }

    impl RecordingProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                started: Instant::now(),
            })
        }

        fn requests(&self) -> Vec<(SearchRequest, Duration)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchProvider for RecordingProvider {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<ProviderHit>> {
            self.requests
                .lock()
                .unwrap()
                .push((request.clone(), self.started.elapsed()));
            if request.query.contains("fail") {
                return Err(SearchError::Provider("HTTP 500".into()));
            }
            Ok((0..3)
                .map(|i| ProviderHit {
                    title: format!("{} #{i}", request.query),
                    url: format!("https://arxiv.org/abs/{}.{i}", request.query.len()),
                    content: String::new(),
                    score: 0.5,
                    published_date: None,
                })
                .collect())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn variants(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    fn fanout(provider: Arc<RecordingProvider>, config: RerankConfig) -> SearchFanout {
        SearchFanout::new(provider, &config)
    }

    #[test]
    fn budget_uses_supplied_variant_count() {
        let f = fanout(RecordingProvider::new(), RerankConfig::default());
        assert_eq!(f.per_variant_budget(10, 8), 3);
        assert_eq!(f.per_variant_budget(30, 2), 15);
        assert_eq!(f.per_variant_budget(5, 0), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn caps_variants_and_paces_dispatch() {
        let provider = RecordingProvider::new();
        let f = fanout(provider.clone(), RerankConfig::default());
        let set = f
            .search("gnn", 10, &variants(&["gnn", "gnn paper", "gnn code", "gnn arxiv"]))
            .await
            .expect("fan-out");

        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        for (i, (request, at)) in requests.iter().enumerate() {
            assert_eq!(request.max_results, 3);
            assert_eq!(request.depth, "basic");
            assert_eq!(request.include_domains, vec!["arxiv.org", "github.com", "huggingface.co"]);
            assert!(*at >= Duration::from_millis(100 * i as u64));
        }
        assert_eq!(set.total_count(), 9);
        assert_eq!(set.query(), "gnn");
        assert_eq!(set.applied_filters()["query_variants"], json!(["gnn", "gnn paper", "gnn code"]));
        assert_eq!(set.applied_filters()["max_results"], json!(10));
        assert_eq!(set.applied_filters()["academic_only"], json!(true));
    }

    #[tokio::test]
    async fn failing_variant_is_contained() {
        let provider = RecordingProvider::new();
        let config = RerankConfig {
            dispatch_delay_ms: 0,
            ..Default::default()
        };
        let set = fanout(provider, config)
            .search("gnn", 10, &variants(&["gnn", "gnn fail"]))
            .await
            .expect("partial success");
        assert_eq!(set.total_count(), 3);
    }

    #[tokio::test]
    async fn all_variants_failing_is_error() {
        let config = RerankConfig {
            dispatch_delay_ms: 0,
            ..Default::default()
        };
        let err = fanout(RecordingProvider::new(), config)
            .search("fail", 10, &variants(&["fail", "fail again"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::AllVariantsFailed(_)));
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn empty_variant_list_searches_topic() {
        let provider = RecordingProvider::new();
        let set = fanout(provider.clone(), RerankConfig::default())
            .search("gnn", 10, &[])
            .await
            .expect("fan-out");
        assert_eq!(provider.requests()[0].0.query, "gnn");
        assert_eq!(set.total_count(), 3);
    }

    #[tokio::test]
    async fn general_mode_sends_no_allow_list() {
        let provider = RecordingProvider::new();
        let config = RerankConfig {
            academic_only: false,
            exclude_domains: vec!["pinterest.com".into()],
            ..Default::default()
        };
        fanout(provider.clone(), config)
            .search("rust", 10, &variants(&["rust"]))
            .await
            .expect("fan-out");
        let (request, _) = &provider.requests()[0];
        assert!(request.include_domains.is_empty());
        assert_eq!(request.exclude_domains, vec!["pinterest.com"]);
    }
}
