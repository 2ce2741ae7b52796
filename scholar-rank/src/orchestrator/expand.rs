//! Query expansion: one topic in, an ordered list of query variants out.
//!
//! The first variant is always the topic itself. The fan-out stage only
//! dispatches the first few variants, but the full list length still drives
//! the per-variant result budget.

use std::sync::Arc;

use async_trait::async_trait;

use crate::provider::TextGenerator;

/// Produces search query variants for a topic.
#[async_trait]
pub trait QueryExpander: Send + Sync {
    /// Expand `topic` into an ordered, non-empty list of queries.
    async fn expand(&self, topic: &str) -> Vec<String>;
}

/// Field keywords and the query suffixes they unlock. The first matching
/// field wins.
const FIELD_SUFFIXES: &[(&[&str], &[&str])] = &[
    (
        &[
            "deep learning",
            "neural network",
            "ai",
            "artificial intelligence",
        ],
        &["model", "dataset", "benchmark", "pytorch", "tensorflow"],
    ),
    (
        &["computer vision", "cv"],
        &["opencv", "detection", "segmentation"],
    ),
    (
        &["nlp", "language", "text"],
        &["transformer", "bert", "huggingface"],
    ),
    (
        &["algorithm", "algorithms"],
        &["implementation", "complexity", "optimization"],
    ),
];

const ACADEMIC_SUFFIXES: &[&str] = &[
    "paper",
    "implementation",
    "github",
    "arxiv",
    "algorithm",
    "code",
    "research",
];

/// Fixed template expansion tuned for research material.
#[derive(Debug, Clone, Copy)]
pub struct AcademicExpander {
    academic_only: bool,
}

impl AcademicExpander {
    /// `academic_only = false` switches to the general tutorial-oriented
    /// template.
    pub fn new(academic_only: bool) -> Self {
        Self { academic_only }
    }

    /// Build the variant list synchronously.
    pub fn variants(&self, topic: &str) -> Vec<String> {
        if !self.academic_only {
            return vec![
                topic.to_owned(),
                format!("{topic} tutorial"),
                format!("{topic} documentation"),
                format!("{topic} examples"),
                format!("awesome {topic}"),
                format!("{topic} tools"),
            ];
        }

        let mut queries = vec![topic.to_owned()];
        queries.extend(ACADEMIC_SUFFIXES.iter().map(|s| format!("{topic} {s}")));

        let lower = topic.to_lowercase();
        if let Some((_, suffixes)) = FIELD_SUFFIXES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        {
            queries.extend(suffixes.iter().map(|s| format!("{topic} {s}")));
        }
        queries
    }
}

#[async_trait]
impl QueryExpander for AcademicExpander {
    async fn expand(&self, topic: &str) -> Vec<String> {
        self.variants(topic)
    }
}

/// Expansion delegated to an external text generator, falling back to
/// [`AcademicExpander`] when the generator fails or yields nothing usable.
pub struct GeneratedExpander {
    generator: Arc<dyn TextGenerator>,
    fallback: AcademicExpander,
}

impl GeneratedExpander {
    pub fn new(generator: Arc<dyn TextGenerator>, fallback: AcademicExpander) -> Self {
        Self {
            generator,
            fallback,
        }
    }
}

#[async_trait]
impl QueryExpander for GeneratedExpander {
    async fn expand(&self, topic: &str) -> Vec<String> {
        match self.generator.generate(&expansion_prompt(topic)).await {
            Ok(reply) => {
                let queries = parse_generated_queries(&reply, topic);
                if queries.len() > 1 {
                    tracing::debug!(count = queries.len(), "generated query variants");
                    return queries;
                }
                tracing::warn!("generator reply held no queries, using template expansion");
            }
            Err(e) => {
                tracing::warn!(error = %e, "query generation failed, using template expansion");
            }
        }
        self.fallback.variants(topic)
    }
}

fn expansion_prompt(topic: &str) -> String {
    format!(
        "You are a topic research expert. Expand the following topic into search \
         queries that find high-quality papers, code and datasets.\n\n\
         Topic: {topic}\n\n\
         Return in the following format:\n\n\
         Extended Keywords:\n- keyword1\n- keyword2\n\n\
         Recommended Search Queries:\n- query1\n- query2\n- query3\n\n\
         Provide 3-5 search queries."
    )
}

/// Extract `- ` bullets from the queries section of a generator reply.
///
/// When the reply has no section mentioning "queries", every bullet counts.
/// The topic is prepended unless the reply already lists it.
pub(crate) fn parse_generated_queries(reply: &str, topic: &str) -> Vec<String> {
    let has_heading = reply
        .lines()
        .any(|line| is_queries_heading(line.trim()));

    let mut in_queries = !has_heading;
    let mut queries: Vec<String> = Vec::new();

    for line in reply.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(item) = line.strip_prefix("- ") {
            let item = item.trim();
            if in_queries && !item.is_empty() && !queries.iter().any(|q| q == item) {
                queries.push(item.to_owned());
            }
        } else if has_heading {
            in_queries = is_queries_heading(line);
        }
    }

    if !queries.iter().any(|q| q.eq_ignore_ascii_case(topic)) {
        queries.insert(0, topic.to_owned());
    }
    queries
}

fn is_queries_heading(line: &str) -> bool {
    !line.starts_with("- ") && line.to_lowercase().contains("queries")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SearchError};

    struct FixedGenerator(Result<String>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(SearchError::Provider(e.to_string())),
            }
        }
    }

    #[test]
    fn academic_template_for_plain_topic() {
        let queries = AcademicExpander::new(true).variants("graph databases");
        assert_eq!(queries.len(), 8);
        assert_eq!(queries[0], "graph databases");
        assert_eq!(queries[1], "graph databases paper");
        assert_eq!(queries[7], "graph databases research");
    }

    #[test]
    fn neural_topic_gets_model_suffixes() {
        let queries = AcademicExpander::new(true).variants("graph neural networks");
        assert_eq!(queries.len(), 13);
        assert!(queries.contains(&"graph neural networks pytorch".to_owned()));
    }

    #[test]
    fn first_matching_field_wins() {
        // "language" would match the NLP field, but the AI field comes first.
        let queries = AcademicExpander::new(true).variants("deep learning for language");
        assert!(queries.iter().any(|q| q.ends_with(" benchmark")));
        assert!(!queries.iter().any(|q| q.ends_with(" bert")));
    }

    #[test]
    fn general_template() {
        let queries = AcademicExpander::new(false).variants("rust");
        assert_eq!(
            queries,
            vec![
                "rust",
                "rust tutorial",
                "rust documentation",
                "rust examples",
                "awesome rust",
                "rust tools"
            ]
        );
    }

    #[test]
    fn parses_queries_section_only() {
        let reply = "Extended Keywords:\n- GNN\n- message passing\n\n\
                     Recommended Search Queries:\n- GNN survey\n- graph convolution paper\n- \n";
        let queries = parse_generated_queries(reply, "graph neural networks");
        assert_eq!(
            queries,
            vec!["graph neural networks", "GNN survey", "graph convolution paper"]
        );
    }

    #[test]
    fn headingless_reply_uses_every_bullet() {
        let queries = parse_generated_queries("- a\n- b\n- a", "topic");
        assert_eq!(queries, vec!["topic", "a", "b"]);
    }

    #[test]
    fn topic_not_duplicated() {
        let reply = "Search Queries:\n- Graph Neural Networks\n- gnn benchmark";
        let queries = parse_generated_queries(reply, "graph neural networks");
        assert_eq!(queries.len(), 2);
    }

    #[tokio::test]
    async fn generated_expander_uses_generator() {
        let generator = Arc::new(FixedGenerator(Ok(
            "Recommended Search Queries:\n- gnn survey\n- gnn pytorch".into(),
        )));
        let expander = GeneratedExpander::new(generator, AcademicExpander::new(true));
        let queries = expander.expand("gnn").await;
        assert_eq!(queries, vec!["gnn", "gnn survey", "gnn pytorch"]);
    }

    #[tokio::test]
    async fn generated_expander_falls_back_on_failure() {
        let generator = Arc::new(FixedGenerator(Err(SearchError::Provider("down".into()))));
        let expander = GeneratedExpander::new(generator, AcademicExpander::new(true));
        let queries = expander.expand("graph databases").await;
        assert_eq!(queries, AcademicExpander::new(true).variants("graph databases"));
    }

    #[tokio::test]
    async fn generated_expander_falls_back_on_empty_reply() {
        let generator = Arc::new(FixedGenerator(Ok("I cannot help with that.".into())));
        let expander = GeneratedExpander::new(generator, AcademicExpander::new(false));
        let queries = expander.expand("rust").await;
        assert_eq!(queries.len(), 6);
    }
}
