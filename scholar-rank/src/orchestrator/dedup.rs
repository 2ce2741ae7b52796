//! Result deduplication by canonical URL.
//!
//! The URL string returned by the provider is the identity key; no
//! normalisation is applied. The first occurrence of each URL wins and
//! survivors keep their relative order, so earlier query variants (the
//! topic itself first) take precedence over later ones.

use std::collections::HashSet;

use crate::types::SearchResult;

/// Keep the first result for each distinct URL, preserving order.
pub fn deduplicate(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(results.len());
    let before = results.len();

    let unique: Vec<SearchResult> = results
        .into_iter()
        .filter(|result| seen.insert(result.url.clone()))
        .collect();

    tracing::debug!(before, after = unique.len(), "deduplicated results");
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(url: &str, title: &str, score: f64) -> SearchResult {
        SearchResult::new(title, url, format!("Content of {title}"), score, None)
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(deduplicate(vec![]).is_empty());
    }

    #[test]
    fn unique_urls_unchanged() {
        let results = vec![
            make_result("https://a.com", "A", 0.9),
            make_result("https://b.com", "B", 0.8),
            make_result("https://c.com", "C", 0.7),
        ];
        let deduped = deduplicate(results);
        let urls: Vec<&str> = deduped.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.com", "https://b.com", "https://c.com"]);
    }

    #[test]
    fn first_occurrence_wins_even_when_lower_scored() {
        let results = vec![
            make_result("https://a.com", "first", 0.2),
            make_result("https://b.com", "B", 0.5),
            make_result("https://a.com", "second", 0.9),
        ];
        let deduped = deduplicate(results);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "first");
        assert!((deduped[0].score - 0.2).abs() < f64::EPSILON);
        assert_eq!(deduped[1].url, "https://b.com");
    }

    #[test]
    fn url_match_is_exact() {
        let results = vec![
            make_result("https://a.com/x", "A", 0.5),
            make_result("https://a.com/x/", "A slash", 0.5),
            make_result("https://A.com/x", "A upper", 0.5),
        ];
        assert_eq!(deduplicate(results).len(), 3);
    }

    #[test]
    fn many_duplicates_collapse() {
        let results: Vec<SearchResult> = (0..12)
            .map(|i| make_result(&format!("https://site{}.com", i % 4), "t", 0.5))
            .collect();
        let deduped = deduplicate(results);
        assert_eq!(deduped.len(), 4);
        assert_eq!(deduped[3].url, "https://site3.com");
    }
}
