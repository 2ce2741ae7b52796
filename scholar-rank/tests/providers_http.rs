//! HTTP adapter tests against a local wiremock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scholar_rank::provider::{
    PaperMetadataProvider, RepoMetadataProvider, ScoringOracle, SearchProvider, SearchRequest,
    TextGenerator,
};
use scholar_rank::providers::{
    ArxivProvider, ChatCompletionsClient, GithubProvider, TavilyProvider,
};
use scholar_rank::{RerankConfig, Reranker, ScoringMethod, SearchError};

const GCN_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/1609.02907v4</id>
    <updated>2017-02-22T09:55:36Z</updated>
    <published>2016-09-09T19:48:19Z</published>
    <title>Semi-Supervised Classification with Graph Convolutional Networks</title>
    <summary>We present a scalable approach for semi-supervised learning on graph-structured data.</summary>
    <author><name>Thomas N. Kipf</name></author>
    <author><name>Max Welling</name></author>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>
"#;

fn pyg_repo() -> serde_json::Value {
    json!({
        "full_name": "pyg-team/pytorch_geometric",
        "description": "Graph Neural Network Library for PyTorch",
        "stargazers_count": 21000,
        "forks_count": 3600,
        "language": "Python",
        "created_at": "2017-10-06T16:03:03Z",
        "updated_at": "2024-05-20T08:00:00Z",
        "topics": ["gnn", "pytorch"],
        "has_issues": true,
        "has_wiki": false,
        "has_pages": true,
        "size": 45000
    })
}

fn request(query: &str) -> SearchRequest {
    SearchRequest {
        query: query.into(),
        max_results: 4,
        depth: "basic".into(),
        include_domains: vec!["arxiv.org".into()],
        exclude_domains: vec![],
    }
}

// ---------------------------------------------------------------------------
// Tavily
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tavily_sends_expected_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({
            "api_key": "tvly-test",
            "query": "graph neural networks",
            "max_results": 4,
            "search_depth": "basic",
            "include_domains": ["arxiv.org"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "graph neural networks",
            "results": [
                {"title": "GCN", "url": "https://arxiv.org/abs/1609.02907", "content": "spectral", "score": 0.91},
                {"title": "no url", "url": "", "content": "", "score": 0.5}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = TavilyProvider::with_client(reqwest::Client::new(), &server.uri(), "tvly-test");
    let hits = provider
        .search(&request("graph neural networks"))
        .await
        .expect("search");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, "https://arxiv.org/abs/1609.02907");
    assert!((hits[0].score - 0.91).abs() < f64::EPSILON);
}

#[tokio::test]
async fn tavily_error_status_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let provider = TavilyProvider::with_client(reqwest::Client::new(), &server.uri(), "tvly-test");
    let err = provider.search(&request("gnn")).await.unwrap_err();
    assert!(matches!(err, SearchError::Provider(_)));
    assert!(err.to_string().contains("429"));
}

#[tokio::test]
async fn tavily_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let provider = TavilyProvider::with_client(reqwest::Client::new(), &server.uri(), "tvly-test");
    let err = provider.search(&request("gnn")).await.unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)));
}

// ---------------------------------------------------------------------------
// arXiv
// ---------------------------------------------------------------------------

#[tokio::test]
async fn arxiv_looks_up_by_id_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("id_list", "1609.02907"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GCN_FEED))
        .expect(1)
        .mount(&server)
        .await;

    let provider = ArxivProvider::with_client(
        reqwest::Client::new(),
        &format!("{}/api/query", server.uri()),
    );
    let paper = provider
        .fetch_by_id("1609.02907")
        .await
        .expect("fetch")
        .expect("paper present");

    assert_eq!(paper.id, "1609.02907v4");
    assert_eq!(paper.authors.len(), 2);
    assert_eq!(paper.categories, vec!["cs.LG"]);
}

#[tokio::test]
async fn arxiv_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = ArxivProvider::with_client(reqwest::Client::new(), &server.uri());
    let err = provider.fetch_by_id("1609.02907").await.unwrap_err();
    assert!(err.to_string().contains("503"));
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

#[tokio::test]
async fn github_sends_token_and_decodes_repo() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/pyg-team/pytorch_geometric"))
        .and(header("authorization", "Bearer ghp-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pyg_repo()))
        .expect(1)
        .mount(&server)
        .await;

    let provider =
        GithubProvider::with_client(reqwest::Client::new(), &server.uri(), Some("ghp-test".into()));
    let repo = provider
        .fetch_by_path("pyg-team/pytorch_geometric")
        .await
        .expect("fetch")
        .expect("repo present");

    assert_eq!(repo.full_name, "pyg-team/pytorch_geometric");
    assert_eq!(repo.stars, 21_000);
    assert_eq!(repo.language, "Python");
    assert!(!repo.has_wiki);
}

#[tokio::test]
async fn github_missing_repo_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/ghost/nothing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let provider = GithubProvider::with_client(reqwest::Client::new(), &server.uri(), None);
    let outcome = provider.fetch_by_path("ghost/nothing").await.expect("404 is not an error");
    assert!(outcome.is_none());
}

#[tokio::test]
async fn github_rate_limit_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let provider = GithubProvider::with_client(reqwest::Client::new(), &server.uri(), None);
    let err = provider.fetch_by_path("a/b").await.unwrap_err();
    assert!(err.to_string().contains("403"));
}

// ---------------------------------------------------------------------------
// Chat completions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_client_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "score these"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"scores\": []}"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChatCompletionsClient::with_client(
        reqwest::Client::new(),
        &server.uri(),
        Some("sk-test".into()),
        "gpt-4o-mini",
    );
    let reply = client.complete("score these").await.expect("complete");
    assert_eq!(reply, "{\"scores\": []}");
}

#[tokio::test]
async fn chat_client_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client =
        ChatCompletionsClient::with_client(reqwest::Client::new(), &server.uri(), None, "m");
    let err = client.generate("expand").await.unwrap_err();
    assert!(matches!(err, SearchError::Provider(_)));
}

// ---------------------------------------------------------------------------
// Full pipeline over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rerank_over_http_enriches_and_scores() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"title": "GCN", "url": "https://arxiv.org/abs/1609.02907", "content": "graph convolutional networks", "score": 0.8},
                {"title": "PyG", "url": "https://github.com/pyg-team/pytorch_geometric", "content": "graph neural network library", "score": 0.7},
                {"title": "GCN", "url": "https://arxiv.org/abs/1609.02907", "content": "duplicate", "score": 0.6}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/query"))
        .and(query_param("id_list", "1609.02907"))
        .respond_with(ResponseTemplate::new(200).set_body_string(GCN_FEED))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/pyg-team/pytorch_geometric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pyg_repo()))
        .expect(1)
        .mount(&server)
        .await;

    let config = RerankConfig {
        max_query_variants: 1,
        dispatch_delay_ms: 0,
        search_base_url: server.uri(),
        search_api_key: Some("tvly-test".into()),
        paper_base_url: format!("{}/api/query", server.uri()),
        repo_base_url: server.uri(),
        oracle_base_url: server.uri(),
        ..Default::default()
    };

    let set = Reranker::from_config(config)
        .expect("valid config")
        .rerank("graph neural networks", Some(5), ScoringMethod::RuleBased)
        .await
        .expect("rerank");

    assert_eq!(set.total_count(), 2);
    for result in set.results() {
        let record = result.rerank.as_ref().expect("score attached");
        assert!(record.diagnostic.is_none(), "{} degraded", result.url);
        assert!((0.0..=1.0).contains(&result.score));
    }
}
