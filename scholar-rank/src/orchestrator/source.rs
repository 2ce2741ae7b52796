//! URL classification for metadata enrichment.
//!
//! Maps a result URL onto the metadata lookup it supports: an arXiv paper
//! identifier, a GitHub `owner/repo` path, or nothing.

use url::Url;

/// GitHub top-level paths that are not repository owners.
const GITHUB_RESERVED: &[&str] = &[
    "topics",
    "orgs",
    "features",
    "marketplace",
    "sponsors",
    "collections",
    "search",
    "settings",
    "explore",
    "trending",
];

/// Which metadata lookup a URL supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    /// arXiv paper identifier, e.g. `2101.00001v2` or `hep-th/9901001`.
    Paper(String),
    /// GitHub repository path, `owner/repo`.
    Repo(String),
    /// No metadata provider covers this URL.
    Unrecognized,
}

/// Classify a result URL. Unparseable URLs are unrecognised.
pub fn classify(raw: &str) -> MetadataSource {
    let Ok(parsed) = Url::parse(raw) else {
        return MetadataSource::Unrecognized;
    };
    let Some(host) = parsed.host_str().map(str::to_ascii_lowercase) else {
        return MetadataSource::Unrecognized;
    };
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match host.trim_start_matches("www.") {
        "arxiv.org" | "export.arxiv.org" => paper_id(&segments)
            .map(MetadataSource::Paper)
            .unwrap_or(MetadataSource::Unrecognized),
        "github.com" => repo_path(&segments)
            .map(MetadataSource::Repo)
            .unwrap_or(MetadataSource::Unrecognized),
        _ => MetadataSource::Unrecognized,
    }
}

/// `/abs/<id>` or `/pdf/<id>[.pdf]`; old-style ids keep their archive prefix.
fn paper_id(segments: &[&str]) -> Option<String> {
    let (kind, rest) = segments.split_first()?;
    if !matches!(*kind, "abs" | "pdf") || rest.is_empty() {
        return None;
    }
    let joined = rest.join("/");
    let id = joined.strip_suffix(".pdf").unwrap_or(&joined);
    (!id.is_empty()).then(|| id.to_owned())
}

/// `/<owner>/<repo>[/...]`, with a trailing `.git` stripped.
fn repo_path(segments: &[&str]) -> Option<String> {
    let [owner, repo, ..] = segments else {
        return None;
    };
    if GITHUB_RESERVED.contains(owner) {
        return None;
    }
    let repo = repo.strip_suffix(".git").unwrap_or(*repo);
    (!repo.is_empty()).then(|| format!("{owner}/{repo}"))
}
