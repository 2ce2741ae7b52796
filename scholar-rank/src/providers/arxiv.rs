//! arXiv query API adapter.
//!
//! The API answers `?id_list=<id>` with an Atom feed holding one `<entry>`.
//! The feed is parsed with `scraper`; arXiv-specific elements keep their
//! namespace prefix in the element name (`arxiv:comment`,
//! `arxiv:journal_ref`), so they are matched by name rather than by CSS
//! selector.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::config::RerankConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::metadata::PaperMetadata;
use crate::provider::PaperMetadataProvider;

/// arXiv Atom API client.
pub struct ArxivProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl ArxivProvider {
    /// Build a provider from config.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: &RerankConfig) -> Result<Self> {
        Ok(Self::with_client(
            http::build_client(config)?,
            &config.paper_base_url,
        ))
    }

    /// Build a provider around an existing client.
    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_owned(),
        }
    }
}

#[async_trait]
impl PaperMetadataProvider for ArxivProvider {
    async fn fetch_by_id(&self, id: &str) -> Result<Option<PaperMetadata>> {
        tracing::trace!(id, "arXiv metadata lookup");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_list", id)])
            .send()
            .await
            .map_err(|e| http::transport_error("arXiv", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Provider(format!(
                "arXiv returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| http::transport_error("arXiv", e))?;

        parse_arxiv_feed(&body)
    }
}

/// Parse an arXiv Atom feed into the record of its first entry.
///
/// Returns `Ok(None)` when the feed has no entry or the entry is an arXiv
/// API error entry (unknown identifier).
///
/// # Errors
///
/// Returns [`SearchError::Parse`] when the entry lacks a title or carries
/// unparseable dates.
pub(crate) fn parse_arxiv_feed(xml: &str) -> Result<Option<PaperMetadata>> {
    let document = Html::parse_document(xml);
    let entry_sel = Selector::parse("entry")
        .map_err(|e| SearchError::Parse(format!("invalid entry selector: {e:?}")))?;

    let Some(entry) = document.select(&entry_sel).next() else {
        return Ok(None);
    };

    let entry_id = element_text(entry, "id").unwrap_or_default();
    if entry_id.contains("/api/errors") {
        return Ok(None);
    }

    let title = element_text(entry, "title")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SearchError::Parse("arXiv entry has no title".into()))?;
    let published = element_date(entry, "published")?;
    let updated = element_date(entry, "updated")?;

    let authors = elements_named(entry, "author")
        .filter_map(|author| element_text(author, "name"))
        .filter(|name| !name.is_empty())
        .collect();

    let categories = elements_named(entry, "category")
        .filter_map(|cat| cat.value().attr("term"))
        .map(str::to_owned)
        .collect();

    Ok(Some(PaperMetadata {
        id: entry_id
            .rsplit_once("/abs/")
            .map_or(entry_id.as_str(), |(_, id)| id)
            .to_owned(),
        title,
        authors,
        abstract_text: element_text(entry, "summary").unwrap_or_default(),
        categories,
        published,
        updated,
        comment: element_text(entry, "arxiv:comment").filter(|c| !c.is_empty()),
        journal_ref: element_text(entry, "arxiv:journal_ref").filter(|j| !j.is_empty()),
    }))
}

/// All descendant elements of `root` with the given element name.
fn elements_named<'a>(
    root: ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}

/// Whitespace-normalised text of the first descendant named `name`.
fn element_text(root: ElementRef<'_>, name: &str) -> Option<String> {
    elements_named(root, name)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn element_date(root: ElementRef<'_>, name: &str) -> Result<DateTime<Utc>> {
    let raw = element_text(root, name)
        .ok_or_else(|| SearchError::Parse(format!("arXiv entry has no <{name}>")))?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SearchError::Parse(format!("invalid arXiv <{name}> date '{raw}': {e}")))
}
