//! Google Sheets / Google Docs implementation of [`CatalogGateway`].
//!
//! Courses live in one spreadsheet range whose first row holds the column
//! headers. Knowledge text lives in one document per locale; the text is the
//! concatenation of every text run of every paragraph, in document order.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use concierge_core::config::CatalogConfig;
use concierge_core::types::{CourseRow, Locale};

use crate::error::{FetchError, Result};
use crate::gateway::CatalogGateway;

pub struct GoogleCatalogGateway {
    http: reqwest::Client,
    config: CatalogConfig,
    api_key: String,
}

impl GoogleCatalogGateway {
    pub fn new(config: CatalogConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            config,
            api_key: api_key.into(),
        })
    }

    fn values_url(&self) -> Result<Url> {
        if self.config.spreadsheet_id.trim().is_empty() {
            return Err(FetchError::NotConfigured("catalog.spreadsheet_id".into()));
        }
        endpoint(
            &self.config.sheets_base_url,
            &[
                "spreadsheets",
                &self.config.spreadsheet_id,
                "values",
                &self.config.sheet_range,
            ],
        )
    }

    fn document_url(&self, locale: Locale) -> Result<Url> {
        let doc_id = self.config.knowledge_doc(locale);
        if doc_id.trim().is_empty() {
            return Err(FetchError::NotConfigured(format!(
                "catalog.knowledge_doc_{}",
                locale.code()
            )));
        }
        endpoint(&self.config.docs_base_url, &["documents", doc_id])
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Malformed(e.without_url().to_string()))
    }
}

#[async_trait]
impl CatalogGateway for GoogleCatalogGateway {
    async fn fetch_courses(&self) -> Result<Vec<CourseRow>> {
        let url = self.values_url()?;
        let range: ValueRange = self.get_json(url).await?;
        let rows = rows_from_values(range.values)?;
        debug!(rows = rows.len(), "course rows fetched");
        Ok(rows)
    }

    async fn fetch_knowledge(&self, locale: Locale) -> Result<String> {
        let url = self.document_url(locale)?;
        let doc: Document = self
            .get_json(url)
            .await
            .map_err(|e| FetchError::Knowledge {
                locale,
                reason: e.to_string(),
            })?;
        let text = doc.plain_text();
        debug!(locale = %locale, chars = text.chars().count(), "knowledge text fetched");
        Ok(text)
    }
}

/// Append percent-encoded path segments to `base`.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base.trim_end_matches('/'))
        .map_err(|e| FetchError::NotConfigured(format!("invalid base url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::NotConfigured(format!("base url {base} cannot have a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Turn a header row plus data rows into column-keyed maps.
///
/// The API omits trailing empty cells, so short rows are padded with blanks.
fn rows_from_values(values: Vec<Vec<String>>) -> Result<Vec<CourseRow>> {
    let mut iter = values.into_iter();
    let headers: Vec<String> = match iter.next() {
        Some(h) => h.into_iter().map(|c| c.trim().to_string()).collect(),
        None => return Ok(Vec::new()),
    };
    if headers.iter().all(String::is_empty) {
        return Err(FetchError::Malformed("header row is blank".into()));
    }

    Ok(iter
        .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, h)| !h.is_empty())
                .map(|(idx, h)| (h.clone(), row.get(idx).cloned().unwrap_or_default()))
                .collect()
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Debug, Deserialize)]
struct StructuralElement {
    #[serde(default)]
    paragraph: Option<Paragraph>,
}

#[derive(Debug, Deserialize)]
struct Paragraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphElement {
    #[serde(default)]
    text_run: Option<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    #[serde(default)]
    content: String,
}

impl Document {
    fn plain_text(&self) -> String {
        self.body
            .iter()
            .flat_map(|b| &b.content)
            .filter_map(|el| el.paragraph.as_ref())
            .flat_map(|p| &p.elements)
            .filter_map(|el| el.text_run.as_ref())
            .map(|run| run.content.as_str())
            .collect()
    }
}
