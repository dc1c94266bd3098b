//! PubMed source implementation using the E-utilities API.

use async_trait::async_trait;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use crate::models::{Author, Paper, PaperBuilder, SearchQuery, SearchResponse};
use crate::sources::{Source, SourceError};
use crate::utils::{with_retry, HttpClient, RetryConfig};

/// PubMed E-utilities API base URL
const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

static INLINE_MARKUP: OnceLock<Regex> = OnceLock::new();

/// Formatting tags PubMed embeds inside titles and affiliations
fn inline_markup() -> &'static Regex {
    INLINE_MARKUP.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub)(?:\s[^>]*)?/?>").expect("markup pattern is a valid regex")
    })
}

/// Drop inline formatting tags, keeping their text
fn strip_inline_markup(xml: &str) -> Cow<'_, str> {
    inline_markup().replace_all(xml, "")
}

/// PubMed research source
///
/// Uses NCBI E-utilities: `esearch` for identifiers, `efetch` for one record at a time.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    base_url: String,
    search_retry: RetryConfig,
}

impl PubMedSource {
    /// Create a new PubMed source
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(Arc::new(HttpClient::new()?)))
    }

    /// Create with a custom HTTP client
    pub fn with_client(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            base_url: EUTILS_BASE_URL.to_string(),
            search_retry: RetryConfig::default(),
        }
    }

    /// Point the source at a different E-utilities root (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Retry policy for the search call
    pub fn with_search_retry(mut self, retry: RetryConfig) -> Self {
        self.search_retry = retry;
        self
    }

    /// Build E-utilities search query string
    fn build_search_params(query: &SearchQuery) -> String {
        let params = [
            ("db".to_string(), "pubmed".to_string()),
            ("term".to_string(), query.query.clone()),
            ("retmax".to_string(), query.max_results.to_string()),
            ("retmode".to_string(), "xml".to_string()),
        ];

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn search_url(&self, query: &SearchQuery) -> String {
        format!(
            "{}/esearch.fcgi?{}",
            self.base_url,
            Self::build_search_params(query)
        )
    }

    fn fetch_url(&self, id: &str) -> String {
        format!(
            "{}/efetch.fcgi?db=pubmed&id={}&retmode=xml",
            self.base_url,
            urlencoding::encode(id)
        )
    }

    /// GET a URL and return the body, mapping HTTP failures onto [`SourceError`]
    async fn get_text(client: &HttpClient, url: &str) -> Result<String, SourceError> {
        let response = client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimit);
        }
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Parse E-utilities search response XML
    pub(crate) fn parse_search_response(
        xml: &str,
        query: &str,
    ) -> Result<SearchResponse, SourceError> {
        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct ESearchResult {
            Count: Option<String>,
            IdList: Option<IdList>,
            ERROR: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        struct IdList {
            #[serde(rename = "Id", default)]
            ids: Vec<String>,
        }

        let result: ESearchResult = from_str(xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse PubMed search XML: {}", e)))?;

        let ids: Vec<String> = result
            .IdList
            .map(|list| list.ids)
            .unwrap_or_default()
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();

        if ids.is_empty() {
            if let Some(error) = result.ERROR {
                return Err(SourceError::Api(error));
            }
        }

        let mut response = SearchResponse::new(ids, query);
        if let Some(total) = result.Count.and_then(|c| c.trim().parse().ok()) {
            response = response.total_results(total);
        }
        Ok(response)
    }

    /// Parse E-utilities fetch response XML for a single record
    pub(crate) fn parse_fetch_response(xml: &str, requested_id: &str) -> Result<Paper, SourceError> {
        #[derive(Debug, Deserialize)]
        struct PubmedArticleSet {
            #[serde(rename = "PubmedArticle", default)]
            articles: Vec<PubmedArticle>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct PubmedArticle {
            MedlineCitation: Option<MedlineCitation>,
            PubmedData: Option<PubmedData>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct MedlineCitation {
            PMID: Option<Pmid>,
            Article: Option<Article>,
        }

        #[derive(Debug, Deserialize)]
        struct Pmid {
            #[serde(rename = "$text")]
            id: String,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct Article {
            Journal: Option<Journal>,
            ArticleTitle: Option<String>,
            #[serde(rename = "ELocationID", default)]
            elocation_ids: Vec<ELocationId>,
            AuthorList: Option<AuthorList>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct Journal {
            JournalIssue: Option<JournalIssue>,
            Title: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct JournalIssue {
            PubDate: Option<PubDate>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct PubDate {
            Year: Option<String>,
            MedlineDate: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        struct ELocationId {
            #[serde(rename = "@EIdType")]
            id_type: Option<String>,
            #[serde(rename = "$text", default)]
            value: String,
        }

        #[derive(Debug, Deserialize)]
        struct AuthorList {
            #[serde(rename = "Author", default)]
            authors: Vec<AuthorXml>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct AuthorXml {
            LastName: Option<String>,
            ForeName: Option<String>,
            CollectiveName: Option<String>,
            #[serde(rename = "AffiliationInfo", default)]
            affiliation_info: Vec<AffiliationInfo>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct AffiliationInfo {
            Affiliation: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct PubmedData {
            ArticleIdList: Option<ArticleIdList>,
        }

        #[derive(Debug, Deserialize)]
        struct ArticleIdList {
            #[serde(rename = "ArticleId", default)]
            ids: Vec<ArticleId>,
        }

        #[derive(Debug, Deserialize)]
        struct ArticleId {
            #[serde(rename = "@IdType")]
            id_type: Option<String>,
            #[serde(rename = "$text", default)]
            value: String,
        }

        fn non_empty(value: Option<&String>) -> Option<String> {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        let xml = strip_inline_markup(xml);
        let result: PubmedArticleSet = from_str(&xml)
            .map_err(|e| SourceError::Parse(format!("Failed to parse PubMed fetch XML: {}", e)))?;

        let article = result
            .articles
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NotFound(requested_id.to_string()))?;

        let citation = article.MedlineCitation.as_ref();
        let body = citation.and_then(|m| m.Article.as_ref());

        let pmid = citation
            .and_then(|m| m.PMID.as_ref())
            .map(|p| p.id.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| requested_id.to_string());

        let journal = body.and_then(|a| a.Journal.as_ref());

        let title = non_empty(body.and_then(|a| a.ArticleTitle.as_ref()));
        let journal_title = non_empty(journal.and_then(|j| j.Title.as_ref()));

        let publication_year = journal
            .and_then(|j| j.JournalIssue.as_ref())
            .and_then(|ji| ji.PubDate.as_ref())
            .and_then(|pd| {
                non_empty(pd.Year.as_ref()).or_else(|| {
                    // MedlineDate looks like "2019 Nov-Dec"; keep the leading year
                    pd.MedlineDate
                        .as_deref()
                        .map(|d| d.trim().chars().take(4).collect::<String>())
                        .filter(|y| y.len() == 4 && y.chars().all(|c| c.is_ascii_digit()))
                })
            });

        let doi = body
            .and_then(|a| {
                a.elocation_ids
                    .iter()
                    .find(|e| e.id_type.as_deref() == Some("doi"))
                    .map(|e| e.value.clone())
            })
            .or_else(|| {
                article
                    .PubmedData
                    .as_ref()
                    .and_then(|pd| pd.ArticleIdList.as_ref())
                    .and_then(|ail| ail.ids.iter().find(|id| id.id_type.as_deref() == Some("doi")))
                    .map(|id| id.value.clone())
            });
        let doi = non_empty(doi.as_ref());

        let authors = body
            .and_then(|a| a.AuthorList.as_ref())
            .map(|al| {
                al.authors
                    .iter()
                    .map(|author| {
                        let name = match &author.CollectiveName {
                            Some(collective) => collective.trim().to_string(),
                            None => format!(
                                "{} {}",
                                author.ForeName.as_deref().unwrap_or(""),
                                author.LastName.as_deref().unwrap_or("")
                            )
                            .trim()
                            .to_string(),
                        };
                        let affiliations = author
                            .affiliation_info
                            .iter()
                            .filter_map(|info| non_empty(info.Affiliation.as_ref()))
                            .collect();
                        Author::new(name, affiliations)
                    })
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let mut builder = PaperBuilder::new(pmid).authors(authors);
        if let Some(title) = title {
            builder = builder.title(title);
        }
        if let Some(year) = publication_year {
            builder = builder.publication_year(year);
        }
        if let Some(journal_title) = journal_title {
            builder = builder.journal(journal_title);
        }
        if let Some(doi) = doi {
            builder = builder.doi(doi);
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl Source for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    fn validate_id(&self, id: &str) -> Result<(), SourceError> {
        if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
            Ok(())
        } else {
            Err(SourceError::InvalidRequest(format!(
                "'{}' is not a PubMed identifier",
                id
            )))
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest("empty search query".to_string()));
        }

        let url = self.search_url(query);
        tracing::debug!("PubMed search: {}", url);

        let client = Arc::clone(&self.client);
        let xml = with_retry(self.search_retry, || {
            let client = Arc::clone(&client);
            let url = url.clone();
            async move { Self::get_text(&client, &url).await }
        })
        .await?;

        let response = Self::parse_search_response(&xml, &query.query)?;
        tracing::info!(
            "PubMed returned {} ids for '{}' (total hits: {})",
            response.ids.len(),
            query.query,
            response
                .total_results
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
        Ok(response)
    }

    async fn fetch_details(&self, id: &str) -> Result<Paper, SourceError> {
        self.validate_id(id)?;

        tracing::debug!("Fetching details for paper ID: {}", id);
        let xml = Self::get_text(&self.client, &self.fetch_url(id)).await?;
        Self::parse_fetch_response(&xml, id)
    }
}
