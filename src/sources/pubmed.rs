//! PubMed research source implementation using E-utilities API.

use async_trait::async_trait;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::config::{Config, DEFAULT_EUTILS_BASE_URL};
use crate::models::{ArticleRecord, PubDate, RawAuthor, SearchQuery};
use crate::sources::{Source, SourceError};
use crate::utils::{with_retry, HttpClient, RetryConfig, DEFAULT_USER_AGENT};

/// Inline formatting tags PubMed allows inside titles and affiliations
static INLINE_MARKUP: OnceLock<Regex> = OnceLock::new();

fn inline_markup() -> &'static Regex {
    INLINE_MARKUP.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub)(?:\s[^>]*)?>").expect("inline markup pattern is valid")
    })
}

/// Remove inline formatting tags so mixed-content elements decode as plain text
fn strip_inline_markup(xml: &str) -> Cow<'_, str> {
    inline_markup().replace_all(xml, "")
}

/// PubMed research source
///
/// Uses NCBI E-utilities: `esearch` for the id list, then one `efetch` per id.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    base_url: String,
    api_key: Option<String>,
    tool: Option<String>,
    email: Option<String>,
    retry: RetryConfig,
}

impl PubMedSource {
    /// Create a new PubMed source against the public endpoint, unthrottled
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(Arc::new(HttpClient::new()?)))
    }

    /// Create a source from application configuration
    ///
    /// The HTTP client is paced at the configured (or NCBI-derived) request rate.
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let has_api_key = config.eutils.api_key.is_some();
        let client = HttpClient::with_settings(
            DEFAULT_USER_AGENT,
            Duration::from_secs(config.fetch.timeout_secs),
            Some(config.fetch.effective_requests_per_second(has_api_key)),
        )?;
        tracing::debug!(
            rate_limited = client.is_rate_limited(),
            timeout_secs = config.fetch.timeout_secs,
            "PubMed client configured"
        );

        Ok(Self {
            client: Arc::new(client),
            base_url: config.eutils.base_url.trim_end_matches('/').to_string(),
            api_key: config.eutils.api_key.clone(),
            tool: Some(config.eutils.tool.clone()).filter(|t| !t.is_empty()),
            email: config.eutils.email.clone(),
            retry: RetryConfig::default().max_attempts(config.fetch.max_attempts),
        })
    }

    /// Create with a custom HTTP client
    pub fn with_client(client: Arc<HttpClient>) -> Self {
        Self {
            client,
            base_url: DEFAULT_EUTILS_BASE_URL.to_string(),
            api_key: None,
            tool: None,
            email: None,
            retry: RetryConfig::default(),
        }
    }

    /// Override the E-utilities base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Identification parameters NCBI asks clients to send
    fn identity_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(tool) = &self.tool {
            params.push(("tool", tool.clone()));
        }
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if let Some(api_key) = &self.api_key {
            params.push(("api_key", api_key.clone()));
        }
        params
    }

    fn encode(params: &[(&'static str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Build E-utilities search URL
    fn build_search_url(&self, query: &SearchQuery) -> String {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.query.clone()),
            ("retmax", query.max_results.to_string()),
            ("retmode", "xml".to_string()),
            ("sort", query.sort_by.as_param().to_string()),
        ];

        if let Some(year) = &query.year {
            match query.date_range() {
                Some((min, max)) => {
                    params.push(("datetype", "pdat".to_string()));
                    params.push(("mindate", min));
                    params.push(("maxdate", max));
                }
                None => tracing::warn!(year = %year, "Ignoring unrecognized year filter"),
            }
        }

        params.extend(self.identity_params());

        format!("{}/esearch.fcgi?{}", self.base_url, Self::encode(&params))
    }

    /// Build E-utilities fetch URL for a single PubMed ID
    fn build_fetch_url(&self, id: &str) -> String {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("id", id.to_string()),
            ("retmode", "xml".to_string()),
        ];
        params.extend(self.identity_params());

        format!("{}/efetch.fcgi?{}", self.base_url, Self::encode(&params))
    }

    /// GET a URL and return the body, mapping HTTP status to errors
    async fn get_text(client: &HttpClient, url: &str) -> Result<String, SourceError> {
        let response = client.get(url).await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimit);
        }
        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read response: {}", e)))
    }

    /// GET with the configured retry policy
    async fn get_with_retry(&self, url: String) -> Result<String, SourceError> {
        let client = Arc::clone(&self.client);
        with_retry(self.retry, || {
            let client = Arc::clone(&client);
            let url = url.clone();
            async move { Self::get_text(&client, &url).await }
        })
        .await
    }

    /// Parse E-utilities search response XML
    fn parse_search_response(xml: &str) -> Result<Vec<String>, SourceError> {
        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct ESearchResult {
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

        if let Some(error) = result.ERROR.filter(|e| !e.trim().is_empty()) {
            return Err(SourceError::InvalidRequest(error));
        }

        Ok(result
            .IdList
            .map(|list| list.ids.into_iter().map(|id| id.trim().to_string()).collect())
            .unwrap_or_default())
    }

    /// Parse E-utilities fetch response XML into the first article's record
    fn parse_fetch_response(xml: &str) -> Result<Option<ArticleRecord>, SourceError> {
        #[derive(Debug, Deserialize)]
        struct PubmedArticleSet {
            #[serde(rename = "PubmedArticle", default)]
            articles: Vec<PubmedArticle>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct PubmedArticle {
            MedlineCitation: Option<MedlineCitation>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct MedlineCitation {
            PMID: Option<Text>,
            Article: Option<Article>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct Article {
            Journal: Option<Journal>,
            ArticleTitle: Option<Text>,
            AuthorList: Option<AuthorList>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct Journal {
            JournalIssue: Option<JournalIssue>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct JournalIssue {
            PubDate: Option<XmlPubDate>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct XmlPubDate {
            Year: Option<Text>,
            Month: Option<Text>,
            Day: Option<Text>,
        }

        #[derive(Debug, Deserialize)]
        struct AuthorList {
            #[serde(rename = "Author", default)]
            authors: Vec<Author>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct Author {
            LastName: Option<Text>,
            ForeName: Option<Text>,
            CollectiveName: Option<Text>,
            #[serde(rename = "AffiliationInfo", default)]
            affiliations: Vec<AffiliationInfo>,
        }

        #[derive(Debug, Deserialize)]
        #[allow(non_snake_case)]
        struct AffiliationInfo {
            Affiliation: Option<Text>,
        }

        #[derive(Debug, Deserialize)]
        struct Text {
            #[serde(rename = "$text", default)]
            value: String,
        }

        fn text(t: Option<Text>) -> Option<String> {
            t.map(|t| t.value.trim().to_string()).filter(|v| !v.is_empty())
        }

        let stripped = strip_inline_markup(xml);
        let result: PubmedArticleSet = from_str(&stripped)
            .map_err(|e| SourceError::Parse(format!("Failed to parse PubMed fetch XML: {}", e)))?;

        let Some(citation) = result
            .articles
            .into_iter()
            .next()
            .and_then(|a| a.MedlineCitation)
        else {
            return Ok(None);
        };

        let Some(article) = citation.Article else {
            return Ok(None);
        };

        let mut record = ArticleRecord::new(text(citation.PMID).unwrap_or_default());
        record.title = text(article.ArticleTitle);

        if let Some(date) = article
            .Journal
            .and_then(|j| j.JournalIssue)
            .and_then(|ji| ji.PubDate)
        {
            record.pub_date = PubDate {
                year: text(date.Year),
                month: text(date.Month),
                day: text(date.Day),
            };
        }

        record.authors = article
            .AuthorList
            .map(|list| {
                list.authors
                    .into_iter()
                    .map(|author| RawAuthor {
                        fore_name: text(author.ForeName),
                        last_name: text(author.LastName),
                        collective_name: text(author.CollectiveName),
                        affiliation: author
                            .affiliations
                            .into_iter()
                            .find_map(|info| text(info.Affiliation)),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Some(record))
    }
}

#[async_trait]
impl Source for PubMedSource {
    fn name(&self) -> &str {
        "PubMed"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>, SourceError> {
        let url = self.build_search_url(query);
        tracing::debug!(query = %query.query, max_results = query.max_results, "Searching PubMed");

        let xml = self.get_with_retry(url).await?;
        let ids = Self::parse_search_response(&xml)?;

        tracing::debug!(count = ids.len(), "PubMed search returned ids");
        Ok(ids)
    }

    async fn fetch_details(&self, id: &str) -> Result<Option<ArticleRecord>, SourceError> {
        self.validate_id(id)?;
        tracing::debug!(pmid = %id, "Fetching PubMed record");

        let xml = self.get_with_retry(self.build_fetch_url(id)).await?;
        let record = Self::parse_fetch_response(&xml)?.map(|mut record| {
            if record.pmid.is_empty() {
                record.pmid = id.to_string();
            }
            record
        });

        if record.is_none() {
            tracing::warn!(pmid = %id, "No article data found");
        }

        Ok(record)
    }

    fn validate_id(&self, id: &str) -> Result<(), SourceError> {
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            Ok(())
        } else {
            Err(SourceError::InvalidRequest(format!(
                "Invalid PubMed ID: {:?}",
                id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortBy;

    const FETCH_XML: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">38012345</PMID>
      <Article PubModel="Print">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <Volume>12</Volume>
            <PubDate>
              <Year>2023</Year>
              <Month>Mar</Month>
              <Day>14</Day>
            </PubDate>
          </JournalIssue>
          <Title>Journal of Testing</Title>
        </Journal>
        <ArticleTitle>Targeting <i>KRAS</i> in solid tumours.</ArticleTitle>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
            <Initials>J</Initials>
            <AffiliationInfo>
              <Affiliation>Department of Biology, Harvard University, Cambridge, MA, USA.</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <LastName>Roe</LastName>
            <ForeName>Rick</ForeName>
            <Initials>R</Initials>
            <AffiliationInfo>
              <Affiliation>Acme Biotech, Boston, MA, USA. rick.roe@acmebio.com.</Affiliation>
            </AffiliationInfo>
            <AffiliationInfo>
              <Affiliation>Second affiliation, ignored.</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <CollectiveName>KRAS Study Group</CollectiveName>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    fn source() -> PubMedSource {
        PubMedSource::new().unwrap()
    }

    #[test]
    fn test_build_search_url() {
        let url = source().build_search_url(&SearchQuery::new("machine learning").max_results(10));

        assert!(url.starts_with("https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi?"));
        assert!(url.contains("db=pubmed"));
        assert!(url.contains("term=machine%20learning"));
        assert!(url.contains("retmax=10"));
        assert!(url.contains("retmode=xml"));
        assert!(url.contains("sort=relevance"));
        assert!(!url.contains("mindate"));
    }

    #[test]
    fn test_from_config_paces_requests() {
        let mut config = Config::default();
        assert!(PubMedSource::from_config(&config).unwrap().client.is_rate_limited());

        config.fetch.requests_per_second = Some(1e-39);
        assert!(!PubMedSource::from_config(&config).unwrap().client.is_rate_limited());
    }

    #[test]
    fn test_custom_base_url() {
        let source = source().with_base_url("http://127.0.0.1:8080/eutils/");
        assert_eq!(
            source.build_fetch_url("42"),
            "http://127.0.0.1:8080/eutils/efetch.fcgi?db=pubmed&id=42&retmode=xml"
        );
    }

    #[test]
    fn test_build_search_url_with_year_and_sort() {
        let query = SearchQuery::new("cancer")
            .year("2015-2020")
            .sort_by(SortBy::PublicationDate);
        let url = source().build_search_url(&query);

        assert!(url.contains("datetype=pdat"));
        assert!(url.contains("mindate=2015%2F01%2F01"));
        assert!(url.contains("maxdate=2020%2F12%2F31"));
        assert!(url.contains("sort=pub_date"));
    }

    #[test]
    fn test_invalid_year_is_ignored() {
        let url = source().build_search_url(&SearchQuery::new("cancer").year("last year"));
        assert!(!url.contains("datetype"));
    }

    #[test]
    fn test_identity_params() {
        let mut config = Config::default();
        config.eutils.base_url = "http://localhost:1234/eutils/".to_string();
        config.eutils.api_key = Some("secret".to_string());
        config.eutils.email = Some("me@example.org".to_string());

        let source = PubMedSource::from_config(&config).unwrap();
        let url = source.build_fetch_url("123");

        assert!(url.starts_with("http://localhost:1234/eutils/efetch.fcgi?"));
        assert!(url.contains("id=123"));
        assert!(url.contains("tool=get-papers-list"));
        assert!(url.contains("email=me%40example.org"));
        assert!(url.contains("api_key=secret"));
    }

    #[test]
    fn test_parse_search_response() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE eSearchResult PUBLIC "-//NLM//DTD esearch 20060628//EN" "https://eutils.ncbi.nlm.nih.gov/eutils/dtd/20060628/esearch.dtd">
<eSearchResult>
  <Count>3</Count>
  <RetMax>3</RetMax>
  <RetStart>0</RetStart>
  <IdList>
    <Id>111</Id>
    <Id>222</Id>
    <Id>333</Id>
  </IdList>
  <QueryTranslation>cancer[All Fields]</QueryTranslation>
</eSearchResult>"#;

        let ids = PubMedSource::parse_search_response(xml).unwrap();
        assert_eq!(ids, vec!["111", "222", "333"]);
    }

    #[test]
    fn test_parse_empty_search_response() {
        let xml = "<eSearchResult><Count>0</Count><IdList/></eSearchResult>";
        assert!(PubMedSource::parse_search_response(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_search_error() {
        let xml = "<eSearchResult><ERROR>Invalid query</ERROR></eSearchResult>";
        assert!(matches!(
            PubMedSource::parse_search_response(xml),
            Err(SourceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_parse_fetch_response() {
        let record = PubMedSource::parse_fetch_response(FETCH_XML)
            .unwrap()
            .unwrap();

        assert_eq!(record.pmid, "38012345");
        assert_eq!(record.title.as_deref(), Some("Targeting KRAS in solid tumours."));
        assert_eq!(record.pub_date.display(), "Mar 2023, 14");
        assert_eq!(record.authors.len(), 3);

        assert_eq!(record.authors[0].display_name(), "Jane Doe");
        assert_eq!(
            record.authors[1].affiliation.as_deref(),
            Some("Acme Biotech, Boston, MA, USA. rick.roe@acmebio.com.")
        );
        assert_eq!(record.authors[2].display_name(), "KRAS Study Group");
        assert_eq!(record.authors[2].affiliation, None);
    }

    #[test]
    fn test_parse_fetch_response_without_article() {
        let xml = "<PubmedArticleSet></PubmedArticleSet>";
        assert_eq!(PubMedSource::parse_fetch_response(xml).unwrap(), None);
    }

    #[test]
    fn test_parse_fetch_response_malformed() {
        let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation>";
        assert!(matches!(
            PubMedSource::parse_fetch_response(xml),
            Err(SourceError::Parse(_))
        ));
    }

    #[test]
    fn test_strip_inline_markup() {
        assert_eq!(
            strip_inline_markup("<ArticleTitle>CO<sub>2</sub> and <i>E. coli</i></ArticleTitle>"),
            "<ArticleTitle>CO2 and E. coli</ArticleTitle>"
        );
        assert_eq!(strip_inline_markup("<Book>x</Book>"), "<Book>x</Book>");
    }

    #[test]
    fn test_validate_id() {
        let source = source();
        assert!(source.validate_id("38012345").is_ok());
        assert!(matches!(
            source.validate_id("PMC123"),
            Err(SourceError::InvalidRequest(_))
        ));
        assert!(source.validate_id("").is_err());
    }
}
