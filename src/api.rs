//! News endpoint interaction with built-in fallback.
//!
//! This module turns a `(category, region)` pair into a non-empty list of
//! [`NormalizedArticle`]s. It talks to a GNews-style search endpoint (or a
//! same-origin proxy in front of one) and never reports failure to its
//! caller: any problem is logged and replaced with the built-in set from
//! [`crate::fallback`].
//!
//! # Architecture
//!
//! The module uses a trait-based design for flexibility:
//! - [`NewsSource`]: Core trait returning the raw response body for a query
//! - [`HttpNewsSource`]: Implements it over `reqwest`
//! - [`NewsProvider`]: Parses, normalizes and caps the result, substitutes
//!   the fallback set, and bumps the usage counter once per fetch
//!
//! # Failure Taxonomy
//!
//! | Variant | Cause |
//! |---------|-------|
//! | [`FetchError::Transport`] | DNS, connection or body read failure |
//! | [`FetchError::Status`] | Non-2xx HTTP status |
//! | [`FetchError::Malformed`] | Body is not the expected JSON |
//! | [`FetchError::Empty`] | Zero usable articles |
//!
//! All four are handled identically by [`NewsProvider::fetch_articles`].

use crate::fallback;
use crate::models::{NormalizedArticle, UpstreamArticle, UpstreamResponse};
use crate::usage::{UsageCounter, UsageStore};
use crate::utils::truncate_for_log;
use itertools::Itertools;
use reqwest::Client;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Region value meaning "no country filter".
pub const WORLD_REGION: &str = "world";

/// Articles requested per search.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Why a live fetch produced nothing usable.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("upstream returned no articles")]
    Empty,
}

impl FetchError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "transport",
            FetchError::Status { .. } => "status",
            FetchError::Malformed(_) => "malformed",
            FetchError::Empty => "empty",
        }
    }
}

/// One search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub category: String,
    /// Two-letter country code, or [`WORLD_REGION`].
    pub region: String,
    pub max: usize,
    pub lang: String,
}

impl NewsQuery {
    /// Query parameters in request order.
    ///
    /// The `country` parameter is left out for [`WORLD_REGION`].
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("category", self.category.clone())];
        if !self.region.eq_ignore_ascii_case(WORLD_REGION) {
            params.push(("country", self.region.clone()));
        }
        params.push(("max", self.max.to_string()));
        params.push(("lang", self.lang.clone()));
        params
    }
}

/// Something that can answer a [`NewsQuery`] with a raw response body.
pub trait NewsSource {
    async fn search(&self, query: &NewsQuery) -> Result<String, FetchError>;
}

/// [`NewsSource`] backed by an HTTP GET to a configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpNewsSource {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpNewsSource {
    pub fn new(endpoint: Url, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
        }
    }

    /// Full request URL for `query`, including the token when configured.
    pub fn request_url(&self, query: &NewsQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query.params() {
                pairs.append_pair(name, &value);
            }
            if let Some(key) = &self.api_key {
                pairs.append_pair("token", key);
            }
        }
        url
    }
}

impl NewsSource for HttpNewsSource {
    #[instrument(
        level = "info",
        skip_all,
        fields(category = %query.category, region = %query.region)
    )]
    async fn search(&self, query: &NewsQuery) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(self.request_url(query))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "News endpoint responded"
        );

        if !status.is_success() {
            // Proxies answer with `{ "error": "..." }`; surface it when present.
            let message = serde_json::from_str::<UpstreamResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| truncate_for_log(&body, 200));
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

/// Turn a raw body into at most `max` normalized, de-duplicated articles.
///
/// Articles with neither a title nor a URL carry nothing worth showing and
/// are dropped.
pub fn parse_articles(body: &str, max: usize) -> Result<Vec<NormalizedArticle>, FetchError> {
    let response: UpstreamResponse = serde_json::from_str(body)?;
    let articles: Vec<NormalizedArticle> = response
        .articles
        .into_iter()
        .map(UpstreamArticle::normalize)
        .filter(|a| !a.title.is_empty() || !a.url.is_empty())
        .unique_by(|a| (a.title.clone(), a.url.clone()))
        .take(max)
        .collect();

    if articles.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(articles)
}

/// Where a batch of articles came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOrigin {
    Live,
    Fallback,
}

/// The News Provider Adapter: a source, the request settings, and the usage
/// counter it bumps after each fetch.
#[derive(Debug)]
pub struct NewsProvider<N, U> {
    source: N,
    usage: UsageCounter<U>,
    max_results: usize,
    lang: String,
}

impl<N, U> NewsProvider<N, U>
where
    N: NewsSource,
    U: UsageStore,
{
    pub fn new(source: N, usage: UsageCounter<U>) -> Self {
        Self {
            source,
            usage,
            max_results: DEFAULT_MAX_RESULTS,
            lang: "en".to_string(),
        }
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max.max(1);
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Fetch articles for `category` in `region`.
    ///
    /// Always returns a non-empty list: live articles when the endpoint
    /// cooperates, otherwise the built-in set for the category. The usage
    /// counter is incremented exactly once per call.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_articles(
        &mut self,
        category: &str,
        region: &str,
    ) -> Vec<NormalizedArticle> {
        self.fetch_with_origin(category, region).await.0
    }

    /// Like [`Self::fetch_articles`], also reporting whether the fallback
    /// set was used.
    pub async fn fetch_with_origin(
        &mut self,
        category: &str,
        region: &str,
    ) -> (Vec<NormalizedArticle>, ArticleOrigin) {
        let query = NewsQuery {
            category: category.to_string(),
            region: region.to_string(),
            max: self.max_results,
            lang: self.lang.clone(),
        };

        let live = match self.source.search(&query).await {
            Ok(body) => parse_articles(&body, self.max_results).inspect_err(|e| {
                if matches!(e, FetchError::Malformed(_)) {
                    debug!(body = %truncate_for_log(&body, 300), "Unparsable news body");
                }
            }),
            Err(e) => Err(e),
        };

        let (articles, origin) = match live {
            Ok(articles) => {
                info!(count = articles.len(), "Fetched live articles");
                (articles, ArticleOrigin::Live)
            }
            Err(e) => {
                warn!(
                    kind = e.kind(),
                    error = %e,
                    known_category = fallback::is_known_category(category),
                    "News fetch failed; using built-in articles"
                );
                (fallback::articles_for(category), ArticleOrigin::Fallback)
            }
        };

        let uses = self.usage.increment();
        debug!(uses, ?origin, "Fetch attempt completed");
        (articles, origin)
    }

    pub fn usage_count(&self) -> u64 {
        self.usage.count()
    }

    #[cfg(test)]
    pub fn source(&self) -> &N {
        &self.source
    }
}
