//! Client for the news search API.
//!
//! Three kinds of lookups are supported: top headlines, free-text search and
//! search over a window of days ending today. Each call issues exactly one
//! GET request. Anything other than a 200 response with a decodable body is
//! logged and reported as `None`.
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use clap::ValueEnum;
use log::{debug, error, info};
use reqwest::StatusCode;

use crate::{Config, NewsError, NewsResponse, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Headline categories accepted by the `top-headlines` resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Category {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::General => "general",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }
}

/// Result ordering for the `everything` resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    #[default]
    #[value(name = "publishedAt", alias = "published-at")]
    PublishedAt,
    Relevancy,
    Popularity,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
        }
    }
}

/// Length of a search window ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn days(&self) -> u64 {
        match self {
            Period::Daily => 1,
            Period::Weekly => 7,
            Period::Monthly => 30,
        }
    }
}

/// Inclusive date range sent as `from` / `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// Window whose `from` lies exactly `days` days before `today`.
    pub fn ending_on(today: NaiveDate, days: u64) -> Self {
        let from = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    pub fn for_period(period: Period, today: NaiveDate) -> Self {
        Self::ending_on(today, period.days())
    }
}

/// The caller's current local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Thin wrapper around a `reqwest::Client` bound to one API endpoint and key.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    /// Builds a client from the configuration. Fails when no API key is set.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        let mut builder = reqwest::Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Top headlines for a country, optionally narrowed to a category.
    pub async fn top_headlines(
        &self,
        country: &str,
        category: Option<Category>,
    ) -> Option<NewsResponse> {
        let mut params = vec![("country", country.to_string())];
        if let Some(category) = category {
            params.push(("category", category.as_str().to_string()));
        }
        self.lookup("top-headlines", params).await
    }

    /// Free-text search with optional inclusive date bounds.
    pub async fn search_articles(
        &self,
        query: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        sort_by: SortBy,
    ) -> Option<NewsResponse> {
        let mut params = vec![
            ("q", query.to_string()),
            ("sortBy", sort_by.as_str().to_string()),
        ];
        if let Some(from) = from {
            params.push(("from", from.format(DATE_FORMAT).to_string()));
        }
        if let Some(to) = to {
            params.push(("to", to.format(DATE_FORMAT).to_string()));
        }
        self.lookup("everything", params).await
    }

    /// Searches the last day when a query is given, otherwise returns the
    /// top headlines for `country`.
    pub async fn daily_news(&self, query: Option<&str>, country: &str) -> Option<NewsResponse> {
        match query {
            Some(query) => self.period_news(Period::Daily, query, today()).await,
            None => self.top_headlines(country, None).await,
        }
    }

    pub async fn weekly_news(&self, query: &str) -> Option<NewsResponse> {
        self.period_news(Period::Weekly, query, today()).await
    }

    pub async fn monthly_news(&self, query: &str) -> Option<NewsResponse> {
        self.period_news(Period::Monthly, query, today()).await
    }

    /// Searches the window of `period` ending on `today`.
    pub async fn period_news(
        &self,
        period: Period,
        query: &str,
        today: NaiveDate,
    ) -> Option<NewsResponse> {
        let window = DateWindow::for_period(period, today);
        debug!("{:?} window for '{}': {} .. {}", period, query, window.from, window.to);
        self.search_articles(query, Some(window.from), Some(window.to), SortBy::default())
            .await
    }

    async fn lookup(&self, resource: &str, params: Vec<(&str, String)>) -> Option<NewsResponse> {
        match self.fetch(resource, params).await {
            Ok(response) => {
                info!(
                    "{} returned {} articles",
                    resource,
                    response.articles.len()
                );
                Some(response)
            }
            Err(e) => {
                error!("News API request to {} failed: {}", resource, e);
                None
            }
        }
    }

    /// Issues one GET against `{base_url}/{resource}`.
    pub async fn fetch(
        &self,
        resource: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<NewsResponse> {
        let url = format!("{}/{}", self.base_url, resource);
        // logged before the key is added
        debug!("GET {} {:?}", url, params);
        params.push(("apiKey", self.api_key.clone()));

        let response = self.http.get(&url).query(&params).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(NewsError::RemoteStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<NewsResponse>().await?)
    }
}
