use std::time::Duration;

use app_logger::{debug, trace};
use reqwest::{
    blocking::{Client as ReqwestClient, ClientBuilder as ReqwestClientBuilder},
    header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE},
};
use url::Url;

use super::page::ProductPage;
use crate::error::{ExtractorError, ExtractorResult};

pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like \
                              Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout: Duration,
    /// Raw `Cookie` header sent with every request
    pub cookie: Option<String>,
}
impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cookie: None,
        }
    }
}

pub struct Client;

impl Client {
    pub fn with_options(options: &FetchOptions) -> ExtractorResult<ReqwestClient> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        if let Some(cookie) = &options.cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ExtractorError::Client(format!("Invalid cookie header: {:?}", e)))?;
            headers.insert(COOKIE, value);
        }

        Self::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ExtractorError::Client(format!("{:?}", e)))
    }

    pub fn builder() -> ReqwestClientBuilder {
        ReqwestClient::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
    }
}

/// Source of product pages.
///
/// Implementations must follow redirects and report the final URL in
/// [`ProductPage::url`], since extractors classify pages by it.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> ExtractorResult<ProductPage>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ReqwestClient,
}
impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> ExtractorResult<Self> {
        Ok(Self {
            client: Client::with_options(options)?,
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> ExtractorResult<ProductPage> {
        debug!(%url, "Fetching page");

        let resp = self
            .client
            .get(url.as_str())
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| ExtractorError::fetch(url, e))?;

        let resolved = resp.url().clone();
        trace!(%resolved, status = ?resp.status(), "Got response");

        let body = resp.text().map_err(|e| ExtractorError::fetch(url, e))?;
        trace!(len = body.len(), "Got response body");

        Ok(ProductPage::new(url.clone(), resolved, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_client_from_options() {
        let options = FetchOptions {
            cookie: Some("cookie2=abc; _tb_token_=def".to_string()),
            ..FetchOptions::default()
        };

        assert!(HttpFetcher::new(&options).is_ok());
    }

    #[test]
    fn rejects_invalid_cookie_header() {
        let options = FetchOptions {
            cookie: Some("bad\nheader".to_string()),
            ..FetchOptions::default()
        };

        assert!(matches!(
            HttpFetcher::new(&options),
            Err(ExtractorError::Client(_))
        ));
    }
}
