use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::{ExtractorError, ExtractorResult};

static TITLE_MATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>([^<]+)<").expect("Invalid regex"));

const LOGIN_PATH_MARKER: &str = "login.jhtml";
const LOGIN_HOST: &str = "login.taobao.com";

/// A fetched HTML document together with the URL it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub requested_url: Url,
    pub url: Url,
    pub body: String,
}
impl ProductPage {
    #[must_use]
    pub fn new<B>(requested_url: Url, url: Url, body: B) -> Self
    where
        B: Into<String>,
    {
        Self {
            requested_url,
            url,
            body: body.into(),
        }
    }

    /// Whether the request ended up on a login page instead of the product
    #[must_use]
    pub fn is_login_redirect(&self) -> bool {
        self.url.as_str().contains(LOGIN_PATH_MARKER)
            || app_helpers::domain::DomainParser::host_matches(&self.url, LOGIN_HOST)
    }

    #[must_use]
    pub fn resolved_host_is(&self, host: &str) -> bool {
        app_helpers::domain::DomainParser::host_matches(&self.url, host)
    }

    pub fn search_regex(&self, re: &Regex, what: &str) -> ExtractorResult<String> {
        search_regex(&self.body, re, what)
    }

    #[must_use]
    pub fn search_regex_opt(&self, re: &Regex) -> Option<String> {
        search_regex_opt(&self.body, re)
    }

    /// Text of the `<title>` tag
    pub fn title(&self) -> ExtractorResult<String> {
        html_title(&self.body).ok_or_else(|| ExtractorError::data_not_found("title"))
    }
}

/// First non-empty capture group of `re` in `haystack`
#[must_use]
pub fn search_regex_opt(haystack: &str, re: &Regex) -> Option<String> {
    let caps = re.captures(haystack)?;

    caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .find(|x| !x.is_empty())
        .map(ToString::to_string)
}

pub fn search_regex(haystack: &str, re: &Regex, what: &str) -> ExtractorResult<String> {
    search_regex_opt(haystack, re).ok_or_else(|| ExtractorError::data_not_found(what))
}

#[must_use]
pub fn html_title(body: &str) -> Option<String> {
    search_regex_opt(body, &TITLE_MATCH)
        .map(|x| unescape_html(&x).trim().to_string())
        .filter(|x| !x.is_empty())
}

fn unescape_html(s: &str) -> String {
    html_escape::decode_html_entities(s).replace('\u{a0}', " ")
}
