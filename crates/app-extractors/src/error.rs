use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractorError {
    #[error("Invalid URL for {extractor}: {url:?}")]
    InvalidUrl { extractor: &'static str, url: String },

    #[error("No extractor can handle {0:?}")]
    UnsupportedUrl(String),

    #[error("Login required: {url} redirected to a login page. Check the session cookies.")]
    LoginRequired { url: String },

    #[error("Unable to extract {what}")]
    DataNotFound { what: String },

    #[error("Unable to parse {what}: {reason}")]
    MalformedData { what: String, reason: String },

    #[error("No video formats found for {id}")]
    NoFormats { id: String },

    #[error(
        "Could not get video or images for {id}. Please check the link again or contact support."
    )]
    Unavailable { id: String },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to create client: {0}")]
    Client(String),
}
impl ExtractorError {
    pub fn data_not_found<T>(what: T) -> Self
    where
        T: Into<String>,
    {
        Self::DataNotFound { what: what.into() }
    }

    pub fn malformed_data<T, E>(what: T, reason: E) -> Self
    where
        T: Into<String>,
        E: ToString,
    {
        Self::MalformedData {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn fetch<T, E>(url: T, reason: E) -> Self
    where
        T: ToString,
        E: std::fmt::Debug,
    {
        Self::Fetch {
            url: url.to_string(),
            reason: format!("{:?}", reason),
        }
    }

    /// Whether fetching and parsing the page again may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DataNotFound { .. } | Self::MalformedData { .. } | Self::Fetch { .. }
        )
    }
}

pub type ExtractorResult<T> = Result<T, ExtractorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_page_content_errors_are_retryable() {
        assert!(ExtractorError::data_not_found("data").is_retryable());
        assert!(ExtractorError::malformed_data("data", "eof").is_retryable());
        assert!(ExtractorError::fetch("https://a.b", "timeout").is_retryable());

        assert!(!ExtractorError::LoginRequired {
            url: "https://login.taobao.com".into()
        }
        .is_retryable());
        assert!(!ExtractorError::InvalidUrl {
            extractor: "amazon",
            url: "x".into()
        }
        .is_retryable());
        assert!(!ExtractorError::Unavailable { id: "1".into() }.is_retryable());
    }

    #[test]
    fn unavailable_message_gives_guidance() {
        let msg = ExtractorError::Unavailable { id: "42".into() }.to_string();

        assert!(msg.contains("check the link"));
        assert!(msg.contains("contact support"));
    }
}
