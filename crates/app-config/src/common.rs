use clap::{Args, CommandFactory, ValueEnum, ValueHint};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};
use url::Url;
use validator::{Validate, ValidationError};

use crate::cli::CliArgs;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Request options"))]
pub struct RequestConfig {
    /// User agent sent with every page request.
    ///
    /// If not provided, a desktop browser user agent is used
    #[arg(long, default_value = None, env = "EXTRACTOR_USER_AGENT")]
    #[validate(length(min = 1))]
    pub user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, env = "EXTRACTOR_TIMEOUT_SECS")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    /// Raw `Cookie` header sent with every page request.
    ///
    /// Taobao and Tmall redirect to a login page without a valid session.
    #[arg(long, default_value = None, env = "EXTRACTOR_COOKIE", hide_env_values = true)]
    #[serde(skip)]
    pub cookie: Option<String>,

    /// How many times to fetch and scrape a page before giving up.
    ///
    /// Only applies to sites with flaky page rendering (Amazon)
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, env = "EXTRACTOR_MAX_ATTEMPTS", value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_ATTEMPTS_LIMIT)))]
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
}
impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cookie: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DetailPageFailure {
    /// Continue without the images from the detail page
    #[default]
    Skip,
    /// Fail the whole extraction
    Fail,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MissingMedia {
    /// Return a placeholder video url
    #[default]
    Placeholder,
    /// Fail with a "no formats" error
    Error,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = Some("Extraction options"))]
pub struct ExtractConfig {
    /// What to do when a secondary detail page (1688) can't be fetched
    #[arg(long, value_enum, default_value_t = DetailPageFailure::Skip, env = "EXTRACTOR_DETAIL_PAGE_FAILURE")]
    pub detail_page_failure: DetailPageFailure,

    /// What to do when a page has images but no video
    #[arg(long, value_enum, default_value_t = MissingMedia::Placeholder, env = "EXTRACTOR_MISSING_MEDIA")]
    pub missing_media: MissingMedia,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[clap(next_help_heading = "Cli options")]
pub struct CliConfig {
    #[clap(flatten)]
    #[validate(nested)]
    #[serde(skip)]
    pub entries_group: UrlGroup,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false, env = "EXTRACTOR_PRETTY")]
    pub pretty: bool,
}

#[derive(Debug, Clone, Default, Args, Serialize, Deserialize, Validate)]
#[group(required = true, multiple = true)]
pub struct UrlGroup {
    /// URLs to extract.
    ///
    /// Has the same behaviour as specifying the URL as a raw argument.
    #[clap(short = 'u', long = "url", value_hint = ValueHint::Url, value_parser = validate_absolute_url())]
    #[validate(custom(function = "absolute_urls"))]
    pub urls: Vec<String>,

    /// Product page URLs to extract.
    ///
    /// Multiple URLs can be specified. Each must be an absolute URL.
    #[clap(id = "URL", value_hint = ValueHint::Url, value_parser = validate_absolute_url())]
    #[validate(custom(function = "absolute_urls"))]
    pub entries: Vec<String>,
}
impl UrlGroup {
    /// Positional URLs first, then the ones given with `--url`
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().chain(self.urls.iter()).map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ValueEnum)]
pub enum DumpConfigType {
    Json,
    Toml,
}
#[derive(Debug, Clone, Default, Serialize, Deserialize, Args, Validate)]
#[allow(clippy::option_option)]
#[clap(next_help_heading = Some("Run options"))]
pub struct RunConfig {
    /// Dump the config to stdout
    #[arg(long, value_enum, default_value = None)]
    pub dump_config: Option<Option<DumpConfigType>>,

    /// Dump shell completions to stdout
    #[arg(long, default_value = None, value_name = "SHELL", value_parser = hacky_dump_completions())]
    #[serde(skip)]
    pub dump_completions: Option<Shell>,
}

#[must_use]
pub fn validate_absolute_url() -> impl clap::builder::TypedValueParser {
    move |s: &str| {
        let parsed = match Url::parse(s) {
            Ok(parsed) => parsed,
            Err(e) => return Err(format!("URL must be absolute: {e}")),
        };

        if parsed.cannot_be_a_base() {
            return Err("URL must be absolute".to_string());
        }

        Ok(s.to_string())
    }
}

#[must_use]
pub fn hacky_dump_completions() -> impl clap::builder::TypedValueParser {
    move |s: &str| {
        let parsed = Shell::from_str(s, true);

        if let Ok(shell) = &parsed {
            clap_complete::generate(
                *shell,
                &mut CliArgs::command(),
                "extractor-cli",
                &mut std::io::stdout(),
            );
            std::process::exit(0);
        }

        parsed
            .map(|_| ())
            .map_err(|_| ValidationError::new("Invalid shell"))
    }
}

pub fn absolute_url(url: &str) -> Result<(), ValidationError> {
    let parsed = Url::parse(url).map_err(|_| ValidationError::new("Invalid URL"))?;

    if parsed.cannot_be_a_base() {
        return Err(ValidationError::new("URL must be absolute"));
    }

    Ok(())
}

#[allow(clippy::ptr_arg)]
pub fn absolute_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    urls.iter().try_for_each(|x| absolute_url(x))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn defaults_are_applied() {
        let args = CliArgs::try_parse_from(["extractor-cli", "https://www.ebay.com/itm/1"])
            .expect("valid args");

        assert_eq!(args.request.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(args.request.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(args.extract.detail_page_failure, DetailPageFailure::Skip);
        assert_eq!(args.extract.missing_media, MissingMedia::Placeholder);
        assert!(!args.cli.pretty);
    }

    #[test]
    fn urls_keep_positional_then_explicit_order() {
        let args = CliArgs::try_parse_from([
            "extractor-cli",
            "-u",
            "https://detail.1688.com/offer/2.html",
            "https://detail.1688.com/offer/1.html",
        ])
        .expect("valid args");

        assert_eq!(
            args.cli.entries_group.all().collect::<Vec<_>>(),
            vec![
                "https://detail.1688.com/offer/1.html",
                "https://detail.1688.com/offer/2.html",
            ]
        );
    }

    #[test]
    fn policies_parse() {
        let args = CliArgs::try_parse_from([
            "extractor-cli",
            "--detail-page-failure",
            "fail",
            "--missing-media",
            "error",
            "https://www.ebay.com/itm/1",
        ])
        .expect("valid args");

        assert_eq!(args.extract.detail_page_failure, DetailPageFailure::Fail);
        assert_eq!(args.extract.missing_media, MissingMedia::Error);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(CliArgs::try_parse_from(["extractor-cli"]).is_err());
        assert!(CliArgs::try_parse_from(["extractor-cli", "item.taobao.com/item.htm"]).is_err());
        assert!(CliArgs::try_parse_from([
            "extractor-cli",
            "--max-attempts",
            "11",
            "https://www.ebay.com/itm/1",
        ])
        .is_err());
        assert!(CliArgs::try_parse_from([
            "extractor-cli",
            "--max-attempts",
            "0",
            "https://www.ebay.com/itm/1",
        ])
        .is_err());
    }

    #[test]
    fn validates_urls() {
        assert!(absolute_urls(&vec!["https://www.amazon.com/dp/B0".to_string()]).is_ok());
        assert!(absolute_urls(&vec!["mailto:someone@example.com".to_string()]).is_err());
        assert!(absolute_urls(&vec!["not a url".to_string()]).is_err());
    }
}
