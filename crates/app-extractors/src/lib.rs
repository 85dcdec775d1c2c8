use app_logger::{debug, info};
use common::{media::ScrapeResult, request::PageFetcher};
use error::{ExtractorError, ExtractorResult};
use extractors::ExtractOptions;
pub use handler::default_extract_handlers;
use handler::{ExtractHandler, DEFAULT_EXTRACT_HANDLERS};

pub mod common;
pub mod error;
pub mod extractors;
pub mod handler;

pub type ExtractorReturn = ExtractorResult<ScrapeResult>;

pub fn extract_info(
    fetcher: &dyn PageFetcher,
    options: &ExtractOptions,
    url: &str,
) -> ExtractorReturn {
    info!(url, "Extracting info");

    let result = extract_info_with(&DEFAULT_EXTRACT_HANDLERS, fetcher, options, url);

    debug!(?result, "Extraction finished");

    result
}

pub fn extract_info_with(
    handlers: &[ExtractHandler],
    fetcher: &dyn PageFetcher,
    options: &ExtractOptions,
    url: &str,
) -> ExtractorReturn {
    let handler = match handlers.iter().find(|h| h.can_handle(url)) {
        Some(h) => h,
        None => {
            return Err(ExtractorError::UnsupportedUrl(url.to_string()));
        }
    };

    debug!(extractor = handler.name(), "Found extractor");

    handler.extract(fetcher, options, url)
}
