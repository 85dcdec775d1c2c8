use std::fmt::Debug;

use app_logger::{debug, info, warn};
use regex::Regex;
use url::Url;

use crate::{
    common::{
        media::{url_or_none, ScrapeResult, PLACEHOLDER_MEDIA_URL},
        page::ProductPage,
        request::PageFetcher,
        thumbnails::dedup_thumbnails,
    },
    error::{ExtractorError, ExtractorResult},
};

pub mod ali1688;
pub mod amazon;
pub mod ebay;
pub mod taobao;
pub mod taobao_world;
pub mod tmall;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// What to do when a secondary detail page cannot be fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailPagePolicy {
    /// Log a warning and leave the extra images out
    #[default]
    Skip,
    /// Fail the whole extraction
    Fail,
}

/// What to do when a page has no playable media
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoMediaPolicy {
    /// Use [`PLACEHOLDER_MEDIA_URL`] as the media URL
    #[default]
    Placeholder,
    /// Fail with [`ExtractorError::NoFormats`]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Upper bound on fetch+parse attempts for extractors that retry
    pub max_attempts: u32,
    pub detail_page: DetailPagePolicy,
    pub no_media: NoMediaPolicy,
}
impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            detail_page: DetailPagePolicy::default(),
            no_media: NoMediaPolicy::default(),
        }
    }
}

/// Everything a vendor's `scrape` step may use besides the page itself
pub struct ScrapeContext<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub options: &'a ExtractOptions,
}
impl ScrapeContext<'_> {
    /// Fetch a secondary page, honouring [`ExtractOptions::detail_page`].
    ///
    /// `Ok(None)` means the page could not be fetched and should be skipped.
    pub fn fetch_secondary(&self, url: &str) -> ExtractorResult<Option<ProductPage>> {
        let res = url_or_none(url)
            .ok_or_else(|| ExtractorError::fetch(url, "not an absolute URL"))
            .and_then(|x| self.fetcher.fetch(&x));

        match (res, self.options.detail_page) {
            (Ok(page), _) => Ok(Some(page)),
            (Err(e), DetailPagePolicy::Skip) => {
                warn!(url, error = %e, "Failed to fetch detail page, skipping its images");
                Ok(None)
            }
            (Err(e), DetailPagePolicy::Fail) => Err(e),
        }
    }
}

pub trait Extractor: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Pattern of accepted URLs, with the product identifier in the `id` group
    fn url_pattern(&self) -> &'static Regex;

    /// How many times fetch+parse is attempted as a unit
    fn fetch_attempts(&self, options: &ExtractOptions) -> u32 {
        let _ = options;
        1
    }

    fn can_handle(&self, url: &str) -> bool {
        self.url_pattern().is_match(url)
    }

    fn extract_id(&self, url: &str) -> ExtractorResult<String> {
        self.url_pattern()
            .captures(url)
            .and_then(|x| x.name("id"))
            .map(|x| x.as_str().to_string())
            .filter(|x| !x.is_empty())
            .ok_or_else(|| ExtractorError::InvalidUrl {
                extractor: self.name(),
                url: url.to_string(),
            })
    }

    /// Map a fetched page into a result
    fn scrape(
        &self,
        ctx: &ScrapeContext<'_>,
        id: &str,
        page: &ProductPage,
    ) -> ExtractorResult<ScrapeResult>;

    fn extract(
        &self,
        fetcher: &dyn PageFetcher,
        options: &ExtractOptions,
        url: &str,
    ) -> ExtractorResult<ScrapeResult> {
        run_pipeline(self, fetcher, options, url)
    }
}

/// Fetch, classify, scrape and finalize a single page.
#[tracing::instrument(skip(extractor, fetcher, options), fields(site = extractor.name()))]
pub fn run_pipeline<E>(
    extractor: &E,
    fetcher: &dyn PageFetcher,
    options: &ExtractOptions,
    url: &str,
) -> ExtractorResult<ScrapeResult>
where
    E: Extractor + ?Sized,
{
    let id = extractor.extract_id(url)?;
    let page_url = Url::parse(url).map_err(|_| ExtractorError::InvalidUrl {
        extractor: extractor.name(),
        url: url.to_string(),
    })?;
    debug!(%id, "Resolved identifier");

    let ctx = ScrapeContext { fetcher, options };

    let result = app_helpers::futures::retry_blocking(
        extractor.fetch_attempts(options),
        ExtractorError::is_retryable,
        |attempt| {
            debug!(attempt, "Fetching product page");
            let page = fetcher.fetch(&page_url)?;

            if page.is_login_redirect() {
                return Err(ExtractorError::LoginRequired {
                    url: page.url.to_string(),
                });
            }

            extractor.scrape(&ctx, &id, &page)
        },
    )?;

    let result = finalize(result, options.no_media)?;
    info!(id = result.id(), "Extracted");

    Ok(result)
}

fn finalize(result: ScrapeResult, policy: NoMediaPolicy) -> ExtractorResult<ScrapeResult> {
    match result {
        ScrapeResult::Video(mut video) => {
            video.thumbnails = dedup_thumbnails(video.thumbnails);

            if !video.has_media() {
                match policy {
                    NoMediaPolicy::Placeholder => {
                        debug!(id = %video.id, "No media found, using placeholder");
                        video = video.with_url(url_or_none(PLACEHOLDER_MEDIA_URL));
                    }
                    NoMediaPolicy::Error => {
                        return Err(ExtractorError::NoFormats { id: video.id });
                    }
                }
            }

            Ok(ScrapeResult::Video(video))
        }
        ScrapeResult::Playlist(playlist) => {
            if playlist.entries.is_empty() && policy == NoMediaPolicy::Error {
                return Err(ExtractorError::NoFormats { id: playlist.id });
            }

            Ok(ScrapeResult::Playlist(playlist))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::media::{PlaylistResult, ThumbnailEntry, VideoResult};

    #[test]
    fn finalize_dedups_and_substitutes_placeholder() {
        let video = VideoResult::new("1").with_thumbnails(vec![
            ThumbnailEntry::new("https://a/1.jpg"),
            ThumbnailEntry::new("https://a/1.jpg"),
        ]);

        let out = finalize(video.into(), NoMediaPolicy::Placeholder).expect("finalized");
        let out = out.as_video().expect("video");

        assert_eq!(
            out.url.as_ref().map(Url::as_str),
            Some(PLACEHOLDER_MEDIA_URL)
        );
        assert_eq!(out.ext.as_deref(), Some("mp4"));
        assert_eq!(out.thumbnails.len(), 1);
    }

    #[test]
    fn finalize_surfaces_missing_media_when_asked() {
        let video = VideoResult::new("1");
        let playlist = PlaylistResult {
            id: "2".into(),
            title: None,
            entries: vec![],
        };

        assert_eq!(
            finalize(video.into(), NoMediaPolicy::Error),
            Err(ExtractorError::NoFormats { id: "1".into() })
        );
        assert_eq!(
            finalize(playlist.clone().into(), NoMediaPolicy::Error),
            Err(ExtractorError::NoFormats { id: "2".into() })
        );
        assert_eq!(
            finalize(playlist.clone().into(), NoMediaPolicy::Placeholder),
            Ok(ScrapeResult::from(playlist))
        );
    }

    #[test]
    fn finalize_keeps_real_media() {
        let video = VideoResult::new("1").with_url(url_or_none("https://v.example/1.mp4"));

        let out = finalize(video.clone().into(), NoMediaPolicy::Error);

        assert_eq!(out, Ok(ScrapeResult::from(video)));
    }
}
