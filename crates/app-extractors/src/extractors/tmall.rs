use app_logger::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    taobao::{CloudVideo, Storefront},
    Extractor, ScrapeContext,
};
use crate::{
    common::{media::ScrapeResult, page::ProductPage},
    error::ExtractorResult,
};

pub static URL_MATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:(?:www|[a-z]{2})\.)?detail\.tmall\.com/.*?id=(?P<id>\d+)")
        .expect("Invalid regex")
});

#[derive(Debug, Default)]
pub struct TmallExtractor;

impl Extractor for TmallExtractor {
    fn name(&self) -> &'static str {
        "tmall"
    }

    fn url_pattern(&self) -> &'static Regex {
        &URL_MATCH
    }

    fn scrape(
        &self,
        _ctx: &ScrapeContext<'_>,
        _id: &str,
        page: &ProductPage,
    ) -> ExtractorResult<ScrapeResult> {
        let storefront = Storefront::of(page)?;
        debug!(?storefront, "Classified product page");

        let video = CloudVideo::from_page(storefront, page)?;

        Ok(video.into_result(page)?.into())
    }
}
