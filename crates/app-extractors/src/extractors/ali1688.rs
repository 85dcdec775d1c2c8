use app_logger::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{Extractor, ScrapeContext};
use crate::{
    common::{
        js_json::{search_json, unescape_json_str},
        media::{str_or_none, url_or_none, ScrapeResult, ThumbnailEntry, VideoResult},
        page::ProductPage,
        thumbnails::{
            dedup_thumbnails, find_alicdn_detail_images, find_alicdn_images, strip_size_variants,
        },
    },
    error::ExtractorResult,
};

pub static URL_MATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:(?:www|[a-z]{2})\.)?(?:detail|m)\.1688\.com/offer/(?P<id>\d+)\.html")
        .expect("Invalid regex")
});

static VIDEO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoId":(\d+)"#).expect("Invalid regex"));
static VIDEO_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoUrl":"(.+?)""#).expect("Invalid regex"));
static INIT_DATA_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"window\.__INIT_DATA\s*=\s*").expect("Invalid regex"));

const NO_VIDEO_ID: &str = "0";

/// Offer videos and images from 1688 wholesale pages
#[derive(Debug, Default)]
pub struct Ali1688Extractor;

impl Extractor for Ali1688Extractor {
    fn name(&self) -> &'static str {
        "ali1688"
    }

    fn url_pattern(&self) -> &'static Regex {
        &URL_MATCH
    }

    fn scrape(
        &self,
        ctx: &ScrapeContext<'_>,
        id: &str,
        page: &ProductPage,
    ) -> ExtractorResult<ScrapeResult> {
        let video_id = page.search_regex(&VIDEO_ID, "video id")?;
        let video_url = if video_id == NO_VIDEO_ID {
            None
        } else {
            page.search_regex_opt(&VIDEO_URL)
                .and_then(|x| url_or_none(&unescape_json_str(&x)))
        };
        debug!(%video_id, ?video_url, "Got video");

        let data = search_json(&page.body, &INIT_DATA_ANCHOR, "init data")?;
        let components = OfferComponents::from_init_data(&data);
        trace!(?components, "Got offer components");

        let mut thumbnails = components
            .images
            .into_iter()
            .map(ThumbnailEntry::from)
            .collect::<Vec<_>>();

        if let Some(props) = data.pointer("/globalData/skuModel/skuProps") {
            thumbnails.extend(find_alicdn_images(&props.to_string()));
        }

        if let Some(detail_url) = components.detail_url {
            if let Some(detail) = ctx.fetch_secondary(&detail_url)? {
                let found = find_alicdn_detail_images(&detail.body);
                debug!(count = found.len(), "Got detail page images");
                thumbnails.extend(found);
            }
        }

        let thumbnails = dedup_thumbnails(
            thumbnails
                .into_iter()
                .map(|x| ThumbnailEntry::new(strip_size_variants(&x.url)))
                .collect(),
        );

        Ok(VideoResult::new(id)
            .with_title(Some(page.title()?))
            .with_url(video_url)
            .with_thumbnails(thumbnails)
            .into())
    }
}

/// Gallery images and the description page link, spread over the page's data components
#[derive(Debug, Default, PartialEq, Eq)]
struct OfferComponents {
    images: Vec<String>,
    detail_url: Option<String>,
}
impl OfferComponents {
    fn from_init_data(data: &Value) -> Self {
        let mut out = Self::default();

        let Some(components) = data.get("data").and_then(Value::as_object) else {
            return out;
        };

        for component in components.values() {
            if component.get("componentType").is_none() {
                continue;
            }

            let images = component
                .pointer("/data/offerImgList")
                .and_then(Value::as_array)
                .filter(|x| !x.is_empty());
            if let Some(images) = images {
                out.images = images
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect();
            }

            if let Some(detail_url) = str_or_none(component.pointer("/data/detailUrl")) {
                out.detail_url = Some(detail_url);
            }
        }

        out
    }
}
