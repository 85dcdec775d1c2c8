use app_logger::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

use super::{Extractor, ScrapeContext};
use crate::{
    common::{
        js_json::{parse_js_literal, search_json_opt, unescape_json_str},
        media::{url_or_none, ScrapeResult, ThumbnailEntry, VideoResult},
        page::ProductPage,
        thumbnails::find_alicdn_images,
    },
    error::{ExtractorError, ExtractorResult},
};

pub static URL_MATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:(?:www|[a-z]{2})\.)?world\.taobao\.com/item/(?P<id>\d+)\.htm")
        .expect("Invalid regex")
});

static VIDEO_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoUrl"\s*:\s*"((?:[^"\\]|\\.)+)""#).expect("Invalid regex"));
static USER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""userId"\s*:\s*"?(\d+)"?"#).expect("Invalid regex"));
static IMAGES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""images"\s*:\s*(\[\S*?"\])"#).expect("Invalid regex"));
static INITIAL_DATA_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"window\.__INITIAL_DATA__\s*=\s*").expect("Invalid regex"));

/// Product videos and gallery images from Taobao's international storefront
#[derive(Debug, Default)]
pub struct TaobaoWorldExtractor;

impl Extractor for TaobaoWorldExtractor {
    fn name(&self) -> &'static str {
        "taobao_world"
    }

    fn url_pattern(&self) -> &'static Regex {
        &URL_MATCH
    }

    fn scrape(
        &self,
        _ctx: &ScrapeContext<'_>,
        id: &str,
        page: &ProductPage,
    ) -> ExtractorResult<ScrapeResult> {
        let video_url = video_url(page);
        debug!(?video_url, "Got video url");

        let user_id = page
            .search_regex_opt(&USER_ID)
            .ok_or_else(|| ExtractorError::Unavailable { id: id.to_string() })?;

        let title = page.title()?;

        let mut thumbnails = gallery_images(page)?;

        let item = search_json_opt(&page.body, &INITIAL_DATA_ANCHOR, "initial data")?;
        let item = item
            .as_ref()
            .and_then(|x| x.pointer("/pageInitialProps/httpData/normalItemResponse"));
        trace!(?item, "Got item response");

        let price = item
            .and_then(|x| x.pointer("/itemPrice/promotionPrice"))
            .and_then(price_text);
        let title = match price {
            Some(price) => format!("{title} - Price: {price} CNY"),
            None => title,
        };

        if let Some(item) = item {
            if let Some(desc) = item.get("itemDesc").and_then(Value::as_str) {
                thumbnails.extend(find_alicdn_images(desc));
            }

            if let Some(props) = item.pointer("/itemSkuDO/skuPropertyList") {
                thumbnails.extend(find_alicdn_images(&props.to_string()));
            }
        }

        Ok(VideoResult::new(user_id)
            .with_title(Some(title))
            .with_url(video_url)
            .with_thumbnails(thumbnails)
            .into())
    }
}

fn video_url(page: &ProductPage) -> Option<Url> {
    page.search_regex_opt(&VIDEO_URL)
        .and_then(|x| url_or_none(&unescape_json_str(&x)))
}

fn gallery_images(page: &ProductPage) -> ExtractorResult<Vec<ThumbnailEntry>> {
    let Some(images) = page.search_regex_opt(&IMAGES) else {
        return Ok(vec![]);
    };

    let images = parse_js_literal(&images, "image list")?;

    Ok(images
        .as_array()
        .map(|x| {
            x.iter()
                .filter_map(Value::as_str)
                .map(ThumbnailEntry::from)
                .collect()
        })
        .unwrap_or_default())
}

fn price_text(price: &Value) -> Option<String> {
    match price {
        Value::String(x) if !x.trim().is_empty() => Some(x.trim().to_string()),
        Value::Number(x) => Some(x.to_string()),
        _ => None,
    }
}
