use app_logger::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{ExtractOptions, Extractor, ScrapeContext};
use crate::{
    common::{
        js_json::search_json,
        media::{int_or_none, str_or_none, url_or_none, MediaEntry, PlaylistResult, ScrapeResult},
        page::ProductPage,
    },
    error::ExtractorResult,
};

pub static URL_MATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?amazon\.(?:[a-z]{2,3})(?:\.[a-z]{2})?/(?:[^/]+/)?(?:dp|gp/product)/(?P<id>[^/&#$?]+)",
    )
    .expect("Invalid regex")
});

static DATA_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"var\s?obj\s?=\s?jQuery\.parseJSON\('").expect("Invalid regex")
});

/// Product videos from the image block data of Amazon product pages
#[derive(Debug, Default)]
pub struct AmazonExtractor;

impl Extractor for AmazonExtractor {
    fn name(&self) -> &'static str {
        "amazon"
    }

    fn url_pattern(&self) -> &'static Regex {
        &URL_MATCH
    }

    fn fetch_attempts(&self, options: &ExtractOptions) -> u32 {
        options.max_attempts
    }

    fn scrape(
        &self,
        _ctx: &ScrapeContext<'_>,
        id: &str,
        page: &ProductPage,
    ) -> ExtractorResult<ScrapeResult> {
        let data = search_json(&page.body, &DATA_ANCHOR, "data")?;
        trace!(?data, "Got image block data");

        let entries = data
            .get("videos")
            .and_then(Value::as_array)
            .map(|videos| videos.iter().filter_map(video_entry).collect::<Vec<_>>())
            .unwrap_or_default();
        debug!(count = entries.len(), "Mapped videos");

        Ok(PlaylistResult {
            id: id.to_string(),
            title: str_or_none(data.get("title")),
            entries,
        }
        .into())
    }
}

fn video_entry(video: &Value) -> Option<MediaEntry> {
    if !video.get("isVideo").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }

    let url = video.get("url").and_then(Value::as_str).and_then(url_or_none);
    let marketplace_id = str_or_none(video.get("marketPlaceID"));

    let (Some(url), Some(marketplace_id)) = (url, marketplace_id) else {
        debug!(?video, "Skipping video without url or marketplace id");
        return None;
    };

    let mut entry = MediaEntry::new(marketplace_id, url);
    entry.title = str_or_none(video.get("title"));
    entry.thumbnail = str_or_none(video.get("thumbUrl")).or_else(|| str_or_none(video.get("thumb")));
    entry.duration = int_or_none(video.get("durationSeconds"));
    entry.width = int_or_none(video.get("videoWidth"));
    entry.height = int_or_none(video.get("videoHeight"));

    Some(entry)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("https://www.amazon.co.uk/dp/B098XNCHLD/", "B098XNCHLD")]
    #[case(
        "https://www.amazon.in/Sony-WH-1000XM4-Cancelling-Headphones-Bluetooth/dp/B0863TXGM3",
        "B0863TXGM3"
    )]
    #[case("https://www.amazon.com/dp/B0845NXCXF/", "B0845NXCXF")]
    #[case(
        "https://www.amazon.es/Samsung-Smartphone-s-AMOLED-Quad-c%C3%A1mara-espa%C3%B1ola/dp/B08WX337PQ",
        "B08WX337PQ"
    )]
    #[case("https://amazon.de/gp/product/B07XJ8C8F5?th=1", "B07XJ8C8F5")]
    fn extracts_asin(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(AmazonExtractor.extract_id(url), Ok(expected.to_string()));
    }

    #[rstest]
    #[case("https://www.amazon.com/")]
    #[case("https://www.amazon.com/s?k=headphones")]
    #[case("https://www.ebay.com/dp/B098XNCHLD")]
    fn rejects_non_product_urls(#[case] url: &str) {
        assert!(AmazonExtractor.extract_id(url).is_err());
    }

    #[test]
    fn maps_video_fields() {
        let entry = video_entry(&json!({
            "isVideo": true,
            "marketPlaceID": "A1F83G8C2ARO7P",
            "url": "https://m.media-amazon.com/images/S/vse-vms/video.mp4",
            "title": "mcdodo usb c cable 100W 5a",
            "thumb": "https://m.media-amazon.com/images/I/thumb.jpg",
            "durationSeconds": 34,
            "videoWidth": "1920",
            "videoHeight": "n/a",
        }))
        .expect("entry");

        assert_eq!(entry.id, "A1F83G8C2ARO7P");
        assert_eq!(entry.ext, "mp4");
        assert_eq!(entry.title.as_deref(), Some("mcdodo usb c cable 100W 5a"));
        assert_eq!(
            entry.thumbnail.as_deref(),
            Some("https://m.media-amazon.com/images/I/thumb.jpg")
        );
        assert_eq!(entry.duration, Some(34));
        assert_eq!(entry.width, Some(1920));
        assert_eq!(entry.height, None);
    }

    #[test]
    fn skips_non_videos_and_incomplete_items() {
        assert!(video_entry(&json!({"isVideo": false, "marketPlaceID": "A", "url": "https://a/v.mp4"})).is_none());
        assert!(video_entry(&json!({"isVideo": true, "url": "https://a/v.mp4"})).is_none());
        assert!(video_entry(&json!({"isVideo": true, "marketPlaceID": "A"})).is_none());
        assert!(video_entry(&json!({"isVideo": true, "marketPlaceID": "A", "url": "/v.mp4"})).is_none());
    }
}
