use app_logger::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{Extractor, ScrapeContext};
use crate::{
    common::{
        js_json::search_json,
        media::{url_or_none, Format, ScrapeResult, VideoResult},
        page::{html_title, ProductPage},
    },
    error::ExtractorResult,
};

pub static URL_MATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?ebay\.(?:[a-z]{2,3})(?:\.[a-z]{2})?/itm(?:[/\S])*/(?P<id>[0-9]{9,12})",
    )
    .expect("Invalid regex")
});

static VIDEO_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r#""video":"#).expect("Invalid regex"));

const TITLE_SUFFIX: &str = " | eBay";

/// Listing videos from eBay item pages
#[derive(Debug, Default)]
pub struct EbayExtractor;

impl Extractor for EbayExtractor {
    fn name(&self) -> &'static str {
        "ebay"
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
        let video = search_json(&page.body, &VIDEO_ANCHOR, "video json")?;

        let formats = video
            .get("playlistMap")
            .and_then(Value::as_object)
            .map(|x| {
                x.iter()
                    .filter_map(|(kind, url)| playlist_format(kind, url))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        debug!(?formats, "Got formats from playlist map");

        let title = html_title(&page.body)
            .map(|x| x.strip_suffix(TITLE_SUFFIX).map(ToString::to_string).unwrap_or(x));

        Ok(VideoResult::new(id)
            .with_title(title)
            .with_formats(formats)
            .into())
    }
}

fn playlist_format(kind: &str, url: &Value) -> Option<Format> {
    let (ext, format_id) = match kind {
        "HLS" => ("m3u8", "hls"),
        "DASH" => ("mpd", "dash"),
        _ => {
            warn!(kind, "Unsupported format");
            return None;
        }
    };

    let Some(url) = url.as_str().and_then(url_or_none) else {
        debug!(kind, ?url, "Skipping playlist entry without a valid url");
        return None;
    };

    Some(Format {
        url,
        ext: ext.to_string(),
        format_id: format_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case(
        "https://www.ebay.com/itm/adidas-Originals-Ultraboost-DNA-XXII-Shoes-Men-039-s-/155249878436?&_trksid=p2056016.m2516.l5255",
        "155249878436"
    )]
    #[case("https://www.ebay.com/itm/155249878436", "155249878436")]
    #[case("https://ebay.co.uk/itm/some-title/123456789", "123456789")]
    fn extracts_item_id(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(EbayExtractor.extract_id(url), Ok(expected.to_string()));
    }

    #[rstest]
    #[case("https://www.ebay.com/itm/12345")]
    #[case("https://www.ebay.com/sch/i.html?_nkw=155249878436")]
    fn rejects_non_item_urls(#[case] url: &str) {
        assert!(EbayExtractor.extract_id(url).is_err());
    }

    #[test]
    fn maps_playlist_kinds() {
        let hls = playlist_format("HLS", &json!("https://video.ebaycdn.net/a/playlist.m3u8"))
            .expect("hls format");
        let dash = playlist_format("DASH", &json!("https://video.ebaycdn.net/a/manifest.mpd"))
            .expect("dash format");

        assert_eq!((hls.ext.as_str(), hls.format_id.as_str()), ("m3u8", "hls"));
        assert_eq!((dash.ext.as_str(), dash.format_id.as_str()), ("mpd", "dash"));
        assert!(playlist_format("MP4", &json!("https://video.ebaycdn.net/a.mp4")).is_none());
        assert!(playlist_format("HLS", &json!(null)).is_none());
    }
}
