use app_logger::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{Extractor, ScrapeContext};
use crate::{
    common::{
        js_json::search_json,
        media::{url_or_none, ScrapeResult, ThumbnailEntry, VideoResult},
        page::ProductPage,
    },
    error::{ExtractorError, ExtractorResult},
};

pub static URL_MATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:(?:www|[a-z]{2})\.)?item\.taobao\.com/.*?id=(?P<id>\d+)")
        .expect("Invalid regex")
});

pub(super) const TMALL_HOST: &str = "detail.tmall.com";
pub(super) const TAOBAO_HOST: &str = "item.taobao.com";

static TMALL_VIDEO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""imgVedioID"\s*:\s*"?(\d+)"?"#).expect("Invalid regex"));
static TMALL_USER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""userId"\s*:\s*"?(\d+)"?"#).expect("Invalid regex"));
static TAOBAO_VIDEO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoId"\s*:\s*"?(\d+)"?"#).expect("Invalid regex"));
static TAOBAO_USER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""videoOwnerId"\s*:\s*"?(\d+)"?"#).expect("Invalid regex"));
static SHOP_SETUP_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"TShop\.Setup\(\s*").expect("Invalid regex"));

/// Which storefront served the product page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Storefront {
    Tmall,
    Taobao,
}
impl Storefront {
    /// Classify a page by the host it resolved to
    pub(super) fn of(page: &ProductPage) -> ExtractorResult<Self> {
        if page.resolved_host_is(TMALL_HOST) {
            Ok(Self::Tmall)
        } else if page.resolved_host_is(TAOBAO_HOST) {
            Ok(Self::Taobao)
        } else {
            Err(ExtractorError::data_not_found(format!(
                "product page (resolved to {})",
                page.url
            )))
        }
    }
}

/// Video identifiers shared by Taobao and Tmall item pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct CloudVideo {
    pub video_id: String,
    pub user_id: String,
}
impl CloudVideo {
    pub(super) fn from_page(storefront: Storefront, page: &ProductPage) -> ExtractorResult<Self> {
        let (video_re, user_re): (&Regex, &Regex) = match storefront {
            Storefront::Tmall => (&TMALL_VIDEO_ID, &TMALL_USER_ID),
            Storefront::Taobao => (&TAOBAO_VIDEO_ID, &TAOBAO_USER_ID),
        };

        Ok(Self {
            video_id: page.search_regex(video_re, "video id")?,
            user_id: page.search_regex(user_re, "video uid")?,
        })
    }

    pub(super) fn url(&self) -> String {
        format!(
            "https://cloud.video.taobao.com/play/u/{}/p/1/e/6/t/1/{}.mp4",
            self.user_id, self.video_id
        )
    }

    pub(super) fn into_result(self, page: &ProductPage) -> ExtractorResult<VideoResult> {
        let title = page.title()?;
        let url = url_or_none(&self.url());

        Ok(VideoResult::new(self.video_id)
            .with_title(Some(title))
            .with_url(url))
    }
}

/// Product videos from Taobao item pages, including ones that redirect to Tmall
#[derive(Debug, Default)]
pub struct TaobaoExtractor;

impl Extractor for TaobaoExtractor {
    fn name(&self) -> &'static str {
        "taobao"
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
        let thumbnails = match storefront {
            Storefront::Tmall => {
                let shop = search_json(&page.body, &SHOP_SETUP_ANCHOR, "shop setup")?;
                trace!(?shop, "Got shop setup");
                property_pics(&shop)
            }
            Storefront::Taobao => vec![],
        };

        Ok(video.into_result(page)?.with_thumbnails(thumbnails).into())
    }
}

/// Images from `propertyPics`: all of `default`, and the first image of every other property
fn property_pics(shop: &Value) -> Vec<ThumbnailEntry> {
    let Some(pics) = shop.get("propertyPics").and_then(Value::as_object) else {
        return vec![];
    };

    let urls = |x: &Value| {
        x.as_array()
            .map(|x| {
                x.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    };

    pics.iter()
        .flat_map(|(key, value)| {
            let urls = urls(value);
            if key == "default" {
                urls
            } else {
                urls.into_iter().take(1).collect()
            }
        })
        .map(ThumbnailEntry::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;
    use url::Url;

    use super::*;

    #[rstest]
    #[case("https://item.taobao.com/item.htm?id=656308694954", "656308694954")]
    #[case("https://item.taobao.com/item.htm?spm=a1z10.1-c.w4004.1&id=123456&ns=1", "123456")]
    #[case("http://tw.item.taobao.com/item.htm?id=42", "42")]
    fn extracts_item_id(#[case] url: &str, #[case] expected: &str) {
        assert!(TaobaoExtractor.can_handle(url));
        assert_eq!(TaobaoExtractor.extract_id(url), Ok(expected.to_string()));
    }

    #[rstest]
    #[case("https://item.taobao.com/item.htm")]
    #[case("https://detail.tmall.com/item.htm?id=656308694954")]
    #[case("https://world.taobao.com/item/643681750378.htm")]
    fn rejects_other_urls(#[case] url: &str) {
        assert!(TaobaoExtractor.extract_id(url).is_err());
    }

    #[test]
    fn builds_cloud_video_url() {
        let video = CloudVideo {
            video_id: "3213".into(),
            user_id: "77".into(),
        };

        assert_eq!(
            video.url(),
            "https://cloud.video.taobao.com/play/u/77/p/1/e/6/t/1/3213.mp4"
        );
    }

    #[test]
    fn classifies_storefront_by_resolved_host() {
        let page = |resolved: &str| {
            ProductPage::new(
                Url::parse("https://item.taobao.com/item.htm?id=1").expect("valid url"),
                Url::parse(resolved).expect("valid url"),
                "",
            )
        };

        assert_eq!(
            Storefront::of(&page("https://detail.tmall.com/item.htm?id=1")),
            Ok(Storefront::Tmall)
        );
        assert_eq!(
            Storefront::of(&page("https://item.taobao.com/item.htm?id=1")),
            Ok(Storefront::Taobao)
        );
        assert!(Storefront::of(&page("https://www.taobao.com/")).is_err());
    }

    #[test]
    fn picks_property_pics() {
        let shop = json!({
            "propertyPics": {
                "default": ["//img.alicdn.com/d1.jpg", "//img.alicdn.com/d2.jpg"],
                ";1627207:28341;": ["//img.alicdn.com/red1.jpg", "//img.alicdn.com/red2.jpg"],
                ";1627207:28320;": [],
            }
        });

        assert_eq!(
            property_pics(&shop),
            vec![
                ThumbnailEntry::new("//img.alicdn.com/d1.jpg"),
                ThumbnailEntry::new("//img.alicdn.com/d2.jpg"),
                ThumbnailEntry::new("//img.alicdn.com/red1.jpg"),
            ]
        );
        assert!(property_pics(&json!({})).is_empty());
    }
}
