use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

pub const DEFAULT_VIDEO_EXT: &str = "mp4";

/// Substituted as the media URL when a page has no video
pub const PLACEHOLDER_MEDIA_URL: &str = "http://bo.vutn.net/no-video.mp4";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: String,
    pub url: Url,
    pub ext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
}
impl MediaEntry {
    #[must_use]
    pub fn new<I>(id: I, url: Url) -> Self
    where
        I: Into<String>,
    {
        let ext = ext_from_url(&url).unwrap_or_else(|| DEFAULT_VIDEO_EXT.to_string());

        Self {
            id: id.into(),
            url,
            ext,
            title: None,
            thumbnail: None,
            duration: None,
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbnailEntry {
    pub url: String,
}
impl ThumbnailEntry {
    #[must_use]
    pub fn new<T>(url: T) -> Self
    where
        T: Into<String>,
    {
        Self { url: url.into() }
    }
}

impl From<String> for ThumbnailEntry {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl From<&str> for ThumbnailEntry {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    pub url: Url,
    pub ext: String,
    pub format_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistResult {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub entries: Vec<MediaEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoResult {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<Format>,
    #[serde(default)]
    pub thumbnails: Vec<ThumbnailEntry>,
}
impl VideoResult {
    #[must_use]
    pub fn new<I>(id: I) -> Self
    where
        I: Into<String>,
    {
        Self {
            id: id.into(),
            title: None,
            url: None,
            ext: None,
            formats: vec![],
            thumbnails: vec![],
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: Option<Url>) -> Self {
        self.ext = url
            .as_ref()
            .map(|x| ext_from_url(x).unwrap_or_else(|| DEFAULT_VIDEO_EXT.to_string()));
        self.url = url;
        self
    }

    #[must_use]
    pub fn with_formats(mut self, formats: Vec<Format>) -> Self {
        self.formats = formats;
        self
    }

    #[must_use]
    pub fn with_thumbnails(mut self, thumbnails: Vec<ThumbnailEntry>) -> Self {
        self.thumbnails = thumbnails;
        self
    }

    #[must_use]
    pub fn has_media(&self) -> bool {
        self.url.is_some() || !self.formats.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "snake_case")]
pub enum ScrapeResult {
    Playlist(PlaylistResult),
    Video(VideoResult),
}
impl ScrapeResult {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Playlist(x) => &x.id,
            Self::Video(x) => &x.id,
        }
    }

    #[must_use]
    pub const fn as_video(&self) -> Option<&VideoResult> {
        match self {
            Self::Video(x) => Some(x),
            Self::Playlist(_) => None,
        }
    }

    #[must_use]
    pub const fn as_playlist(&self) -> Option<&PlaylistResult> {
        match self {
            Self::Playlist(x) => Some(x),
            Self::Video(_) => None,
        }
    }
}

impl From<PlaylistResult> for ScrapeResult {
    fn from(value: PlaylistResult) -> Self {
        Self::Playlist(value)
    }
}

impl From<VideoResult> for ScrapeResult {
    fn from(value: VideoResult) -> Self {
        Self::Video(value)
    }
}

/// Coerce a JSON number or numeric string into an integer.
///
/// Anything else yields `None`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn int_or_none(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|x| x.is_finite()).map(|x| x as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|x| x.is_finite()).map(|x| x as i64))
        }
        _ => None,
    }
}

/// Non-empty string value, trimmed
#[must_use]
pub fn str_or_none(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(ToString::to_string)
}

/// Parse an absolute http(s) URL, accepting protocol-relative ones
#[must_use]
pub fn url_or_none(value: &str) -> Option<Url> {
    let value = value.trim();
    let value = if value.starts_with("//") {
        format!("https:{}", value)
    } else {
        value.to_string()
    };

    Url::parse(&value)
        .ok()
        .filter(|x| matches!(x.scheme(), "http" | "https"))
}

/// Lowercase file extension of the last path segment
#[must_use]
pub fn ext_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.last()?;
    let (stem, ext) = last.rsplit_once('.')?;

    if stem.is_empty() || ext.is_empty() || ext.len() > 5 {
        return None;
    }

    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn int_or_none_coerces_numbers_and_strings() {
        assert_eq!(int_or_none(Some(&json!(34))), Some(34));
        assert_eq!(int_or_none(Some(&json!(34.9))), Some(34));
        assert_eq!(int_or_none(Some(&json!("720"))), Some(720));
        assert_eq!(int_or_none(Some(&json!(" 1080 "))), Some(1080));
        assert_eq!(int_or_none(Some(&json!("12.5"))), Some(12));
    }

    #[test]
    fn int_or_none_is_absent_on_failure() {
        assert_eq!(int_or_none(None), None);
        assert_eq!(int_or_none(Some(&json!(null))), None);
        assert_eq!(int_or_none(Some(&json!("tall"))), None);
        assert_eq!(int_or_none(Some(&json!({"h": 1}))), None);
        assert_eq!(int_or_none(Some(&json!(true))), None);
    }

    #[test]
    fn url_or_none_requires_absolute_http() {
        assert!(url_or_none("https://a.example/v.mp4").is_some());
        assert_eq!(
            url_or_none("//img.alicdn.com/a.jpg").map(|x| x.to_string()),
            Some("https://img.alicdn.com/a.jpg".to_string())
        );
        assert!(url_or_none("/relative/v.mp4").is_none());
        assert!(url_or_none("javascript:void(0)").is_none());
        assert!(url_or_none("").is_none());
    }

    #[test]
    fn ext_is_taken_from_last_segment() {
        let url = |s| Url::parse(s).expect("valid url");

        assert_eq!(ext_from_url(&url("https://a.b/x/v.MP4?x=1")), Some("mp4".into()));
        assert_eq!(ext_from_url(&url("https://a.b/x/master.m3u8")), Some("m3u8".into()));
        assert_eq!(ext_from_url(&url("https://a.b/x/video")), None);
        assert_eq!(ext_from_url(&url("https://a.b/")), None);
    }

    #[test]
    fn media_entry_defaults_to_mp4() {
        let entry = MediaEntry::new("A1", Url::parse("https://a.b/stream").expect("valid url"));

        assert_eq!(entry.ext, "mp4");
    }

    #[test]
    fn video_result_serializes_generic_shape() {
        let res = ScrapeResult::from(
            VideoResult::new("1")
                .with_title(Some("t".into()))
                .with_url(url_or_none("https://a.b/v.mp4"))
                .with_thumbnails(vec!["https://a.b/1.jpg".into()]),
        );

        let out = serde_json::to_value(&res).expect("serializable");

        assert_eq!(
            out,
            json!({
                "_type": "video",
                "id": "1",
                "title": "t",
                "url": "https://a.b/v.mp4",
                "ext": "mp4",
                "thumbnails": [{"url": "https://a.b/1.jpg"}],
            })
        );
    }
}
