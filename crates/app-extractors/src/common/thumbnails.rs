use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::media::ThumbnailEntry;

static ALICDN_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:img|cbu01)\.alicdn\.com[^"'\s<>()]*?\.(?:jpg|png)"#).expect("Invalid regex")
});

static ALICDN_DETAIL_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:cbu01|img)\.alicdn\.com/img[^"'\s<>()]*?\.(?:jpg|png)"#)
        .expect("Invalid regex")
});

static SIZE_VARIANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\.(?:[-_]?\d{2,4}x\d{2,4})+\.)|(?:.summ.)|(?:.search.)").expect("Invalid regex")
});

/// Drop repeated entries, keeping the first occurrence of each
#[must_use]
pub fn dedup_thumbnails(thumbnails: Vec<ThumbnailEntry>) -> Vec<ThumbnailEntry> {
    let mut seen = HashSet::new();

    thumbnails
        .into_iter()
        .filter(|x| seen.insert(x.clone()))
        .collect()
}

/// Collapse resolution variants (`a.220x220.jpg`, `a.summ.jpg`) to the base image URL
#[must_use]
pub fn strip_size_variants(url: &str) -> String {
    SIZE_VARIANT.replace_all(url, ".").into_owned()
}

/// Sorted `https://` URLs of every alicdn image mentioned in `haystack`
#[must_use]
pub fn find_alicdn_images(haystack: &str) -> Vec<ThumbnailEntry> {
    sorted_https_matches(&ALICDN_IMAGE, haystack)
}

/// Sorted `https://` URLs of alicdn `/img` paths, as found on 1688 detail pages
#[must_use]
pub fn find_alicdn_detail_images(haystack: &str) -> Vec<ThumbnailEntry> {
    sorted_https_matches(&ALICDN_DETAIL_IMAGE, haystack)
}

fn sorted_https_matches(re: &Regex, haystack: &str) -> Vec<ThumbnailEntry> {
    let mut found = re
        .find_iter(haystack)
        .map(|m| format!("https://{}", m.as_str()))
        .collect::<Vec<_>>();
    found.sort();

    found.into_iter().map(ThumbnailEntry::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thumbs(urls: &[&str]) -> Vec<ThumbnailEntry> {
        urls.iter().copied().map(ThumbnailEntry::from).collect()
    }

    #[test]
    fn dedup_keeps_first_seen_order() {
        let input = thumbs(&[
            "https://a/2.jpg",
            "https://a/1.jpg",
            "https://a/2.jpg",
            "https://a/3.jpg",
            "https://a/1.jpg",
        ]);

        assert_eq!(
            dedup_thumbnails(input),
            thumbs(&["https://a/2.jpg", "https://a/1.jpg", "https://a/3.jpg"])
        );
    }

    #[test]
    fn dedup_is_idempotent() {
        let once = dedup_thumbnails(thumbs(&["x", "y", "x", "z", "y", "x"]));
        let twice = dedup_thumbnails(once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn strips_size_variants() {
        assert_eq!(
            strip_size_variants("https://cbu01.alicdn.com/img/ibank/O1CN01.60x60_120x120.jpg"),
            "https://cbu01.alicdn.com/img/ibank/O1CN01.jpg"
        );
        assert_eq!(
            strip_size_variants("https://cbu01.alicdn.com/img/ibank/O1CN01.400x400.jpg"),
            "https://cbu01.alicdn.com/img/ibank/O1CN01.jpg"
        );
        assert_eq!(
            strip_size_variants("https://cbu01.alicdn.com/img/ibank/O1CN01.summ.jpg"),
            "https://cbu01.alicdn.com/img/ibank/O1CN01.jpg"
        );
        assert_eq!(
            strip_size_variants("https://cbu01.alicdn.com/img/ibank/O1CN01.search.jpg"),
            "https://cbu01.alicdn.com/img/ibank/O1CN01.jpg"
        );
        assert_eq!(
            strip_size_variants("https://img.alicdn.com/imgextra/plain.png"),
            "https://img.alicdn.com/imgextra/plain.png"
        );
    }

    #[test]
    fn size_variants_collapse_after_dedup() {
        let input = ["a.220x220.jpg", "a.jpg", "a.60x60.jpg"]
            .iter()
            .map(|x| format!("https://cbu01.alicdn.com/img/{x}"))
            .map(|x| ThumbnailEntry::new(strip_size_variants(&x)))
            .collect::<Vec<_>>();

        assert_eq!(
            dedup_thumbnails(input),
            thumbs(&["https://cbu01.alicdn.com/img/a.jpg"])
        );
    }

    #[test]
    fn finds_sorted_alicdn_images() {
        let html = r#"<p><img src="//img.alicdn.com/imgextra/b.png"/><img src="https://cbu01.alicdn.com/img/a.jpg"></p>
            <span>img.alicdn.com/other.gif</span>"#;

        assert_eq!(
            find_alicdn_images(html),
            thumbs(&[
                "https://cbu01.alicdn.com/img/a.jpg",
                "https://img.alicdn.com/imgextra/b.png",
            ])
        );
    }

    #[test]
    fn detail_images_require_img_path() {
        let html = r#"var desc='<img src="https://cbu01.alicdn.com/img/ibank/2.jpg"><img src="https://img.alicdn.com/tfs/1.jpg">';"#;

        assert_eq!(
            find_alicdn_detail_images(html),
            thumbs(&["https://cbu01.alicdn.com/img/ibank/2.jpg"])
        );
    }
}
