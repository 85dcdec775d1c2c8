use url::Url;

pub struct DomainParser;
impl DomainParser {
    /// Lowercased host of the URL, without a trailing dot
    #[must_use]
    pub fn get_host(url: &Url) -> Option<String> {
        url.host_str()
            .map(|x| x.trim_end_matches('.').to_ascii_lowercase())
    }

    /// Whether the URL host is `host` or one of its subdomains.
    ///
    /// This is a plain label-boundary suffix comparison on the host string.
    /// The public suffix list is not consulted, so `host` should be a
    /// registrable domain or one of its subdomains, never a bare suffix like `com.cn`.
    #[must_use]
    pub fn host_matches(url: &Url, host: &str) -> bool {
        Self::get_host(url).is_some_and(|x| {
            x == host
                || x.strip_suffix(host)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}
