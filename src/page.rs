//! Facts about the current page that cookie handling depends on.
use url::Url;

/// Where the gateway runs: the page URL, how it was reached and whether it
/// is framed.
#[derive(Debug, Clone)]
pub struct PageContext {
    url: Url,
    referrer: Option<Url>,
    in_iframe: bool,
}

impl PageContext {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            referrer: None,
            in_iframe: false,
        }
    }

    pub fn with_referrer(mut self, referrer: Option<Url>) -> Self {
        self.referrer = referrer;
        self
    }

    pub fn in_iframe(mut self, framed: bool) -> Self {
        self.in_iframe = framed;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `true` when the page is served over https; cookies then carry `Secure`.
    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn hostname(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn pathname(&self) -> &str {
        self.url.path()
    }

    /// Path component of the referrer, if there is one.
    pub fn referrer_path(&self) -> Option<&str> {
        self.referrer.as_ref().map(Url::path)
    }

    pub fn is_framed(&self) -> bool {
        self.in_iframe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_url_parts() {
        let url = Url::parse("https://www.example.com/cookie-settings?x=1").unwrap();
        let page = PageContext::new(url)
            .with_referrer(Url::parse("https://www.example.com/search?q=cloud").ok());

        assert!(page.is_secure());
        assert_eq!(page.hostname(), "www.example.com");
        assert_eq!(page.pathname(), "/cookie-settings");
        assert_eq!(page.referrer_path(), Some("/search"));
        assert!(!page.is_framed());
    }
}
