use reqwest::Url;

const WHOLE_FOODS_HOST: &str = "wholefoodsmarket.com";
const AMAZON_HOST: &str = "amazon.com";
const AMAZON_STOREFRONT_MARKER: &str = "wholefoods";

/// Retailer page layouts the extractor knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// wholefoodsmarket.com product pages
    WholeFoods,
    /// The Whole Foods storefront on amazon.com
    AmazonWholeFoods,
}

impl SourceKind {
    /// Classify a product URL, or `None` if it is outside the allowed domains.
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url.trim()).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }

        let host = parsed.host_str()?.to_ascii_lowercase();

        if host_matches(&host, WHOLE_FOODS_HOST) {
            return Some(Self::WholeFoods);
        }

        if host_matches(&host, AMAZON_HOST)
            && parsed.as_str().to_ascii_lowercase().contains(AMAZON_STOREFRONT_MARKER)
        {
            return Some(Self::AmazonWholeFoods);
        }

        None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WholeFoods => "wholefoods",
            Self::AmazonWholeFoods => "amazon_wholefoods",
        }
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}
