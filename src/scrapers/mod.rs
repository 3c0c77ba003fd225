pub mod extractor;
pub mod fetcher;
pub mod parser;
pub mod source;
pub mod strategies;

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

pub use extractor::{PageReader, PriceExtractor};
pub use fetcher::{FetchError, HttpFetcher, PageFetcher};
pub use source::SourceKind;

/// Result of a single price check. Failures are carried in `error`, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub regular_price: Option<Decimal>,
    pub on_sale: bool,
    pub product_name: Option<String>,
    pub error: Option<ScrapeError>,
}

impl PriceQuote {
    pub fn failed(error: ScrapeError) -> Self {
        Self {
            price: None,
            regular_price: None,
            on_sale: false,
            product_name: None,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.price.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrapeError {
    /// URL is outside the allowed retailer domains; nothing was fetched
    #[error("invalid source")]
    InvalidSource,
    #[error("fetch failed: {0}")]
    FetchFailed(String),
    #[error("could not extract price")]
    NoPrice,
    #[error("scrape failed: {0}")]
    Unexpected(String),
}

impl Serialize for ScrapeError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug)]
pub struct ScraperConfig {
    pub fetch_timeout: Duration,
    pub politeness_delay: Duration,
    pub max_redirects: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(15),
            politeness_delay: Duration::from_secs(2),
            max_redirects: 5,
        }
    }
}
