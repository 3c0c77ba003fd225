use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;

use super::{strategies, PageFetcher, PriceQuote, ScrapeError, ScraperConfig, SourceKind};
use crate::entities::items;

/// Turns product URLs into price quotes.
///
/// `extract` never fails: every problem (bad domain, network, markup drift)
/// comes back as a quote with `error` set and no price.
pub struct PriceExtractor {
    fetcher: Arc<dyn PageFetcher>,
    reader: PageReader,
    politeness_delay: Duration,
}

/// Turns fetched HTML into a quote; runs on the blocking pool
pub type PageReader = fn(SourceKind, &str) -> PriceQuote;

impl PriceExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ScraperConfig) -> Self {
        Self {
            fetcher,
            reader: strategies::read_quote,
            politeness_delay: config.politeness_delay,
        }
    }

    /// Replace the default strategy-based page reader.
    pub fn with_reader(mut self, reader: PageReader) -> Self {
        self.reader = reader;
        self
    }

    pub async fn extract(&self, url: &str) -> PriceQuote {
        let Some(kind) = SourceKind::from_url(url) else {
            tracing::warn!("Rejecting price check for unsupported URL: {}", url);
            return PriceQuote::failed(ScrapeError::InvalidSource);
        };

        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                return PriceQuote::failed(ScrapeError::FetchFailed(e.to_string()));
            }
        };

        // Html is !Send; parse on the blocking pool, which also contains panics
        let reader = self.reader;
        let quote = match tokio::task::spawn_blocking(move || reader(kind, &html)).await {
            Ok(quote) => quote,
            Err(e) => PriceQuote::failed(join_failure(e)),
        };

        match (&quote.price, &quote.error) {
            (Some(price), _) => tracing::info!(
                "Price for {}: ${} (regular: {:?}, on sale: {})",
                url,
                price,
                quote.regular_price,
                quote.on_sale
            ),
            (None, Some(e)) => tracing::warn!("Price check for {} failed: {}", url, e),
            (None, None) => {}
        }

        quote
    }

    /// Check every item that has a source URL, one at a time.
    ///
    /// Waits `politeness_delay` between consecutive requests. A failed item is
    /// recorded in the result and the loop moves on.
    pub async fn extract_all(&self, items: &[items::Model]) -> BTreeMap<i32, PriceQuote> {
        let mut results = BTreeMap::new();

        for item in items {
            let Some(url) = item.price_source() else {
                tracing::debug!("Skipping item {} ({}): no source URL", item.id, item.name);
                continue;
            };

            if !results.is_empty() && !self.politeness_delay.is_zero() {
                tokio::time::sleep(self.politeness_delay).await;
            }

            tracing::info!("Checking price for: {}", item.name);
            let quote = self.extract(url).await;
            results.insert(item.id, quote);
        }

        results
    }
}

fn join_failure(err: JoinError) -> ScrapeError {
    ScrapeError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::FetchError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    struct CountingFetcher {
        html: &'static str,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(html: &'static str) -> Arc<Self> {
            Arc::new(Self {
                html,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.html.to_string())
        }
    }

    struct DownFetcher;

    #[async_trait]
    impl PageFetcher for DownFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            Err(FetchError::Timeout(15))
        }
    }

    const WFM_PAGE: &str = r#"<h1>Organic Bananas</h1><div data-testid="product-price">$0.29/lb</div>"#;

    fn no_delay() -> ScraperConfig {
        ScraperConfig {
            politeness_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn item(id: i32, url: Option<&str>) -> items::Model {
        items::Model {
            id,
            name: format!("item {}", id),
            source_url: url.map(str::to_string),
            on_list: true,
            store_id: None,
            target_frequency_days: None,
            occasional: false,
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn test_extract_success() {
        let fetcher = CountingFetcher::new(WFM_PAGE);
        let extractor = PriceExtractor::new(fetcher.clone(), &no_delay());

        let quote = extractor
            .extract("https://www.wholefoodsmarket.com/product/organic-bananas")
            .await;

        assert_eq!(quote.price, Some(dec!(0.29)));
        assert_eq!(quote.product_name.as_deref(), Some("Organic Bananas"));
        assert!(quote.is_ok());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_source_skips_network() {
        let fetcher = CountingFetcher::new(WFM_PAGE);
        let extractor = PriceExtractor::new(fetcher.clone(), &no_delay());

        let quote = extractor.extract("https://www.example.com/bananas").await;

        assert_eq!(quote, PriceQuote::failed(ScrapeError::InvalidSource));
        assert_eq!(quote.error.as_ref().map(|e| e.to_string()).as_deref(), Some("invalid source"));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_a_value() {
        let extractor = PriceExtractor::new(Arc::new(DownFetcher), &no_delay());

        let quote = extractor
            .extract("https://www.wholefoodsmarket.com/product/x")
            .await;

        assert_eq!(quote.price, None);
        assert!(!quote.on_sale);
        assert_eq!(
            quote.error,
            Some(ScrapeError::FetchFailed("timed out after 15s".to_string()))
        );
        assert_eq!(
            quote.error.unwrap().to_string(),
            "fetch failed: timed out after 15s"
        );
    }

    #[tokio::test]
    async fn test_unparseable_page_is_extraction_failure() {
        let fetcher = CountingFetcher::new("<html><body>Access denied</body></html>");
        let extractor = PriceExtractor::new(fetcher, &no_delay());

        let quote = extractor
            .extract("https://www.wholefoodsmarket.com/product/x")
            .await;

        assert_eq!(quote.error, Some(ScrapeError::NoPrice));
        assert_eq!(quote.price, None);
    }

    fn panicking_reader(_kind: SourceKind, _html: &str) -> PriceQuote {
        panic!("malformed page")
    }

    #[tokio::test]
    async fn test_panicking_parse_becomes_unexpected_quote() {
        let fetcher = CountingFetcher::new(WFM_PAGE);
        let extractor =
            PriceExtractor::new(fetcher.clone(), &no_delay()).with_reader(panicking_reader);

        let quote = extractor
            .extract("https://www.wholefoodsmarket.com/product/organic-bananas")
            .await;

        assert_eq!(quote.price, None);
        assert!(!quote.on_sale);
        assert!(matches!(quote.error, Some(ScrapeError::Unexpected(_))));
        assert!(quote.error.unwrap().to_string().starts_with("scrape failed: "));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_panic_in_batch_does_not_stop_later_items() {
        let fetcher = CountingFetcher::new(WFM_PAGE);
        let extractor =
            PriceExtractor::new(fetcher.clone(), &no_delay()).with_reader(panicking_reader);

        let items = vec![
            item(1, Some("https://www.wholefoodsmarket.com/product/a")),
            item(2, Some("https://www.wholefoodsmarket.com/product/b")),
        ];
        let results = extractor.extract_all(&items).await;

        assert_eq!(results.len(), 2);
        assert!(results
            .values()
            .all(|q| matches!(q.error, Some(ScrapeError::Unexpected(_)))));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_extract_all_isolates_failures() {
        let fetcher = CountingFetcher::new(WFM_PAGE);
        let extractor = PriceExtractor::new(fetcher.clone(), &no_delay());

        let items = vec![
            item(1, Some("https://www.wholefoodsmarket.com/product/a")),
            item(2, Some("https://shop.example.org/b")),
            item(3, Some("https://www.wholefoodsmarket.com/product/c")),
        ];

        let results = extractor.extract_all(&items).await;

        assert_eq!(results.len(), 3);
        let invalid: Vec<_> = results
            .iter()
            .filter(|(_, q)| q.error == Some(ScrapeError::InvalidSource))
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(invalid, vec![2]);
        assert_eq!(results[&1].price, Some(dec!(0.29)));
        assert_eq!(results[&3].price, Some(dec!(0.29)));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_extract_all_skips_items_without_url() {
        let fetcher = CountingFetcher::new(WFM_PAGE);
        let extractor = PriceExtractor::new(fetcher.clone(), &no_delay());

        let items = vec![item(1, None), item(2, Some("   "))];
        let results = extractor.extract_all(&items).await;

        assert!(results.is_empty());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_extract_all_waits_between_items() {
        let fetcher = CountingFetcher::new(WFM_PAGE);
        let config = ScraperConfig {
            politeness_delay: Duration::from_millis(40),
            ..Default::default()
        };
        let extractor = PriceExtractor::new(fetcher, &config);

        let items = vec![
            item(1, Some("https://www.wholefoodsmarket.com/product/a")),
            item(2, Some("https://www.wholefoodsmarket.com/product/b")),
            item(3, Some("https://www.wholefoodsmarket.com/product/c")),
        ];

        let started = Instant::now();
        extractor.extract_all(&items).await;

        // Two gaps for three items, none after the last
        assert!(started.elapsed() >= Duration::from_millis(80));
    }
}
