//! Per-retailer price, sale and name extraction over a fetched product page.
//!
//! Each source kind owns an ordered list of price strategies. They are tried
//! in order and the first one that yields a price wins; results are never
//! combined. Sale detection runs separately so a page whose price came from a
//! fallback strategy can still be flagged as discounted.

use std::str::FromStr;

use lazy_static::lazy_static;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use serde_json::Value;

use super::parser::{element_text, first_dollar_amount, normalize_price};
use super::{PriceQuote, ScrapeError, SourceKind};

lazy_static! {
    static ref AMAZON_CORE_PRICE: Selector =
        Selector::parse("#corePrice_feature_div .a-offscreen").unwrap();
    static ref AMAZON_PRICE_BLOCK: Selector = Selector::parse("#priceblock_ourprice").unwrap();
    static ref AMAZON_A_PRICE: Selector =
        Selector::parse("span.a-price:not(.a-text-price) span.a-offscreen").unwrap();
    static ref AMAZON_WAS_PRICE: Selector =
        Selector::parse("span.a-text-price span.a-offscreen").unwrap();
    static ref AMAZON_SAVINGS: Selector = Selector::parse("span.savingsPercentage").unwrap();
    static ref AMAZON_TITLE: Selector = Selector::parse("#productTitle").unwrap();

    static ref WFM_PRODUCT_PRICE: Selector =
        Selector::parse(r#"[data-testid="product-price"]"#).unwrap();
    static ref WFM_ANY_PRICE: Selector = Selector::parse(r#"[class*="price"]"#).unwrap();
    static ref WFM_REGULAR_PRICE: Selector = Selector::parse(
        r#"[data-testid="regular-price"], [class*="regular-price"], [class*="price"] s, [class*="price"] del"#
    )
    .unwrap();
    static ref WFM_SALE_BADGE: Selector = Selector::parse(
        r#"[data-testid="sale-badge"], [class*="sale-badge"], [class*="discount"]"#
    )
    .unwrap();
    static ref WFM_TITLE: Selector = Selector::parse("h1").unwrap();

    static ref JSON_LD: Selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    static ref OG_TITLE: Selector = Selector::parse(r#"meta[property="og:title"]"#).unwrap();
}

/// A fetched product page
pub struct Page<'a> {
    pub document: Html,
    pub raw: &'a str,
}

impl<'a> Page<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            document: Html::parse_document(raw),
            raw,
        }
    }

    fn first_price(&self, selector: &Selector) -> Option<Decimal> {
        self.document
            .select(selector)
            .next()
            .and_then(|el| normalize_price(&element_text(el)))
    }

    fn any_price(&self, selector: &Selector) -> Option<Decimal> {
        self.document
            .select(selector)
            .find_map(|el| normalize_price(&element_text(el)))
    }

    fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    }
}

/// A named price lookup; `None` means "try the next one"
pub struct PriceStrategy {
    pub name: &'static str,
    pub run: fn(&Page<'_>) -> Option<Decimal>,
}

static AMAZON_STRATEGIES: &[PriceStrategy] = &[
    PriceStrategy {
        name: "core_price",
        run: |page| page.first_price(&AMAZON_CORE_PRICE),
    },
    PriceStrategy {
        name: "price_block",
        run: |page| page.first_price(&AMAZON_PRICE_BLOCK),
    },
    PriceStrategy {
        name: "a_price",
        run: |page| page.first_price(&AMAZON_A_PRICE),
    },
    PriceStrategy {
        name: "page_text",
        run: |page| first_dollar_amount(page.raw),
    },
];

static WHOLE_FOODS_STRATEGIES: &[PriceStrategy] = &[
    PriceStrategy {
        name: "product_price",
        run: |page| page.first_price(&WFM_PRODUCT_PRICE),
    },
    PriceStrategy {
        name: "json_ld_offer",
        run: json_ld_offer_price,
    },
    PriceStrategy {
        name: "price_class",
        run: price_class_price,
    },
];

impl SourceKind {
    pub fn price_strategies(&self) -> &'static [PriceStrategy] {
        match self {
            Self::WholeFoods => WHOLE_FOODS_STRATEGIES,
            Self::AmazonWholeFoods => AMAZON_STRATEGIES,
        }
    }
}

/// Evidence of a discount, independent of which strategy found the price
#[derive(Debug, Default, PartialEq)]
pub struct SaleSignal {
    /// Struck-through or "regular" price, if one could be read
    pub was_price: Option<Decimal>,
    /// A discount badge or explicit strikethrough was present
    pub marker: bool,
}

pub fn detect_sale(kind: SourceKind, page: &Page<'_>) -> SaleSignal {
    match kind {
        SourceKind::AmazonWholeFoods => SaleSignal {
            // a-text-price is also used for unit prices, so it only counts
            // once compared against the current price
            was_price: page.any_price(&AMAZON_WAS_PRICE),
            marker: page.document.select(&AMAZON_SAVINGS).next().is_some(),
        },
        SourceKind::WholeFoods => {
            let regular = page.document.select(&WFM_REGULAR_PRICE).next();
            SaleSignal {
                was_price: page.any_price(&WFM_REGULAR_PRICE),
                marker: regular.is_some() || page.document.select(&WFM_SALE_BADGE).next().is_some(),
            }
        }
    }
}

pub fn product_name(kind: SourceKind, page: &Page<'_>) -> Option<String> {
    let title = match kind {
        SourceKind::AmazonWholeFoods => page.first_text(&AMAZON_TITLE),
        SourceKind::WholeFoods => page.first_text(&WFM_TITLE),
    };

    title.or_else(|| {
        page.document
            .select(&OG_TITLE)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty())
            .map(str::to_string)
    })
}

/// Run the source's strategies over a page and assemble the quote.
pub fn read_quote(kind: SourceKind, raw: &str) -> PriceQuote {
    let page = Page::parse(raw);
    let product_name = product_name(kind, &page);

    let found = kind
        .price_strategies()
        .iter()
        .find_map(|strategy| (strategy.run)(&page).map(|price| (strategy.name, price)));

    let Some((strategy, price)) = found else {
        return PriceQuote {
            product_name,
            ..PriceQuote::failed(ScrapeError::NoPrice)
        };
    };

    tracing::debug!("{} price {} via {}", kind.as_str(), price, strategy);

    let sale = detect_sale(kind, &page);
    let (on_sale, regular_price) = match sale.was_price {
        Some(was) if was > price => (true, was),
        _ if sale.marker => (true, price),
        _ => (false, price),
    };

    PriceQuote {
        price: Some(price),
        regular_price: Some(regular_price),
        on_sale,
        product_name,
        error: None,
    }
}

fn price_class_price(page: &Page<'_>) -> Option<Decimal> {
    page.document
        .select(&WFM_ANY_PRICE)
        .filter(|el| {
            let class = el.value().attr("class").unwrap_or_default().to_ascii_lowercase();
            !class.contains("regular") && !class.contains("was")
        })
        .find_map(|el| normalize_price(&element_text(el)))
}

fn json_ld_offer_price(page: &Page<'_>) -> Option<Decimal> {
    page.document
        .select(&JSON_LD)
        .filter_map(|el| serde_json::from_str::<Value>(&el.text().collect::<String>()).ok())
        .find_map(|doc| offer_price(&doc))
}

fn offer_price(value: &Value) -> Option<Decimal> {
    match value {
        Value::Array(entries) => entries.iter().find_map(offer_price),
        Value::Object(map) => {
            if let Some(offers) = map.get("offers") {
                let price = match offers {
                    Value::Array(list) => list.iter().find_map(|offer| offer.get("price")),
                    other => other.get("price"),
                };
                if let Some(price) = price.and_then(json_price) {
                    return Some(price);
                }
            }
            map.get("@graph").and_then(offer_price)
        }
        _ => None,
    }
}

fn json_price(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(text) => normalize_price(text),
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        _ => None,
    }
}
