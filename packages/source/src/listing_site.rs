//! Listing site search page client.
//!
//! Fetches `{base_url}/{search_path}/{slug}?rentalPrice_from=..&rentalPrice_to=..`
//! and extracts adverts from the page's embedded `__NEXT_DATA__` JSON.
//! When that script is missing or yields nothing, the rendered result
//! cards are scraped instead.

use async_trait::async_trait;
use property_insights_models::{PriceBand, RawListing};
use scraper::{ElementRef, Html, Selector};

use crate::registry::ListingSiteConfig;
use crate::{ListingSearch, SourceError, retry};

const SERVICE: &str = "listing_site";

/// [`ListingSearch`] backed by the listing site's search pages.
pub struct ListingSite {
    client: reqwest::Client,
    config: ListingSiteConfig,
}

impl ListingSite {
    /// Creates a search client.
    #[must_use]
    pub const fn new(client: reqwest::Client, config: ListingSiteConfig) -> Self {
        Self { client, config }
    }

    /// Builds the search URL for a location slug and price band.
    #[must_use]
    pub fn search_url(&self, location: &str, band: PriceBand) -> String {
        format!(
            "{}/{}/{location}?rentalPrice_from={:.0}&rentalPrice_to={:.0}",
            self.config.base_url.trim_end_matches('/'),
            self.config.search_path,
            band.min,
            band.max
        )
    }
}

#[async_trait]
impl ListingSearch for ListingSite {
    async fn search(
        &self,
        location: &str,
        band: PriceBand,
    ) -> Result<Vec<RawListing>, SourceError> {
        let url = self.search_url(location, band);
        log::info!("Searching similar listings: {url}");

        let html = retry::send_text(SERVICE, || {
            self.client
                .get(&url)
                .header(reqwest::header::USER_AGENT, &self.config.user_agent)
                .header(
                    reqwest::header::ACCEPT,
                    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
                )
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
        })
        .await?;

        let listings = parse_search_page(&html, &self.config.base_url);
        log::info!("{} raw listings on search page", listings.len());
        Ok(listings)
    }
}

/// Extracts adverts from a search page, preferring embedded page data.
fn parse_search_page(html: &str, base_url: &str) -> Vec<RawListing> {
    let document = Html::parse_document(html);

    let from_data = parse_next_data(&document, base_url);
    if !from_data.is_empty() {
        return from_data;
    }

    log::debug!("No adverts in page data, falling back to result cards");
    parse_result_cards(&document, base_url)
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|_| unreachable!())
}

fn absolute_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reads `props.pageProps.adverts` from the `__NEXT_DATA__` script.
///
/// The monthly price is used, falling back to the weekly price when the
/// monthly one is absent or zero.
fn parse_next_data(document: &Html, base_url: &str) -> Vec<RawListing> {
    let Some(script) = document.select(&selector("script#__NEXT_DATA__")).next() else {
        return Vec::new();
    };

    let text: String = script.text().collect();
    let data: serde_json::Value = match serde_json::from_str(&text) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Failed to decode __NEXT_DATA__: {e}");
            return Vec::new();
        }
    };

    let Some(adverts) = data["props"]["pageProps"]["adverts"].as_array() else {
        return Vec::new();
    };

    adverts
        .iter()
        .map(|ad| {
            let price = &ad["price"];
            let amount = price["monthly"]
                .as_f64()
                .filter(|p| *p > 0.0)
                .or_else(|| price["weekly"].as_f64())
                .filter(|p| *p > 0.0);

            RawListing {
                address: ad["displayAddress"].as_str().and_then(non_empty),
                price_text: amount.map(|p| p.to_string()),
                url: ad["adPath"]
                    .as_str()
                    .and_then(non_empty)
                    .map(|path| absolute_url(base_url, &path)),
            }
        })
        .collect()
}

fn child_text(card: ElementRef<'_>, css: &str) -> Option<String> {
    card.select(&selector(css))
        .next()
        .and_then(|el| non_empty(&el.text().collect::<String>()))
}

/// Scrapes rendered `li[data-testid^='result-']` cards.
fn parse_result_cards(document: &Html, base_url: &str) -> Vec<RawListing> {
    document
        .select(&selector("li[data-testid^='result-']"))
        .map(|card| RawListing {
            address: child_text(card, "div[data-tracking='srp_address'] p"),
            price_text: child_text(card, "div[data-tracking='srp_price'] p"),
            url: card
                .select(&selector("a[href^='/share/']"))
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| absolute_url(base_url, href)),
        })
        .collect()
}
