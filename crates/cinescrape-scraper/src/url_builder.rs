use crate::error::{Result, ScrapeError};
use cinescrape_core::ScrapingConfig;
use url::Url;

/// Build the single-shot listing URL requesting `page_budget × items_per_page` items.
///
/// A page budget of zero is treated as one.
pub fn build_search_url(
    config: &ScrapingConfig,
    keyword: &str,
    genre: &str,
    page_budget: u32,
) -> Result<Url> {
    let count = page_budget.max(1).saturating_mul(config.items_per_page);

    let mut url = Url::parse(&config.base_url)
        .and_then(|base| base.join(&config.search_path))
        .map_err(|e| ScrapeError::InvalidSearchUrl(format!("{}: {e}", config.base_url)))?;

    url.query_pairs_mut()
        .clear()
        .append_pair("title", keyword)
        .append_pair("genres", genre)
        .append_pair("title_type", &config.title_type)
        .append_pair("sort", &config.sort)
        .append_pair("count", &count.to_string())
        .append_pair("start", "1");

    Ok(url)
}
