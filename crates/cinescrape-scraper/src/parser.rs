//! Markup extraction for listing and detail pages.
//!
//! Every field is read through a named [`ExtractionRule`] holding one or more
//! selector alternatives. When the site's markup drifts, the failing rule can
//! be identified and tested on its own.

use crate::error::ParseFailure;
use cinescrape_core::{or_sentinel, DetailFields, MovieSummary, NOT_AVAILABLE};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Maximum number of cast members kept from a detail page.
pub const MAX_ACTORS: usize = 5;

/// A named field extractor over an element scope.
///
/// Selectors are tried in order; the first one that yields a value wins.
#[derive(Debug)]
pub struct ExtractionRule {
    name: &'static str,
    selectors: Vec<Selector>,
}

impl ExtractionRule {
    fn new(name: &'static str, selectors: &[&str]) -> Self {
        let selectors = selectors
            .iter()
            .map(|s| Selector::parse(s).expect("static selector is valid"))
            .collect();
        Self { name, selectors }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All elements matched by the first selector alternative that matches anything.
    pub fn select<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        self.selectors
            .iter()
            .map(|selector| scope.select(selector).collect::<Vec<_>>())
            .find(|matches| !matches.is_empty())
            .unwrap_or_default()
    }

    /// Trimmed text of the first matching element with non-empty text.
    pub fn first_text(&self, scope: ElementRef<'_>) -> Option<String> {
        self.selectors.iter().find_map(|selector| {
            scope
                .select(selector)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
    }

    /// Trimmed, non-empty texts of every matching element in document order.
    pub fn all_texts(&self, scope: ElementRef<'_>) -> Vec<String> {
        self.select(scope)
            .into_iter()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Value of `attr` on the first matching element that carries it.
    pub fn first_attr(&self, scope: ElementRef<'_>, attr: &str) -> Option<String> {
        self.selectors.iter().find_map(|selector| {
            scope
                .select(selector)
                .filter_map(|el| el.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(str::to_string)
        })
    }

    /// Whether any matching element's text contains `needle`.
    pub fn any_text_contains(&self, scope: ElementRef<'_>, needle: &str) -> bool {
        self.selectors.iter().any(|selector| {
            scope
                .select(selector)
                .any(|el| el.text().collect::<String>().contains(needle))
        })
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Rules for the search listing page.
#[derive(Debug)]
pub struct ListingRules {
    pub item: ExtractionRule,
    pub item_label: ExtractionRule,
    pub title: ExtractionRule,
    pub link: ExtractionRule,
    pub year: ExtractionRule,
    pub rating: ExtractionRule,
    pub plot: ExtractionRule,
}

/// Rules for a title's detail page.
#[derive(Debug)]
pub struct DetailRules {
    pub principal_credit: ExtractionRule,
    pub credit_name: ExtractionRule,
    pub cast_actor: ExtractionRule,
    pub plot: ExtractionRule,
}

pub fn listing_rules() -> &'static ListingRules {
    static RULES: OnceLock<ListingRules> = OnceLock::new();
    RULES.get_or_init(|| ListingRules {
        item: ExtractionRule::new("listing.item", &[".ipc-metadata-list-summary-item"]),
        item_label: ExtractionRule::new(
            "listing.item_label",
            &["span.ipc-metadata-list-item__label"],
        ),
        title: ExtractionRule::new("listing.title", &[".ipc-title__text"]),
        link: ExtractionRule::new(
            "listing.link",
            &["a.ipc-title-link-wrapper", ".ipc-title-link-wrapper"],
        ),
        year: ExtractionRule::new(
            "listing.year",
            &[".sc-2bbfc9e9-7", ".dli-title-metadata-item"],
        ),
        rating: ExtractionRule::new("listing.rating", &[".ipc-rating-star--rating"]),
        plot: ExtractionRule::new("listing.plot", &[".ipc-html-content-inner-div"]),
    })
}

pub fn detail_rules() -> &'static DetailRules {
    static RULES: OnceLock<DetailRules> = OnceLock::new();
    RULES.get_or_init(|| DetailRules {
        principal_credit: ExtractionRule::new(
            "detail.principal_credit",
            &[r#"[data-testid="title-pc-principal-credit"]"#],
        ),
        credit_name: ExtractionRule::new("detail.credit_name", &["a"]),
        cast_actor: ExtractionRule::new(
            "detail.cast_actor",
            &[r#"[data-testid="title-cast-item"] [data-testid="title-cast-item__actor"]"#],
        ),
        plot: ExtractionRule::new(
            "detail.plot",
            &[r#"[data-testid="plot"] span"#, r#"[data-testid="plot"]"#],
        ),
    })
}

/// Remove a leading `"<digits>. "` ordinal from a listing title.
pub fn strip_ordinal(title: &str) -> String {
    static ORDINAL: OnceLock<Regex> = OnceLock::new();
    let regex = ORDINAL.get_or_init(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));
    regex.replace(title.trim(), "").trim().to_string()
}

/// Resolve a listing href against the site origin, dropping query and fragment.
///
/// Links that resolve to another origin (ads, tracking redirects) are rejected.
pub fn canonical_url(base: &Url, href: &str) -> Result<String, String> {
    let path = href.split('?').next().unwrap_or_default();
    let mut url = base.join(path).map_err(|e| e.to_string())?;
    if url.origin() != base.origin() {
        return Err(format!("link leaves {}", base.origin().ascii_serialization()));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

/// Extracts movie records from rendered listing and detail pages.
#[derive(Debug, Clone)]
pub struct MovieParser {
    base_url: Url,
}

impl MovieParser {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Parse every movie on a listing page.
    ///
    /// Episodes and items without a title or link are skipped. A malformed
    /// item is logged and does not affect the rest of the batch.
    pub fn extract_listing(&self, html: &str) -> Vec<MovieSummary> {
        let document = Html::parse_document(html);
        let rules = listing_rules();
        let mut movies = Vec::new();

        for (index, item) in rules.item.select(document.root_element()).into_iter().enumerate() {
            match self.extract_item(index, item) {
                Ok(Some(movie)) => {
                    tracing::debug!("Parsed movie {}: {} ({})", index + 1, movie.title, movie.url);
                    movies.push(movie);
                }
                Ok(None) => {}
                Err(e) => tracing::error!("Error parsing movie {}: {}", index, e),
            }
        }

        tracing::info!("Found {} movies", movies.len());
        movies
    }

    fn extract_item(
        &self,
        index: usize,
        item: ElementRef<'_>,
    ) -> Result<Option<MovieSummary>, ParseFailure> {
        let rules = listing_rules();

        if rules.item_label.any_text_contains(item, "Episode") {
            tracing::debug!("Skipping episode at position {}", index + 1);
            return Ok(None);
        }

        let title = rules
            .title
            .first_text(item)
            .map(|t| strip_ordinal(&t))
            .filter(|t| !t.is_empty());
        let href = rules.link.first_attr(item, "href");

        let (Some(title), Some(href)) = (title, href) else {
            return Ok(None);
        };

        let url = canonical_url(&self.base_url, &href).map_err(|e| ParseFailure::InvalidLink {
            index,
            href: href.clone(),
            reason: e,
        })?;

        Ok(Some(MovieSummary {
            title,
            url,
            year: or_sentinel(rules.year.first_text(item)),
            rating: or_sentinel(rules.rating.first_text(item)),
            plot: or_sentinel(rules.plot.first_text(item)),
        }))
    }
}

/// Parse directors, top-billed cast and plot from a detail page.
///
/// Missing markup yields `"N/A"` for the affected field; this never fails.
pub fn extract_detail(html: &str) -> DetailFields {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let rules = detail_rules();

    let directors = rules
        .principal_credit
        .select(root)
        .into_iter()
        .next()
        .map(|block| rules.credit_name.all_texts(block))
        .unwrap_or_default();

    let actors: Vec<String> = rules
        .cast_actor
        .all_texts(root)
        .into_iter()
        .take(MAX_ACTORS)
        .collect();

    DetailFields {
        directors: join_or_sentinel(&directors),
        actors: join_or_sentinel(&actors),
        plot: or_sentinel(rules.plot.first_text(root)),
    }
}

fn join_or_sentinel(names: &[String]) -> String {
    if names.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        names.join(", ")
    }
}
