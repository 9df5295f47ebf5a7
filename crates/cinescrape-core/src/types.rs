//! Movie records shared across the Cinescrape pipeline.
//!
//! Missing values are represented by the literal [`NOT_AVAILABLE`] sentinel
//! rather than `Option`, so that every record serializes to the same shape
//! regardless of how much the upstream page exposed.

use serde::{Deserialize, Serialize};

/// Sentinel standing in for "field not available".
pub const NOT_AVAILABLE: &str = "N/A";

/// Returns true if `value` carries real data (non-empty and not the sentinel).
#[must_use]
pub fn is_available(value: &str) -> bool {
    !value.is_empty() && value != NOT_AVAILABLE
}

/// Returns the value, or the sentinel when it is `None` or blank.
#[must_use]
pub fn or_sentinel(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// A movie as it appears on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Title with any leading ordinal (`"1. "`) removed
    pub title: String,
    /// Absolute URL of the detail page, without query string
    pub url: String,
    /// Release year or `"N/A"`
    pub year: String,
    /// User rating or `"N/A"`
    pub rating: String,
    /// Short plot or `"N/A"`
    pub plot: String,
}

impl MovieSummary {
    /// Create a summary with every optional field set to the sentinel.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            year: NOT_AVAILABLE.to_string(),
            rating: NOT_AVAILABLE.to_string(),
            plot: NOT_AVAILABLE.to_string(),
        }
    }

    /// Whether the listing already supplied a plot, making a detail fetch unnecessary.
    #[must_use]
    pub fn has_plot(&self) -> bool {
        is_available(&self.plot)
    }

    /// Merge detail-page fields into this summary.
    ///
    /// The summary plot is kept when it is already available; the detail
    /// plot only fills the sentinel case.
    #[must_use]
    pub fn into_detail(self, fields: DetailFields) -> MovieDetail {
        let plot = if self.has_plot() {
            self.plot
        } else {
            fields.plot
        };

        MovieDetail {
            title: self.title,
            url: self.url,
            year: self.year,
            rating: self.rating,
            plot,
            directors: fields.directors,
            actors: fields.actors,
        }
    }

    /// Promote to a detail record with sentinel credits and the known plot.
    #[must_use]
    pub fn without_details(self) -> MovieDetail {
        let plot = self.plot.clone();
        self.into_detail(DetailFields {
            plot,
            ..DetailFields::unavailable()
        })
    }
}

/// Fields only available on a detail page. This is also the value type of
/// the detail cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailFields {
    /// Comma-joined director names or `"N/A"`
    pub directors: String,
    /// Comma-joined names of the first five cast members or `"N/A"`
    pub actors: String,
    /// Full plot or `"N/A"`
    pub plot: String,
}

impl DetailFields {
    /// All fields set to the sentinel.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            directors: NOT_AVAILABLE.to_string(),
            actors: NOT_AVAILABLE.to_string(),
            plot: NOT_AVAILABLE.to_string(),
        }
    }
}

impl Default for DetailFields {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// A listing summary enriched with detail-page credits.
///
/// Field order matters: it is the column order of CSV output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetail {
    /// Title with any leading ordinal removed
    pub title: String,
    /// Absolute URL of the detail page; the unique key in the store
    pub url: String,
    /// Release year or `"N/A"`
    pub year: String,
    /// User rating or `"N/A"`
    pub rating: String,
    /// Plot or `"N/A"`
    pub plot: String,
    /// Comma-joined director names or `"N/A"`
    pub directors: String,
    /// Comma-joined names of up to five cast members or `"N/A"`
    pub actors: String,
}
