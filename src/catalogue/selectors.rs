//! CSS selectors for catalogue listing pages.
//!
//! Update this file when the catalogue markup changes, and add a fixture
//! under `tests/fixtures` that reproduces the new layout.

use scraper::Selector;
use std::sync::LazyLock;

/// One book card on a listing page.
pub static LISTING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article.product_pod").unwrap());

/// Title link; the full title lives in its `title` attribute.
pub static TITLE_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3 a").unwrap());

/// Attribute holding the untruncated title.
pub static TITLE_ATTR: &str = "title";

/// Price paragraph, e.g. `£51.77`.
pub static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.price_color").unwrap());

/// Stock status paragraph.
pub static AVAILABILITY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        "p.instock.availability, \
         p.availability",
    )
    .unwrap()
});

/// Star rating paragraph; the label is its second class (`star-rating Three`).
pub static RATING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.star-rating").unwrap());

/// Class shared by every rating paragraph, skipped when reading the label.
pub static RATING_CLASS: &str = "star-rating";
