//! Markup extraction for listing and article pages.
//!
//! The crawl engine never touches selectors itself; it hands raw page text
//! to this module and gets back ordered titles, items, or a cleaned article
//! body.
//!
//! # Markup shape
//!
//! Listing pages enumerate entries as `ul.type02 li`, each carrying an
//! anchor (title + link) and a `span.date` cell with the 12-hour clock
//! text. Article pages carry their body under `article#dic_area`, polluted
//! with script/style blocks and layout `div`/`span` wrappers whose text is
//! not part of the story.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::models::{ExtractedItem, ListingPage};

static ITEM_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("ul.type02 li").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static TIME_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("span.date").unwrap());
static CONTENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article#dic_area").unwrap());

/// Tags whose entire subtree is dropped when cleaning article bodies.
const DROPPED_TAGS: [&str; 4] = ["script", "style", "div", "span"];

/// Pull the ordered titles and candidate items out of one listing page.
///
/// Rows without an anchor are skipped. Relative links are resolved against
/// `listing_url`.
pub fn parse_listing(html: &str, listing_url: &str) -> ListingPage {
    let document = Html::parse_document(html);
    let mut page = ListingPage::default();

    for row in document.select(&ITEM_SELECTOR) {
        let Some(anchor) = row.select(&ANCHOR_SELECTOR).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let title = anchor
            .text()
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
        let raw_time = row
            .select(&TIME_SELECTOR)
            .next()
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        page.titles.push(title.clone());
        page.items.push(ExtractedItem {
            title,
            link: resolve_link(listing_url, href),
            raw_time,
        });
    }

    page
}

/// Extract the cleaned article body from one detail page.
///
/// Returns `None` when the page has no recognizable content element.
pub fn parse_article_content(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let content = document.select(&CONTENT_SELECTOR).next()?;

    let mut text = String::new();
    collect_clean_text(content, &mut text);
    Some(text.trim().to_string())
}

fn collect_clean_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            if !DROPPED_TAGS.contains(&el.value().name()) {
                collect_clean_text(el, out);
            }
        }
    }
}

fn resolve_link(base: &str, href: &str) -> String {
    if let Ok(absolute) = Url::parse(href) {
        return absolute.to_string();
    }
    Url::parse(base)
        .ok()
        .and_then(|base| base.join(href).ok())
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|| href.to_string())
}
