//! Generic SERP HTML parsing.
//!
//! Used for raw search-engine fetches (the direct/proxy path) and for
//! HTML-proxy providers that return the page verbatim. Desktop and mobile
//! result pages use different markup; the mobile pass only runs when the
//! desktop pass finds nothing and the keyword is tracked on mobile.

use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Selector};
use serpwatch_core::{Device, SerpEntry};

pub(crate) fn parse_serp_html(html: &str, device: Device) -> Vec<SerpEntry> {
    let doc = Html::parse_document(html);
    let entries = parse_desktop(&doc);
    if entries.is_empty() && device == Device::Mobile {
        return parse_mobile(&doc);
    }
    entries
}

/// Desktop markup: result blocks are `div.g` inside the `#search`
/// container (falling back to `#rso`), each with an `h3` heading and an
/// anchor wrapping it.
fn parse_desktop(doc: &Html) -> Vec<SerpEntry> {
    let container = Selector::parse("#search, #rso").expect("valid selector");
    let block = Selector::parse("div.g").expect("valid selector");
    let heading = Selector::parse("h3").expect("valid selector");

    let Some(root) = doc.select(&container).next() else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for result in root.select(&block) {
        push_block(&mut entries, result, &heading);
    }
    entries
}

/// Mobile markup: result blocks are `div.xpd` inside `#main` (falling
/// back to `#rso`), with the heading in a `role="heading"` element.
fn parse_mobile(doc: &Html) -> Vec<SerpEntry> {
    let container = Selector::parse("#main, #rso").expect("valid selector");
    let block = Selector::parse("div.xpd").expect("valid selector");
    let heading = Selector::parse("div[role=\"heading\"], h3").expect("valid selector");

    let Some(root) = doc.select(&container).next() else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for result in root.select(&block) {
        push_block(&mut entries, result, &heading);
    }
    entries
}

/// Extracts one result block. Blocks missing a heading or a usable anchor
/// are dropped without consuming a position number.
fn push_block(entries: &mut Vec<SerpEntry>, block: ElementRef<'_>, heading: &Selector) {
    let anchor = Selector::parse("a[href]").expect("valid selector");

    let title: Option<String> = block
        .select(heading)
        .next()
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());
    let href = block
        .select(&anchor)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| href.starts_with("http") || href.starts_with("/url?"));

    if let (Some(title), Some(href)) = (title, href) {
        let url = clean_serp_url(href);
        if url.is_empty() {
            return;
        }
        #[allow(clippy::cast_possible_truncation)]
        let position = entries.len() as u32 + 1;
        entries.push(SerpEntry {
            title,
            url,
            position,
        });
    }
}

/// Normalizes an extracted href to the destination page.
///
/// Unwraps the search engine's `/url?q=<dest>` redirect wrapper and strips
/// trailing click-tracking parameters so the stored URL is the page the
/// result actually points at.
pub(crate) fn clean_serp_url(raw: &str) -> String {
    let mut url = raw.trim().to_string();

    if let Some(idx) = url.find("/url?") {
        let params = url[idx + "/url?".len()..].to_string();
        for param in params.split('&') {
            if let Some(dest) = param.strip_prefix("q=").or_else(|| param.strip_prefix("url=")) {
                url = percent_decode_str(dest).decode_utf8_lossy().into_owned();
                break;
            }
        }
    }

    for marker in ["&sa=", "&ved=", "&usg="] {
        if let Some(idx) = url.find(marker) {
            url.truncate(idx);
        }
    }

    url
}
