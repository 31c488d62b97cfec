//! Rank resolution: locate the tracked domain in a ranked listing.

use serpwatch_core::{RankMatch, SerpEntry};

/// Finds the tracked domain's best (first) position in a listing.
///
/// The comparison is `www.`-insensitive on both sides and matches when the
/// tracked domain is a substring of the entry's host, so `example.com`
/// matches `shop.example.com`. An empty domain or listing resolves to
/// not-ranked without scanning; no match is a valid outcome
/// (`position == 0`), distinct from a failed scrape.
#[must_use]
pub fn resolve_rank(domain: &str, serp: &[SerpEntry]) -> RankMatch {
    let domain = domain.trim();
    let domain = domain.strip_prefix("www.").unwrap_or(domain);
    if domain.is_empty() || serp.is_empty() {
        return RankMatch::not_ranked();
    }

    let needle = domain.to_ascii_lowercase();
    for entry in serp {
        let host = host_of(&entry.url).to_ascii_lowercase();
        if host.contains(&needle) {
            return RankMatch {
                position: entry.position,
                url: entry.url.clone(),
            };
        }
    }
    RankMatch::not_ranked()
}

/// Extracts the hostname from a URL without pulling in a URL parser:
/// strip the scheme, cut at the first path/query/fragment delimiter,
/// drop a leading `www.`.
fn host_of(url: &str) -> &str {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);
    host.strip_prefix("www.").unwrap_or(host)
}
