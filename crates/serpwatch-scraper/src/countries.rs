//! Country table used by provider URL builders.
//!
//! Maps an ISO 3166-1 alpha-2 code to the country's display name (used in
//! provider `location` parameters) and the Google interface-language `hl`
//! code for that market. Codes absent from the table fall back to
//! `("Unknown", "en")` so a builder never fails on an exotic country.

/// (code, display name, `hl` language).
static COUNTRIES: &[(&str, &str, &str)] = &[
    ("AR", "Argentina", "es"),
    ("AT", "Austria", "de"),
    ("AU", "Australia", "en"),
    ("BE", "Belgium", "nl"),
    ("BR", "Brazil", "pt"),
    ("CA", "Canada", "en"),
    ("CH", "Switzerland", "de"),
    ("CL", "Chile", "es"),
    ("CN", "China", "zh-CN"),
    ("CO", "Colombia", "es"),
    ("CZ", "Czechia", "cs"),
    ("DE", "Germany", "de"),
    ("DK", "Denmark", "da"),
    ("EG", "Egypt", "ar"),
    ("ES", "Spain", "es"),
    ("FI", "Finland", "fi"),
    ("FR", "France", "fr"),
    ("GB", "United Kingdom", "en"),
    ("GR", "Greece", "el"),
    ("HK", "Hong Kong", "zh-HK"),
    ("HU", "Hungary", "hu"),
    ("ID", "Indonesia", "id"),
    ("IE", "Ireland", "en"),
    ("IL", "Israel", "he"),
    ("IN", "India", "hi"),
    ("IT", "Italy", "it"),
    ("JP", "Japan", "ja"),
    ("KR", "South Korea", "ko"),
    ("MX", "Mexico", "es"),
    ("MY", "Malaysia", "ms"),
    ("NG", "Nigeria", "en"),
    ("NL", "Netherlands", "nl"),
    ("NO", "Norway", "no"),
    ("NZ", "New Zealand", "en"),
    ("PH", "Philippines", "en"),
    ("PL", "Poland", "pl"),
    ("PT", "Portugal", "pt"),
    ("RO", "Romania", "ro"),
    ("RU", "Russia", "ru"),
    ("SA", "Saudi Arabia", "ar"),
    ("SE", "Sweden", "sv"),
    ("SG", "Singapore", "en"),
    ("TH", "Thailand", "th"),
    ("TR", "Turkey", "tr"),
    ("TW", "Taiwan", "zh-TW"),
    ("UA", "Ukraine", "uk"),
    ("US", "United States", "en"),
    ("VN", "Vietnam", "vi"),
    ("ZA", "South Africa", "en"),
];

fn entry(code: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    let upper = code.to_ascii_uppercase();
    COUNTRIES.iter().find(|(c, _, _)| *c == upper)
}

/// Google interface language (`hl`) for a country code. Defaults to `"en"`.
#[must_use]
pub fn language_for(code: &str) -> &'static str {
    entry(code).map_or("en", |(_, _, lang)| *lang)
}

/// Display name for a country code. Defaults to `"Unknown"`.
#[must_use]
pub fn name_for(code: &str) -> &'static str {
    entry(code).map_or("Unknown", |(_, name, _)| *name)
}
