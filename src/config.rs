// src/config.rs

/// The article we scrape.
pub static PAGE_URL: &str = "https://en.wikipedia.org/wiki/List_of_books_banned_by_governments";

/// Sent as `User-Agent`; Wikipedia rejects requests without one.
pub static USER_AGENT: &str = "Mozilla/5.0";

/// Written to the current working directory.
pub static OUTPUT_FILE: &str = "banned_books_by_governments_by_country.csv";

/// Container holding the rendered article body.
pub static CONTENT_SELECTOR: &str = "#mw-content-text .mw-parser-output";

/// Tables we extract rows from.
pub static TABLE_SELECTOR: &str = "table.wikitable";

/// Heading tag that opens a country section.
pub static COUNTRY_HEADING: &str = "h2";

/// Heading tag that opens a subdivision within a country section.
pub static SUBDIVISION_HEADING: &str = "h3";

/// H2 titles that are article housekeeping rather than countries.
pub static NON_COUNTRY_HEADINGS: &[&str] = &[
    "See also",
    "References",
    "Further reading",
    "External links",
    "Notes",
    "Citations",
];

/// True if `title` names a housekeeping section.
pub fn is_non_country(title: &str) -> bool {
    NON_COUNTRY_HEADINGS.contains(&title)
}
