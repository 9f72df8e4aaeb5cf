// src/sections.rs

use ego_tree::NodeId;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::config::{is_non_country, COUNTRY_HEADING, SUBDIVISION_HEADING};
use crate::html::{has_class, visible_text};

static HEADLINE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.mw-headline").expect("headline selector should parse"));

/// Country and optional subdivision a table sits under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionContext {
    pub country: String,
    pub subdivision: Option<String>,
}

/// Display title of a heading: the `mw-headline` span if there is one,
/// otherwise the heading's own text minus its edit link.
pub fn headline_text(heading: ElementRef<'_>) -> Option<String> {
    let text = match heading.select(&HEADLINE).next() {
        Some(span) => visible_text(span, |_| false),
        None => visible_text(heading, |e| has_class(e, "mw-editsection")),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Clone, Copy)]
struct Heading<'a> {
    pos: usize,
    el: ElementRef<'a>,
}

/// Document-order positions of every element plus the country and
/// subdivision headings, built once per page.
pub struct HeadingIndex<'a> {
    positions: HashMap<NodeId, usize>,
    countries: Vec<Heading<'a>>,
    subdivisions: Vec<Heading<'a>>,
}

impl<'a> HeadingIndex<'a> {
    pub fn build(doc: &'a Html) -> Self {
        let mut positions = HashMap::new();
        let mut countries = Vec::new();
        let mut subdivisions = Vec::new();

        for (pos, node) in doc.tree.root().descendants().enumerate() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };
            positions.insert(el.id(), pos);

            let name = el.value().name();
            if name == COUNTRY_HEADING {
                countries.push(Heading { pos, el });
            } else if name == SUBDIVISION_HEADING {
                subdivisions.push(Heading { pos, el });
            }
        }

        trace!(
            countries = countries.len(),
            subdivisions = subdivisions.len(),
            "indexed headings"
        );
        Self {
            positions,
            countries,
            subdivisions,
        }
    }

    /// Last heading in `list` that starts before `pos`.
    fn preceding(list: &[Heading<'a>], pos: usize) -> Option<Heading<'a>> {
        let idx = list.partition_point(|h| h.pos < pos);
        idx.checked_sub(1).map(|i| list[i])
    }

    /// Section a table belongs to, or `None` when it is outside any country
    /// section (no H2 before it, or the H2 is housekeeping).
    ///
    /// The nearest H3 counts as the subdivision only if the nearest H2
    /// before that H3 is the same H2 that owns the table.
    pub fn resolve(&self, table: ElementRef<'a>) -> Option<SectionContext> {
        let pos = *self.positions.get(&table.id())?;

        let Some(country_heading) = Self::preceding(&self.countries, pos) else {
            debug!(pos, "table has no preceding country heading");
            return None;
        };
        let Some(country) = headline_text(country_heading.el) else {
            debug!(pos, "country heading has no text");
            return None;
        };
        if is_non_country(&country) {
            debug!(pos, heading = %country, "table under housekeeping section");
            return None;
        }

        let subdivision = Self::preceding(&self.subdivisions, pos)
            .filter(|sub| {
                Self::preceding(&self.countries, sub.pos).map(|owner| owner.el.id())
                    == Some(country_heading.el.id())
            })
            .and_then(|sub| headline_text(sub.el));

        Some(SectionContext {
            country,
            subdivision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contexts(html: &str) -> Vec<Option<SectionContext>> {
        let doc = Html::parse_document(html);
        let index = HeadingIndex::build(&doc);
        let sel = Selector::parse("table").unwrap();
        doc.select(&sel).map(|t| index.resolve(t)).collect()
    }

    fn ctx(country: &str, subdivision: Option<&str>) -> Option<SectionContext> {
        Some(SectionContext {
            country: country.to_string(),
            subdivision: subdivision.map(str::to_string),
        })
    }

    #[test]
    fn test_country_and_subdivision() {
        let got = contexts(
            r#"<h2>Canada</h2><table></table>
               <h3>Quebec</h3><table></table>"#,
        );
        assert_eq!(got, vec![ctx("Canada", None), ctx("Canada", Some("Quebec"))]);
    }

    #[test]
    fn test_stale_subdivision_not_inherited() {
        let got = contexts(
            r#"<h2>Canada</h2><h3>Quebec</h3><table></table>
               <h2>France</h2><table></table>"#,
        );
        assert_eq!(got, vec![ctx("Canada", Some("Quebec")), ctx("France", None)]);
    }

    #[test]
    fn test_housekeeping_and_orphans_rejected() {
        let got = contexts(
            r#"<table></table>
               <h3>Intro</h3><table></table>
               <h2>Japan</h2><table></table>
               <h2>References</h2><table></table>
               <h2>See also</h2><h3>Lists</h3><table></table>"#,
        );
        assert_eq!(got, vec![None, None, ctx("Japan", None), None, None]);
    }

    #[test]
    fn test_subdivision_without_any_country_is_ignored() {
        let doc = Html::parse_document(r#"<h3>Orphan</h3><h2>Chile</h2><table></table>"#);
        let index = HeadingIndex::build(&doc);
        let sel = Selector::parse("table").unwrap();
        let table = doc.select(&sel).next().unwrap();
        assert_eq!(index.resolve(table), ctx("Chile", None));
    }

    #[test]
    fn test_headline_span_and_edit_links() {
        let got = contexts(
            r#"<h2><span class="mw-headline" id="Iran">Iran</span><span class="mw-editsection">[edit]</span></h2>
               <table></table>
               <div class="mw-heading mw-heading2"><h2 id="New_Zealand">New  Zealand</h2><span class="mw-editsection">[edit]</span></div>
               <div class="mw-heading mw-heading3"><h3>Auckland <span class="mw-editsection">[edit]</span></h3></div>
               <table></table>"#,
        );
        assert_eq!(
            got,
            vec![ctx("Iran", None), ctx("New Zealand", Some("Auckland"))]
        );
    }
}
