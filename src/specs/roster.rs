// src/specs/roster.rs
//! Race card page: who is running.
//!
//! Entrants are the `<a href=".../horse/...">` links inside tables carrying
//! the `RaceTable01` class. Jockey and trainer links live in the same rows
//! but point elsewhere, so the href filter is what picks out horses.

use std::collections::HashSet;

use crate::config::consts::{HORSE_HREF_MARKER, MIN_ENTRANT_NAME_CHARS, ROSTER_TABLE_CLASS};
use crate::config::options::NetOptions;
use crate::core::HttpGet;
use crate::core::html::{Markup, attr, looks_like_markup, open_tag, text_of};
use crate::error::{Error, Result};
use crate::race_id::RaceId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entrant {
    pub name: String,
    /// Absolute URL of the horse's profile page.
    pub profile_url: String,
}

impl Entrant {
    pub fn new(name: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self { name: name.into(), profile_url: profile_url.into() }
    }

    /// Last path segment of the profile URL, e.g. `2019105219`.
    pub fn profile_id(&self) -> Option<&str> {
        let path = self.profile_url.split(['?', '#']).next().unwrap_or("");
        path.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty() && !s.contains(':'))
    }
}

/// GET the race card and read its entrants.
pub fn fetch<H: HttpGet>(http: &H, net: &NetOptions, id: &RaceId) -> Result<Vec<Entrant>> {
    let url = net.race_card_url(id.as_str());
    let body = http.get_text(&url)?;
    let entrants = parse(&body, &net.db_host)?;
    tracing::debug!(race_id = %id, count = entrants.len(), "roster parsed");
    Ok(entrants)
}

/// Entrants in page order. A card that isn't published yet has no race
/// table and yields an empty list.
pub fn parse(doc: &str, db_host: &str) -> Result<Vec<Entrant>> {
    if !looks_like_markup(doc) {
        return Err(Error::Parse("race card is not HTML".into()));
    }

    let doc = Markup::new(doc);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for table in doc.blocks_with_class("table", ROSTER_TABLE_CLASS) {
        let table = Markup::new(table);
        for a in table.blocks("a") {
            let Some(href) = attr(open_tag(a), "href") else { continue };
            if !href.contains(HORSE_HREF_MARKER) { continue; }

            // Very short names are markup leftovers (icons, marks)
            let name = text_of(a);
            if name.chars().count() < MIN_ENTRANT_NAME_CHARS { continue; }
            if !seen.insert(name.clone()) { continue; }

            out.push(Entrant { name, profile_url: absolute_url(&href, db_host) });
        }
    }
    Ok(out)
}

fn absolute_url(href: &str, host: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        format!("{}/{}", host.trim_end_matches('/'), href.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://db.netkeiba.com";

    #[test]
    fn picks_horse_links_only_and_dedups() {
        let html = r#"<html><body>
            <table class="RaceTable01 ShutubaTable"><tr>
              <td class="HorseInfo"><a href="https://db.netkeiba.com/horse/2021100001" title="Alpha">Alpha Star</a></td>
              <td class="Jockey"><a href="https://db.netkeiba.com/jockey/result/recent/01167/">Jockey Name</a></td>
            </tr><tr>
              <td><a href="/horse/2021100002/">Beta&nbsp;Road</a></td>
              <td><a href="/horse/2021100009/">X</a></td>
              <td><a href="/horse/2021100001/">Alpha Star</a></td>
            </tr></table>
            <table class="Other"><tr><td><a href="/horse/2021100003/">Gamma</a></td></tr></table>
        </body></html>"#;
        let e = parse(html, HOST).unwrap();
        assert_eq!(
            e,
            vec![
                Entrant::new("Alpha Star", "https://db.netkeiba.com/horse/2021100001"),
                Entrant::new("Beta Road", "https://db.netkeiba.com/horse/2021100002/"),
            ]
        );
        assert_eq!(e[0].profile_id(), Some("2021100001"));
        assert_eq!(e[1].profile_id(), Some("2021100002"));
    }

    #[test]
    fn race_table_inside_layout_table_is_found() {
        let html = r#"<html><body><table class="layout"><tr><td>
            <table class="RaceTable01"><tr>
              <td><a href="/horse/2021100001/">Horse A</a></td>
            </tr></table>
        </td></tr></table></body></html>"#;
        let e = parse(html, HOST).unwrap();
        assert_eq!(e, vec![Entrant::new("Horse A", "https://db.netkeiba.com/horse/2021100001/")]);
    }

    #[test]
    fn unpublished_card_is_empty_not_error() {
        let html = "<html><body><div class=\"RaceList_Item\">出馬表は未確定です</div></body></html>";
        assert_eq!(parse(html, HOST).unwrap(), vec![]);
    }

    #[test]
    fn non_markup_is_parse_error() {
        assert!(matches!(parse("Service Unavailable", HOST), Err(Error::Parse(_))));
    }

    #[test]
    fn profile_id_edge_cases() {
        assert_eq!(Entrant::new("A", "https://x/horse/123/?pid=1").profile_id(), Some("123"));
        assert_eq!(Entrant::new("A", "https://").profile_id(), None);
    }
}
