// src/specs/pedigree.rs
//! Five-generation pedigree page.
//!
//! The `blood_table` lists ancestors as `<td>` cells. Read in document order,
//! a rowspan table comes out in preorder, which is the order of
//! [`labels()`](crate::labels::labels): cell `i` is the ancestor at label `i`.
//!
//! Nothing in the markup names the slots, so the pairing is an assumption
//! about the site. It is checked against the cells' `rowspan`s (a parent
//! spans 16 rows, each generation back halves that); see [`LayoutCheck`].

use crate::config::consts::PEDIGREE_TABLE_CLASS;
use crate::config::options::NetOptions;
use crate::core::HttpGet;
use crate::core::html::{Markup, attr, looks_like_markup, open_tag, text_of};
use crate::error::{Error, Result};
use crate::labels::PositionLabel;
use crate::specs::roster::Entrant;

/// Whether the table's shape agreed with the label order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LayoutCheck {
    Verified,
    /// No cells to check.
    #[default]
    Unverifiable,
    /// First cell whose rowspan disagrees with its label's generation.
    Mismatch { index: usize, expected: usize, found: usize },
}

/// Ancestor names by slot, in label order. Slots without a name are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pedigree {
    entries: Vec<(PositionLabel, String)>,
    layout: LayoutCheck,
}

impl Pedigree {
    /// Pair cells with labels positionally; extra cells past the last label
    /// are ignored.
    pub fn from_cells<I>(cells: I, labels: &[PositionLabel]) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let entries = labels
            .iter()
            .zip(cells)
            .filter_map(|(label, name)| name.map(|n| (label.clone(), n)))
            .collect();
        Self { entries, layout: LayoutCheck::Unverifiable }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PositionLabel, &str)> {
        self.entries.iter().map(|(l, n)| (l, n.as_str()))
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l.as_str() == label)
            .map(|(_, n)| n.as_str())
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn layout(&self) -> &LayoutCheck { &self.layout }
}

struct Cell {
    name: Option<String>,
    rowspan: usize,
}

/// GET an entrant's pedigree page and decode it.
/// With `strict`, a layout mismatch is a parse error instead of a warning.
pub fn fetch<H: HttpGet>(
    http: &H,
    net: &NetOptions,
    entrant: &Entrant,
    labels: &[PositionLabel],
    strict: bool,
) -> Result<Pedigree> {
    let id = entrant.profile_id().ok_or_else(|| {
        Error::Parse(format!("no profile id in {:?}", entrant.profile_url))
    })?;
    let url = net.pedigree_url(id);
    let body = http.get_text(&url)?;
    let pedigree = parse(&body, labels)?;

    if let LayoutCheck::Mismatch { index, expected, found } = pedigree.layout {
        let msg = format!(
            "pedigree layout mismatch for {} at cell {index}: rowspan {found}, expected {expected}",
            entrant.name
        );
        if strict {
            return Err(Error::Parse(msg));
        }
        tracing::warn!("{msg}");
    }
    Ok(pedigree)
}

/// Decode a pedigree page. No `blood_table` means no data, not an error.
pub fn parse(doc: &str, labels: &[PositionLabel]) -> Result<Pedigree> {
    if !looks_like_markup(doc) {
        return Err(Error::Parse("pedigree page is not HTML".into()));
    }
    let doc = Markup::new(doc);
    let Some(table) = doc.blocks_with_class("table", PEDIGREE_TABLE_CLASS).next() else {
        return Ok(Pedigree::default());
    };

    let mut cells = read_cells(table);
    cells.truncate(labels.len());

    let layout = check_layout(&cells, labels);
    let mut pedigree = Pedigree::from_cells(cells.into_iter().map(|c| c.name), labels);
    pedigree.layout = layout;
    Ok(pedigree)
}

fn read_cells(table: &str) -> Vec<Cell> {
    let table = Markup::new(table);
    table
        .blocks("td")
        .map(|td| {
            let rowspan = attr(open_tag(td), "rowspan")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1);
            // The ancestor's name is the cell's first link
            let name = Markup::new(td)
                .blocks("a")
                .next()
                .map(text_of)
                .filter(|n| !n.is_empty());
            Cell { name, rowspan }
        })
        .collect()
}

fn check_layout(cells: &[Cell], labels: &[PositionLabel]) -> LayoutCheck {
    if cells.is_empty() {
        return LayoutCheck::Unverifiable;
    }
    for (index, (cell, label)) in cells.iter().zip(labels).enumerate() {
        let expected = label.expected_rowspan();
        if cell.rowspan != expected {
            return LayoutCheck::Mismatch { index, expected, found: cell.rowspan };
        }
    }
    LayoutCheck::Verified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{LABEL_COUNT, labels};

    /// A well-formed five-generation table; cell `i` is named `Horse{i}`.
    fn full_table() -> String {
        let mut html = String::from("<html><body><table class=\"blood_table detail\">");
        for (i, l) in labels().iter().enumerate() {
            let span = l.expected_rowspan();
            let attr = if span > 1 { format!(" rowspan=\"{span}\"") } else { String::new() };
            html.push_str(&format!(
                "<tr><td{attr} class=\"b_ml\"><a href=\"/horse/{i:06}/\">Horse{i}</a><br><a href=\"/horse/sire/{i:06}/\">産駒</a></td></tr>"
            ));
        }
        html.push_str("</table></body></html>");
        html
    }

    #[test]
    fn full_table_decodes_and_verifies() {
        let p = parse(&full_table(), labels()).unwrap();
        assert_eq!(p.len(), LABEL_COUNT);
        assert_eq!(p.layout(), &LayoutCheck::Verified);
        assert_eq!(p.get("father"), Some("Horse0"));
        assert_eq!(p.get("mother"), Some("Horse31"));
        assert_eq!(p.get("father mother"), Some("Horse16"));
    }

    #[test]
    fn blood_table_inside_layout_table_is_found() {
        let page = full_table();
        let wrapped = page.replacen(
            "<body>",
            "<body><table class=\"db_layout\"><tr><td class=\"side\">menu</td><td>",
            1,
        ).replacen("</body>", "</td></tr></table></body>", 1);
        let p = parse(&wrapped, labels()).unwrap();
        assert_eq!(p.len(), LABEL_COUNT);
        assert_eq!(p.layout(), &LayoutCheck::Verified);
        assert_eq!(p.get("mother"), Some("Horse31"));
    }

    #[test]
    fn from_cells_pairs_positionally() {
        for n in [0usize, 1, 7, 62, 70] {
            let cells: Vec<Option<String>> = (0..n).map(|i| Some(format!("c{i}"))).collect();
            let p = Pedigree::from_cells(cells.clone(), labels());
            assert_eq!(p.len(), n.min(LABEL_COUNT));
            for (i, (label, name)) in p.iter().enumerate() {
                assert_eq!(label, &labels()[i]);
                assert_eq!(Some(name.to_string()), cells[i]);
            }
        }
    }

    #[test]
    fn nameless_cells_are_skipped_without_shifting() {
        let cells = vec![Some("Sire".into()), None, Some("Damsire".into())];
        let p = Pedigree::from_cells(cells, labels());
        assert_eq!(p.len(), 2);
        assert_eq!(p.get("father"), Some("Sire"));
        assert_eq!(p.get("father father"), None);
        assert_eq!(p.get("father father father"), Some("Damsire"));
    }

    #[test]
    fn missing_table_is_empty() {
        let p = parse("<html><body>no data</body></html>", labels()).unwrap();
        assert!(p.is_empty());
        assert_eq!(p.layout(), &LayoutCheck::Unverifiable);
    }

    #[test]
    fn wrong_rowspans_are_flagged() {
        // a four-generation table starts at rowspan 8
        let html = r#"<html><table class="blood_table">
            <tr><td rowspan="8"><a href="/horse/1/">Sire</a></td>
            <td rowspan="4"><a href="/horse/2/">Grandsire</a></td></tr></table></html>"#;
        let p = parse(html, labels()).unwrap();
        assert_eq!(p.layout(), &LayoutCheck::Mismatch { index: 0, expected: 16, found: 8 });
        assert_eq!(p.get("father"), Some("Sire"));
    }
}
