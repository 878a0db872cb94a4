// src/bloodline.rs
//! Reference bloodlines and matching pedigrees against them.
//!
//! Matching goes through a normalized key (NFKC, trimmed, lowercased) so
//! width and case differences still hit. Image lookup uses the exact name as
//! written in the reference list, so a hit on a differently-written name
//! shows without a picture.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::consts::{MATCH_SEPARATOR, NO_MATCH};
use crate::core::sanitize::normalize_key;
use crate::csv::{self, Header, cell};
use crate::error::{Error, Result};
use crate::labels::PositionLabel;
use crate::specs::pedigree::Pedigree;

const NAME: &[&str] = &["canonical-name", "name", "kettou", "血統"];
const IMAGE: &[&str] = &["image-reference", "image", "url"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceBloodline {
    pub name: String,
    pub key: String,
    pub image: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ReferenceSet {
    entries: Vec<ReferenceBloodline>,
    keys: HashSet<String>,
    images: HashMap<String, String>,
}

impl ReferenceSet {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<S>)>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for (name, image) in items {
            set.insert(name.into(), image.map(Into::into));
        }
        set
    }

    fn insert(&mut self, name: String, image: Option<String>) {
        let name = name.trim().to_string();
        if name.is_empty() { return; }
        let image = image.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let key = normalize_key(&name);

        self.keys.insert(key.clone());
        if let Some(url) = &image {
            self.images.entry(name.clone()).or_insert_with(|| url.clone());
        }
        self.entries.push(ReferenceBloodline { name, key, image });
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let set = Self::parse_csv(&text)?;
        tracing::info!(path = %path.display(), count = set.len(), "reference bloodlines loaded");
        Ok(set)
    }

    /// CSV with a name column and an optional image column. A file with no
    /// recognizable header is read as a bare list of names.
    pub fn parse_csv(text: &str) -> Result<Self> {
        let rows = csv::parse_rows(text);
        let Some(first) = rows.first() else {
            return Err(Error::Parse("reference bloodline list is empty".into()));
        };
        let header = Header::new(first);

        let set = match header.find(NAME) {
            Some(c_name) => {
                let c_image = header.find(IMAGE);
                Self::new(rows.iter().skip(1).map(|r| {
                    let image = c_image.map(|c| cell(r, c).to_string());
                    (cell(r, c_name).to_string(), image)
                }))
            }
            None => Self::new(rows.iter().map(|r| (cell(r, 0).to_string(), None))),
        };
        Ok(set)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains(&normalize_key(name))
    }

    /// Image for a name exactly as listed.
    pub fn image_for(&self, name: &str) -> Option<&str> {
        self.images.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// One ancestor found in the reference list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchRecord {
    pub position: PositionLabel,
    /// As written on the pedigree page, not normalized.
    pub ancestor: String,
    pub image: Option<String>,
}

impl MatchRecord {
    /// HTML fragment shown for this match. The ancestor name keeps `&` and
    /// quotes as written; only `<` and `>` are escaped.
    pub fn render(&self) -> String {
        let text = format!("【{}】{}", self.position, escape_text(&self.ancestor));
        match &self.image {
            Some(url) => format!(
                "<img src='{}' width='100' style='vertical-align:middle;margin-right:8px;'>{text}",
                escape_attr(url)
            ),
            None => text,
        }
    }
}

/// Ancestors present in `reference`, in label order.
pub fn find_matches(pedigree: &Pedigree, reference: &ReferenceSet) -> Vec<MatchRecord> {
    pedigree
        .iter()
        .filter(|(_, name)| reference.contains(name))
        .map(|(position, name)| MatchRecord {
            position: position.clone(),
            ancestor: name.to_string(),
            image: reference.image_for(name).map(str::to_string),
        })
        .collect()
}

/// All fragments joined, or the no-match marker.
pub fn render_matches(matches: &[MatchRecord]) -> String {
    if matches.is_empty() {
        return NO_MATCH.to_string();
    }
    matches.iter().map(MatchRecord::render).collect::<Vec<_>>().join(MATCH_SEPARATOR)
}

fn escape_text(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
