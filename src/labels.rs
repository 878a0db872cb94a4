// src/labels.rs
//! Pedigree slot labels.
//!
//! A label is the path from the horse to one ancestor, e.g. `father mother`
//! is the sire's dam. Labels are generated in preorder (node, then its father
//! subtree, then its mother subtree) over five generations, giving
//! 2 + 4 + 8 + 16 + 32 = 62 slots. The pedigree table on the source site is
//! read in this same order, so the list is built once and shared.

use std::fmt;
use std::sync::OnceLock;

pub const MAX_DEPTH: usize = 5;
pub const LABEL_COUNT: usize = 62;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parent {
    Father,
    Mother,
}

impl Parent {
    pub fn as_str(self) -> &'static str {
        match self {
            Parent::Father => "father",
            Parent::Mother => "mother",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionLabel(String);

impl PositionLabel {
    fn from_path(path: &[Parent]) -> Self {
        let words: Vec<&str> = path.iter().map(|p| p.as_str()).collect();
        Self(words.join(" "))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Generations back from the horse; `father` is 1.
    pub fn depth(&self) -> usize {
        self.0.split(' ').count()
    }

    /// Rows this slot spans in a five-generation table: 16 for a parent,
    /// 1 for a great-great-great-grandparent.
    pub fn expected_rowspan(&self) -> usize {
        1 << (MAX_DEPTH - self.depth())
    }
}

impl fmt::Display for PositionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PositionLabel {
    fn as_ref(&self) -> &str { &self.0 }
}

/// The 62 labels in table order. Computed on first use.
pub fn labels() -> &'static [PositionLabel] {
    static LABELS: OnceLock<Vec<PositionLabel>> = OnceLock::new();
    LABELS.get_or_init(generate)
}

fn generate() -> Vec<PositionLabel> {
    fn walk(path: &mut Vec<Parent>, out: &mut Vec<PositionLabel>) {
        if path.len() == MAX_DEPTH { return; }
        for parent in [Parent::Father, Parent::Mother] {
            path.push(parent);
            out.push(PositionLabel::from_path(path));
            walk(path, out);
            path.pop();
        }
    }

    let mut out = Vec::with_capacity(LABEL_COUNT);
    walk(&mut Vec::with_capacity(MAX_DEPTH), &mut out);
    out
}
