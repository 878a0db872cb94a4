// src/core/html.rs
// Tolerant, case-insensitive tag scanning over raw HTML.
// Not a DOM: blocks are matched to the first closing tag of the same name,
// which is enough for the flat tables the source pages use.

use super::sanitize::{normalize_entities, normalize_ws};

/// ASCII-only lowercasing. Byte offsets stay identical to the input.
pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// A document plus its lowercased twin, so repeated searches don't re-lower.
pub struct Markup<'a> {
    src: &'a str,
    lc: String,
}

impl<'a> Markup<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, lc: to_lower(src) }
    }

    /// Byte range of the next `<tag ...>...</tag>` starting at or after `from`.
    /// `tag` must be lowercase. An unterminated block yields `None`.
    pub fn next_block(&self, tag: &str, from: usize) -> Option<(usize, usize)> {
        let start = self.find_open(&format!("<{tag}"), from)?;
        self.block_at(tag, start)
    }

    /// Start of the next `<tag` at or after `from`.
    /// `<a` must not match `<abbr>`, `<td` must not match `<tdx>`.
    fn find_open(&self, open: &str, from: usize) -> Option<usize> {
        let mut at = from;
        loop {
            let i = self.lc.get(at..)?.find(open)? + at;
            match self.lc.as_bytes().get(i + open.len()) {
                Some(b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'/') => return Some(i),
                _ => at = i + open.len(),
            }
        }
    }

    fn find_close_tag(&self, close: &str, from: usize) -> Option<usize> {
        let mut at = from;
        loop {
            let i = self.lc.get(at..)?.find(close)? + at;
            match self.lc.as_bytes().get(i + close.len()) {
                Some(b'>' | b' ' | b'\t' | b'\r' | b'\n') | None => return Some(i),
                _ => at = i + close.len(),
            }
        }
    }

    /// Closing tag that balances an opening one ending at `from`. Nested
    /// blocks of the same tag are skipped. When the markup never balances
    /// (unclosed `<td>`s), the first closing tag is taken.
    fn find_close(&self, open: &str, close: &str, from: usize) -> Option<usize> {
        let first = self.find_close_tag(close, from)?;
        let mut depth = 0usize;
        let mut at = from;
        loop {
            let Some(c) = self.find_close_tag(close, at) else { return Some(first) };
            match self.find_open(open, at) {
                Some(o) if o < c => {
                    depth += 1;
                    at = o + open.len();
                }
                _ if depth == 0 => return Some(c),
                _ => {
                    depth -= 1;
                    at = c + close.len();
                }
            }
        }
    }

    /// Byte range of the block whose opening tag starts at `start`.
    fn block_at(&self, tag: &str, start: usize) -> Option<(usize, usize)> {
        let open = format!("<{tag}");
        let close = format!("</{tag}");
        let open_end = self.src[start..].find('>')? + start + 1;
        let close_start = self.find_close(&open, &close, open_end)?;
        let end = self.lc[close_start..]
            .find('>')
            .map_or(self.src.len(), |i| close_start + i + 1);
        Some((start, end))
    }

    /// All top-level `<tag>` blocks in document order.
    pub fn blocks<'m>(&'m self, tag: &'m str) -> Blocks<'a, 'm> {
        Blocks { doc: self, tag, pos: 0 }
    }

    /// Blocks of `tag` whose opening tag carries `class`, at any depth:
    /// a non-matching block is searched inside, a matching one is not.
    pub fn blocks_with_class<'m>(
        &'m self,
        tag: &'m str,
        class: &'m str,
    ) -> impl Iterator<Item = &'a str> + 'm {
        let open = format!("<{tag}");
        let mut at = 0;
        std::iter::from_fn(move || loop {
            let start = self.find_open(&open, at)?;
            let open_end = self.src[start..].find('>')? + start + 1;
            if !has_class(&self.src[start..open_end], class) {
                at = open_end;
                continue;
            }
            let (s, e) = self.block_at(tag, start)?;
            at = e;
            return Some(&self.src[s..e]);
        })
    }
}

pub struct Blocks<'a, 'm> {
    doc: &'m Markup<'a>,
    tag: &'m str,
    pos: usize,
}

impl<'a> Iterator for Blocks<'a, '_> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (s, e) = self.doc.next_block(self.tag, self.pos)?;
        self.pos = e;
        Some(&self.doc.src[s..e])
    }
}

/// Cheap sanity check that a response body is HTML at all.
pub fn looks_like_markup(doc: &str) -> bool {
    let t = doc.trim_start_matches('\u{feff}').trim_start();
    t.starts_with('<') && t.contains('>')
}

/// The opening tag of a block, `<td rowspan="16" class="b_ml">`.
pub fn open_tag(block: &str) -> &str {
    match block.find('>') {
        Some(i) => &block[..=i],
        None => block,
    }
}

/// Value of attribute `name` in an opening tag. Quoted or bare values.
pub fn attr(open: &str, name: &str) -> Option<String> {
    let lc = to_lower(open);
    let bytes = lc.as_bytes();
    let mut from = 0;
    while let Some(rel) = lc[from..].find(name) {
        let i = from + rel;
        from = i + name.len();
        let boundary_before = i > 0 && bytes[i - 1].is_ascii_whitespace();
        if !boundary_before { continue; }

        let rest = lc[from..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else { continue };
        let value_start = lc.len() - rest.trim_start().len();
        let raw = &open[value_start..];
        let value = match raw.chars().next() {
            Some(q @ ('"' | '\'')) => raw[1..].split(q).next().unwrap_or(""),
            _ => raw
                .split(|c: char| c.is_ascii_whitespace() || c == '>')
                .next()
                .unwrap_or(""),
        };
        return Some(normalize_entities(value));
    }
    None
}

pub fn has_class(open: &str, class: &str) -> bool {
    attr(open, "class")
        .map(|v| v.split_ascii_whitespace().any(|c| c.eq_ignore_ascii_case(class)))
        .unwrap_or(false)
}

/// Given `<td ...>INNER</td>`, return INNER (may still contain tags).
pub fn inner_after_open_tag(block: &str) -> &str {
    if let Some(oe) = block.find('>') {
        if let Some(cs) = block.rfind('<') {
            if cs > oe {
                return &block[oe + 1..cs];
            }
        }
    }
    ""
}

/// Remove tags, then decode entities and collapse whitespace.
pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&normalize_entities(&out))
}

/// Visible text of a block, without its wrapping tags.
pub fn text_of(block: &str) -> String {
    strip_tags(inner_after_open_tag(block))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_respect_tag_boundaries() {
        let doc = Markup::new("<abbr>x</abbr><A HREF='/horse/1/'>One</A><a href=\"/horse/2/\">Two</a>");
        let texts: Vec<String> = doc.blocks("a").map(text_of).collect();
        assert_eq!(texts, vec!["One", "Two"]);
    }

    #[test]
    fn class_lookup_handles_multiple_classes() {
        let doc = Markup::new(
            r#"<table class="Other">a</table><table class="RaceTable01 ShutubaTable">b</table>"#,
        );
        let hits: Vec<&str> = doc.blocks_with_class("table", "RaceTable01").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(text_of(hits[0]), "b");
    }

    #[test]
    fn class_lookup_descends_into_wrapping_tables() {
        let doc = Markup::new(
            r#"<table class="layout"><tr><td>
                 <table class="RaceTable01"><tr><td>inner</td></tr></table>
               </td></tr></table><table class="RaceTable01">after</table>"#,
        );
        let hits: Vec<String> = doc.blocks_with_class("table", "RaceTable01").map(text_of).collect();
        assert_eq!(hits, vec!["inner", "after"]);
    }

    #[test]
    fn nested_same_tag_closes_at_its_own_end() {
        let doc = Markup::new("<table><tr><td><table><tr><td>x</td></tr></table></td></tr></table>tail");
        let outer: Vec<&str> = doc.blocks("table").collect();
        assert_eq!(outer.len(), 1);
        assert!(outer[0].ends_with("</td></tr></table>"));
        assert!(!outer[0].contains("tail"));
    }

    #[test]
    fn unclosed_cells_fall_back_to_first_close() {
        let doc = Markup::new("<tr><td>a<td>b</td><td>c</td></tr>");
        let cells: Vec<&str> = doc.blocks("td").collect();
        assert_eq!(cells, vec!["<td>a<td>b</td>", "<td>c</td>"]);
    }

    #[test]
    fn attr_quoted_bare_and_missing() {
        let tag = r#"<td ROWSPAN=16 class='b_ml' data-x="a &amp; b">"#;
        assert_eq!(attr(tag, "rowspan").as_deref(), Some("16"));
        assert_eq!(attr(tag, "class").as_deref(), Some("b_ml"));
        assert_eq!(attr(tag, "data-x").as_deref(), Some("a & b"));
        assert_eq!(attr(tag, "href"), None);
        // `span` must not match inside `rowspan`
        assert_eq!(attr(tag, "span"), None);
    }

    #[test]
    fn strip_tags_decodes_after_stripping() {
        assert_eq!(strip_tags("<b>A&nbsp;&amp;\n  B</b> &lt;i&gt;"), "A & B <i>");
    }

    #[test]
    fn markup_sniff() {
        assert!(looks_like_markup("\n <!DOCTYPE html><html></html>"));
        assert!(!looks_like_markup("{\"error\": 1}"));
        assert!(!looks_like_markup(""));
    }
}
