// src/csv.rs
use std::io::{self, Write};
use std::mem::take;

/* ---------------- Parsing ---------------- */

/// Minimal CSV parser (quotes + CRLF tolerant). Blank lines are dropped.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // doubled quote
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) { chars.next(); }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush a trailing row without newline, even if quotes were unterminated.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// Column positions from a header row, looked up by any of several names.
pub struct Header {
    names: Vec<String>,
}

impl Header {
    pub fn new(row: &[String]) -> Self {
        Self { names: row.iter().map(|h| h.trim().to_lowercase()).collect() }
    }

    /// First column whose name matches one of `aliases` (case-insensitive).
    pub fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|a| {
            let a = a.to_lowercase();
            self.names.iter().position(|n| *n == a)
        })
    }

    pub fn require(&self, aliases: &[&str]) -> Result<usize, String> {
        self.find(aliases)
            .ok_or_else(|| format!("missing column (one of {})", aliases.join(" / ")))
    }
}

/// Borrow cell `i` of a row, `""` when the row is short.
pub fn cell(row: &[String], i: usize) -> &str {
    row.get(i).map(|s| s.as_str()).unwrap_or("")
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first { w.write_all(b",")?; } else { first = false; }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_fields_survive() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["a,b", "say \"hi\"", "x<br>y"]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "\"a,b\",\"say \"\"hi\"\"\",x<br>y\n");
        let rows = parse_rows(&text);
        assert_eq!(rows, vec![vec!["a,b", "say \"hi\"", "x<br>y"]]);
    }

    #[test]
    fn crlf_bom_and_blank_lines() {
        let rows = parse_rows("\u{feff}h1,h2\r\n\r\n1,2\r\n3,\"multi\nline\"");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["h1", "h2"]);
        assert_eq!(rows[2][1], "multi\nline");
    }

    #[test]
    fn header_aliases() {
        let h = Header::new(&["年".into(), "Track".into(), " date ".into()]);
        assert_eq!(h.find(&["year", "年"]), Some(0));
        assert_eq!(h.find(&["競馬場", "track"]), Some(1));
        assert_eq!(h.find(&["DATE"]), Some(2));
        assert!(h.require(&["meeting"]).is_err());
    }
}
