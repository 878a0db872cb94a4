// src/core/sanitize.rs
use unicode_normalization::UnicodeNormalization;

/// Decode the handful of entities the source pages actually emit.
/// `&amp;` goes last so `&amp;lt;` stays `&lt;`.
pub fn normalize_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Matching key for a horse name: NFKC, trimmed, lowercased.
/// Full-width `ＡＢＣ` and `abc` share a key.
pub fn normalize_key(name: &str) -> String {
    let folded: String = name.nfkc().collect();
    folded.trim().to_lowercase()
}
