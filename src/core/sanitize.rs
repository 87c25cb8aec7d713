// src/core/sanitize.rs

/// Decode the handful of entities that actually show up in rendered tables.
/// `&nbsp;` becomes U+00A0 (not a plain space) so callers can tell the difference.
pub fn normalize_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').filter(|&semi| semi <= 10) {
            Some(semi) => {
                let name = &tail[1..semi];
                match decode_entity(name) {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&tail[..=semi]),
                }
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub(crate) fn decode_entity(name: &str) -> Option<char> {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "nbsp" => Some('\u{a0}'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = lower.strip_prefix('#')?;
            let code = match num.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Collapse sequences of whitespace into a single space and trim.
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

/// NBSP → space, collapse runs, trim. What a reader would call "the text".
pub fn clean_text(s: &str) -> String {
    normalize_ws(&s.replace('\u{a0}', " "))
}

/// Key used for every column-name comparison: trimmed and lower-cased.
pub fn normalize_name(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Escape text for use as element content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text for use inside a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

/// Split comma-separated values, dropping blanks: `"a, b,,c"` → `["a","b","c"]`.
pub fn split_csv<'a>(s: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    s.split(',').map(str::trim).filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_keep_nbsp_distinct() {
        assert_eq!(normalize_entities("a&nbsp;b"), "a\u{a0}b");
        assert_eq!(normalize_entities("&AMP;&lt;x&gt;"), "&<x>");
        assert_eq!(normalize_entities("&#65;&#x42;"), "AB");
        assert_eq!(normalize_entities("fish & chips"), "fish & chips");
        assert_eq!(normalize_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn clean_text_collapses_nbsp_and_runs() {
        assert_eq!(clean_text("\u{a0} a \n\t b\u{a0}"), "a b");
        assert_eq!(clean_text("\u{a0}\u{a0}"), "");
    }

    #[test]
    fn names_are_trimmed_and_lowered() {
        assert_eq!(normalize_name(" Status "), "status");
        assert_eq!(normalize_name("STATUS"), "status");
        assert_eq!(normalize_name("Città"), "città");
    }

    #[test]
    fn split_csv_drops_blanks() {
        let v: Vec<_> = split_csv(" a, b,,c ,").collect();
        assert_eq!(v, vec!["a", "b", "c"]);
    }
}
