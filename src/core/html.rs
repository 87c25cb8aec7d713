// src/core/html.rs
// Low-level HTML string scanning, case-insensitive on tag and attribute names.
// Deliberately not a full parser: enough to locate the data table, its header
// and body rows, a handful of summary elements, and form controls.

use std::ops::Range;

/// Fast ASCII-only lowercasing; byte offsets stay aligned with the input.
pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// A located element: `<tag ...>INNER</tag>`.
/// All offsets index into the haystack the block was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    /// Offset of `<` of the opening tag.
    pub start: usize,
    /// Offset just past the `>` of the opening tag.
    pub inner_start: usize,
    /// Offset of `<` of the closing tag (== `end` when unclosed).
    pub inner_end: usize,
    /// Offset just past the closing tag.
    pub end: usize,
}

impl Block {
    pub fn open_tag<'a>(&self, s: &'a str) -> &'a str {
        &s[self.start..self.inner_start]
    }
    pub fn inner<'a>(&self, s: &'a str) -> &'a str {
        &s[self.inner_start..self.inner_end]
    }
    pub fn outer<'a>(&self, s: &'a str) -> &'a str {
        &s[self.start..self.end]
    }
}

fn is_name_boundary(b: Option<&u8>) -> bool {
    matches!(b, None | Some(b' ' | b'\t' | b'\r' | b'\n' | b'>' | b'/'))
}

/// Find the next `<name` (whole tag name, so `<th` does not match `<thead`) at or after `from`.
/// `lc` must be the `to_lower` of the haystack.
pub fn find_open_ci(lc: &str, name: &str, from: usize) -> Option<usize> {
    let pat = format!("<{}", name.to_ascii_lowercase());
    let mut pos = from;
    loop {
        let i = lc.get(pos..)?.find(&pat)? + pos;
        if is_name_boundary(lc.as_bytes().get(i + pat.len())) {
            return Some(i);
        }
        pos = i + pat.len();
    }
}

/// Find the next `</name` (whole tag name, so `</head` does not match `</header`).
pub fn find_close_ci(lc: &str, name: &str, from: usize) -> Option<usize> {
    let pat = format!("</{}", name.to_ascii_lowercase());
    let mut pos = from;
    loop {
        let i = lc.get(pos..)?.find(&pat)? + pos;
        if is_name_boundary(lc.as_bytes().get(i + pat.len())) {
            return Some(i);
        }
        pos = i + pat.len();
    }
}

/// Offset just past the `>` closing the tag that starts at `start`, honoring quoted attributes.
pub fn tag_end(s: &str, start: usize) -> Option<usize> {
    let b = s.as_bytes();
    let mut i = start + 1;
    let mut in_s = false;
    let mut in_d = false;
    while i < b.len() {
        match b[i] {
            b'\'' if !in_d => in_s = !in_s,
            b'"' if !in_s => in_d = !in_d,
            b'>' if !in_s && !in_d => return Some(i + 1),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Find the next `<name ...>...</name>` block from `from`, matching nested same-name tags.
/// An unclosed element extends to the end of the haystack.
pub fn next_block_ci(s: &str, name: &str, from: usize) -> Option<Block> {
    let lc = to_lower(s);
    next_block_in(s, &lc, name, from)
}

/// Like `next_block_ci`, reusing a precomputed lowercase copy.
pub fn next_block_in(s: &str, lc: &str, name: &str, from: usize) -> Option<Block> {
    let start = find_open_ci(lc, name, from)?;
    let inner_start = tag_end(s, start)?;

    // Self-closing or void: no inner content.
    if s[start..inner_start].trim_end_matches('>').ends_with('/') || is_void(name) {
        return Some(Block { start, inner_start, inner_end: inner_start, end: inner_start });
    }

    let mut depth = 1usize;
    let mut pos = inner_start;
    loop {
        let next_open = find_open_ci(lc, name, pos);
        let next_close = find_close_ci(lc, name, pos);
        match (next_open, next_close) {
            (Some(o), Some(c)) if o < c => {
                depth += 1;
                pos = o + 1;
            }
            (_, Some(c)) => {
                depth -= 1;
                if depth == 0 {
                    let end = tag_end(s, c).unwrap_or(s.len());
                    return Some(Block { start, inner_start, inner_end: c, end });
                }
                pos = c + 1;
            }
            (_, None) => {
                return Some(Block { start, inner_start, inner_end: s.len(), end: s.len() });
            }
        }
    }
}

/// Every top-level `<name>` block inside `s`, in document order.
pub fn blocks_ci(s: &str, name: &str) -> Vec<Block> {
    let lc = to_lower(s);
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(b) = next_block_in(s, &lc, name, pos) {
        pos = b.end.max(b.start + 1);
        out.push(b);
    }
    out
}

/// HTML void elements never have a closing tag.
pub fn is_void(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "br" | "img" | "input" | "hr" | "meta" | "link" | "col" | "source" | "wbr" | "embed" | "area" | "base" | "track"
    )
}

/// Tag name of an opening tag like `<td class=x>` → `td` (lowercased).
pub fn tag_name(open_tag: &str) -> String {
    open_tag
        .trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Read attribute `name` from an opening tag. Handles `"…"`, `'…'`, bare values and bare flags
/// (a bare flag yields `Some("")`). Entities in the value are decoded.
pub fn attr(open_tag: &str, name: &str) -> Option<String> {
    attr_span(open_tag, name).map(|(_, v)| v)
}

/// Like `attr`, plus the byte range of the whole attribute (leading whitespace included),
/// so it can be cut out of the tag.
pub fn attr_span(open_tag: &str, name: &str) -> Option<(Range<usize>, String)> {
    let b = open_tag.as_bytes();
    let want = name.to_ascii_lowercase();

    // skip `<tagname`
    let mut i = 1;
    while i < b.len() && !b[i].is_ascii_whitespace() && b[i] != b'>' && b[i] != b'/' { i += 1; }

    while i < b.len() {
        while i < b.len() && (b[i].is_ascii_whitespace() || b[i] == b'/') { i += 1; }
        if i >= b.len() || b[i] == b'>' { return None; }

        let ks = i;
        while i < b.len() && !b[i].is_ascii_whitespace() && b[i] != b'=' && b[i] != b'>' && b[i] != b'/' { i += 1; }
        let key = open_tag[ks..i].to_ascii_lowercase();
        let ke = i;

        while i < b.len() && b[i].is_ascii_whitespace() { i += 1; }
        let value = if i < b.len() && b[i] == b'=' {
            i += 1;
            while i < b.len() && b[i].is_ascii_whitespace() { i += 1; }
            match b.get(i) {
                Some(&q @ (b'"' | b'\'')) => {
                    let vs = i + 1;
                    let ve = open_tag[vs..].find(q as char).map(|r| vs + r).unwrap_or(b.len());
                    i = (ve + 1).min(b.len());
                    &open_tag[vs..ve]
                }
                _ => {
                    let vs = i;
                    while i < b.len() && !b[i].is_ascii_whitespace() && b[i] != b'>' { i += 1; }
                    &open_tag[vs..i]
                }
            }
        } else {
            i = ke;
            ""
        };

        if key == want {
            let start = open_tag[..ks].trim_end().len();
            return Some((start..i, super::sanitize::normalize_entities(value)));
        }
    }
    None
}

/// True if the opening tag's class list contains `class` (whole token, case-sensitive like CSS).
pub fn has_class(open_tag: &str, class: &str) -> bool {
    attr(open_tag, "class")
        .map(|v| v.split_ascii_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Remove all tags, decode entities, collapse whitespace.
/// Text of a fragment as written: tags and comments dropped, entities decoded,
/// whitespace kept as is.
pub fn text_content(s: &str) -> String {
    tokens(s)
        .into_iter()
        .filter_map(|t| match t {
            Token::Text(raw) => Some(super::sanitize::normalize_entities(raw)),
            _ => None,
        })
        .collect()
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let text: String = super::VisChars::new(s.as_ref()).collect();
    super::sanitize::clean_text(&text)
}

/// One lexical piece of an HTML fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw text between tags (entities not yet decoded).
    Text(&'a str),
    /// Opening (or self-closing) tag; `raw` is the whole `<...>`.
    Open { name: String, raw: &'a str },
    Close { name: String },
    Comment,
}

/// Tokenize an HTML fragment. Unterminated tags swallow the rest of the input.
pub fn tokens(s: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < s.len() {
        let Some(rel) = s[i..].find('<') else {
            out.push(Token::Text(&s[i..]));
            break;
        };
        if rel > 0 {
            out.push(Token::Text(&s[i..i + rel]));
        }
        let start = i + rel;
        if s[start..].starts_with("<!--") {
            i = s[start..].find("-->").map(|e| start + e + 3).unwrap_or(s.len());
            out.push(Token::Comment);
            continue;
        }
        let end = tag_end(s, start).unwrap_or(s.len());
        let raw = &s[start..end];
        let name = tag_name(raw);
        if name.is_empty() {
            // A lone '<' in text, e.g. "a < b".
            out.push(Token::Text(&s[start..start + 1]));
            i = start + 1;
            continue;
        }
        if raw.starts_with("</") {
            out.push(Token::Close { name });
        } else {
            out.push(Token::Open { name, raw });
        }
        i = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn th_does_not_match_thead() {
        let s = "<table><thead><tr><th>a</th></tr></thead></table>";
        let lc = to_lower(s);
        let i = find_open_ci(&lc, "th", 0).unwrap();
        assert_eq!(&s[i..i + 4], "<th>");
    }

    #[test]
    fn nested_blocks_match_their_own_close() {
        let s = "<div id=a><div>x</div>y</div><div>z</div>";
        let b = next_block_ci(s, "div", 0).unwrap();
        assert_eq!(b.inner(s), "<div>x</div>y");
        assert_eq!(blocks_ci(s, "div").len(), 2);
    }

    #[test]
    fn unclosed_block_runs_to_end() {
        let s = "<td>abc";
        let b = next_block_ci(s, "td", 0).unwrap();
        assert_eq!(b.inner(s), "abc");
    }

    #[test]
    fn attributes_in_all_quoting_styles() {
        let t = r#"<input type=date name='when' data-default-expr="today" disabled>"#;
        assert_eq!(attr(t, "type").as_deref(), Some("date"));
        assert_eq!(attr(t, "NAME").as_deref(), Some("when"));
        assert_eq!(attr(t, "data-default-expr").as_deref(), Some("today"));
        assert_eq!(attr(t, "disabled").as_deref(), Some(""));
        assert_eq!(attr(t, "value"), None);
    }

    #[test]
    fn attribute_spans_cover_only_the_attribute() {
        let t = r#"<input placeholder="pick a value here" value="" name=x>"#;
        let (span, v) = attr_span(t, "value").unwrap();
        assert_eq!(v, "");
        assert_eq!(&t[span], r#" value="""#);

        let bare = "<input value class=x>";
        let (span, _) = attr_span(bare, "value").unwrap();
        assert_eq!(&bare[span], " value");
        assert!(attr_span(r#"<input placeholder="a value">"#, "value").is_none());
    }

    #[test]
    fn text_content_keeps_inner_whitespace() {
        assert_eq!(text_content("<b>First</b>  Name&nbsp;<!-- x -->"), "First  Name\u{a0}");
    }

    #[test]
    fn close_tags_match_whole_names() {
        let lc = "<header></header><head></head>";
        assert_eq!(find_close_ci(lc, "head", 0), Some(17));
    }

    #[test]
    fn class_tokens() {
        let t = r#"<table class="rows-and-columns wide">"#;
        assert!(has_class(t, "rows-and-columns"));
        assert!(!has_class(t, "rows"));
    }

    #[test]
    fn tokenizer_pieces() {
        let toks = tokens("a<br/><!-- c --><em class=x>1</em> < b");
        assert_eq!(toks[0], Token::Text("a"));
        assert!(matches!(&toks[1], Token::Open { name, .. } if name == "br"));
        assert_eq!(toks[2], Token::Comment);
        assert!(matches!(&toks[3], Token::Open { name, .. } if name == "em"));
        assert_eq!(toks[4], Token::Text("1"));
        assert_eq!(toks[5], Token::Close { name: "em".into() });
    }

    #[test]
    fn strip_tags_decodes() {
        assert_eq!(strip_tags("<b>3</b>&nbsp;rows &amp; more"), "3 rows & more");
    }
}
