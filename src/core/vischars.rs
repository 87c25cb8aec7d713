// src/core/vischars.rs
// Visible-text character iterator for an HTML fragment.
// Skips tags (<...>) and comments, decodes entities, collapses ASCII whitespace to a single ' '.
// NBSP is passed through untouched; `sanitize::clean_text` folds it afterwards.

use super::sanitize::decode_entity;

pub struct VisChars<'a> {
    s: &'a str,
    b: &'a [u8],
    i: usize,
    n: usize,
}

impl<'a> VisChars<'a> {
    pub fn new(s: &'a str) -> Self { Self { s, b: s.as_bytes(), i: 0, n: s.len() } }

    #[inline]
    fn skip_tag(&mut self) {
        // called when current byte is '<'
        if self.s[self.i..].starts_with("<!--") {
            self.i = match self.s[self.i..].find("-->") {
                Some(e) => self.i + e + 3,
                None => self.n,
            };
            return;
        }
        self.i += 1;
        let mut in_s = false; // '
        let mut in_d = false; // "
        while self.i < self.n {
            match self.b[self.i] {
                b'\'' if !in_d => in_s = !in_s,
                b'"'  if !in_s => in_d = !in_d,
                b'>' if !in_s && !in_d => { self.i += 1; break; }
                _ => {}
            }
            self.i += 1;
        }
    }

    /// Called on '&'. Decodes `&name;` when it is a known entity, else yields a literal '&'.
    #[inline]
    fn entity(&mut self) -> char {
        let rest = &self.s[self.i..];
        if let Some(semi) = rest[1..].find(';').map(|p| p + 1).filter(|&p| p <= 10) {
            if let Some(ch) = decode_entity(&rest[1..semi]) {
                self.i += semi + 1;
                return ch;
            }
        }
        self.i += 1;
        '&'
    }

    /// A '<' only opens a tag when followed by a name, '/' or '!'.
    #[inline]
    fn opens_tag(&self) -> bool {
        matches!(self.b.get(self.i + 1), Some(c) if c.is_ascii_alphabetic() || *c == b'/' || *c == b'!')
    }

    #[inline]
    fn next_char(&mut self) -> Option<char> {
        let ch = self.s[self.i..].chars().next()?;
        self.i += ch.len_utf8();
        Some(ch)
    }
}

impl<'a> Iterator for VisChars<'a> {
    type Item = char;
    fn next(&mut self) -> Option<Self::Item> {
        while self.i < self.n {
            match self.b[self.i] {
                b'<' if self.opens_tag() => { self.skip_tag(); continue; }
                b'&' => return Some(self.entity()),
                b' ' | b'\t' | b'\r' | b'\n' => {
                    while self.i < self.n {
                        match self.b[self.i] { b' ' | b'\t' | b'\r' | b'\n' => self.i += 1, _ => break }
                    }
                    return Some(' ');
                }
                _ => return self.next_char(),
            }
        }
        None
    }
}
