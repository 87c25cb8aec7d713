// src/engine/types.rs
use std::collections::BTreeSet;

use crate::core::sanitize::normalize_name;

/// One piece of a cell's descendant markup, flattened in document order.
/// Only the kinds the emptiness heuristic cares about are distinguished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellNode {
    /// A text run, entities already decoded (NBSP kept as U+00A0).
    Text(String),
    /// `<br>`
    LineBreak,
    /// `<em …>…</em>`: small inline annotation, contents swallowed.
    Annotation,
    /// Links, media and form controls; always "visible".
    Interactive(String),
    /// Any other element (`span`, `div`, …).
    Element(String),
    /// `<!-- … -->`
    Comment,
}

/// A data cell: its full text content plus its structured markup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Text content as a reader would copy it (annotations included), not yet normalized.
    pub text: String,
    pub nodes: Vec<CellNode>,
}

impl Cell {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Plain text cell (a single text node).
    pub fn text<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        Self { nodes: vec![CellNode::Text(text.clone())], text }
    }

    pub fn from_nodes(nodes: Vec<CellNode>) -> Self {
        let text = nodes
            .iter()
            .filter_map(|n| match n { CellNode::Text(t) => Some(t.as_str()), _ => None })
            .collect();
        Self { text, nodes }
    }

    /// Append a node (builder style, mostly for tests and fixtures).
    pub fn with(mut self, node: CellNode) -> Self {
        if let CellNode::Text(t) = &node {
            self.text.push_str(t);
        }
        self.nodes.push(node);
        self
    }

    pub fn has_interactive(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, CellNode::Interactive(_)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// Header text as rendered (trimmed of markup, not lower-cased).
    pub name: String,
    /// 1-based, matches CSS `nth-child`.
    pub position: usize,
}

/// Immutable view of a rendered table at one instant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableSnapshot {
    headers: Vec<Header>,
    rows: Vec<Vec<Cell>>,
}

impl TableSnapshot {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>, rows: Vec<Vec<Cell>>) -> Self {
        let headers = headers
            .into_iter()
            .enumerate()
            .map(|(i, name)| Header { name: name.into(), position: i + 1 })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[Header] { &self.headers }
    pub fn rows(&self) -> &[Vec<Cell>] { &self.rows }

    pub fn column_count(&self) -> usize { self.headers.len() }
    pub fn row_count(&self) -> usize { self.rows.len() }

    /// `rows × columns`, saturating.
    pub fn cell_count(&self) -> usize {
        self.rows.len().saturating_mul(self.headers.len())
    }

    /// Cell at `row` (0-based) and column `position` (1-based). Short rows yield `None`.
    pub fn cell(&self, row: usize, position: usize) -> Option<&Cell> {
        if position == 0 { return None; }
        self.rows.get(row)?.get(position - 1)
    }

    pub fn header_name(&self, position: usize) -> Option<&str> {
        self.headers.get(position.checked_sub(1)?).map(|h| h.name.as_str())
    }
}

/// Set of 1-based column positions to hide, kept sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HiddenColumns(BTreeSet<usize>);

impl HiddenColumns {
    pub fn new() -> Self { Self(BTreeSet::new()) }

    pub fn insert(&mut self, position: usize) -> bool { self.0.insert(position) }
    pub fn contains(&self, position: usize) -> bool { self.0.contains(&position) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ { self.0.iter().copied() }

    pub fn to_vec(&self) -> Vec<usize> { self.iter().collect() }

    /// Header names of the hidden positions, in position order.
    pub fn names<'a>(&self, snap: &'a TableSnapshot) -> Vec<&'a str> {
        self.iter().filter_map(|p| snap.header_name(p)).collect()
    }

    /// Normalized names, handy for comparisons in logs and tests.
    pub fn normalized_names(&self, snap: &TableSnapshot) -> BTreeSet<String> {
        self.names(snap).into_iter().map(normalize_name).collect()
    }
}

impl FromIterator<usize> for HiddenColumns {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<usize> for HiddenColumns {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}
