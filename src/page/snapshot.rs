// src/page/snapshot.rs
// Locate the main data table in a rendered page and snapshot it.
//
// Markup convention:
//   <table class="... <table_class> ...">
//     <thead><tr><th>name</th>...</tr></thead>
//     <tbody><tr><td>...</td>...</tr>...</tbody>
//   </table>

use crate::core::html::{self, Block, has_class, next_block_in, text_content, to_lower};
use crate::engine::TableSnapshot;

use super::cell::parse_cell;

/// The first `<table>` whose class list contains `class`.
pub fn find_table(doc: &str, class: &str) -> Option<Block> {
    let lc = to_lower(doc);
    let mut pos = 0usize;
    loop {
        let b = next_block_in(doc, &lc, "table", pos)?;
        if has_class(b.open_tag(doc), class) {
            return Some(b);
        }
        pos = b.start + 1;
    }
}

/// `<td>`/`<th>` blocks of one row, in order.
pub fn row_cells(row_inner: &str) -> Vec<Block> {
    let lc = to_lower(row_inner);
    let mut out = Vec::new();
    let mut pos = 0usize;
    loop {
        let td = html::find_open_ci(&lc, "td", pos);
        let th = html::find_open_ci(&lc, "th", pos);
        let name = match (td, th) {
            (Some(a), Some(b)) => if a < b { "td" } else { "th" },
            (Some(_), None) => "td",
            (None, Some(_)) => "th",
            (None, None) => break,
        };
        let Some(b) = next_block_in(row_inner, &lc, name, pos) else { break };
        pos = b.end.max(b.start + 1);
        out.push(b);
    }
    out
}

/// Snapshot the table marked with `class`. `None` when the table, its header row
/// (or header cells), or its body is missing: callers treat that as "abstain".
pub fn parse_table(doc: &str, class: &str) -> Option<TableSnapshot> {
    let table = find_table(doc, class)?;
    let inner = table.inner(doc);
    let lc = to_lower(inner);

    let thead = next_block_in(inner, &lc, "thead", 0)?;
    let thead_inner = thead.inner(inner);
    let head_row = html::next_block_ci(thead_inner, "tr", 0)?;
    let head_inner = head_row.inner(thead_inner);
    let headers: Vec<String> = row_cells(head_inner)
        .iter()
        // Trimmed only: inner whitespace is part of the name, as rule names are.
        .map(|c| s!(text_content(c.inner(head_inner)).trim()))
        .collect();
    if headers.is_empty() {
        return None;
    }

    let tbody = next_block_in(inner, &lc, "tbody", thead.end)?;
    let body = tbody.inner(inner);
    let rows = html::blocks_ci(body, "tr")
        .iter()
        .map(|tr| {
            let tr_inner = tr.inner(body);
            row_cells(tr_inner)
                .iter()
                .map(|c| parse_cell(c.inner(tr_inner)))
                .collect()
        })
        .collect();

    Some(TableSnapshot::new(headers, rows))
}
