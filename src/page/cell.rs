// src/page/cell.rs
// Turn a cell's inner HTML into the structured `Cell` the engine classifies.

use crate::core::html::{Token, tokens};
use crate::core::sanitize::normalize_entities;
use crate::engine::visibility::is_interactive_tag;
use crate::engine::{Cell, CellNode};

/// Flatten the descendant markup of a `<td>`/`<th>` into `CellNode`s.
///
/// - `<em>` and everything inside it becomes one `Annotation` (its text still
///   counts toward `Cell::text`).
/// - Interactive elements are recorded wherever they appear, even inside `<em>`.
pub fn parse_cell(inner_html: &str) -> Cell {
    let mut text = s!();
    let mut nodes = Vec::new();
    let mut em_depth = 0usize;

    for tok in tokens(inner_html) {
        match tok {
            Token::Text(raw) => {
                let decoded = normalize_entities(raw);
                text.push_str(&decoded);
                if em_depth == 0 {
                    nodes.push(CellNode::Text(decoded));
                }
            }
            Token::Comment => {
                if em_depth == 0 { nodes.push(CellNode::Comment); }
            }
            Token::Open { name, .. } => {
                if is_interactive_tag(&name) {
                    nodes.push(CellNode::Interactive(name));
                    continue;
                }
                if em_depth > 0 {
                    if name == "em" { em_depth += 1; }
                    continue;
                }
                match name.as_str() {
                    "br" => nodes.push(CellNode::LineBreak),
                    "em" => {
                        em_depth = 1;
                        nodes.push(CellNode::Annotation);
                    }
                    _ => nodes.push(CellNode::Element(name)),
                }
            }
            Token::Close { name } => {
                if name == "em" && em_depth > 0 { em_depth -= 1; }
            }
        }
    }
    Cell { text, nodes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cell_is_visibly_empty;

    fn empty(html: &str) -> bool { cell_is_visibly_empty(&parse_cell(html)) }

    #[test]
    fn decorative_markup_is_empty() {
        assert!(empty(""));
        assert!(empty("&nbsp;"));
        assert!(empty("  <br>\n<br/> "));
        assert!(empty("<em class=\"subtle-id\"></em>"));
    }

    #[test]
    fn visible_content_is_not_empty() {
        assert!(!empty("0"));
        assert!(!empty("<a href=\"/x\"></a>"));
        assert!(!empty("<img src=x>"));
        assert!(!empty("<span></span>"));
        assert!(!empty("<em>3</em>"), "annotation text still counts as text");
        assert!(!empty("<em><svg></svg></em>"));
        assert!(!empty("<!-- note -->"));
    }

    #[test]
    fn text_includes_annotation_content() {
        let c = parse_cell("Rome <em>(2)</em>");
        assert_eq!(c.text, "Rome (2)");
        assert_eq!(c.nodes, vec![CellNode::Text(s!("Rome ")), CellNode::Annotation]);
    }
}
