// benches/visibility.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use colvis::engine::{ColumnVisibilityEngine, VisibilityRules};
use colvis::page::snapshot::parse_table;

/// A page at the safety bound: 2000 rows × 20 columns, every third column empty.
fn sample_page(rows: usize, cols: usize) -> String {
    let mut s = String::from("<html><head></head><body><table class=\"rows-and-columns\"><thead><tr>");
    for c in 0..cols {
        s.push_str(&format!("<th>col{c}</th>"));
    }
    s.push_str("</tr></thead><tbody>");
    for r in 0..rows {
        s.push_str("<tr>");
        for c in 0..cols {
            if c % 3 == 2 {
                s.push_str("<td>&nbsp;<br></td>");
            } else {
                s.push_str(&format!("<td><a href=\"/x/{r}\">{r}</a> <em>({c})</em></td>"));
            }
        }
        s.push_str("</tr>");
    }
    s.push_str("</tbody></table></body></html>");
    s
}

fn bench_visibility(c: &mut Criterion) {
    let page = sample_page(2000, 20);
    let snap = parse_table(&page, "rows-and-columns").unwrap_or_else(|| panic!("sample has a table"));
    let engine = ColumnVisibilityEngine::default();
    let rules = VisibilityRules::new().auto_hide_empty(true).deny(["col0"]);

    c.bench_function("parse_table_40k_cells", |b| {
        b.iter(|| {
            let snap = parse_table(black_box(&page), "rows-and-columns");
            black_box(snap.map(|s| s.cell_count()))
        })
    });

    c.bench_function("evaluate_40k_cells", |b| {
        b.iter(|| {
            let eval = engine.evaluate(black_box(&snap), black_box(&rules));
            black_box(eval.map(|e| e.hidden.len()))
        })
    });
}

criterion_group!(benches, bench_visibility);
criterion_main!(benches);
