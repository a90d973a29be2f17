//! Benchmarks for metric computation and emission over wide and deep trees.
//!
//! Run with: cargo bench -p treescope-parts

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use treescope_parts::builders::{
    CommaPolicy, build_foldable_tree_node_from_children, build_one_line_tree_node, text,
};
use treescope_parts::{
    DocumentOptions, ExpandState, LineItem, Part, RenderContext, TextOptions, render_document,
    render_to_text,
};

/// A list of `width` records, each holding `width` numbers, nested `depth` times.
fn build_tree(width: usize, depth: usize) -> Part {
    fn node(width: usize, depth: usize, path: &str) -> LineItem {
        if depth == 0 {
            return build_one_line_tree_node(text("12345"), Some(path));
        }
        let children: Vec<LineItem> = (0..width)
            .map(|i| node(width, depth - 1, &format!("{path}[{i}]")))
            .collect();
        build_foldable_tree_node_from_children(
            text("["),
            children,
            text("]"),
            CommaPolicy::SEPARATED,
            Some(path),
            ExpandState::Expanded,
        )
    }
    node(width, depth, "value").renderable
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("parts/metrics");
    for (width, depth) in [(10, 2), (10, 3), (4, 6)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{depth}")),
            &(width, depth),
            |b, &(width, depth)| {
                b.iter_with_setup(
                    || build_tree(width, depth),
                    |tree| {
                        black_box(tree.collapsed_width().ok());
                        black_box(tree.newlines_in_expanded_parent());
                    },
                )
            },
        );
    }
    group.finish();
}

fn bench_text(c: &mut Criterion) {
    let tree = build_tree(10, 3);
    c.bench_function("parts/text/10x3", |b| {
        b.iter(|| {
            let out = render_to_text(&tree, TextOptions::default(), &mut RenderContext::new());
            black_box(out.ok())
        })
    });
}

fn bench_html(c: &mut Criterion) {
    let tree = build_tree(10, 3);
    c.bench_function("parts/html/10x3", |b| {
        b.iter(|| {
            black_box(render_document(
                &tree,
                DocumentOptions::default(),
                &mut RenderContext::new(),
            ))
        })
    });
}

criterion_group!(benches, bench_metrics, bench_text, bench_html);
criterion_main!(benches);
