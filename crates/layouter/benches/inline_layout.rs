use anyhow::Error;
use criterion::{Criterion, criterion_group, criterion_main};
use css_style_model::{ComputedStyle, Display, Edges};
use layouter::{DOMUpdate, Layouter, LayouterConfig, NodeKey};
use std::hint::black_box;

const WORDS: &str = "The quick brown fox jumps over the lazy dog while the five boxing wizards jump quickly ";

/// Build a synthetic document: a body with `paragraphs` paragraphs of plain
/// text, every fourth one holding a padded span so it needs line boxes.
fn build_document(config: LayouterConfig, paragraphs: u64) -> Result<Layouter, Error> {
    let mut layouter = Layouter::with_config(config);
    let block = ComputedStyle {
        display: Display::Block,
        ..ComputedStyle::default()
    };
    let padded = ComputedStyle {
        padding: Edges {
            left: 4.0,
            right: 4.0,
            ..Edges::default()
        },
        ..ComputedStyle::default()
    };
    let body = NodeKey(1);
    let mut updates = vec![DOMUpdate::InsertElement {
        parent: NodeKey::ROOT,
        node: body,
        style: block.clone(),
        pos: 0,
    }];
    for index in 0..paragraphs {
        let para = NodeKey(10 + index * 10);
        updates.push(DOMUpdate::InsertElement {
            parent: body,
            node: para,
            style: block.clone(),
            pos: usize::MAX,
        });
        updates.push(DOMUpdate::InsertText {
            parent: para,
            node: NodeKey(para.0 + 1),
            text: WORDS.repeat(4),
            pos: 0,
        });
        if index % 4 == 0 {
            let span = NodeKey(para.0 + 2);
            updates.push(DOMUpdate::InsertElement {
                parent: para,
                node: span,
                style: padded.clone(),
                pos: 1,
            });
            updates.push(DOMUpdate::InsertText {
                parent: span,
                node: NodeKey(para.0 + 3),
                text: WORDS.to_owned(),
                pos: 0,
            });
        }
    }
    layouter.apply_updates(updates)?;
    Ok(layouter)
}

fn bench_inline_layout(criterion: &mut Criterion) {
    criterion.bench_function("layouter_inline_full_pass", |bencher| {
        let Ok(mut layouter) = build_document(LayouterConfig::default(), 64) else {
            return;
        };
        bencher.iter(|| black_box(layouter.compute_layout_full()));
    });

    criterion.bench_function("layouter_inline_line_boxes_only", |bencher| {
        let config = LayouterConfig::new(false, 200, 1024.0, false);
        let Ok(mut layouter) = build_document(config, 64) else {
            return;
        };
        bencher.iter(|| black_box(layouter.compute_layout_full()));
    });

    criterion.bench_function("layouter_inline_text_edit", |bencher| {
        let Ok(mut layouter) = build_document(LayouterConfig::default(), 64) else {
            return;
        };
        let mut toggle = false;
        bencher.iter(|| {
            toggle = !toggle;
            let text = if toggle { WORDS.repeat(3) } else { WORDS.repeat(4) };
            let edited = layouter
                .apply_updates([DOMUpdate::SetText {
                    node: NodeKey(21),
                    text,
                }])
                .is_ok();
            black_box((edited, layouter.compute_layout()))
        });
    });
}

criterion_group!(inline_benches, bench_inline_layout);
criterion_main!(inline_benches);
