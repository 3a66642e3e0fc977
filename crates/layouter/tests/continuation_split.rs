use css_display::NodeId;
use css_style_model::{ComputedStyle, Display};
use layouter::{DOMSubscriber, DOMUpdate, Layouter, LayouterConfig, NodeKey};

const PARA: NodeKey = NodeKey(1);
const SPAN: NodeKey = NodeKey(2);
const DIV: NodeKey = NodeKey(4);

fn init_logging() {
    let _logger = env_logger::builder().is_test(true).try_init();
}

fn apply(layouter: &mut Layouter, update: DOMUpdate) {
    let applied = layouter.apply_update(update).map_err(|error| error.to_string());
    assert_eq!(applied, Ok(()));
}

fn styled(display: Display) -> ComputedStyle {
    ComputedStyle {
        display,
        ..ComputedStyle::default()
    }
}

fn text(parent: NodeKey, node: NodeKey, content: &str, pos: usize) -> DOMUpdate {
    DOMUpdate::InsertText {
        parent,
        node,
        text: content.to_owned(),
        pos,
    }
}

/// `<p><span>A<div>B</div>C</span></p>` in document order.
fn block_in_inline(layouter: &mut Layouter) {
    let updates = [
        DOMUpdate::InsertElement {
            parent: NodeKey::ROOT,
            node: PARA,
            style: styled(Display::Block),
            pos: 0,
        },
        DOMUpdate::InsertElement {
            parent: PARA,
            node: SPAN,
            style: styled(Display::Inline),
            pos: 0,
        },
        text(SPAN, NodeKey(3), "A", 0),
        DOMUpdate::InsertElement {
            parent: SPAN,
            node: DIV,
            style: styled(Display::Block),
            pos: 1,
        },
        text(DIV, NodeKey(5), "B", 0),
        text(SPAN, NodeKey(6), "C", 2),
    ];
    for update in updates {
        apply(layouter, update);
    }
}

fn run_texts(layouter: &Layouter, key: NodeKey) -> Vec<String> {
    layouter
        .runs_for_node(key)
        .into_iter()
        .map(|run| run.text.to_owned())
        .collect()
}

/// # Panics
/// Panics if the block inside the span does not split it around the div.
#[test]
fn block_inside_inline_splits_paragraph() {
    init_logging();
    let mut layouter = Layouter::new();
    block_in_inline(&mut layouter);
    let tree = layouter.render_tree();
    let para = tree.renderer_for(PARA);
    let span = tree.renderer_for(SPAN);
    assert!(para.is_some() && span.is_some(), "{}", tree.dump());
    let (Some(para), Some(span)) = (para, span) else {
        return;
    };

    let blocks = tree.children(para);
    assert_eq!(blocks.len(), 3, "{}", tree.dump());
    assert!(blocks
        .iter()
        .all(|block| tree.get(*block).is_some_and(|object| object.is_anonymous_block())));
    assert_eq!(tree.children(blocks[0]), vec![span]);
    assert_eq!(tree.renderer_for(DIV).and_then(|div| tree.parent(div)), Some(blocks[1]));

    let chain: Vec<NodeId> = tree.continuation_chain(span).collect();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain.get(1), Some(&blocks[1]));
    let clone = chain[2];
    assert_eq!(tree.parent(clone), Some(blocks[2]));
    assert_eq!(tree.get(clone).and_then(|object| object.node), Some(SPAN));
    assert_eq!(tree.continuation_head(clone), span);
}

/// # Panics
/// Panics if the split paragraph does not lay out as three stacked blocks.
#[test]
fn split_paragraph_lays_out_each_part() {
    init_logging();
    let mut layouter = Layouter::new();
    block_in_inline(&mut layouter);
    // Root, paragraph, three anonymous blocks and the div.
    assert_eq!(layouter.compute_layout(), 6);
    assert_eq!(run_texts(&layouter, SPAN), vec!["A", "B", "C"]);
    assert_eq!(run_texts(&layouter, NodeKey(6)), vec!["C"]);

    let div = layouter.rect_for(DIV);
    assert!(div.is_some_and(|rect| (rect.y - 16.0).abs() < 0.001), "{layouter:?}");
    let para = layouter.rect_for(PARA);
    assert!(para.is_some_and(|rect| (rect.height - 48.0).abs() < 0.001), "{layouter:?}");
}

/// # Panics
/// Panics if later insertions and removals do not follow the chain.
#[test]
fn mutations_follow_the_chain() {
    init_logging();
    let mut layouter = Layouter::new();
    block_in_inline(&mut layouter);
    // Between the div and "C": lands in the clone.
    apply(&mut layouter, text(SPAN, NodeKey(7), "Z", 2));
    layouter.compute_layout();
    assert_eq!(run_texts(&layouter, SPAN), vec!["A", "B", "Z", "C"]);

    apply(&mut layouter, DOMUpdate::RemoveNode { node: DIV });
    layouter.compute_layout();
    assert_eq!(run_texts(&layouter, SPAN), vec!["A", "Z", "C"]);
    assert!(layouter.renderer_for(NodeKey(5)).is_none());

    apply(&mut layouter, DOMUpdate::RemoveNode { node: SPAN });
    let tree = layouter.render_tree();
    let para = tree.renderer_for(PARA);
    assert!(para.is_some_and(|para| tree.children(para).is_empty()), "{}", tree.dump());
}

/// # Panics
/// Panics if a shallow split bound loops or drops the block.
#[test]
fn shallow_split_depth_still_places_block() {
    init_logging();
    let mut layouter = Layouter::with_config(LayouterConfig::new(true, 1, 1024.0, false));
    apply(
        &mut layouter,
        DOMUpdate::InsertElement {
            parent: NodeKey::ROOT,
            node: PARA,
            style: styled(Display::Block),
            pos: 0,
        },
    );
    let mut parent = PARA;
    for key in 10..14 {
        apply(
            &mut layouter,
            DOMUpdate::InsertElement {
                parent,
                node: NodeKey(key),
                style: styled(Display::Inline),
                pos: 0,
            },
        );
        parent = NodeKey(key);
    }
    apply(&mut layouter, text(parent, NodeKey(20), "deep", 0));
    apply(
        &mut layouter,
        DOMUpdate::InsertElement {
            parent,
            node: DIV,
            style: styled(Display::Block),
            pos: 1,
        },
    );
    apply(&mut layouter, text(DIV, NodeKey(21), "block", 0));
    layouter.compute_layout();
    assert!(layouter.rect_for(DIV).is_some());
    assert_eq!(run_texts(&layouter, NodeKey(21)), vec!["block"]);
    assert_eq!(run_texts(&layouter, NodeKey(20)), vec!["deep"]);
}
