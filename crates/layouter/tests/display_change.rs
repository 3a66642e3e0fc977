use css_style_model::{ComputedStyle, Display};
use layouter::{DOMSubscriber, DOMUpdate, Layouter, NodeKey};

const PARA: NodeKey = NodeKey(1);
const SPAN: NodeKey = NodeKey(2);
const EM: NodeKey = NodeKey(4);

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

fn restyle(layouter: &mut Layouter, node: NodeKey, display: Display) {
    apply(
        layouter,
        DOMUpdate::SetStyle {
            node,
            style: styled(display),
        },
    );
}

/// `<p><span>A<em>B</em>C</span></p>` with every box inline.
fn inline_paragraph() -> Layouter {
    let mut layouter = Layouter::new();
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
        DOMUpdate::InsertText {
            parent: SPAN,
            node: NodeKey(3),
            text: "A".into(),
            pos: 0,
        },
        DOMUpdate::InsertElement {
            parent: SPAN,
            node: EM,
            style: styled(Display::Inline),
            pos: 1,
        },
        DOMUpdate::InsertText {
            parent: EM,
            node: NodeKey(5),
            text: "B".into(),
            pos: 0,
        },
        DOMUpdate::InsertText {
            parent: SPAN,
            node: NodeKey(6),
            text: "C".into(),
            pos: 2,
        },
    ];
    for update in updates {
        apply(&mut layouter, update);
    }
    layouter
}

fn run_texts(layouter: &Layouter, key: NodeKey) -> Vec<String> {
    layouter
        .runs_for_node(key)
        .into_iter()
        .map(|run| run.text.to_owned())
        .collect()
}

fn line_count(layouter: &Layouter, key: NodeKey) -> Option<usize> {
    layouter.block_layout_for(key).map(|layout| layout.line_count())
}

/// # Panics
/// Panics if turning an inline into a block does not split its ancestor.
#[test]
fn inline_to_block_splits_the_span() {
    init_logging();
    let mut layouter = inline_paragraph();
    layouter.compute_layout();
    assert_eq!(line_count(&layouter, PARA), Some(1));

    restyle(&mut layouter, EM, Display::Block);
    layouter.compute_layout();
    let tree = layouter.render_tree();
    let span = tree.renderer_for(SPAN);
    assert!(span.is_some_and(|span| tree.continuation_chain(span).count() == 3), "{}", tree.dump());
    let em = tree.renderer_for(EM);
    assert!(em.is_some_and(|em| tree.get(em).is_some_and(|object| object.is_block_container())));
    // The paragraph no longer holds lines itself.
    assert_eq!(line_count(&layouter, PARA), None);
    assert_eq!(run_texts(&layouter, SPAN), vec!["A", "B", "C"]);
    assert_eq!(run_texts(&layouter, EM), vec!["B"]);
}

/// # Panics
/// Panics if turning the block back into an inline loses content.
#[test]
fn block_back_to_inline_rejoins_the_flow() {
    init_logging();
    let mut layouter = inline_paragraph();
    restyle(&mut layouter, EM, Display::Block);
    restyle(&mut layouter, EM, Display::Inline);
    layouter.compute_layout();
    let tree = layouter.render_tree();
    let em = tree.renderer_for(EM);
    let parent_is_inline = em
        .and_then(|em| tree.parent(em))
        .and_then(|parent| tree.get(parent))
        .is_some_and(|object| object.is_inline_box());
    assert!(parent_is_inline, "{}", tree.dump());
    assert_eq!(run_texts(&layouter, SPAN), vec!["A", "B", "C"]);
}

/// # Panics
/// Panics if display:none does not drop every piece of a split inline.
#[test]
fn hiding_a_split_inline_drops_all_links() {
    init_logging();
    let mut layouter = inline_paragraph();
    restyle(&mut layouter, EM, Display::Block);
    restyle(&mut layouter, SPAN, Display::None);
    layouter.compute_layout();
    let tree = layouter.render_tree();
    assert!(tree.renderer_for(SPAN).is_none());
    assert!(tree.renderer_for(EM).is_none());
    assert!(tree.renderer_for(NodeKey(6)).is_none());
    let para = tree.renderer_for(PARA);
    assert!(para.is_some_and(|para| tree.children(para).is_empty()), "{}", tree.dump());

    restyle(&mut layouter, SPAN, Display::Inline);
    layouter.compute_layout();
    assert_eq!(run_texts(&layouter, SPAN), vec!["A", "B", "C"]);
}

/// # Panics
/// Panics if a style change keeping the box kind rebuilds the renderer.
#[test]
fn same_kind_restyle_keeps_renderer() {
    init_logging();
    let mut layouter = inline_paragraph();
    let before = layouter.renderer_for(SPAN);
    apply(
        &mut layouter,
        DOMUpdate::SetStyle {
            node: SPAN,
            style: ComputedStyle {
                font_size: 32.0,
                ..ComputedStyle::default()
            },
        },
    );
    assert_eq!(layouter.renderer_for(SPAN), before);
    layouter.compute_layout();
    // Text inherits the larger font; the paragraph falls back to line boxes.
    let height = layouter.block_layout_for(PARA).map(|layout| layout.height());
    assert!(height.is_some_and(|height| (height - 32.0).abs() < 0.001), "{layouter:?}");
}
