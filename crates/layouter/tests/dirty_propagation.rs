use css_style_model::{ComputedStyle, Display};
use layouter::{DOMSubscriber, DOMUpdate, DirtyKind, Layouter, NodeKey};

fn apply(layouter: &mut Layouter, update: DOMUpdate) {
    let applied = layouter.apply_update(update).map_err(|error| error.to_string());
    assert_eq!(applied, Ok(()));
}

fn element(parent: NodeKey, node: NodeKey, display: Display) -> DOMUpdate {
    DOMUpdate::InsertElement {
        parent,
        node,
        style: ComputedStyle {
            display,
            ..ComputedStyle::default()
        },
        pos: 0,
    }
}

/// # Panics
/// Panics if a text insertion does not dirty the node, its parent and the root.
#[test]
fn text_insertion_marks_node_parent_and_ancestors() {
    let mut layouter = Layouter::new();
    let parent = NodeKey(1);
    let text = NodeKey(2);
    apply(&mut layouter, element(NodeKey::ROOT, parent, Display::Block));
    apply(
        &mut layouter,
        DOMUpdate::InsertText {
            parent,
            node: text,
            text: "Hello".to_owned(),
            pos: 0,
        },
    );

    let child_kind = layouter.dirty_kind_of(text);
    assert!(child_kind.contains(DirtyKind::STRUCTURE));
    assert!(child_kind.contains(DirtyKind::LAYOUT));
    assert!(child_kind.contains(DirtyKind::REASON_TEXT));

    let parent_kind = layouter.dirty_kind_of(parent);
    assert!(parent_kind.contains(DirtyKind::LAYOUT.or(DirtyKind::INLINE_AXIS)));
    assert!(layouter.dirty_kind_of(NodeKey::ROOT).contains(DirtyKind::LAYOUT));

    layouter.compute_layout();
    assert_eq!(layouter.dirty_kind_of(text), DirtyKind::NONE);
    assert!(!layouter.take_and_clear_layout_dirty());
}

/// # Panics
/// Panics if a style change does not mark the node style dirty and its ancestors.
#[test]
fn style_change_marks_style_and_ancestors() {
    let mut layouter = Layouter::new();
    let outer = NodeKey(10);
    let inner = NodeKey(11);
    apply(&mut layouter, element(NodeKey::ROOT, outer, Display::Block));
    apply(&mut layouter, element(outer, inner, Display::Inline));
    layouter.compute_layout();
    apply(
        &mut layouter,
        DOMUpdate::SetStyle {
            node: inner,
            style: ComputedStyle {
                font_size: 32.0,
                ..ComputedStyle::default()
            },
        },
    );

    let kind = layouter.dirty_kind_of(inner);
    assert!(kind.contains(DirtyKind::STYLE.or(DirtyKind::REASON_STYLE)));
    assert!(layouter.dirty_kind_of(outer).contains(DirtyKind::BLOCK_AXIS));
    assert!(layouter.dirty_kind_of(NodeKey::ROOT).contains(DirtyKind::LAYOUT));
}

/// # Panics
/// Panics if a removal does not dirty the former parent and the root.
#[test]
fn removal_marks_parent_and_ancestors() {
    let mut layouter = Layouter::new();
    let parent = NodeKey(20);
    let child = NodeKey(21);
    apply(&mut layouter, element(NodeKey::ROOT, parent, Display::Block));
    apply(&mut layouter, element(parent, child, Display::Inline));
    layouter.compute_layout();

    apply(&mut layouter, DOMUpdate::RemoveNode { node: child });
    let parent_kind = layouter.dirty_kind_of(parent);
    assert!(parent_kind.contains(DirtyKind::STRUCTURE));
    assert!(parent_kind.contains(DirtyKind::LAYOUT));
    assert!(layouter.dirty_kind_of(NodeKey::ROOT).contains(DirtyKind::LAYOUT));
    assert!(layouter.node(child).is_none());
    assert!(layouter.renderer_for(child).is_none());
}
