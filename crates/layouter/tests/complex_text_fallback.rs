use css_inline::BlockLineLayout;
use css_style_model::{ComputedStyle, Display};
use css_text::{FixedPitchMeasurer, FontMetrics, NoHyphenation, TextMeasurer, TextRun};
use layouter::{DOMSubscriber, DOMUpdate, Layouter, LayouterConfig, NodeKey};

const MONO: FixedPitchMeasurer = FixedPitchMeasurer::new(10.0);

/// Fixed pitch, except that text starting with "complex" needs shaping.
struct ShapingMarker;

impl TextMeasurer for ShapingMarker {
    fn measure(&self, run: &TextRun<'_>, style: &ComputedStyle) -> f32 {
        MONO.measure(run, style)
    }

    fn is_fixed_pitch(&self, style: &ComputedStyle) -> bool {
        MONO.is_fixed_pitch(style)
    }

    fn font_metrics(&self, style: &ComputedStyle) -> FontMetrics {
        MONO.font_metrics(style)
    }

    fn requires_complex_path(&self, text: &str, _style: &ComputedStyle) -> bool {
        text.starts_with("complex")
    }
}

fn init_logging() {
    let _logger = env_logger::builder().is_test(true).try_init();
}

fn apply(layouter: &mut Layouter, update: DOMUpdate) {
    let applied = layouter.apply_update(update).map_err(|error| error.to_string());
    assert_eq!(applied, Ok(()));
}

fn layouter_with(texts: &[&str]) -> Layouter {
    let mut config = LayouterConfig::new(true, 200, 500.0, true);
    config.log_avoidance_reasons = true;
    let mut layouter =
        Layouter::with_text_backend(config, Box::new(ShapingMarker), Box::new(NoHyphenation));
    apply(
        &mut layouter,
        DOMUpdate::InsertElement {
            parent: NodeKey::ROOT,
            node: NodeKey(1),
            style: ComputedStyle {
                display: Display::Block,
                ..ComputedStyle::default()
            },
            pos: 0,
        },
    );
    for (index, text) in texts.iter().enumerate() {
        apply(
            &mut layouter,
            DOMUpdate::InsertText {
                parent: NodeKey(1),
                node: NodeKey(2 + index as u64),
                text: (*text).to_owned(),
                pos: index,
            },
        );
    }
    layouter
}

/// # Panics
/// Panics if a block disqualified at its fourth segment keeps a partial fast-path table.
#[test]
fn late_disqualification_falls_back_to_line_boxes() {
    init_logging();
    let mut layouter = layouter_with(&["one ", "two ", "three ", "complex"]);
    layouter.compute_layout();
    let para = NodeKey(1);
    assert!(layouter.layout_simple_for(para).is_none());
    assert_eq!(layouter.perf_simple_blocks_last(), 0);
    assert_eq!(layouter.perf_line_box_blocks_last(), 1);

    let layout = layouter.block_layout_for(para);
    assert!(matches!(layout, Some(BlockLineLayout::LineBoxes(_))), "{layouter:?}");
    // Every fragment is still laid out, including the three before the marker.
    let texts: Vec<&str> = layouter
        .resolver_for(para)
        .map(|resolver| resolver.runs().map(|run| run.text).collect())
        .unwrap_or_default();
    assert_eq!(texts.concat(), "one two three complex");
    assert_eq!(layouter.runs_for_node(NodeKey(5)).len(), 1);
}

/// # Panics
/// Panics if removing the disqualifying text does not restore the fast path.
#[test]
fn removing_complex_text_restores_fast_path() {
    init_logging();
    let mut layouter = layouter_with(&["one ", "complex"]);
    layouter.compute_layout();
    assert_eq!(layouter.perf_line_box_blocks_last(), 1);

    apply(&mut layouter, DOMUpdate::RemoveNode { node: NodeKey(3) });
    layouter.compute_layout();
    assert_eq!(layouter.perf_simple_blocks_last(), 1);
    assert!(layouter.layout_simple_for(NodeKey(1)).is_some());
}
