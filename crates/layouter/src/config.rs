//! Runtime configuration for inline layout.
//!
//! Settings can be constructed programmatically or loaded from environment
//! variables with [`LayouterConfig::from_env`].

use css_display::MAX_SPLIT_DEPTH;
use css_inline::InlineLayoutOptions;
use std::env;

/// Initial containing block width when none is configured.
pub const DEFAULT_AVAILABLE_WIDTH: f32 = 1024.0;

/// Runtime configuration for the layouter.
///
/// Controls the fast inline path, continuation split depth, the viewport
/// width used for the root block and telemetry output.
#[derive(Clone, Debug, PartialEq)]
pub struct LayouterConfig {
    /// Whether qualifying blocks may use the simple line layout
    pub simple_line_layout: bool,
    /// Whether to log every reason a block falls back to line boxes
    pub log_avoidance_reasons: bool,
    /// Inline nesting levels cloned when a block splits an inline (1..=200)
    pub max_split_depth: usize,
    /// Width of the initial containing block in px
    pub available_width: f32,
    /// Whether to emit a telemetry event after every layout pass
    pub telemetry_enabled: bool,
}

impl LayouterConfig {
    /// Construct a new `LayouterConfig` with explicit values.
    ///
    /// # Arguments
    ///
    /// * `simple_line_layout` - Allow the fast path for qualifying blocks
    /// * `max_split_depth` - Continuation clone depth, clamped to `1..=200`
    /// * `available_width` - Initial containing width; non-positive values use the default
    /// * `telemetry_enabled` - Whether to emit telemetry events
    #[inline]
    #[must_use]
    pub const fn new(
        simple_line_layout: bool,
        max_split_depth: usize,
        available_width: f32,
        telemetry_enabled: bool,
    ) -> Self {
        let depth = if max_split_depth < 1 {
            1
        } else if max_split_depth > MAX_SPLIT_DEPTH {
            MAX_SPLIT_DEPTH
        } else {
            max_split_depth
        };
        let width = if available_width.is_finite() && available_width > 0.0 {
            available_width
        } else {
            DEFAULT_AVAILABLE_WIDTH
        };
        Self {
            simple_line_layout,
            log_avoidance_reasons: false,
            max_split_depth: depth,
            available_width: width,
            telemetry_enabled,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `LAYOUTER_SIMPLE_LINE_LAYOUT`: Set to "0" to disable the fast path (default: enabled)
    /// - `LAYOUTER_SIMPLE_LINE_LAYOUT_DEBUG`: Set to "1" to log avoidance reasons
    /// - `LAYOUTER_MAX_SPLIT_DEPTH`: Continuation clone depth (default: 200)
    /// - `LAYOUTER_AVAILABLE_WIDTH`: Initial containing width in px (default: 1024)
    /// - `LAYOUTER_TELEMETRY`: Set to "1" to enable telemetry (default: disabled)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Self::from_env`], reading values through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let simple_line_layout =
            lookup("LAYOUTER_SIMPLE_LINE_LAYOUT").as_deref() != Some("0");
        let max_split_depth = lookup("LAYOUTER_MAX_SPLIT_DEPTH")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(MAX_SPLIT_DEPTH);
        let available_width = lookup("LAYOUTER_AVAILABLE_WIDTH")
            .and_then(|val| val.trim().parse::<f32>().ok())
            .unwrap_or(DEFAULT_AVAILABLE_WIDTH);
        let telemetry_enabled = lookup("LAYOUTER_TELEMETRY").as_deref() == Some("1");
        let mut config = Self::new(
            simple_line_layout,
            max_split_depth,
            available_width,
            telemetry_enabled,
        );
        config.log_avoidance_reasons =
            lookup("LAYOUTER_SIMPLE_LINE_LAYOUT_DEBUG").as_deref() == Some("1");
        config
    }

    /// Options for laying out one block `available_width` px wide.
    #[inline]
    #[must_use]
    pub const fn inline_options(&self, available_width: f32) -> InlineLayoutOptions {
        InlineLayoutOptions {
            available_width,
            simple_line_layout: self.simple_line_layout,
            log_avoidance_reasons: self.log_avoidance_reasons,
        }
    }
}

impl Default for LayouterConfig {
    fn default() -> Self {
        Self::new(true, MAX_SPLIT_DEPTH, DEFAULT_AVAILABLE_WIDTH, false)
    }
}
