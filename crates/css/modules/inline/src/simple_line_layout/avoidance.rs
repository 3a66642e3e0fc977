//! Reasons a block cannot take the simple line layout.

use core::fmt;
use core::ops::BitOr;

/// Set of reasons that disqualify a flow from the fast path.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AvoidanceReasons(u32);

impl AvoidanceReasons {
    pub const NONE: Self = Self(0);
    pub const FEATURE_DISABLED: Self = Self(1);
    pub const FLOW_IS_MISSING: Self = Self(1 << 1);
    pub const FLOW_HAS_NO_CHILD: Self = Self(1 << 2);
    pub const FLOW_CHILDREN_NOT_INLINE: Self = Self(1 << 3);
    pub const FLOW_HAS_FLOAT: Self = Self(1 << 4);
    pub const FLOW_HAS_OUT_OF_FLOW_CHILD: Self = Self(1 << 5);
    pub const FLOW_HAS_ATOMIC_INLINE: Self = Self(1 << 6);
    pub const FLOW_HAS_DECORATED_INLINE_BOX: Self = Self(1 << 7);
    pub const FLOW_CHILD_STYLE_DIFFERS: Self = Self(1 << 8);
    pub const FLOW_HAS_AUTO_HYPHENATION: Self = Self(1 << 9);
    pub const FLOW_HAS_UNSUPPORTED_WHITE_SPACE: Self = Self(1 << 10);
    pub const FLOW_HAS_MIXED_BIDI_LEVELS: Self = Self(1 << 11);
    pub const FLOW_TEXT_HAS_SOFT_HYPHEN: Self = Self(1 << 12);
    pub const FLOW_TEXT_REQUIRES_COMPLEX_PATH: Self = Self(1 << 13);

    /// Reasons that leave something other than text and breaks in the flow.
    pub const NON_TEXT_CONTENT: Self = Self(
        Self::FLOW_IS_MISSING.0
            | Self::FLOW_CHILDREN_NOT_INLINE.0
            | Self::FLOW_HAS_FLOAT.0
            | Self::FLOW_HAS_OUT_OF_FLOW_CHILD.0
            | Self::FLOW_HAS_ATOMIC_INLINE.0,
    );

    const NAMES: [(Self, &'static str); 14] = [
        (Self::FEATURE_DISABLED, "feature-disabled"),
        (Self::FLOW_IS_MISSING, "flow-is-missing"),
        (Self::FLOW_HAS_NO_CHILD, "flow-has-no-child"),
        (Self::FLOW_CHILDREN_NOT_INLINE, "flow-children-not-inline"),
        (Self::FLOW_HAS_FLOAT, "flow-has-float"),
        (Self::FLOW_HAS_OUT_OF_FLOW_CHILD, "flow-has-out-of-flow-child"),
        (Self::FLOW_HAS_ATOMIC_INLINE, "flow-has-atomic-inline"),
        (Self::FLOW_HAS_DECORATED_INLINE_BOX, "flow-has-decorated-inline-box"),
        (Self::FLOW_CHILD_STYLE_DIFFERS, "flow-child-style-differs"),
        (Self::FLOW_HAS_AUTO_HYPHENATION, "flow-has-auto-hyphenation"),
        (Self::FLOW_HAS_UNSUPPORTED_WHITE_SPACE, "flow-has-unsupported-white-space"),
        (Self::FLOW_HAS_MIXED_BIDI_LEVELS, "flow-has-mixed-bidi-levels"),
        (Self::FLOW_TEXT_HAS_SOFT_HYPHEN, "flow-text-has-soft-hyphen"),
        (Self::FLOW_TEXT_REQUIRES_COMPLEX_PATH, "flow-text-requires-complex-path"),
    ];

    #[inline]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Names of the reasons in the set, in declaration order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(reason, _)| self.contains(*reason))
            .map(|(_, name)| name)
    }
}

impl BitOr for AvoidanceReasons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl fmt::Debug for AvoidanceReasons {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return formatter.write_str("AvoidanceReasons(none)");
        }
        formatter.write_str("AvoidanceReasons(")?;
        for (index, name) in self.names().enumerate() {
            if index > 0 {
                formatter.write_str(" | ")?;
            }
            formatter.write_str(name)?;
        }
        formatter.write_str(")")
    }
}

/// How far a qualification check runs once it finds a reason.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IncludeReasons {
    /// Stop at the first reason found.
    #[default]
    First,
    /// Collect every reason, for diagnostics.
    All,
}
