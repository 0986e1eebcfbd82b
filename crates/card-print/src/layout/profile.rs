//! Named sheet layouts
//!
//! Every named layout is a hard-coded [`LayoutProfile`]. The mapping between
//! layout variants and their canonical names lives in [`LAYOUT_NAMES`] and
//! nowhere else.

use crate::types::{Orientation, PaperSize, PrintError, Result};
use std::fmt;
use std::str::FromStr;

/// The closed set of layout kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// 3×3 on A4 portrait at full card scale
    A4NineUp,
    /// 3×3 on US Letter portrait
    LetterNineUp,
    /// 3 rows × 6 columns on A4 landscape at 70% card scale
    A4EighteenUp,
    /// Caller-supplied geometry
    Custom,
}

/// Canonical name of each layout kind
pub const LAYOUT_NAMES: [(LayoutKind, &str); 4] = [
    (LayoutKind::A4NineUp, "a4_9up"),
    (LayoutKind::LetterNineUp, "letter_9up"),
    (LayoutKind::A4EighteenUp, "a4_18up"),
    (LayoutKind::Custom, "custom"),
];

impl LayoutKind {
    pub fn as_str(self) -> &'static str {
        LAYOUT_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, name)| *name)
            .unwrap_or("custom")
    }

    pub fn from_name(name: &str) -> Result<Self> {
        LAYOUT_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(kind, _)| *kind)
            .ok_or_else(|| PrintError::UnsupportedLayout(name.to_string()))
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Fixed geometry of a sheet layout, in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutProfile {
    pub paper: PaperSize,
    pub orientation: Orientation,
    pub rows: usize,
    pub cols: usize,
    /// Multiplier applied to the (bleed-inflated) card box
    pub card_scale: f32,
    pub margin_x_mm: f32,
    pub margin_y_mm: f32,
    pub spacing_mm: f32,
}

impl LayoutProfile {
    /// Replace spacing and/or both margins
    pub fn with_overrides(mut self, spacing_mm: Option<f32>, margin_mm: Option<f32>) -> Self {
        if let Some(spacing) = spacing_mm {
            self.spacing_mm = spacing;
        }
        if let Some(margin) = margin_mm {
            self.margin_x_mm = margin;
            self.margin_y_mm = margin;
        }
        self
    }
}

const A4_NINE_UP: LayoutProfile = LayoutProfile {
    paper: PaperSize::A4,
    orientation: Orientation::Portrait,
    rows: 3,
    cols: 3,
    card_scale: 1.0,
    margin_x_mm: 1.0,
    margin_y_mm: 5.0,
    spacing_mm: 0.0,
};

// Three bleed-inflated cards (3 × 94mm) are taller than a Letter page,
// so this profile prints slightly under full size. The side margins keep
// column gutters under two cut-mark gaps, so marks of neighbours never cross.
const LETTER_NINE_UP: LayoutProfile = LayoutProfile {
    paper: PaperSize::Letter,
    orientation: Orientation::Portrait,
    rows: 3,
    cols: 3,
    card_scale: 0.95,
    margin_x_mm: 7.0,
    margin_y_mm: 5.0,
    spacing_mm: 0.5,
};

const A4_EIGHTEEN_UP: LayoutProfile = LayoutProfile {
    paper: PaperSize::A4,
    orientation: Orientation::Landscape,
    rows: 3,
    cols: 6,
    card_scale: 0.7,
    margin_x_mm: 2.0,
    margin_y_mm: 5.0,
    spacing_mm: 0.5,
};

/// Layout selector for a print sheet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetLayout {
    #[default]
    A4NineUp,
    LetterNineUp,
    A4EighteenUp,
    Custom(LayoutProfile),
}

impl SheetLayout {
    /// Every named (non-custom) layout
    pub const NAMED: [SheetLayout; 3] = [
        SheetLayout::A4NineUp,
        SheetLayout::LetterNineUp,
        SheetLayout::A4EighteenUp,
    ];

    /// Resolve an optional layout name.
    ///
    /// Only the absence of a name falls back to the default layout; unknown
    /// names are rejected. `custom` cannot be selected by name because it
    /// carries its own geometry.
    pub fn from_name(name: Option<&str>) -> Result<Self> {
        let Some(name) = name else {
            return Ok(SheetLayout::default());
        };
        match LayoutKind::from_name(name)? {
            LayoutKind::A4NineUp => Ok(SheetLayout::A4NineUp),
            LayoutKind::LetterNineUp => Ok(SheetLayout::LetterNineUp),
            LayoutKind::A4EighteenUp => Ok(SheetLayout::A4EighteenUp),
            LayoutKind::Custom => Err(PrintError::Config(
                "custom layouts must be given explicit geometry".to_string(),
            )),
        }
    }

    pub fn kind(&self) -> LayoutKind {
        match self {
            SheetLayout::A4NineUp => LayoutKind::A4NineUp,
            SheetLayout::LetterNineUp => LayoutKind::LetterNineUp,
            SheetLayout::A4EighteenUp => LayoutKind::A4EighteenUp,
            SheetLayout::Custom(_) => LayoutKind::Custom,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn profile(&self) -> LayoutProfile {
        match self {
            SheetLayout::A4NineUp => A4_NINE_UP,
            SheetLayout::LetterNineUp => LETTER_NINE_UP,
            SheetLayout::A4EighteenUp => A4_EIGHTEEN_UP,
            SheetLayout::Custom(profile) => *profile,
        }
    }
}

impl FromStr for SheetLayout {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(Some(s))
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::LayoutKind;
    use serde::{Deserialize, Serialize};

    impl Serialize for LayoutKind {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            serializer.serialize_str(self.as_str())
        }
    }

    impl<'de> Deserialize<'de> for LayoutKind {
        fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            LayoutKind::from_name(&s).map_err(serde::de::Error::custom)
        }
    }
}
