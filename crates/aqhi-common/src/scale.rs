//! AQHI display categories and colour scale.
//!
//! Interpolated estimates are quantized into a small set of display
//! categories before being coloured: `"NA"` for no estimate, `"0"` for
//! anything that rounds below 1, the integers 1 through 10, and `"10+"`.
//! Rounding is round-half-to-even, so 4.5 displays as `"4"` and 5.5 as `"6"`.

use std::fmt;

/// Display value for a cell without an estimate.
pub const NO_DATA: &str = "NA";

/// Display value for anything that rounds to 11 or more.
pub const ABOVE_TEN: &str = "10+";

/// Colour for no-data, below-1 and unparseable categories.
pub const NO_DATA_COLOR: &str = "#D3D3D3";

const ABOVE_TEN_COLOR: &str = "#640100";

/// Colours for AQHI 1 through 10, light blue through dark maroon.
const LEVEL_COLORS: [&str; 10] = [
    "#01cbff", "#0099cb", "#016797", "#fffe03", "#ffcb00", "#ff9835", "#fd6866", "#fe0002",
    "#cc0001", "#9a0100",
];

/// A quantized AQHI display category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqhiCategory {
    /// No estimate available.
    NoData,
    /// Rounded value below 1.
    BelowOne,
    /// Rounded value 1 through 10.
    Level(u8),
    /// Rounded value 11 or more.
    AboveTen,
}

impl AqhiCategory {
    /// Quantize an interpolated estimate.
    pub fn from_estimate(estimate: Option<f64>) -> Self {
        match estimate {
            Some(v) if v.is_finite() => Self::from_rounded(v.round_ties_even()),
            _ => Self::NoData,
        }
    }

    /// Parse a display string back into a category.
    ///
    /// Anything that is neither `"10+"` nor a finite number is `NoData`.
    pub fn parse(display: &str) -> Self {
        let display = display.trim();
        if display == ABOVE_TEN {
            return Self::AboveTen;
        }
        match display.parse::<f64>() {
            Ok(v) if v.is_finite() => Self::from_rounded(v.round_ties_even()),
            _ => Self::NoData,
        }
    }

    fn from_rounded(rounded: f64) -> Self {
        if rounded < 1.0 {
            Self::BelowOne
        } else if rounded >= 11.0 {
            Self::AboveTen
        } else {
            Self::Level(rounded as u8)
        }
    }

    /// Hex colour for this category.
    pub fn color(&self) -> &'static str {
        match self {
            Self::NoData | Self::BelowOne => NO_DATA_COLOR,
            Self::Level(n) => LEVEL_COLORS
                .get(usize::from(*n).wrapping_sub(1))
                .copied()
                .unwrap_or(NO_DATA_COLOR),
            Self::AboveTen => ABOVE_TEN_COLOR,
        }
    }

    /// Human readable label for popups.
    pub fn label(&self) -> String {
        match self {
            Self::NoData => "No data".to_string(),
            Self::BelowOne => "AQHI below 1".to_string(),
            Self::Level(n) => format!("AQHI {}", n),
            Self::AboveTen => format!("AQHI {}", ABOVE_TEN),
        }
    }
}

impl fmt::Display for AqhiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str(NO_DATA),
            Self::BelowOne => f.write_str("0"),
            Self::Level(n) => write!(f, "{}", n),
            Self::AboveTen => f.write_str(ABOVE_TEN),
        }
    }
}

/// Map a display value to its colour. Never fails: unparseable input is gray.
pub fn aqhi_color(display: &str) -> &'static str {
    AqhiCategory::parse(display).color()
}
