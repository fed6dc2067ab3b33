//! The (min, max, percent) value triple produced by lore extraction.
//!
//! Every attribute reduces the lore of an entity's items to a single
//! [`StatusData`]. Contributions from separate lines, templates and bonus
//! stores are merged by field-wise addition, so the order in which they are
//! collected never matters.

use std::fmt;
use std::ops::{Add, AddAssign};

use strum::{Display, EnumString};

/// Accumulated attribute value.
///
/// `max >= min` is not enforced: a malformed lore line such as `10-5 ATK`
/// yields `min = 10, max = 5` and is kept as-is. Only [`fix_zero_value`]
/// changes values after aggregation.
///
/// [`fix_zero_value`]: StatusData::fix_zero_value
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatusData {
    pub min: f64,
    pub max: f64,
    pub percent: f64,
}

impl StatusData {
    /// Zero triple.
    pub const fn new() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            percent: 0.0,
        }
    }

    pub const fn from_parts(min: f64, max: f64, percent: f64) -> Self {
        Self { min, max, percent }
    }

    /// Same value for both bounds, no percent.
    pub const fn flat(value: f64) -> Self {
        Self::from_parts(value, value, 0.0)
    }

    pub const fn percent(percent: f64) -> Self {
        Self::from_parts(0.0, 0.0, percent)
    }

    /// Returns true when both bounds are exactly zero.
    ///
    /// `percent` is deliberately excluded: a percent-only attribute still
    /// counts as zero for the zero-execute gate.
    pub fn is_zero_data(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }

    /// Clamps negative bounds to zero. `percent` is left untouched.
    pub fn fix_zero_value(&mut self) {
        if self.min < 0.0 {
            self.min = 0.0;
        }
        if self.max < 0.0 {
            self.max = 0.0;
        }
    }

    /// Field-wise merge of `other` into `self`.
    pub fn merge(&mut self, other: StatusData) {
        self.min += other.min;
        self.max += other.max;
        self.percent += other.percent;
    }

    /// Renders one component of the triple for text substitution.
    ///
    /// The percent suffix for percent attributes is appended by the
    /// definition, not here.
    pub fn placeholder(&self, kind: PlaceholderType) -> String {
        match kind {
            PlaceholderType::Min => format_value(self.min),
            PlaceholderType::Max => format_value(self.max),
            PlaceholderType::Percent => format_value(self.percent),
            PlaceholderType::Range => {
                format!("{} - {}", format_value(self.min), format_value(self.max))
            }
        }
    }
}

impl Add for StatusData {
    type Output = StatusData;

    fn add(mut self, rhs: StatusData) -> Self::Output {
        self.merge(rhs);
        self
    }
}

impl AddAssign for StatusData {
    fn add_assign(&mut self, rhs: StatusData) {
        self.merge(rhs);
    }
}

impl std::iter::Sum for StatusData {
    fn sum<I: Iterator<Item = StatusData>>(iter: I) -> Self {
        iter.fold(StatusData::new(), Add::add)
    }
}

impl fmt::Display for StatusData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min={} max={} percent={}",
            format_value(self.min),
            format_value(self.max),
            format_value(self.percent)
        )
    }
}

/// Which component of a [`StatusData`] a placeholder renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PlaceholderType {
    Min,
    Max,
    Percent,
    /// `"min - max"`
    Range,
}

/// Integral values print without a trailing `.0`, others with two decimals.
fn format_value(value: f64) -> String {
    if value == 0.0 {
        // Also catches -0.0.
        "0".to_string()
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{:.2}", value)
    }
}
