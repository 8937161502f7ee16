//! Board coordinates.
//!
//! KiCad stores millimetres in the file but works in integer nanometres
//! internally. Geometry in this workspace uses the integer form so that
//! endpoint comparisons are exact.

use std::fmt;

/// Internal units per millimetre.
pub const IU_PER_MM: f64 = 1_000_000.0;

pub fn mm_to_iu(mm: f64) -> i64 {
    (mm * IU_PER_MM).round() as i64
}

/// A position in internal units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn from_mm(x: f64, y: f64) -> Self {
        Self::new(mm_to_iu(x), mm_to_iu(y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.x, self.y)
    }
}
