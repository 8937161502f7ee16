//! Segments, rectangles and bounding boxes in board internal units.

use std::fmt;

pub use pcb_board::Point;

/// A straight edge between two points.
///
/// Endpoints are canonicalised on construction so that `start <= end` in
/// `(x, y)` order. That keeps `start.x <= end.x` for every segment and also
/// orients vertical segments top-down, so two segments covering the same
/// points compare equal no matter which way they were drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    Diagonal,
    /// Zero length. Would otherwise count as both horizontal and vertical.
    Degenerate,
}

impl Segment {
    pub fn new(a: Point, b: Point) -> Self {
        if (a.x, a.y) <= (b.x, b.y) {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn orientation(&self) -> Orientation {
        if self.start == self.end {
            Orientation::Degenerate
        } else if self.start.y == self.end.y {
            Orientation::Horizontal
        } else if self.start.x == self.end.x {
            Orientation::Vertical
        } else {
            Orientation::Diagonal
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.orientation() == Orientation::Horizontal
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation() == Orientation::Vertical
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<({})-({})>", self.start, self.end)
    }
}

/// Inclusive axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl BoundingBox {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }

    /// Grow the box by `margin` on every side.
    pub fn expand(self, margin: i64) -> Self {
        Self {
            x1: self.x1 - margin,
            y1: self.y1 - margin,
            x2: self.x2 + margin,
            y2: self.y2 + margin,
        }
    }

    pub fn width(&self) -> i64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i64 {
        self.y2 - self.y1
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{} -- {};{}", self.x1, self.y1, self.x2, self.y2)
    }
}

/// The four edges that close one rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectangleEdges {
    pub top: Segment,
    pub bottom: Segment,
    pub left: Segment,
    pub right: Segment,
}

impl RectangleEdges {
    pub fn segments(&self) -> [Segment; 4] {
        [self.top, self.bottom, self.left, self.right]
    }

    /// Tight box around the edges.
    pub fn outline(&self) -> BoundingBox {
        let segments = self.segments();
        BoundingBox {
            x1: segments.iter().map(|s| s.start.x).min().unwrap_or_default(),
            y1: segments.iter().map(|s| s.start.y).min().unwrap_or_default(),
            x2: segments.iter().map(|s| s.end.x).max().unwrap_or_default(),
            y2: segments.iter().map(|s| s.end.y).max().unwrap_or_default(),
        }
    }
}

/// A detected board outline together with the pruning box derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub edges: RectangleEdges,
    /// Outline grown by the margin, so items sitting exactly on the outline
    /// are inside.
    pub bounds: BoundingBox,
}

impl Rectangle {
    pub fn new(edges: RectangleEdges, margin: i64) -> Self {
        Self {
            edges,
            bounds: edges.outline().expand(margin),
        }
    }
}
