//! Reconstructing rectangles from loose line segments.
//!
//! Pairs of horizontal segments with the same x extent are candidate
//! top/bottom edges. Vertical segments are then offered to the candidates in
//! a fixed order and attach first-fit to the first open left or right slot
//! whose endpoints they connect. A candidate with both sides closed is a
//! rectangle; the rest are dropped.
//!
//! First-fit makes the result depend on processing order when one vertical
//! could close two candidates, so both lists are sorted with total keys
//! before matching and the output does not depend on input order.

use log::debug;
use std::cmp::Reverse;

use crate::geometry::{Orientation, Rectangle, RectangleEdges, Segment};

struct Candidate {
    top: Segment,
    bottom: Segment,
    left: Option<Segment>,
    right: Option<Segment>,
}

impl Candidate {
    fn closes_left(&self, v: &Segment) -> bool {
        self.left.is_none() && v.start == self.top.start && v.end == self.bottom.start
    }

    fn closes_right(&self, v: &Segment) -> bool {
        self.right.is_none() && v.start == self.top.end && v.end == self.bottom.end
    }

    fn complete(&self) -> Option<RectangleEdges> {
        Some(RectangleEdges {
            top: self.top,
            bottom: self.bottom,
            left: self.left?,
            right: self.right?,
        })
    }
}

/// Find every rectangle closed by four of the given segments.
///
/// Rectangles come out in completion order. Diagonal and zero-length
/// segments are ignored.
pub fn find_rectangles(segments: &[Segment]) -> Vec<RectangleEdges> {
    let mut horizontal: Vec<Segment> = Vec::new();
    let mut vertical: Vec<Segment> = Vec::new();
    for segment in segments {
        match segment.orientation() {
            Orientation::Horizontal => horizontal.push(*segment),
            Orientation::Vertical => vertical.push(*segment),
            Orientation::Diagonal | Orientation::Degenerate => {
                debug!("Ignoring non-axis-aligned edge {segment}")
            }
        }
    }

    // Verticals bottom-up; horizontals left to right, then top-down so the
    // upper edge of a pair always comes first.
    vertical.sort_by_key(|v| (Reverse(v.start.y), v.start.x, v.end.y));
    horizontal.sort_by_key(|h| (h.start.x, h.start.y, h.end.x));

    let mut pending: Vec<Candidate> = Vec::new();
    for (i, h1) in horizontal.iter().enumerate() {
        for h2 in &horizontal[i + 1..] {
            if h1.start.x == h2.start.x && h1.end.x == h2.end.x {
                pending.push(Candidate {
                    top: *h1,
                    bottom: *h2,
                    left: None,
                    right: None,
                });
            }
        }
    }
    debug!(
        "{} horizontal / {} vertical edges, {} candidate pairs",
        horizontal.len(),
        vertical.len(),
        pending.len()
    );

    let mut rectangles = Vec::new();
    for v in &vertical {
        for i in 0..pending.len() {
            let candidate = &mut pending[i];
            if candidate.closes_left(v) {
                candidate.left = Some(*v);
            } else if candidate.closes_right(v) {
                candidate.right = Some(*v);
            } else {
                continue;
            }

            if let Some(edges) = candidate.complete() {
                pending.remove(i);
                rectangles.push(edges);
            }
            break;
        }
    }

    rectangles
}

/// Find rectangles and turn them into pruning boxes, ordered top-to-bottom
/// then left-to-right.
pub fn detect_rectangles(segments: &[Segment], margin: i64) -> Vec<Rectangle> {
    let mut rects: Vec<Rectangle> = find_rectangles(segments)
        .into_iter()
        .map(|edges| Rectangle::new(edges, margin))
        .collect();
    rects.sort_by_key(|r| (r.bounds.y1, r.bounds.x1));
    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Point};
    use itertools::Itertools;

    fn seg(x1: i64, y1: i64, x2: i64, y2: i64) -> Segment {
        Segment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Outline of the box (x1,y1)-(x2,y2), drawn the way a user might:
    /// clockwise, so half the segments run "backwards".
    fn outline(x1: i64, y1: i64, x2: i64, y2: i64) -> Vec<Segment> {
        vec![
            seg(x1, y1, x2, y1),
            seg(x2, y1, x2, y2),
            seg(x2, y2, x1, y2),
            seg(x1, y2, x1, y1),
        ]
    }

    #[test]
    fn single_rectangle_any_order() {
        let sides = outline(0, 0, 100, 100);
        for perm in sides.iter().copied().permutations(4) {
            let found = find_rectangles(&perm);
            assert_eq!(found.len(), 1, "input order {perm:?}");
            let edges = found[0];
            assert_eq!(edges.top, seg(0, 0, 100, 0));
            assert_eq!(edges.bottom, seg(0, 100, 100, 100));
            assert_eq!(edges.left, seg(0, 0, 0, 100));
            assert_eq!(edges.right, seg(100, 0, 100, 100));
        }
    }

    #[test]
    fn two_rectangles_any_order() {
        let mut sides = outline(0, 0, 100, 100);
        sides.extend(outline(200, 50, 260, 120));
        for perm in sides.iter().copied().permutations(sides.len()) {
            let boxes: Vec<(i64, i64, i64, i64)> = detect_rectangles(&perm, 0)
                .iter()
                .map(|r| (r.bounds.x1, r.bounds.y1, r.bounds.x2, r.bounds.y2))
                .collect();
            assert_eq!(
                boxes,
                vec![(0, 0, 100, 100), (200, 50, 260, 120)],
                "input order {perm:?}"
            );
        }
    }

    #[test]
    fn three_sides_are_not_a_rectangle() {
        let mut sides = outline(0, 0, 100, 100);
        for missing in 0..4 {
            let removed = sides.remove(missing);
            assert!(find_rectangles(&sides).is_empty());
            sides.insert(missing, removed);
        }
    }

    #[test]
    fn two_disjoint_rectangles() {
        let mut segments = outline(200, 0, 300, 100);
        segments.extend(outline(0, 0, 100, 100));
        segments.reverse();

        let rects = detect_rectangles(&segments, 0);
        assert_eq!(rects.len(), 2);
        assert_eq!(
            rects[0].bounds,
            BoundingBox {
                x1: 0,
                y1: 0,
                x2: 100,
                y2: 100
            }
        );
        assert_eq!(
            rects[1].bounds,
            BoundingBox {
                x1: 200,
                y1: 0,
                x2: 300,
                y2: 100
            }
        );
    }

    #[test]
    fn output_sorted_top_to_bottom_then_left_to_right() {
        let mut segments = outline(0, 500, 100, 600);
        segments.extend(outline(300, 0, 400, 100));
        segments.extend(outline(0, 0, 100, 100));

        let origins: Vec<(i64, i64)> = detect_rectangles(&segments, 5)
            .iter()
            .map(|r| (r.bounds.x1, r.bounds.y1))
            .collect();
        assert_eq!(origins, vec![(-5, -5), (295, -5), (-5, 495)]);
    }

    #[test]
    fn stacked_rectangles_sharing_an_edge() {
        // Two boards on top of each other; the middle line belongs to both
        // and the left/right rails are split at y=100.
        let segments = vec![
            seg(0, 0, 100, 0),
            seg(0, 100, 100, 100),
            seg(0, 200, 100, 200),
            seg(0, 0, 0, 100),
            seg(0, 100, 0, 200),
            seg(100, 0, 100, 100),
            seg(100, 100, 100, 200),
        ];

        let rects = detect_rectangles(&segments, 0);
        let boxes: Vec<(i64, i64, i64, i64)> = rects
            .iter()
            .map(|r| (r.bounds.x1, r.bounds.y1, r.bounds.x2, r.bounds.y2))
            .collect();
        assert_eq!(boxes, vec![(0, 0, 100, 100), (0, 100, 100, 200)]);
    }

    #[test]
    fn each_vertical_closes_one_edge_only() {
        // Two candidate pairs share the same left rail position but only one
        // rail exists, so only one rectangle can close.
        let segments = vec![
            seg(0, 0, 100, 0),
            seg(0, 100, 100, 100),
            seg(0, 0, 0, 100),
            seg(100, 0, 100, 100),
            // Duplicate top edge creates a second, identical candidate.
            seg(0, 0, 100, 0),
        ];
        assert_eq!(find_rectangles(&segments).len(), 1);
    }

    #[test]
    fn degenerate_and_diagonal_segments_are_ignored() {
        let mut segments = outline(0, 0, 10, 10);
        segments.push(seg(0, 0, 0, 0));
        segments.push(seg(10, 10, 10, 10));
        segments.push(seg(0, 0, 10, 10));
        assert_eq!(find_rectangles(&segments).len(), 1);

        assert!(find_rectangles(&[seg(5, 5, 5, 5), seg(5, 5, 5, 5)]).is_empty());
    }

    #[test]
    fn mismatched_extents_do_not_pair() {
        let segments = vec![
            seg(0, 0, 100, 0),
            seg(0, 100, 90, 100),
            seg(0, 0, 0, 100),
            seg(100, 0, 100, 100),
        ];
        assert!(find_rectangles(&segments).is_empty());
    }

    #[test]
    fn empty_input() {
        assert!(detect_rectangles(&[], 10_000).is_empty());
    }
}
