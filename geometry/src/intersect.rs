//! Intersections of straight particle paths with cell boundaries.
//!
//! A deposit's path is approximated by the segment joining its entry and exit
//! points in the working frame. The length of that segment lying inside a
//! given cell (the *chord*) determines the fraction of the deposit's energy
//! which the cell receives.

use crate::{Point2, Rectangle};

/// Path length used for weighting when entry and exit coincide.
///
/// A zero-length path would make the per-cell weight `chord / length` a 0/0.
/// Such deposits always fall in a single cell, whose weight is computed as
/// `length / length`, so any non-zero value gives the right answer; -1 also
/// flags these hits for anyone looking at the weights later.
pub const ZERO_PATH_SENTINEL: f64 = -1.0;

/// Straight-line distance between `a` and `b`
pub fn path_length(a: Point2, b: Point2) -> f64 { a.distance(b) }

/// Like `path_length`, but returns `ZERO_PATH_SENTINEL` for a zero-length path.
///
/// The result must only ever be used as a divisor for per-cell weights, never
/// as a physical length.
pub fn weighting_path_length(a: Point2, b: Point2) -> f64 {
    let length = path_length(a, b);
    if length == 0.0 { ZERO_PATH_SENTINEL } else { length }
}

/// Find where segment `(a,b)` crosses segment `(c,d)`.
///
/// First check whether the infinite line through `a` and `b` crosses the
/// segment `(c,d)`: parametrize the crossing as `c + h (d-c)` and require
/// `0 < h < 1`. Then check that the crossing lies within the bounding box of
/// `(a,b)`. Parallel lines never cross.
pub fn segments_cross(a: Point2, b: Point2, c: Point2, d: Point2) -> Option<Point2> {
    let (ex, ey) = b - a;
    let (fx, fy) = d - c;
    // Perpendicular to (a,b)
    let (px, py) = (-ey, ex);

    let bottom = fx * px + fy * py;
    if bottom == 0.0 { return None }

    let (gx, gy) = a - c;
    let top = gx * px + gy * py;
    let h = top / bottom;
    if !(h > 0.0 && h < 1.0) { return None }

    let r = Point2::new(c.x + fx * h, c.y + fy * h);
    let outside_ab =
        (r.x > a.x && r.x > b.x) ||
        (r.x < a.x && r.x < b.x) ||
        (r.y < a.y && r.y < b.y) ||
        (r.y > a.y && r.y > b.y);
    if outside_ab { None } else { Some(r) }
}

/// Length of segment `(a,b)` lying inside `cell`.
///
/// `None` if the segment does not cross the boundary of `cell` at all (this
/// includes segments lying entirely inside it: the caller handles that case
/// without asking). `Some(0.0)` is possible when the boundary is touched but
/// no length can be attributed, e.g. a single crossing with neither end
/// strictly inside.
pub fn chord_length(a: Point2, b: Point2, cell: &Rectangle) -> Option<f64> {
    let mut crossings = [Point2::default(); 4];
    let mut n = 0;
    for (c, d) in cell.edges() {
        if let Some(r) = segments_cross(a, b, c, d) {
            crossings[n] = r;
            n += 1;
        }
    }

    let chord = match n {
        0 => return None,
        // Enters and leaves
        2 => crossings[0].distance(crossings[1]),
        // One end inside the cell
        1 => {
            let r = crossings[0];
            let mut chord = 0.0;
            if cell.strictly_contains(a) { chord = r.distance(a) }
            if cell.strictly_contains(b) { chord = r.distance(b) }
            chord
        },
        // Only reachable through rounding on near-degenerate geometry
        _ => 0.0,
    };
    Some(chord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use proptest::prelude::*;
    use units::float_eq::assert_float_eq;

    fn p(x: f64, y: f64) -> Point2 { Point2::new(x, y) }

    fn unit_square() -> Rectangle { Rectangle::new(p(0.0, 0.0), p(1.0, 1.0)).unwrap() }

    #[rstest(/**/     a     ,     b     ,     c     ,     d     , expected,
             case((0.0, 0.0), (2.0, 2.0), (0.0, 2.0), (2.0, 0.0), Some((1.0, 1.0))), // X
             case((0.0, 0.0), (1.0, 1.0), (0.0, 4.0), (4.0, 0.0), None),             // (a,b) too short
             case((0.0, 0.0), (2.0, 0.0), (0.0, 1.0), (2.0, 1.0), None),             // parallel
             case((0.0, 0.0), (2.0, 0.0), (2.0, 0.0), (2.0, 1.0), None),             // touches end of (c,d): h = 0
             case((0.5, -1.0), (0.5, 1.0), (0.0, 0.0), (1.0, 0.0), Some((0.5, 0.0))),
    )]
    fn crossing_points(a: (f64, f64), b: (f64, f64), c: (f64, f64), d: (f64, f64), expected: Option<(f64, f64)>) {
        let r = segments_cross(a.into(), b.into(), c.into(), d.into());
        assert_eq!(r, expected.map(Point2::from));
    }

    #[rstest(/**/      a      ,      b      , expected,
             // straight through, horizontally and vertically
             case((-1.0,  0.5), ( 2.0,  0.5), Some(1.0)),
             case(( 0.3, -5.0), ( 0.3,  5.0), Some(1.0)),
             // diagonal through both corners' neighbourhood
             case((-0.5,  0.0), ( 1.5,  1.0), Some(1.25_f64.sqrt())),
             // starts inside, leaves through the right edge
             case(( 0.5,  0.5), ( 1.5,  0.5), Some(0.5)),
             // ends inside, entered through the bottom edge
             case(( 0.25, -1.0), ( 0.25, 0.75), Some(0.75)),
             // misses completely
             case(( 2.0,  2.0), ( 3.0,  3.0), None),
             case((-1.0,  2.0), ( 2.0,  2.0), None),
             // entirely inside: no boundary crossing
             case(( 0.2,  0.2), ( 0.8,  0.8), None),
    )]
    fn chords_through_unit_square(a: (f64, f64), b: (f64, f64), expected: Option<f64>) {
        let chord = chord_length(a.into(), b.into(), &unit_square());
        match (chord, expected) {
            (Some(c), Some(e)) => assert_float_eq!(c, e, abs <= 1e-12),
            (c, e) => assert_eq!(c, e),
        }
    }

    #[test]
    fn single_crossing_ending_on_boundary_fires_with_zero_chord() {
        // Crosses the bottom edge and stops exactly on the top-right corner,
        // which is not strictly inside and is excluded from both edges (h = 1)
        let chord = chord_length(p(0.5, -1.0), p(1.0, 1.0), &unit_square());
        assert_eq!(chord, Some(0.0));
    }

    #[test]
    fn zero_length_path_gets_sentinel() {
        let a = p(0.3, 0.7);
        assert_eq!(weighting_path_length(a, a), ZERO_PATH_SENTINEL);
        assert_eq!(weighting_path_length(a, p(0.3, 1.7)), 1.0);
        // Weight of the single fired cell is still exactly one
        assert_eq!(weighting_path_length(a, a) / weighting_path_length(a, a), 1.0);
    }

    proptest! {
        #[test]
        fn chord_length_is_direction_independent(
            ax in -3.0..3.0_f64, ay in -3.0..3.0_f64,
            bx in -3.0..3.0_f64, by in -3.0..3.0_f64,
            lx in -1.0..1.0_f64, ly in -1.0..1.0_f64,
            wx in  0.1..2.0_f64, wy in  0.1..2.0_f64,
        ) {
            let cell = Rectangle::new(p(lx, ly), p(lx + wx, ly + wy)).unwrap();
            let (a, b) = (p(ax, ay), p(bx, by));
            let forward  = chord_length(a, b, &cell);
            let backward = chord_length(b, a, &cell);
            prop_assert_eq!(forward.is_some(), backward.is_some());
            if let (Some(f), Some(b)) = (forward, backward) {
                assert_float_eq!(f, b, abs <= 1e-9);
            }
        }

        #[test]
        fn chord_never_exceeds_path_length(
            ax in -3.0..3.0_f64, ay in -3.0..3.0_f64,
            bx in -3.0..3.0_f64, by in -3.0..3.0_f64,
        ) {
            let (a, b) = (p(ax, ay), p(bx, by));
            if let Some(chord) = chord_length(a, b, &unit_square()) {
                prop_assert!(chord >= 0.0);
                prop_assert!(chord <= path_length(a, b) + 1e-9);
            }
        }
    }
}
