use thiserror::Error;
use crate::Point2;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("bad rectangle definition: low corner {low:?} is not below high corner {high:?}")]
pub struct RectangleError {
    pub low: Point2,
    pub high: Point2,
}

/// Axis-aligned rectangle in the working frame, such as a single cell.
///
/// ```text
///   E--------H
///   |        |
///   |        |
///   L--------F
/// ```
///
/// `L` is the low corner, `H` the high corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle {
    low: Point2,
    high: Point2,
}

impl Rectangle {

    pub fn new(low: Point2, high: Point2) -> Result<Self, RectangleError> {
        if low.x > high.x || low.y > high.y {
            return Err(RectangleError { low, high })
        }
        Ok(Self { low, high })
    }

    /// Rectangle of full widths `(wx, wy)` centred on `centre`. The signs of
    /// the widths are ignored.
    pub fn centred(centre: Point2, wx: f64, wy: f64) -> Self {
        let (hx, hy) = (wx.abs() / 2.0, wy.abs() / 2.0);
        Self {
            low : Point2::new(centre.x - hx, centre.y - hy),
            high: Point2::new(centre.x + hx, centre.y + hy),
        }
    }

    pub fn low (&self) -> Point2 { self.low  }
    pub fn high(&self) -> Point2 { self.high }

    /// The four edges, in the order bottom, right, top, left
    pub fn edges(&self) -> [(Point2, Point2); 4] {
        let Self { low: l, high: h } = *self;
        let e = Point2::new(l.x, h.y);
        let f = Point2::new(h.x, l.y);
        [(l, f), (f, h), (e, h), (l, e)]
    }

    /// Is `p` inside the rectangle? Points on the boundary are *not* inside.
    pub fn strictly_contains(&self, p: Point2) -> bool {
        let Self { low: l, high: h } = *self;
        p.x > l.x && p.y > l.y && p.x < h.x && p.y < h.y
    }
}
