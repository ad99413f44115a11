use std::ops::Sub;
use units::{Length, mm_};
use units::todo::FrameCoordinate;

/// A point in a layer's 2-D working frame.
///
/// `x` runs along the layer's first binning axis, `y` along its second. The
/// units depend on the binning mode (mm for positions, nothing for
/// pseudorapidity), so these are plain numbers rather than `uom` quantities.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point2 {
    pub x: FrameCoordinate,
    pub y: FrameCoordinate,
}

impl Point2 {
    pub fn new(x: FrameCoordinate, y: FrameCoordinate) -> Self { Self { x, y } }

    pub fn distance(self, other: Self) -> FrameCoordinate {
        let (dx, dy) = self - other;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Component-wise difference, as a plain `(dx, dy)` pair
impl Sub for Point2 {
    type Output = (FrameCoordinate, FrameCoordinate);
    fn sub(self, rhs: Self) -> Self::Output {
        (self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(FrameCoordinate, FrameCoordinate)> for Point2 {
    fn from((x, y): (FrameCoordinate, FrameCoordinate)) -> Self { Self { x, y } }
}

/// A point in the detector (lab) frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point3 {
    pub x: Length,
    pub y: Length,
    pub z: Length,
}

impl Point3 {
    pub fn new(x: Length, y: Length, z: Length) -> Self { Self { x, y, z } }

    /// Distance from the beam (z) axis
    pub fn radius(&self) -> Length {
        let &Self { x, y, .. } = self;
        (x*x + y*y).sqrt()
    }

    pub fn in_mm(&self) -> (f64, f64, f64) { (mm_(self.x), mm_(self.y), mm_(self.z)) }
}
