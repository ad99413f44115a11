mod point;
mod rectangle;
mod intersect;
mod pseudorapidity;

pub use point::{Point2, Point3};
pub use rectangle::{Rectangle, RectangleError};
pub use intersect::{segments_cross, chord_length, path_length, weighting_path_length, ZERO_PATH_SENTINEL};
pub use pseudorapidity::{eta_at, eta_phi};
