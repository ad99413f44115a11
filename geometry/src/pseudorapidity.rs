use units::{Angle, Length, mm_, radian_};
use units::todo::Pseudorapidity;
use crate::Point3;

/// Pseudorapidity of a point at distance `radius` from the beam axis and
/// longitudinal position `z`.
///
/// Computed from `|z|` and negated for negative `z`, so that the result is
/// exactly antisymmetric under `z -> -z`.
pub fn eta_at(radius: Length, z: Length) -> Pseudorapidity {
    let theta = radian_(radius.atan2(z.abs()));
    let eta = -(theta / 2.0).tan().ln();
    if mm_(z) < 0.0 { -eta } else { eta }
}

/// Pseudorapidity and azimuth of a point in the detector frame
pub fn eta_phi(p: Point3) -> (Pseudorapidity, Angle) {
    let theta = radian_(p.radius().atan2(p.z));
    let eta = -(theta / 2.0).tan().ln();
    let phi = p.y.atan2(p.x);
    (eta, phi)
}
