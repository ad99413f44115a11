//! Physical units used throughout the cell reconstruction.
//!
//! Lengths and angles are `uom` quantities stored as `f64` in a system whose
//! base length unit is the millimetre, so that `value` fields hold numbers
//! which are directly meaningful to detector people. Quantities which do not
//! fit comfortably into `uom` live in [`todo`] as plain `f64` aliases.

pub mod todo;

pub use uom;
pub use float_eq;

pub mod mmns {

  pub mod f64 {
    use uom::{ISQ, system};
    ISQ!(uom::si, f64, (millimeter, kilogram, nanosecond, ampere, kelvin, mole, candela));

    /// The full circle constant (τ) Equal to 2π.
    pub const TWOPI: Angle = Angle {
        dimension: std::marker::PhantomData,
        units: std::marker::PhantomData,
        value: std::f64::consts::TAU,
    };
  }

}

pub use uom::si::Quantity;
pub use mmns::f64::{Angle, TWOPI, Length, Area, Ratio};

mod units {
  pub use uom::si::{length::{micrometer, millimeter, centimeter, meter},
                    ratio ::ratio,
                    angle ::{radian, degree},
  };
}

// Making values from float literals seems to be very long-winded, so provide
// some pithily-named convenience constructors.

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f64) -> $quantity { $quantity::new::<units::$unit>(x) }
  };
}

wrap!(um     Length  micrometer);
wrap!(mm     Length  millimeter);
wrap!(cm     Length  centimeter);
wrap!(m      Length       meter);
wrap!(ratio  Ratio        ratio);
wrap!(radian Angle       radian);
wrap!(degree Angle       degree);

// Reverse direction of the above.
pub fn mm_    (x: Length) -> f64 { x.get::<units::millimeter>() }
pub fn cm_    (x: Length) -> f64 { x.get::<units::centimeter>() }
pub fn ratio_ (x: Ratio ) -> f64 { x.get::<units::ratio>() }
pub fn radian_(x: Angle ) -> f64 { x.get::<units::radian>() }

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    $crate::float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
  };
}
