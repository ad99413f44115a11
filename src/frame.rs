//! Layer blocks and their 2-D working frames.
//!
//! A layer is a rectangular block of active material. Its first axis runs
//! along the block's local transverse (`x`) direction, which is taken to be
//! tangential to the circle through the block's centre; the second axis is
//! either pseudorapidity or `z`, depending on the `BinningMode`.

use geometry::{eta_at, eta_phi, Point2, Point3};
use units::{Length, mm_};

use crate::LayerId;
use crate::error::ConfigError;
use crate::index::{BinningMode, GeometryIndex};

/// A rectangular block described by its centre and full size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    pub centre: Point3,
    pub size: (Length, Length, Length),
}

impl Block {

    pub fn new(centre: Point3, size: (Length, Length, Length)) -> Self { Self { centre, size } }

    /// Distance of the block's centre from the beam axis
    pub fn radius(&self) -> Length { self.centre.radius() }

    /// Radius of the block's outer face
    pub fn outer_radius(&self) -> Length { self.radius() + self.size.1 / 2.0 }

    pub fn z_min(&self) -> Length { self.centre.z - self.size.2 / 2.0 }
    pub fn z_max(&self) -> Length { self.z_min() + self.size.2 }

    /// Span of the local transverse coordinate, in mm
    pub fn x_span(&self) -> (f64, f64) {
        let half = mm_(self.size.0) / 2.0;
        (-half, half)
    }

    /// Pseudorapidity span, evaluated at the block's outer radius
    pub fn eta_span(&self) -> (f64, f64) {
        let r = self.outer_radius();
        (eta_at(r, self.z_min()), eta_at(r, self.z_max()))
    }

    /// Bin grid for cells of (at most) the given sizes.
    ///
    /// `x_step` is in mm; `second_step` is a pseudorapidity interval for
    /// `EtaX` and a length in mm for `Planar`.
    pub fn geometry_index(
        &self,
        layer: LayerId,
        mode: BinningMode,
        x_step: f64,
        second_step: f64,
    ) -> Result<GeometryIndex, ConfigError> {
        let (x_min, x_max) = self.x_span();
        let (min2, max2) = match mode {
            BinningMode::EtaX   => self.eta_span(),
            BinningMode::Planar => (mm_(self.z_min()), mm_(self.z_max())),
        };
        GeometryIndex::from_spans(layer, mode, (x_min, x_max, x_step), (min2, max2, second_step))
    }
}

/// Projection of detector-frame points into a layer's working frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    mode: BinningMode,
    /// Unit vector along the block's local x, in the detector's xy-plane
    tangent: (f64, f64),
}

impl Frame {

    pub fn new(block: &Block, mode: BinningMode) -> Self {
        let (cx, cy, _) = block.centre.in_mm();
        let phi0 = cy.atan2(cx);
        Self { mode, tangent: (-phi0.sin(), phi0.cos()) }
    }

    pub fn mode(&self) -> BinningMode { self.mode }

    pub fn project(&self, p: Point3) -> Point2 {
        let (x, y, z) = p.in_mm();
        let (tx, ty) = self.tangent;
        let local_x = x * tx + y * ty;
        let second = match self.mode {
            BinningMode::EtaX   => eta_phi(p).0,
            BinningMode::Planar => z,
        };
        Point2::new(local_x, second)
    }
}
