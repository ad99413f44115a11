use geometry::{Point2, Point3};
use units::todo::{Energy, LightYield};

use crate::{HitId, LayerId};
use crate::frame::Frame;

/// Energy deposited by one particle along a short, straight path segment,
/// expressed in the layer's working frame.
///
/// A negative `edep` is not a physical deposit: it marks a geantino (a
/// non-interacting probe particle) whose path must survive downstream
/// processing. Such records are binned exactly like real ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepositRecord {
    pub layer: LayerId,
    pub hit_id: HitId,
    pub entry: Point2,
    pub exit: Point2,
    /// GeV
    pub edep: Energy,
    pub light_yield: Option<LightYield>,
}

impl DepositRecord {

    pub fn new(layer: LayerId, hit_id: HitId, entry: Point2, exit: Point2, edep: Energy) -> Self {
        Self { layer, hit_id, entry, exit, edep, light_yield: None }
    }

    pub fn with_light_yield(self, light_yield: LightYield) -> Self {
        Self { light_yield: Some(light_yield), ..self }
    }

    pub fn is_geantino(&self) -> bool { self.edep < 0.0 }
}

/// A simulated step in the detector frame, as delivered by the transport code
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepHit {
    pub layer: LayerId,
    pub hit_id: HitId,
    pub entry: Point3,
    pub exit: Point3,
    pub edep: Energy,
    pub light_yield: Option<LightYield>,
}

impl StepHit {
    /// Express this step in the working frame of its layer
    pub fn project(&self, frame: &Frame) -> DepositRecord {
        let &Self { layer, hit_id, entry, exit, edep, light_yield } = self;
        DepositRecord {
            layer, hit_id,
            entry: frame.project(entry),
            exit : frame.project(exit),
            edep, light_yield,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use units::mm;
    use float_eq::assert_float_eq;
    use crate::frame::Block;
    use crate::index::BinningMode;

    #[test]
    fn geantinos_are_negative() {
        let p = Point2::new(0.0, 0.0);
        assert!( DepositRecord::new(0, 1, p, p, -1.0).is_geantino());
        assert!(!DepositRecord::new(0, 1, p, p,  0.0).is_geantino());
    }

    #[test]
    fn projection_keeps_everything_but_coordinates() {
        let block = Block::new(Point3::new(mm(100.0), mm(0.0), mm(0.0)), (mm(10.0), mm(10.0), mm(10.0)));
        let frame = Frame::new(&block, BinningMode::Planar);
        let hit = StepHit {
            layer: 4, hit_id: 99,
            entry: Point3::new(mm(100.0), mm(1.0), mm(-2.0)),
            exit : Point3::new(mm(101.0), mm(2.0), mm( 3.0)),
            edep: 0.125, light_yield: Some(7.0),
        };
        let d = hit.project(&frame);
        assert_eq!(d.layer, 4);
        assert_eq!(d.hit_id, 99);
        assert_eq!(d.edep, 0.125);
        assert_eq!(d.light_yield, Some(7.0));
        assert_float_eq!((d.entry.x, d.entry.y), (1.0, -2.0), abs <= (1e-9, 1e-9));
        assert_float_eq!((d.exit .x, d.exit .y), (2.0,  3.0), abs <= (1e-9, 1e-9));
    }
}
