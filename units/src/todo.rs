/// Units which are simply type aliases for `f64` rather than having an
/// implementation as a `uom` `Quantity`.
///
/// This may be because:
///
/// + The quantity is dimensionless but not a plain ratio (pseudorapidity).
///
/// + It is measured in detector-specific units (ADC counts, photons) which
///   have no place in the SI system.
///
/// + There are other complications in the client code which make using `uom`
///   difficult, so we use plain `f64`s, but still want some clues in the source
///   as to what they represent.

/// Energy in GeV
pub type Energy         = f64; // TODO uom Energy with GeV as base unit
/// Raw digitizer output: ADC counts or photon counts
pub type Adc            = f64;
/// Calibration constant: GeV per ADC count
pub type EnergyPerAdc   = f64;
pub type Pseudorapidity = f64;
/// Fraction of a deposit's path length lying inside one cell
pub type Weight         = f64;
pub type LightYield     = f64;
/// Coordinate in a layer's 2-D working frame: mm or pseudorapidity, depending
/// on the axis
pub type FrameCoordinate = f64;
