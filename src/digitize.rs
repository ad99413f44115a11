//! Conversion of deposited energy into a number of scintillation photons.

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Poisson};

use units::todo::{Adc, Energy, LightYield};

use crate::EventId;
use crate::error::ConfigError;
use crate::tower::{Tower, TowerContainer};

/// Photons per MeV of deposited energy
pub const DEFAULT_MEAN_LIGHT_YIELD: LightYield = 200.0;

const MEV_PER_GEV: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Digitizer {
    mean_light_yield: LightYield,
    photon_statistics: bool,
    seed: u64,
}

impl Digitizer {

    pub fn new(mean_light_yield: LightYield, photon_statistics: bool, seed: u64) -> Result<Self, ConfigError> {
        if !(mean_light_yield >= 0.0 && mean_light_yield.is_finite()) {
            return Err(ConfigError::BadLightYield(mean_light_yield))
        }
        Ok(Self { mean_light_yield, photon_statistics, seed })
    }

    pub fn mean_light_yield (&self) -> LightYield { self.mean_light_yield }
    pub fn photon_statistics(&self) -> bool       { self.photon_statistics }

    /// Expected number of photons, truncated towards zero
    pub fn mean_photons(&self, energy: Energy) -> Adc {
        (energy * self.mean_light_yield * MEV_PER_GEV).trunc()
    }

    /// Number of photons produced by `energy`.
    ///
    /// With photon statistics, positive means are replaced by a Poisson draw.
    /// Zero, negative (geantino) and non-finite means pass through untouched.
    pub fn photons(&self, energy: Energy, rng: &mut impl Rng) -> Adc {
        let mean = self.mean_photons(energy);
        if !self.photon_statistics || !mean.is_finite() { return mean }
        match Poisson::new(mean) {
            Ok(poisson) => poisson.sample(rng),
            Err(_) => mean,
        }
    }

    /// Random stream for one event: reproducible, and independent of the
    /// order in which events are processed
    pub fn event_rng(&self, event: EventId) -> StdRng {
        StdRng::seed_from_u64(self.seed ^ event.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    pub fn digitize(&self, towers: &TowerContainer, rng: &mut impl Rng) -> TowerContainer {
        towers.iter()
            .map(|&Tower { key, energy }| Tower { key, energy: self.photons(energy, rng) })
            .collect()
    }
}
