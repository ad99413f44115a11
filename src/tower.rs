use std::collections::BTreeMap;

use units::todo::Energy;

use crate::LayerId;
use crate::cell::{CellContainer, CellKey};

/// Towers are keyed exactly like the cells they are built from
pub type TowerKey = CellKey;

/// A readout channel: one per fired cell.
///
/// `energy` is in GeV for raw and calibrated towers, and in ADC-like counts
/// for digitized ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tower {
    pub key: TowerKey,
    pub energy: Energy,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TowerContainer {
    towers: BTreeMap<TowerKey, Tower>,
}

impl TowerContainer {

    pub fn new() -> Self { Self::default() }

    /// One raw tower per cell, carrying the cell's energy
    pub fn from_cells(cells: &CellContainer) -> Self {
        cells.iter()
            .map(|cell| Tower { key: cell.key(), energy: cell.edep() })
            .collect()
    }

    /// Add `energy` to the tower at `key`, creating it if necessary
    pub fn add(&mut self, key: TowerKey, energy: Energy) {
        self.towers.entry(key)
            .or_insert(Tower { key, energy: 0.0 })
            .energy += energy;
    }

    pub fn get(&self, key: &TowerKey) -> Option<&Tower> { self.towers.get(key) }

    pub fn len     (&self) -> usize { self.towers.len() }
    pub fn is_empty(&self) -> bool  { self.towers.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &Tower> { self.towers.values() }

    pub fn layer(&self, layer: LayerId) -> impl Iterator<Item = &Tower> {
        self.towers.range(TowerKey::new(layer, 0, 0)..)
            .take_while(move |(k, _)| k.layer == layer)
            .map(|(_, t)| t)
    }

    pub fn total_energy(&self) -> Energy { self.iter().map(|t| t.energy).sum() }

    /// Remove towers with less than `emin`.
    ///
    /// Towers with negative energy mark geantino paths and always survive.
    pub fn compress(&mut self, emin: Energy) {
        self.towers.retain(|_, t| t.energy < 0.0 || t.energy >= emin);
    }
}

impl FromIterator<Tower> for TowerContainer {
    fn from_iter<I: IntoIterator<Item = Tower>>(iter: I) -> Self {
        let mut towers = Self::new();
        for Tower { key, energy } in iter { towers.add(key, energy) }
        towers
    }
}

impl<'a> IntoIterator for &'a TowerContainer {
    type Item = &'a Tower;
    type IntoIter = std::collections::btree_map::Values<'a, TowerKey, Tower>;
    fn into_iter(self) -> Self::IntoIter { self.towers.values() }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};
    use crate::cell::Cell;

    fn key(layer: LayerId, b1: usize, b2: usize) -> TowerKey { TowerKey::new(layer, b1, b2) }

    #[test]
    fn one_tower_per_cell() {
        let mut cells = CellContainer::new();
        for (k, e) in [(key(0, 1, 1), 0.5), (key(0, 2, 1), 1.5), (key(3, 0, 0), -1.0)] {
            let mut cell = Cell::new(k);
            cell.add_edep(1, e, 0.0);
            cells.insert(cell);
        }
        let towers = TowerContainer::from_cells(&cells);
        assert_eq!(towers.len(), cells.len());
        assert_eq!(towers.total_energy(), cells.total_edep());
        assert_eq!(towers.get(&key(0, 2, 1)).map(|t| t.energy), Some(1.5));
        assert_eq!(towers.layer(0).count(), 2);
    }

    #[test]
    fn add_accumulates() {
        let mut towers = TowerContainer::new();
        towers.add(key(1, 2, 3), 0.25);
        towers.add(key(1, 2, 3), 0.5);
        assert_eq!(towers.len(), 1);
        assert_eq!(towers.get(&key(1, 2, 3)).map(|t| t.energy), Some(0.75));
    }

    #[test]
    fn compress_keeps_geantinos() {
        let mut towers: TowerContainer = [
            (key(0, 0, 0),  0.001),
            (key(0, 0, 1),  0.5  ),
            (key(0, 0, 2), -1.0  ),
            (key(0, 0, 3),  0.0  ),
        ].into_iter().map(|(key, energy)| Tower { key, energy }).collect();
        towers.compress(0.01);
        let kept: Vec<_> = towers.iter().map(|t| t.key.bin2).collect();
        assert_eq!(kept, vec![1, 2]);
    }
}
