//! Unionized energy grid with double indexing.
//!
//! All isotope energies are merged into one sorted grid. Each grid point also
//! stores, per isotope, the index of the last table entry at or below its
//! energy, so a lookup needs one binary search over the unionized grid instead
//! of one per isotope.

use crate::error::{Result, XsError};
use crate::nuclide::NuclideGrids;
use crate::utilities::lower_bound_index;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionizedGrid {
    n_isotopes: usize,
    /// Every isotope energy, ascending, duplicates kept
    energies: Vec<f64>,
    /// Row `g` (length `n_isotopes`) holds the per-isotope indices of grid point `g`
    index_data: Vec<u32>,
}

impl UnionizedGrid {
    /// Merge and double-index sorted nuclide tables.
    pub fn build(grids: &NuclideGrids) -> Result<Self> {
        debug_assert!(grids.is_sorted(), "nuclide tables must be sorted before unionizing");

        let n_isotopes = grids.n_isotopes();
        let n_gridpoints = grids.n_gridpoints();
        if u32::try_from(n_gridpoints).is_err() {
            return Err(XsError::config(format!(
                "{} gridpoints per isotope exceed the index range",
                n_gridpoints
            )));
        }

        let n_total = grids.points().len();
        let mut energies = Vec::new();
        energies
            .try_reserve_exact(n_total)
            .map_err(|_| XsError::allocation::<f64>("unionized energies", n_total))?;
        energies.extend(grids.points().iter().map(|p| p.energy));
        energies.sort_unstable_by(f64::total_cmp);

        let n_index = n_total
            .checked_mul(n_isotopes)
            .ok_or_else(|| XsError::allocation::<u32>("unionized index data", usize::MAX))?;
        let mut index_data: Vec<u32> = Vec::new();
        index_data
            .try_reserve_exact(n_index)
            .map_err(|_| XsError::allocation::<u32>("unionized index data", n_index))?;
        index_data.resize(n_index, 0);

        index_data
            .par_chunks_mut(n_isotopes)
            .zip(energies.par_iter())
            .for_each(|(row, &energy)| {
                for (nuclide, slot) in row.iter_mut().enumerate() {
                    let table = grids.table(nuclide);
                    *slot = lower_bound_index(table, energy, |p| p.energy) as u32;
                }
            });

        debug!(
            "Unionized grid: {} points, {} indices per point",
            energies.len(),
            n_isotopes
        );
        Ok(Self {
            n_isotopes,
            energies,
            index_data,
        })
    }

    /// Grid point index to interpolate from: the last point at or below
    /// `energy`, 0 below the grid, and never past the second-to-last point.
    #[inline]
    pub fn grid_search(&self, energy: f64) -> usize {
        let idx = lower_bound_index(&self.energies, energy, |e| *e);
        idx.min(self.energies.len().saturating_sub(2))
    }

    /// Per-isotope table indices stored at grid point `idx`
    #[inline]
    pub fn indices(&self, idx: usize) -> &[u32] {
        let start = idx * self.n_isotopes;
        &self.index_data[start..start + self.n_isotopes]
    }

    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    pub fn n_isotopes(&self) -> usize {
        self.n_isotopes
    }

    /// Lowest and highest energy on the grid
    pub fn energy_bounds(&self) -> Option<(f64, f64)> {
        Some((*self.energies.first()?, *self.energies.last()?))
    }

    /// Structural consistency with `grids`, used after loading a cache.
    pub fn is_consistent_with(&self, grids: &NuclideGrids) -> bool {
        self.n_isotopes == grids.n_isotopes()
            && self.energies.len() == grids.points().len()
            && self.index_data.len() == self.energies.len() * self.n_isotopes
            && self
                .index_data
                .iter()
                .all(|&j| (j as usize) < grids.n_gridpoints())
    }
}
