//! Macroscopic cross-section evaluation over the unionized grid.

use crate::error::{Result, XsError};
use crate::fast_rng::FastRng;
use crate::material::{MaterialProfile, MaterialTable};
use crate::nuclide::{NuclideGrids, NUM_CHANNELS};
use crate::unionized::UnionizedGrid;
use crate::utilities::interpolate_xs;
use log::info;

/// Everything a lookup reads: sorted nuclide tables, the double-indexed
/// unionized grid and the materials. Immutable once built, so it is shared
/// by plain reference across lookup threads.
#[derive(Debug, Clone)]
pub struct CrossSectionData {
    nuclides: NuclideGrids,
    grid: UnionizedGrid,
    materials: MaterialTable,
}

impl CrossSectionData {
    /// Generate, sort and unionize grids, then load the profile's materials.
    ///
    /// Grids draw from `rng` first, concentrations after.
    pub fn generate(
        n_isotopes: usize,
        n_gridpoints: usize,
        profile: MaterialProfile,
        rng: &mut FastRng,
    ) -> Result<Self> {
        info!("Generating nuclide energy grids...");
        let mut nuclides = NuclideGrids::generate(n_isotopes, n_gridpoints, rng)?;

        info!("Sorting nuclide energy grids...");
        nuclides.sort();

        info!("Generating unionized energy grid...");
        let grid = UnionizedGrid::build(&nuclides)?;

        info!("Loading materials...");
        let materials = MaterialTable::load_profile(profile, n_isotopes, rng)?;

        Self::from_parts(nuclides, grid, materials)
    }

    /// Assemble from prebuilt pieces, e.g. grids read from a cache.
    pub fn from_parts(
        nuclides: NuclideGrids,
        grid: UnionizedGrid,
        materials: MaterialTable,
    ) -> Result<Self> {
        if !nuclides.is_sorted() {
            return Err(XsError::config("nuclide tables are not sorted by energy"));
        }
        if !grid.is_consistent_with(&nuclides) {
            return Err(XsError::config(
                "unionized grid does not match the nuclide tables",
            ));
        }
        materials.validate(nuclides.n_isotopes())?;
        Ok(Self {
            nuclides,
            grid,
            materials,
        })
    }

    /// Sort, unionize and pair prebuilt tables with a material table.
    pub fn from_tables(mut nuclides: NuclideGrids, materials: MaterialTable) -> Result<Self> {
        nuclides.sort();
        let grid = UnionizedGrid::build(&nuclides)?;
        Self::from_parts(nuclides, grid, materials)
    }

    /// Interpolated cross sections of one isotope at `energy`, starting from
    /// unionized grid point `idx`.
    #[inline]
    pub fn calculate_micro_xs(&self, energy: f64, nuclide: usize, idx: usize) -> [f64; NUM_CHANNELS] {
        let table = self.nuclides.table(nuclide);
        let j = self.grid.indices(idx)[nuclide] as usize;
        let hi = (j + 1).min(table.len() - 1);
        interpolate_xs(&table[j], &table[hi], energy)
    }

    /// Concentration-weighted sum of micro cross sections over the isotopes
    /// of `material_id`.
    ///
    /// Any finite energy is accepted; energies outside the grid take the
    /// boundary values. Panics if `material_id` is not in the table.
    #[inline]
    pub fn calculate_macro_xs(&self, energy: f64, material_id: usize) -> [f64; NUM_CHANNELS] {
        let idx = self.grid.grid_search(energy);
        let mut macro_xs = [0.0; NUM_CHANNELS];

        for (nuclide, conc) in self.materials.get(material_id).composition() {
            let micro_xs = self.calculate_micro_xs(energy, nuclide, idx);
            for (total, micro) in macro_xs.iter_mut().zip(micro_xs) {
                *total += micro * conc;
            }
        }
        macro_xs
    }

    pub fn nuclides(&self) -> &NuclideGrids {
        &self.nuclides
    }

    pub fn grid(&self) -> &UnionizedGrid {
        &self.grid
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Give up the grids, keeping nothing else.
    pub fn into_grids(self) -> (NuclideGrids, UnionizedGrid) {
        (self.nuclides, self.grid)
    }
}
