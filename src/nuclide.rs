//! Per-isotope tabulated cross sections.
//!
//! Every isotope owns `n_gridpoints` synthetic samples of five reaction
//! channels. The tables for all isotopes live in one flat arena, isotope `k`
//! occupying the row `k * n_gridpoints .. (k + 1) * n_gridpoints`.

use crate::error::{Result, XsError};
use crate::fast_rng::FastRng;
use log::debug;
use serde::{Deserialize, Serialize};

/// Reaction channels carried per grid point, in the order total, elastic,
/// absorption, fission, nu-fission
pub const NUM_CHANNELS: usize = 5;

/// Lower edge of the synthetic energy domain
pub const MIN_ENERGY: f64 = 0.0;
/// Upper edge (exclusive) of the synthetic energy domain
pub const MAX_ENERGY: f64 = 1.0;

/// One tabulated sample of one isotope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NuclideGridPoint {
    pub energy: f64,
    /// total, elastic scatter, absorption, fission, nu-fission
    pub xs: [f64; NUM_CHANNELS],
}

/// Tabulated cross sections of all isotopes.
///
/// Deserialized data goes through the same shape check as
/// [`NuclideGrids::from_tables`], so a decoded value always holds
/// `n_isotopes * n_gridpoints` points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNuclideGrids")]
pub struct NuclideGrids {
    n_isotopes: usize,
    n_gridpoints: usize,
    points: Vec<NuclideGridPoint>,
}

/// Wire layout of [`NuclideGrids`] before its shape is checked
#[derive(Deserialize)]
struct RawNuclideGrids {
    n_isotopes: usize,
    n_gridpoints: usize,
    points: Vec<NuclideGridPoint>,
}

impl TryFrom<RawNuclideGrids> for NuclideGrids {
    type Error = XsError;

    fn try_from(raw: RawNuclideGrids) -> Result<Self> {
        if raw.n_isotopes == 0 || raw.n_gridpoints == 0 {
            return Err(XsError::config(format!(
                "nuclide grids need at least one isotope and one gridpoint (got {} x {})",
                raw.n_isotopes, raw.n_gridpoints
            )));
        }
        if raw.n_isotopes.checked_mul(raw.n_gridpoints) != Some(raw.points.len()) {
            return Err(XsError::config(format!(
                "{} x {} nuclide grids hold {} points",
                raw.n_isotopes,
                raw.n_gridpoints,
                raw.points.len()
            )));
        }
        Ok(Self {
            n_isotopes: raw.n_isotopes,
            n_gridpoints: raw.n_gridpoints,
            points: raw.points,
        })
    }
}

impl NuclideGrids {
    /// Fill `n_isotopes` tables of `n_gridpoints` random samples.
    ///
    /// Draws go isotope by isotope, point by point: one energy, then the five
    /// channels, all uniform in `[0, 1)` (energies scaled onto
    /// `[MIN_ENERGY, MAX_ENERGY)`). Tables come out unsorted.
    pub fn generate(n_isotopes: usize, n_gridpoints: usize, rng: &mut FastRng) -> Result<Self> {
        if n_isotopes == 0 || n_gridpoints == 0 {
            return Err(XsError::config(format!(
                "nuclide grids need at least one isotope and one gridpoint (got {} x {})",
                n_isotopes, n_gridpoints
            )));
        }
        let total = n_isotopes
            .checked_mul(n_gridpoints)
            .ok_or_else(|| XsError::allocation::<NuclideGridPoint>("nuclide grids", usize::MAX))?;

        let mut points = Vec::new();
        points
            .try_reserve_exact(total)
            .map_err(|_| XsError::allocation::<NuclideGridPoint>("nuclide grids", total))?;

        for _ in 0..total {
            let energy = MIN_ENERGY + (MAX_ENERGY - MIN_ENERGY) * rng.random();
            let mut xs = [0.0; NUM_CHANNELS];
            for v in xs.iter_mut() {
                *v = rng.random();
            }
            points.push(NuclideGridPoint { energy, xs });
        }

        debug!(
            "Generated {} x {} nuclide grid points",
            n_isotopes, n_gridpoints
        );
        Ok(Self {
            n_isotopes,
            n_gridpoints,
            points,
        })
    }

    /// Build from explicit tables, one `Vec` per isotope, all the same length.
    pub fn from_tables(tables: Vec<Vec<NuclideGridPoint>>) -> Result<Self> {
        let n_isotopes = tables.len();
        let n_gridpoints = tables.first().map_or(0, Vec::len);
        if n_isotopes == 0 || n_gridpoints == 0 {
            return Err(XsError::config("nuclide tables must not be empty"));
        }
        if let Some(k) = tables.iter().position(|t| t.len() != n_gridpoints) {
            return Err(XsError::config(format!(
                "isotope {} has {} gridpoints, expected {}",
                k,
                tables[k].len(),
                n_gridpoints
            )));
        }
        Ok(Self {
            n_isotopes,
            n_gridpoints,
            points: tables.into_iter().flatten().collect(),
        })
    }

    /// Sort every isotope's table by increasing energy. Ties may land in any
    /// order.
    pub fn sort(&mut self) {
        for table in self.points.chunks_exact_mut(self.n_gridpoints) {
            table.sort_unstable_by(|a, b| a.energy.total_cmp(&b.energy));
        }
    }

    /// Whether every table is non-decreasing in energy
    pub fn is_sorted(&self) -> bool {
        self.points
            .chunks_exact(self.n_gridpoints)
            .all(|t| t.windows(2).all(|w| w[0].energy <= w[1].energy))
    }

    pub fn n_isotopes(&self) -> usize {
        self.n_isotopes
    }

    pub fn n_gridpoints(&self) -> usize {
        self.n_gridpoints
    }

    /// Table of isotope `nuclide`
    #[inline]
    pub fn table(&self, nuclide: usize) -> &[NuclideGridPoint] {
        let start = nuclide * self.n_gridpoints;
        &self.points[start..start + self.n_gridpoints]
    }

    pub fn tables(&self) -> impl Iterator<Item = &[NuclideGridPoint]> {
        self.points.chunks_exact(self.n_gridpoints)
    }

    /// All points, isotope-major
    pub fn points(&self) -> &[NuclideGridPoint] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_dimensions_and_ranges() {
        let mut rng = FastRng::new(26);
        let grids = NuclideGrids::generate(3, 50, &mut rng).unwrap();
        assert_eq!(grids.n_isotopes(), 3);
        assert_eq!(grids.n_gridpoints(), 50);
        assert_eq!(grids.points().len(), 150);
        for p in grids.points() {
            assert!(p.energy >= MIN_ENERGY && p.energy < MAX_ENERGY);
            assert!(p.xs.iter().all(|&v| (0.0..1.0).contains(&v)));
        }
    }

    #[test]
    fn test_generate_same_seed_same_tables() {
        let a = NuclideGrids::generate(2, 10, &mut FastRng::new(5)).unwrap();
        let b = NuclideGrids::generate(2, 10, &mut FastRng::new(5)).unwrap();
        let c = NuclideGrids::generate(2, 10, &mut FastRng::new(6)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generate_rejects_empty() {
        let mut rng = FastRng::new(1);
        assert!(matches!(
            NuclideGrids::generate(0, 10, &mut rng),
            Err(XsError::InvalidConfig(_))
        ));
        assert!(NuclideGrids::generate(4, 0, &mut rng).is_err());
    }

    #[test]
    fn test_sort_orders_each_table() {
        let mut grids = NuclideGrids::generate(4, 200, &mut FastRng::new(11)).unwrap();
        assert!(!grids.is_sorted());
        grids.sort();
        assert!(grids.is_sorted());
        for table in grids.tables() {
            for w in table.windows(2) {
                assert!(w[0].energy <= w[1].energy);
            }
        }
    }

    #[test]
    fn test_sort_keeps_rows_separate() {
        let mut grids = NuclideGrids::generate(2, 30, &mut FastRng::new(3)).unwrap();
        let mut before: Vec<f64> = grids.table(1).iter().map(|p| p.energy).collect();
        grids.sort();
        let after: Vec<f64> = grids.table(1).iter().map(|p| p.energy).collect();
        before.sort_by(f64::total_cmp);
        assert_eq!(before, after);
    }

    #[test]
    fn test_from_tables_rejects_ragged() {
        let p = NuclideGridPoint {
            energy: 0.5,
            xs: [1.0; NUM_CHANNELS],
        };
        assert!(NuclideGrids::from_tables(vec![vec![p, p], vec![p]]).is_err());
        let grids = NuclideGrids::from_tables(vec![vec![p, p], vec![p, p]]).unwrap();
        assert_eq!(grids.n_isotopes(), 2);
        assert_eq!(grids.table(1).len(), 2);
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let grids = NuclideGrids::generate(2, 3, &mut FastRng::new(9)).unwrap();
        let text = serde_json::to_string(&grids).unwrap();
        let back: NuclideGrids = serde_json::from_str(&text).unwrap();
        assert_eq!(back, grids);

        let p = r#"{"energy":0.5,"xs":[1.0,1.0,1.0,1.0,1.0]}"#;
        let short = format!(r#"{{"n_isotopes":2,"n_gridpoints":4,"points":[{p},{p},{p},{p}]}}"#);
        assert!(serde_json::from_str::<NuclideGrids>(&short).is_err());
        let empty = r#"{"n_isotopes":2,"n_gridpoints":0,"points":[]}"#;
        assert!(serde_json::from_str::<NuclideGrids>(empty).is_err());
    }
}
