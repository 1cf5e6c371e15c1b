// Structural properties of sorted tables, the unionized grid and lookups over it

use approx::assert_relative_eq;
use xsbench::{
    CrossSectionData, FastRng, Material, MaterialProfile, MaterialTable, NuclideGrids,
    UnionizedGrid, NUM_CHANNELS,
};

fn built(n_isotopes: usize, n_gridpoints: usize, seed: u64) -> (NuclideGrids, UnionizedGrid) {
    let mut grids = NuclideGrids::generate(n_isotopes, n_gridpoints, &mut FastRng::new(seed)).unwrap();
    grids.sort();
    let grid = UnionizedGrid::build(&grids).unwrap();
    (grids, grid)
}

/// One material per isotope, concentration 1, plus one holding every isotope
fn per_isotope_materials(n_isotopes: usize) -> MaterialTable {
    let mut materials: Vec<Material> = (0..n_isotopes)
        .map(|k| Material::new(k, vec![k], vec![1.0]).unwrap())
        .collect();
    materials.push(
        Material::new(
            n_isotopes,
            (0..n_isotopes).collect(),
            (0..n_isotopes).map(|k| 1.0 + k as f64).collect(),
        )
        .unwrap(),
    );
    let weights = vec![1.0; n_isotopes + 1];
    MaterialTable::new(materials, &weights).unwrap()
}

#[test]
fn test_sorted_tables_and_grid_size() {
    for seed in [1, 2, 3] {
        let (grids, grid) = built(6, 100, seed);
        assert!(grids.tables().all(|t| t.windows(2).all(|w| w[0].energy <= w[1].energy)));
        assert_eq!(grid.len(), 6 * 100);
        assert!(grid.energies().windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn test_every_index_is_greatest_at_or_below() {
    let (grids, grid) = built(5, 80, 17);
    for (g, &energy) in grid.energies().iter().enumerate() {
        for (k, &j) in grid.indices(g).iter().enumerate() {
            let table = grids.table(k);
            let j = j as usize;
            let expected = table.iter().rposition(|p| p.energy <= energy).unwrap_or(0);
            assert_eq!(j, expected, "grid point {} isotope {}", g, k);
        }
    }
}

#[test]
fn test_lookup_exact_at_tabulated_energies() {
    let (grids, grid) = built(4, 60, 8);
    let data = CrossSectionData::from_parts(grids, grid, per_isotope_materials(4)).unwrap();
    for k in 0..4 {
        for point in data.nuclides().table(k) {
            let macro_xs = data.calculate_macro_xs(point.energy, k);
            assert_eq!(macro_xs, point.xs, "isotope {} at {}", k, point.energy);
        }
    }
}

#[test]
fn test_lookup_clamps_outside_grid() {
    let (grids, grid) = built(3, 40, 21);
    let (lowest, highest) = grid.energy_bounds().unwrap();
    let data = CrossSectionData::from_parts(grids, grid, per_isotope_materials(3)).unwrap();
    let mixed = 3;

    assert_eq!(data.calculate_macro_xs(lowest - 1.0, mixed), data.calculate_macro_xs(lowest, mixed));
    assert_eq!(data.calculate_macro_xs(highest + 1.0, mixed), data.calculate_macro_xs(highest, mixed));

    // above the grid every isotope contributes its last row
    let above = data.calculate_macro_xs(highest + 1.0, mixed);
    for c in 0..NUM_CHANNELS {
        let expected: f64 = data
            .materials()
            .get(mixed)
            .composition()
            .map(|(k, conc)| data.nuclides().table(k).last().unwrap().xs[c] * conc)
            .sum();
        assert_relative_eq!(above[c], expected, epsilon = 1e-12);
    }

    // below the grid every isotope contributes its first row
    let below = data.calculate_macro_xs(lowest - 1.0, mixed);
    for c in 0..NUM_CHANNELS {
        let expected: f64 = data
            .materials()
            .get(mixed)
            .composition()
            .map(|(k, conc)| data.nuclides().table(k)[0].xs[c] * conc)
            .sum();
        assert_relative_eq!(below[c], expected, epsilon = 1e-12);
    }
}

#[test]
fn test_concentration_weighted_sum_between_gridpoints() {
    let (grids, grid) = built(2, 10, 5);
    let materials = MaterialTable::new(
        vec![
            Material::new(0, vec![0, 1], vec![2.0, 1.0]).unwrap(),
            Material::new(1, vec![0], vec![1.0]).unwrap(),
            Material::new(2, vec![1], vec![1.0]).unwrap(),
        ],
        &[1.0, 1.0, 1.0],
    )
    .unwrap();
    let data = CrossSectionData::from_parts(grids, grid, materials).unwrap();

    let energies = data.grid().energies().to_vec();
    for w in energies.windows(2) {
        let energy = 0.5 * (w[0] + w[1]);
        let mixed = data.calculate_macro_xs(energy, 0);
        let a = data.calculate_macro_xs(energy, 1);
        let b = data.calculate_macro_xs(energy, 2);
        for c in 0..NUM_CHANNELS {
            assert_relative_eq!(mixed[c], 2.0 * a[c] + 1.0 * b[c], epsilon = 1e-12);
        }
    }
}

#[test]
fn test_interpolated_values_stay_within_bracketing_rows() {
    let (grids, grid) = built(3, 50, 99);
    let data = CrossSectionData::from_parts(grids, grid, per_isotope_materials(3)).unwrap();
    let mut rng = FastRng::new(3);
    for _ in 0..2000 {
        let energy = rng.random();
        for k in 0..3 {
            let xs = data.calculate_macro_xs(energy, k);
            let table = data.nuclides().table(k);
            let (lo, hi) = (table.first().unwrap(), table.last().unwrap());
            assert!(xs.iter().all(|v| v.is_finite()));
            if energy > lo.energy && energy < hi.energy {
                let j = table.iter().rposition(|p| p.energy <= energy).unwrap();
                for c in 0..NUM_CHANNELS {
                    let (a, b) = (table[j].xs[c], table[j + 1].xs[c]);
                    assert!(xs[c] >= a.min(b) - 1e-12 && xs[c] <= a.max(b) + 1e-12);
                }
            }
        }
    }
}

#[test]
fn test_profile_data_rejects_small_isotope_counts() {
    let result = CrossSectionData::generate(10, 5, MaterialProfile::Small, &mut FastRng::new(1));
    assert!(result.is_err());
}
