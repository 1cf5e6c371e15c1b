//! Material compositions and the material sampling distribution.
//!
//! A material is a list of isotope ids with one concentration each. The
//! built-in profiles model twelve regions of a light-water reactor core; a
//! lookup picks one of them with a fixed probability per region.

use crate::error::{Result, XsError};
use crate::fast_rng::FastRng;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which built-in set of materials to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialProfile {
    /// 68 isotopes, 34 of them in the fuel
    Small,
    /// 355 isotopes, 321 of them in the fuel
    Large,
}

impl MaterialProfile {
    /// Number of isotopes the profile's materials draw from
    pub fn n_isotopes(self) -> usize {
        match self {
            MaterialProfile::Small => 68,
            MaterialProfile::Large => 355,
        }
    }

    /// Isotope count of the fuel material
    pub fn fuel_nuclides(self) -> usize {
        match self {
            MaterialProfile::Small => FUEL_SMALL.len(),
            MaterialProfile::Large => FUEL_SMALL.len() + (355 - 68),
        }
    }
}

impl fmt::Display for MaterialProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialProfile::Small => write!(f, "small"),
            MaterialProfile::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for MaterialProfile {
    type Err = XsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(MaterialProfile::Small),
            "large" => Ok(MaterialProfile::Large),
            other => Err(XsError::config(format!(
                "unknown material profile '{}', expected 'small' or 'large'",
                other
            ))),
        }
    }
}

// Isotope ids per reactor region. In the large profile the fuel also holds
// every isotope from 68 upward.
const FUEL_SMALL: &[usize] = &[
    58, 59, 60, 61, 40, 42, 43, 44, 45, 46, 1, 2, 3, 7, 8, 9, 10, 29, 57, 47, 48, 0, 62, 15, 33,
    34, 52, 53, 54, 55, 56, 18, 23, 41,
];
const CLADDING: &[usize] = &[63, 64, 65, 66, 67];
const BORATED_WATER: &[usize] = &[24, 41, 4, 5];
const PRESSURE_VESSEL: &[usize] = &[
    19, 20, 21, 22, 35, 36, 37, 38, 39, 25, 27, 28, 29, 30, 31, 32, 26, 49, 50, 51, 11, 12, 13,
    14, 6, 16, 17,
];
const STRUCTURAL: &[usize] = &[
    24, 41, 4, 5, 19, 20, 21, 22, 35, 36, 37, 38, 39, 25, 49, 50, 51, 11, 12, 13, 14,
];
const ASSEMBLY_END: &[usize] = &[24, 41, 4, 5, 63, 64, 65, 66, 67];

/// Region names and selection weights, in material id order
const REGIONS: [(&str, f64); 12] = [
    ("fuel", 0.140),
    ("cladding", 0.052),
    ("cold borated water", 0.275),
    ("hot borated water", 0.134),
    ("reactor pressure vessel", 0.154),
    ("lower radial reflector", 0.064),
    ("top reflector", 0.066),
    ("bottom plate", 0.055),
    ("bottom nozzle", 0.008),
    ("top nozzle", 0.015),
    ("top of fuel assemblies", 0.025),
    ("bottom of fuel assemblies", 0.013),
];

/// One material: isotope ids with matching concentrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: Option<String>,
    pub material_id: usize,
    pub nuclides: Vec<usize>,
    pub concentrations: Vec<f64>,
}

impl Material {
    pub fn new(material_id: usize, nuclides: Vec<usize>, concentrations: Vec<f64>) -> Result<Self> {
        if nuclides.len() != concentrations.len() {
            return Err(XsError::config(format!(
                "material {} has {} isotopes but {} concentrations",
                material_id,
                nuclides.len(),
                concentrations.len()
            )));
        }
        if let Some(c) = concentrations.iter().find(|c| !c.is_finite() || **c < 0.0) {
            return Err(XsError::config(format!(
                "material {} has invalid concentration {}",
                material_id, c
            )));
        }
        Ok(Material {
            name: None,
            material_id,
            nuclides,
            concentrations,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn num_nuclides(&self) -> usize {
        self.nuclides.len()
    }

    /// (isotope id, concentration) pairs in material order
    pub fn composition(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.nuclides
            .iter()
            .copied()
            .zip(self.concentrations.iter().copied())
    }
}

/// All materials of a run plus the distribution lookups sample them from.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTable {
    materials: Vec<Material>,
    /// Normalized cumulative selection probabilities, last entry exactly 1.0
    cdf: Vec<f64>,
}

impl MaterialTable {
    /// Table from explicit materials and unnormalized selection weights.
    ///
    /// Material ids must equal their position in `materials`.
    pub fn new(materials: Vec<Material>, weights: &[f64]) -> Result<Self> {
        if materials.is_empty() {
            return Err(XsError::config("material table is empty"));
        }
        if weights.len() != materials.len() {
            return Err(XsError::config(format!(
                "{} materials but {} selection weights",
                materials.len(),
                weights.len()
            )));
        }
        if let Some(pos) = materials
            .iter()
            .enumerate()
            .position(|(i, m)| m.material_id != i)
        {
            return Err(XsError::config(format!(
                "material at position {} has id {}",
                pos, materials[pos].material_id
            )));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(XsError::config("selection weights must be finite and non-negative"));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(XsError::config("selection weights sum to zero"));
        }

        let mut running = 0.0;
        let mut cdf: Vec<f64> = weights
            .iter()
            .map(|w| {
                running += w;
                running / total
            })
            .collect();
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }

        Ok(Self { materials, cdf })
    }

    /// Load a built-in profile, drawing every concentration uniform in
    /// `[0, 1)` from `rng`, material by material.
    pub fn load_profile(profile: MaterialProfile, n_isotopes: usize, rng: &mut FastRng) -> Result<Self> {
        if n_isotopes < profile.n_isotopes() {
            return Err(XsError::config(format!(
                "the {} material profile needs {} isotopes, got {}",
                profile,
                profile.n_isotopes(),
                n_isotopes
            )));
        }

        let mut materials = Vec::with_capacity(REGIONS.len());
        let mut weights = Vec::with_capacity(REGIONS.len());
        for (material_id, (name, weight)) in REGIONS.iter().enumerate() {
            let nuclides = region_nuclides(profile, material_id);
            let concentrations = (0..nuclides.len()).map(|_| rng.random()).collect();
            materials.push(Material::new(material_id, nuclides, concentrations)?.with_name(*name));
            weights.push(*weight);
        }

        let table = Self::new(materials, &weights)?;
        table.validate(n_isotopes)?;
        debug!(
            "Loaded {} profile: {} materials, {} isotope entries",
            profile,
            table.len(),
            table.total_nuclides()
        );
        Ok(table)
    }

    /// Every referenced isotope must lie in `[0, n_isotopes)`.
    pub fn validate(&self, n_isotopes: usize) -> Result<()> {
        for m in &self.materials {
            if let Some(&nuclide) = m.nuclides.iter().find(|&&k| k >= n_isotopes) {
                return Err(XsError::MaterialOutOfRange {
                    material: m.material_id,
                    nuclide,
                    n_isotopes,
                });
            }
        }
        Ok(())
    }

    /// Material id selected by one uniform draw in `[0, 1)`.
    #[inline]
    pub fn pick_material(&self, roll: f64) -> usize {
        let i = self.cdf.partition_point(|&c| c <= roll);
        i.min(self.cdf.len() - 1)
    }

    #[inline]
    pub fn get(&self, material_id: usize) -> &Material {
        &self.materials[material_id]
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Sum of isotope counts over all materials
    pub fn total_nuclides(&self) -> usize {
        self.materials.iter().map(Material::num_nuclides).sum()
    }

    /// Selection probability of each material
    pub fn probabilities(&self) -> Vec<f64> {
        let mut previous = 0.0;
        self.cdf
            .iter()
            .map(|&c| {
                let p = c - previous;
                previous = c;
                p
            })
            .collect()
    }
}

fn region_nuclides(profile: MaterialProfile, material_id: usize) -> Vec<usize> {
    match material_id {
        0 => {
            let mut fuel = FUEL_SMALL.to_vec();
            if profile == MaterialProfile::Large {
                fuel.extend(68..MaterialProfile::Large.n_isotopes());
            }
            fuel
        }
        1 => CLADDING.to_vec(),
        2 | 3 => BORATED_WATER.to_vec(),
        4 => PRESSURE_VESSEL.to_vec(),
        5..=9 => STRUCTURAL.to_vec(),
        _ => ASSEMBLY_END.to_vec(),
    }
}
