// Run configuration for the lookup kernel
use crate::error::{Result, XsError};
use crate::material::MaterialProfile;
use crate::nuclide::NuclideGridPoint;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Gridpoints per isotope unless overridden
pub const DEFAULT_GRIDPOINTS: usize = 11303;
/// Lookups per run unless overridden
pub const DEFAULT_LOOKUPS: usize = 15_000_000;
/// Seed used by verification runs unless overridden
pub const DEFAULT_SEED: u64 = 26;

/// How random numbers are drawn and whether results are hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Entropy-seeded, per-worker streams; no checksum
    #[default]
    Performance,
    /// Seeded per-lookup streams and a checksum over every result
    Verification,
}

/// Validated, immutable inputs of a run.
///
/// Built with [`Config::for_profile`] (the reference problem sizes) and then
/// adjusted field by field, or read from JSON with [`Config::from_json_file`].
/// Fields missing from JSON take the defaults of the file's profile (small
/// when the profile is missing too).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct Config {
    /// Worker threads in the lookup pool
    pub threads: usize,
    pub n_isotopes: usize,
    pub n_gridpoints: usize,
    pub lookups: usize,
    pub profile: MaterialProfile,
    pub mode: RunMode,
    /// Master seed; only consulted in verification mode
    pub seed: u64,
}

impl Config {
    /// Reference problem for a profile: its isotope count, 11303 gridpoints
    /// per isotope, 15 million lookups on every available core.
    pub fn for_profile(profile: MaterialProfile) -> Self {
        Config {
            threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            n_isotopes: profile.n_isotopes(),
            n_gridpoints: DEFAULT_GRIDPOINTS,
            lookups: DEFAULT_LOOKUPS,
            profile,
            mode: RunMode::Performance,
            seed: DEFAULT_SEED,
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate_for_profile()?;
        Ok(config)
    }

    /// Reject inputs the lookup kernel cannot run with. Nothing is clamped.
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(XsError::config("thread count must be greater than zero"));
        }
        if self.n_isotopes == 0 {
            return Err(XsError::config("number of isotopes must be greater than zero"));
        }
        if self.n_gridpoints == 0 {
            return Err(XsError::config("number of gridpoints must be greater than zero"));
        }
        if u32::try_from(self.n_gridpoints).is_err() {
            return Err(XsError::config(format!(
                "{} gridpoints per isotope exceed the index range",
                self.n_gridpoints
            )));
        }
        if self.n_isotopes.checked_mul(self.n_gridpoints).is_none() {
            return Err(XsError::config("grid dimensions overflow"));
        }
        Ok(())
    }

    /// [`Config::validate`] plus the isotope count the built-in material
    /// profile references. Custom material tables skip this check.
    pub fn validate_for_profile(&self) -> Result<()> {
        self.validate()?;
        if self.n_isotopes < self.profile.n_isotopes() {
            return Err(XsError::config(format!(
                "the {} material profile needs at least {} isotopes, got {}",
                self.profile,
                self.profile.n_isotopes(),
                self.n_isotopes
            )));
        }
        Ok(())
    }

    pub fn is_verification(&self) -> bool {
        self.mode == RunMode::Verification
    }

    /// Unionized grid size
    pub fn total_gridpoints(&self) -> usize {
        self.n_isotopes.saturating_mul(self.n_gridpoints)
    }

    /// Bytes held by nuclide tables, unionized energies and index data.
    pub fn estimated_memory_bytes(&self) -> u64 {
        let total = self.total_gridpoints() as u64;
        let nuclide_bytes = total * std::mem::size_of::<NuclideGridPoint>() as u64;
        let energy_bytes = total * std::mem::size_of::<f64>() as u64;
        let index_bytes = total * self.n_isotopes as u64 * std::mem::size_of::<u32>() as u64;
        nuclide_bytes + energy_bytes + index_bytes
    }
}

/// JSON form of [`Config`]; every field optional
#[derive(Deserialize)]
struct ConfigFile {
    threads: Option<usize>,
    n_isotopes: Option<usize>,
    n_gridpoints: Option<usize>,
    lookups: Option<usize>,
    profile: Option<MaterialProfile>,
    mode: Option<RunMode>,
    seed: Option<u64>,
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        let base = Config::for_profile(file.profile.unwrap_or(MaterialProfile::Small));
        Config {
            threads: file.threads.unwrap_or(base.threads),
            n_isotopes: file.n_isotopes.unwrap_or(base.n_isotopes),
            n_gridpoints: file.n_gridpoints.unwrap_or(base.n_gridpoints),
            lookups: file.lookups.unwrap_or(base.lookups),
            mode: file.mode.unwrap_or(base.mode),
            seed: file.seed.unwrap_or(base.seed),
            ..base
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(MaterialProfile::Small)
    }
}
