//! Parallel lookup driver.
//!
//! A [`Simulation`] owns the cross-section data and runs the randomized
//! lookup loop once on a dedicated rayon pool:
//!
//! ```text
//! Init ──run()──▶ Running ──▶ Done
//! ```

use crate::config::{Config, RunMode};
use crate::error::{Result, XsError};
use crate::fast_rng::{future_seed, FastRng};
use crate::material::{MaterialProfile, MaterialTable};
use crate::nuclide::{NuclideGrids, NUM_CHANNELS};
use crate::sampling::{lookup_digest, sample_lookup, trial_rng, worker_rng, RngPolicy};
use crate::unionized::UnionizedGrid;
use crate::xs::CrossSectionData;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    /// Data built and validated, timer not started
    Init,
    Running,
    Done,
}

/// Outcome of a completed lookup loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub threads: usize,
    pub n_isotopes: usize,
    pub n_gridpoints: usize,
    pub lookups: usize,
    pub profile: MaterialProfile,
    pub mode: RunMode,
    /// Wall time of the lookup loop only
    pub elapsed_secs: f64,
    pub lookups_per_second: f64,
    /// Sum of per-lookup digests, verification mode only
    pub checksum: Option<u64>,
}

pub struct Simulation {
    config: Config,
    data: CrossSectionData,
    policy: RngPolicy,
    phase: SimulationPhase,
}

impl Simulation {
    /// Validate `config`, then generate grids and load the profile's
    /// materials.
    ///
    /// Verification runs seed the setup stream with `config.seed`; performance
    /// runs seed it from entropy.
    pub fn new(config: Config) -> Result<Self> {
        config.validate_for_profile()?;
        let mut rng = FastRng::new(setup_seed(&config));
        let data = CrossSectionData::generate(
            config.n_isotopes,
            config.n_gridpoints,
            config.profile,
            &mut rng,
        )?;
        Self::from_data(config, data)
    }

    /// Like [`Simulation::new`], but with grids read from a cache.
    ///
    /// The setup stream is skipped past the draws grid generation would have
    /// made, so concentrations (and the verification checksum) match a run
    /// that generated the same grids.
    pub fn with_cached_grids(
        config: Config,
        nuclides: NuclideGrids,
        grid: UnionizedGrid,
    ) -> Result<Self> {
        config.validate_for_profile()?;
        let skipped = (config.total_gridpoints() * (1 + NUM_CHANNELS)) as u64;
        let mut rng = FastRng::new(future_seed(skipped, setup_seed(&config)));
        info!("Loading materials...");
        let materials = MaterialTable::load_profile(config.profile, config.n_isotopes, &mut rng)?;
        let data = CrossSectionData::from_parts(nuclides, grid, materials)?;
        Self::from_data(config, data)
    }

    /// Drive prebuilt data (cached grids, custom material tables).
    pub fn from_data(config: Config, data: CrossSectionData) -> Result<Self> {
        config.validate()?;
        let nuclides = data.nuclides();
        if nuclides.n_isotopes() != config.n_isotopes || nuclides.n_gridpoints() != config.n_gridpoints {
            return Err(XsError::config(format!(
                "data holds {} isotopes x {} gridpoints but the configuration asks for {} x {}",
                nuclides.n_isotopes(),
                nuclides.n_gridpoints(),
                config.n_isotopes,
                config.n_gridpoints
            )));
        }
        let policy = RngPolicy::for_config(&config);
        Ok(Self {
            config,
            data,
            policy,
            phase: SimulationPhase::Init,
        })
    }

    /// Replace the sampling policy chosen from the run mode.
    pub fn with_policy(mut self, policy: RngPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn data(&self) -> &CrossSectionData {
        &self.data
    }

    pub fn policy(&self) -> RngPolicy {
        self.policy
    }

    /// Run every lookup and report timing and, in verification mode, the
    /// checksum. A simulation runs once.
    pub fn run(&mut self) -> Result<SimulationResults> {
        if self.phase != SimulationPhase::Init {
            return Err(XsError::InvalidState(format!(
                "simulation already {:?}",
                self.phase
            )));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()?;

        info!(
            "Running {} lookups on {} threads ({:?} mode)",
            self.config.lookups, self.config.threads, self.config.mode
        );
        if self.config.lookups == 0 {
            warn!("No lookups requested");
        }
        self.phase = SimulationPhase::Running;

        let checksum = AtomicU64::new(0);
        let hashing = self.config.is_verification();
        let start = Instant::now();
        pool.install(|| self.lookup_loop(hashing.then_some(&checksum)));
        let elapsed_secs = start.elapsed().as_secs_f64();

        self.phase = SimulationPhase::Done;
        let lookups_per_second = if elapsed_secs > 0.0 {
            self.config.lookups as f64 / elapsed_secs
        } else {
            0.0
        };
        let checksum = hashing.then(|| checksum.into_inner());
        info!("Lookups finished in {:.3} s", elapsed_secs);
        if let Some(c) = checksum {
            debug!("Verification checksum: {}", c);
        }

        Ok(SimulationResults {
            threads: self.config.threads,
            n_isotopes: self.config.n_isotopes,
            n_gridpoints: self.config.n_gridpoints,
            lookups: self.config.lookups,
            profile: self.config.profile,
            mode: self.config.mode,
            elapsed_secs,
            lookups_per_second,
            checksum,
        })
    }

    fn lookup_loop(&self, checksum: Option<&AtomicU64>) {
        let data = &self.data;
        let lookups = self.config.lookups as u64;
        let progress = progress_step(lookups);
        match self.policy {
            RngPolicy::PerTrial { base_seed } => {
                (0..lookups)
                    .into_par_iter()
                    .for_each_init(String::new, |buf, trial| {
                        report_progress(trial, lookups, progress);
                        let mut rng = trial_rng(base_seed, trial);
                        lookup(data, &mut rng, buf, checksum);
                    });
            }
            RngPolicy::PerWorker { entropy_seed } => {
                let streams = AtomicU64::new(0);
                (0..lookups).into_par_iter().for_each_init(
                    || {
                        let stream = streams.fetch_add(1, Ordering::Relaxed);
                        (worker_rng(entropy_seed, stream), String::new())
                    },
                    |(rng, buf), trial| {
                        report_progress(trial, lookups, progress);
                        lookup(data, rng, buf, checksum);
                    },
                );
            }
        }
    }
}

/// Lookups between progress messages, about ten per run
fn progress_step(lookups: u64) -> u64 {
    (lookups / 10).max(1)
}

#[inline]
fn report_progress(trial: u64, lookups: u64, step: u64) {
    if trial % step == 0 {
        debug!(
            "Calculating XS's... ({:.0}% completed)",
            100.0 * trial as f64 / lookups as f64
        );
    }
}

/// Seed of the stream that generates grids and concentrations
fn setup_seed(config: &Config) -> u64 {
    match config.mode {
        RunMode::Verification => config.seed,
        RunMode::Performance => rand::random(),
    }
}

#[inline]
fn lookup(data: &CrossSectionData, rng: &mut FastRng, buf: &mut String, checksum: Option<&AtomicU64>) {
    let (energy, material) = sample_lookup(rng, data.materials());
    let xs = data.calculate_macro_xs(energy, material);
    match checksum {
        Some(total) => {
            let digest = lookup_digest(buf, energy, material, &xs);
            total.fetch_add(digest, Ordering::Relaxed);
        }
        None => {
            let _ = std::hint::black_box(xs);
        }
    }
}
