//! xsbench: macroscopic cross-section lookup benchmark
//!
//! Usage:
//!   xsbench -s large -t 16 -l 15000000
//!   xsbench --verify --seed 26 -g 2000 -l 100000
//!   xsbench -s small --dump grids.bin
//!   xsbench -s small --read grids.bin

use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;
use xsbench::{grid_cache, report, Config, MaterialProfile, Result, RunMode, Simulation};

#[derive(Parser, Debug)]
#[command(name = "xsbench")]
#[command(about = "Monte Carlo macroscopic cross-section lookup benchmark")]
struct Args {
    /// Worker threads (default: all available CPUs)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Problem size: small (68 isotopes) or large (355 isotopes)
    #[arg(short = 's', long = "size", value_parser = parse_profile)]
    profile: Option<MaterialProfile>,

    /// Gridpoints per isotope
    #[arg(short, long)]
    gridpoints: Option<usize>,

    /// Number of cross-section lookups
    #[arg(short, long)]
    lookups: Option<usize>,

    /// Number of isotopes (at least what the profile needs)
    #[arg(short, long)]
    isotopes: Option<usize>,

    /// Seeded, reproducible run that reports a verification checksum
    #[arg(long)]
    verify: bool,

    /// Master seed for verification runs
    #[arg(long)]
    seed: Option<u64>,

    /// JSON configuration file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Build the grids, write them to this file and exit
    #[arg(long, conflicts_with = "read")]
    dump: Option<PathBuf>,

    /// Read grids written by --dump instead of generating them
    #[arg(long)]
    read: Option<PathBuf>,

    /// Print results as JSON instead of the text summary
    #[arg(long)]
    json: bool,
}

fn parse_profile(s: &str) -> std::result::Result<MaterialProfile, String> {
    s.parse::<MaterialProfile>().map_err(|e| e.to_string())
}

/// Flags win over the JSON file. Switching away from the file's profile resets
/// the isotope count to the new profile's unless `-i` is also given.
fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::for_profile(args.profile.unwrap_or(MaterialProfile::Large)),
    };

    if let Some(profile) = args.profile {
        if args.config.is_some() && profile != config.profile {
            config.n_isotopes = profile.n_isotopes();
        }
        config.profile = profile;
    }
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(gridpoints) = args.gridpoints {
        config.n_gridpoints = gridpoints;
    }
    if let Some(lookups) = args.lookups {
        config.lookups = lookups;
    }
    if let Some(isotopes) = args.isotopes {
        config.n_isotopes = isotopes;
    }
    if args.verify {
        config.mode = RunMode::Verification;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    config.validate_for_profile()?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;

    if !args.json {
        report::print_inputs(&config);
    }

    let mut simulation = match &args.read {
        Some(path) => {
            let (nuclides, grid) = grid_cache::load(path, config.n_isotopes, config.n_gridpoints)?;
            Simulation::with_cached_grids(config, nuclides, grid)?
        }
        None => Simulation::new(config)?,
    };

    if let Some(path) = &args.dump {
        let data = simulation.data();
        grid_cache::dump(path, data.nuclides(), data.grid())?;
        if !args.json {
            println!("Grid cache written to {}", path.display());
        }
        return Ok(());
    }

    let results = simulation.run()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        report::print_results(&results);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("xsbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_defaults_to_large_profile() {
        let config = build_config(&parse(&["--verify", "--seed", "9", "-i", "400"])).unwrap();
        assert_eq!(config.profile, MaterialProfile::Large);
        assert_eq!(config.n_isotopes, 400);
        assert_eq!(config.mode, RunMode::Verification);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn test_cli_flags_override_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"profile": "small", "lookups": 1000, "n_gridpoints": 50}"#).unwrap();
        let path = path.to_string_lossy().into_owned();

        let config = build_config(&parse(&["--config", &path, "-l", "5"])).unwrap();
        assert_eq!(config.profile, MaterialProfile::Small);
        assert_eq!(config.n_isotopes, 68);
        assert_eq!(config.n_gridpoints, 50);
        assert_eq!(config.lookups, 5);

        // switching profile resets the isotope count to the new profile's
        let config = build_config(&parse(&["--config", &path, "-s", "large"])).unwrap();
        assert_eq!(config.profile, MaterialProfile::Large);
        assert_eq!(config.n_isotopes, 355);
        assert_eq!(config.lookups, 1000);
    }

    #[test]
    fn test_cli_rejects_too_few_isotopes() {
        assert!(build_config(&parse(&["-s", "large", "-i", "10"])).is_err());
        assert!(Args::try_parse_from(["xsbench", "--dump", "a", "--read", "b"]).is_err());
    }
}
