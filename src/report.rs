//! Human-readable input and result summaries.

use crate::config::{Config, RunMode};
use crate::simulation::SimulationResults;

const WIDTH: usize = 79;

/// Full-width rule
pub fn border() -> String {
    "=".repeat(WIDTH)
}

/// `s` centered within `width` columns
pub fn center(s: &str, width: usize) -> String {
    format!("{:^width$}", s, width = width)
}

/// Integer with thousands separators, e.g. `15,000,000`
pub fn fancy_int(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn section(title: &str) -> String {
    format!("{}\n{}\n{}\n", border(), center(title, WIDTH), border())
}

/// Summary of the problem about to be run.
pub fn format_inputs(config: &Config) -> String {
    let mut out = section("INPUT SUMMARY");
    if config.mode == RunMode::Verification {
        out.push_str(&format!("Verification Mode:            on (seed {})\n", config.seed));
    }
    out.push_str(&format!("H-M Benchmark Size:           {}\n", config.profile));
    out.push_str(&format!(
        "Total Nuclides:               {}\n",
        fancy_int(config.n_isotopes as u64)
    ));
    out.push_str(&format!(
        "Gridpoints (per Nuclide):     {}\n",
        fancy_int(config.n_gridpoints as u64)
    ));
    out.push_str(&format!(
        "Unionized Energy Gridpoints:  {}\n",
        fancy_int(config.total_gridpoints() as u64)
    ));
    out.push_str(&format!(
        "XS Lookups:                   {}\n",
        fancy_int(config.lookups as u64)
    ));
    out.push_str(&format!("Threads:                      {}\n", config.threads));
    out.push_str(&format!(
        "Est. Memory Usage (MB):       {}\n",
        fancy_int(config.estimated_memory_bytes() / 1024 / 1024)
    ));
    out
}

/// Timing, throughput and checksum of a finished run.
pub fn format_results(results: &SimulationResults) -> String {
    let mut out = section("RESULTS");
    out.push_str(&format!("Threads:     {}\n", results.threads));
    out.push_str(&format!("Runtime:     {:.3} seconds\n", results.elapsed_secs));
    out.push_str(&format!(
        "Lookups:     {}\n",
        fancy_int(results.lookups as u64)
    ));
    out.push_str(&format!(
        "Lookups/s:   {}\n",
        fancy_int(results.lookups_per_second.round() as u64)
    ));
    if let Some(checksum) = results.checksum {
        out.push_str(&format!("Verification checksum: {}\n", checksum));
    }
    out.push_str(&border());
    out.push('\n');
    out
}

pub fn print_inputs(config: &Config) {
    print!("{}", format_inputs(config));
}

pub fn print_results(results: &SimulationResults) {
    print!("{}", format_results(results));
}
