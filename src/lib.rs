// First, the lookup kernel: grids, unionized grid, materials, evaluation
pub mod error;
pub mod fast_rng;
pub mod material;
pub mod nuclide;
pub mod unionized;
pub mod utilities;
pub mod xs;

// Then the driver and the layers around it
pub mod config;
pub mod grid_cache;
pub mod report;
pub mod sampling;
pub mod simulation;

pub use config::{Config, RunMode};
pub use error::{Result, XsError};
pub use fast_rng::FastRng;
pub use material::{Material, MaterialProfile, MaterialTable};
pub use nuclide::{NuclideGridPoint, NuclideGrids, NUM_CHANNELS};
pub use sampling::RngPolicy;
pub use simulation::{Simulation, SimulationPhase, SimulationResults};
pub use unionized::UnionizedGrid;
pub use utilities::{interpolate_xs, lower_bound_index};
pub use xs::CrossSectionData;
