//! Error types for grid construction, material loading and the lookup driver.

use thiserror::Error;

/// Setup failures. Everything here is detected before the parallel lookup
/// phase starts; lookups themselves cannot fail.
#[derive(Error, Debug)]
pub enum XsError {
    /// Zero sizes, unsupported profile/isotope combinations, bad weights
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// A material references an isotope outside `[0, n_isotopes)`
    #[error("Material {material} references isotope {nuclide}, but only {n_isotopes} isotopes exist")]
    MaterialOutOfRange {
        material: usize,
        nuclide: usize,
        n_isotopes: usize,
    },

    /// Storage for a grid arena could not be reserved
    #[error("Failed to allocate {what} ({bytes} bytes)")]
    Allocation { what: &'static str, bytes: usize },

    /// Operation not allowed in the current simulation phase
    #[error("Invalid simulation state: {0}")]
    InvalidState(String),

    /// Grid cache file was built for different dimensions
    #[error("Grid cache holds {found_isotopes} isotopes x {found_gridpoints} gridpoints, expected {expected_isotopes} x {expected_gridpoints}")]
    CacheMismatch {
        expected_isotopes: usize,
        expected_gridpoints: usize,
        found_isotopes: usize,
        found_gridpoints: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Grid cache error: {0}")]
    Cache(#[from] bincode::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl XsError {
    pub fn config(message: impl Into<String>) -> Self {
        XsError::InvalidConfig(message.into())
    }

    /// Allocation failure for `count` elements of `T`.
    pub fn allocation<T>(what: &'static str, count: usize) -> Self {
        XsError::Allocation {
            what,
            bytes: count.saturating_mul(std::mem::size_of::<T>()),
        }
    }
}

pub type Result<T> = std::result::Result<T, XsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = XsError::MaterialOutOfRange {
            material: 3,
            nuclide: 70,
            n_isotopes: 68,
        };
        assert_eq!(
            err.to_string(),
            "Material 3 references isotope 70, but only 68 isotopes exist"
        );

        let err = XsError::allocation::<f64>("unionized energies", 4);
        assert_eq!(err.to_string(), "Failed to allocate unionized energies (32 bytes)");
    }
}
