//! Binary cache of the nuclide tables and the unionized grid.
//!
//! Building the double index dominates setup time for large problems, so the
//! sorted tables and the finished unionized grid can be written once and read
//! back by later runs. Materials are never cached.

use crate::error::{Result, XsError};
use crate::nuclide::NuclideGrids;
use crate::unionized::UnionizedGrid;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Bumped whenever the cached layout changes
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheHeader {
    version: u32,
    n_isotopes: usize,
    n_gridpoints: usize,
}

#[derive(Serialize)]
struct CacheRef<'a> {
    header: CacheHeader,
    nuclides: &'a NuclideGrids,
    grid: &'a UnionizedGrid,
}

#[derive(Deserialize)]
struct CacheOwned {
    header: CacheHeader,
    nuclides: NuclideGrids,
    grid: UnionizedGrid,
}

/// Write sorted tables and their unionized grid to `path`.
pub fn dump(path: impl AsRef<Path>, nuclides: &NuclideGrids, grid: &UnionizedGrid) -> Result<()> {
    let path = path.as_ref();
    let cache = CacheRef {
        header: CacheHeader {
            version: CACHE_VERSION,
            n_isotopes: nuclides.n_isotopes(),
            n_gridpoints: nuclides.n_gridpoints(),
        },
        nuclides,
        grid,
    };
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, &cache)?;
    writer.flush()?;
    info!(
        "Wrote grid cache {} ({} x {} gridpoints)",
        path.display(),
        nuclides.n_isotopes(),
        nuclides.n_gridpoints()
    );
    Ok(())
}

/// Read a cache written by [`dump`], requiring the given dimensions.
pub fn load(
    path: impl AsRef<Path>,
    n_isotopes: usize,
    n_gridpoints: usize,
) -> Result<(NuclideGrids, UnionizedGrid)> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let cache: CacheOwned = bincode::deserialize_from(reader)?;

    if cache.header.version != CACHE_VERSION {
        return Err(XsError::config(format!(
            "grid cache {} has version {}, expected {}",
            path.display(),
            cache.header.version,
            CACHE_VERSION
        )));
    }
    if cache.header.n_isotopes != n_isotopes || cache.header.n_gridpoints != n_gridpoints {
        return Err(XsError::CacheMismatch {
            expected_isotopes: n_isotopes,
            expected_gridpoints: n_gridpoints,
            found_isotopes: cache.header.n_isotopes,
            found_gridpoints: cache.header.n_gridpoints,
        });
    }
    if cache.nuclides.n_isotopes() != n_isotopes
        || cache.nuclides.n_gridpoints() != n_gridpoints
        || cache.grid.n_isotopes() != n_isotopes
    {
        return Err(XsError::config(format!(
            "grid cache {} header says {} x {} but holds {} x {} grids",
            path.display(),
            n_isotopes,
            n_gridpoints,
            cache.nuclides.n_isotopes(),
            cache.nuclides.n_gridpoints()
        )));
    }
    if !cache.nuclides.is_sorted() || !cache.grid.is_consistent_with(&cache.nuclides) {
        return Err(XsError::config(format!(
            "grid cache {} is corrupt",
            path.display()
        )));
    }

    info!("Read grid cache {}", path.display());
    Ok((cache.nuclides, cache.grid))
}
