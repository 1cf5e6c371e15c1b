//! Search and interpolation helpers shared by grid construction and lookups.

use crate::nuclide::{NuclideGridPoint, NUM_CHANNELS};

/// Largest index `i` with `key(items[i]) <= quarry`.
///
/// Returns 0 when `quarry` lies below the first entry (or `items` is empty)
/// and the last index when it lies at or above the last entry. With
/// duplicate keys the last of the run is returned.
#[inline]
pub fn lower_bound_index<T>(items: &[T], quarry: f64, key: impl Fn(&T) -> f64) -> usize {
    let n = items.len();
    if n == 0 || quarry < key(&items[0]) {
        return 0;
    }
    if key(&items[n - 1]) <= quarry {
        return n - 1;
    }

    let mut low = 0usize;
    let mut high = n - 1; // invariant: key(items[low]) <= quarry < key(items[high])
    while high - low > 1 {
        let mid = (low + high) >> 1;
        if key(&items[mid]) <= quarry {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

/// Linear interpolation of all reaction channels between two tabulated points.
///
/// Values outside `[lo.energy, hi.energy]` are held flat, not extrapolated:
/// energies at or below `lo` return `lo`'s values exactly and energies at or
/// above `hi` return `hi`'s. An energy below an isotope's first point or above
/// its last therefore sees that endpoint's values, and a zero-width interval
/// never divides.
#[inline]
pub fn interpolate_xs(
    lo: &NuclideGridPoint,
    hi: &NuclideGridPoint,
    energy: f64,
) -> [f64; NUM_CHANNELS] {
    if energy <= lo.energy {
        return lo.xs;
    }
    if energy >= hi.energy {
        return hi.xs;
    }

    let mut xs = [0.0; NUM_CHANNELS];
    for (c, out) in xs.iter_mut().enumerate() {
        *out = lo.xs[c] + (hi.xs[c] - lo.xs[c]) / (hi.energy - lo.energy) * (energy - lo.energy);
    }
    xs
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn point(energy: f64, value: f64) -> NuclideGridPoint {
        NuclideGridPoint {
            energy,
            xs: [value; NUM_CHANNELS],
        }
    }

    #[test]
    fn test_lower_bound_index_interior_and_edges() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let id = |v: &f64| *v;
        assert_eq!(lower_bound_index(&x, 0.5, id), 0);
        assert_eq!(lower_bound_index(&x, 1.0, id), 0);
        assert_eq!(lower_bound_index(&x, 2.5, id), 1);
        assert_eq!(lower_bound_index(&x, 3.0, id), 2);
        assert_eq!(lower_bound_index(&x, 4.0, id), 3);
        assert_eq!(lower_bound_index(&x, 9.0, id), 3);
        assert_eq!(lower_bound_index::<f64>(&[], 1.0, id), 0);
    }

    #[test]
    fn test_lower_bound_index_duplicates_pick_last() {
        let x = [1.0, 2.0, 2.0, 2.0, 5.0];
        assert_eq!(lower_bound_index(&x, 2.0, |v| *v), 3);
        assert_eq!(lower_bound_index(&x, 1.999, |v| *v), 0);
    }

    #[test]
    fn test_interpolate_xs_midpoint() {
        let lo = point(1.0, 2.0);
        let hi = point(3.0, 6.0);
        let xs = interpolate_xs(&lo, &hi, 2.0);
        for v in xs {
            assert_relative_eq!(v, 4.0);
        }
    }

    #[test]
    fn test_interpolate_xs_endpoints_exact() {
        let lo = point(0.25, 0.1);
        let hi = point(0.75, 0.3);
        assert_eq!(interpolate_xs(&lo, &hi, 0.25), lo.xs);
        assert_eq!(interpolate_xs(&lo, &hi, 0.75), hi.xs);
        assert_eq!(interpolate_xs(&lo, &hi, 0.0), lo.xs);
        assert_eq!(interpolate_xs(&lo, &hi, 1.0), hi.xs);
    }

    #[test]
    fn test_interpolate_xs_holds_flat_outside_interval() {
        // a linear extrapolation would give 1.2 and -0.8 here
        let lo = point(0.4, 0.6);
        let hi = point(0.6, 0.8);
        assert_eq!(interpolate_xs(&lo, &hi, 1.0), [0.8; NUM_CHANNELS]);
        assert_eq!(interpolate_xs(&lo, &hi, -1.0), [0.6; NUM_CHANNELS]);
    }

    #[test]
    fn test_interpolate_xs_zero_width() {
        let lo = point(0.5, 0.7);
        let xs = interpolate_xs(&lo, &lo, 0.9);
        assert_eq!(xs, lo.xs);
        assert!(xs.iter().all(|v| v.is_finite()));
    }
}
