use ndarray::{Array2, Array3, Axis};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Band image normalization
// ---------------------------------------------------------------------------
//
// The one algorithmic core of the viewer: slice a band out of a (band,
// sample, line) cube, drop unwanted sample rows, and contrast-stretch the
// result into [0, 1] for display.

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("band index {band_index} out of range (cube has {bands} bands)")]
    BandOutOfRange { band_index: usize, bands: usize },
}

/// How [`normalize`] treats the selected band image.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// Half-open `[start, end)` ranges of sample rows to exclude. Ranges are
    /// clipped to the image like slice assignments; inverted or fully
    /// out-of-range pairs are no-ops.
    pub drop_ranges: Vec<(usize, usize)>,
    /// When false the image passes through untouched (no clamping).
    pub stretch: bool,
    /// Explicit (clip_min, clip_max) bounds. Takes precedence over
    /// `percentile` when set.
    pub clip: Option<(f64, f64)>,
    /// Percentile pair in [0, 100], low < high, used to derive bounds from
    /// the image itself when `clip` is unset. NaNs are ignored.
    pub percentile: (f64, f64),
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            drop_ranges: Vec::new(),
            stretch: true,
            clip: None,
            percentile: (2.0, 98.0),
        }
    }
}

/// Extract band `band_index` from `cube`, apply the drop ranges, and stretch.
///
/// Stretched output lies in [0, 1] except that NaN pixels keep their
/// positions (stretch bounds are computed ignoring them). Degenerate bounds
/// (`clip_max <= clip_min`, or a percentile window with no finite pixels)
/// collapse to an all-zero image of the same shape instead of propagating
/// NaN or Inf.
pub fn normalize(
    cube: &Array3<f64>,
    band_index: usize,
    opts: &NormalizeOptions,
) -> Result<Array2<f64>, NormalizeError> {
    let bands = cube.len_of(Axis(0));
    if band_index >= bands {
        return Err(NormalizeError::BandOutOfRange { band_index, bands });
    }

    let mut image = cube.index_axis(Axis(0), band_index).to_owned();

    if !opts.drop_ranges.is_empty() {
        let rows = image.nrows();
        let mut keep = vec![true; rows];
        for &(start, end) in &opts.drop_ranges {
            let start = start.min(rows);
            let end = end.min(rows);
            if start < end {
                keep[start..end].fill(false);
            }
        }
        let kept: Vec<usize> = (0..rows).filter(|&i| keep[i]).collect();
        if kept.len() != rows {
            image = image.select(Axis(0), &kept);
        }
    }

    if opts.stretch {
        let bounds = match opts.clip {
            Some(clip) => Some(clip),
            None => nan_percentile_bounds(image.iter().copied(), opts.percentile),
        };
        image = match bounds {
            Some((lo, hi)) if hi > lo => {
                image.mapv_into(|v| ((v - lo) / (hi - lo)).clamp(0.0, 1.0))
            }
            // Flat or empty value distribution: a zero image is the defined
            // fallback, never NaN.
            _ => Array2::zeros(image.raw_dim()),
        };
    }

    Ok(image)
}

/// (low, high) percentile bounds over the finite values of `values`, using
/// linear interpolation between order statistics (NumPy's default). `None`
/// when there is no finite value at all.
fn nan_percentile_bounds(
    values: impl Iterator<Item = f64>,
    (low, high): (f64, f64),
) -> Option<(f64, f64)> {
    let mut finite: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    Some((percentile_of_sorted(&finite, low), percentile_of_sorted(&finite, high)))
}

fn percentile_of_sorted(sorted: &[f64], pct: f64) -> f64 {
    let last = sorted.len() - 1;
    let rank = pct.clamp(0.0, 100.0) / 100.0 * last as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    if below == above {
        sorted[below]
    } else {
        let frac = rank - below as f64;
        sorted[below] * (1.0 - frac) + sorted[above] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// 1 band, 10 samples, 4 lines; pixel value = sample * 10 + line.
    fn ramp_cube() -> Array3<f64> {
        Array3::from_shape_fn((1, 10, 4), |(_, s, l)| (s * 10 + l) as f64)
    }

    #[test]
    fn keeps_all_rows_without_drop_ranges() {
        let cube = ramp_cube();
        let img = normalize(&cube, 0, &NormalizeOptions::default()).unwrap();
        assert_eq!(img.dim(), (10, 4));
    }

    #[test]
    fn rejects_out_of_range_band() {
        let cube = ramp_cube();
        let err = normalize(&cube, 1, &NormalizeOptions::default()).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::BandOutOfRange {
                band_index: 1,
                bands: 1
            }
        );
    }

    #[test]
    fn drops_rows_preserving_order() {
        let cube = ramp_cube();
        let opts = NormalizeOptions {
            drop_ranges: vec![(0, 3)],
            stretch: false,
            ..Default::default()
        };
        let img = normalize(&cube, 0, &opts).unwrap();
        assert_eq!(img.dim(), (7, 4));
        // Remaining rows start at the original sample 3, still ascending.
        assert_eq!(img[[0, 0]], 30.0);
        assert_eq!(img[[6, 3]], 93.0);
    }

    #[test]
    fn out_of_range_and_inverted_drop_ranges_are_no_ops() {
        let cube = ramp_cube();
        let opts = NormalizeOptions {
            drop_ranges: vec![(8, 100), (5, 2), (40, 50)],
            stretch: false,
            ..Default::default()
        };
        let img = normalize(&cube, 0, &opts).unwrap();
        // Only samples 8 and 9 actually fall inside a valid range.
        assert_eq!(img.dim(), (8, 4));
        assert_eq!(img[[7, 0]], 70.0);
    }

    #[test]
    fn explicit_unit_clip_is_identity_on_unit_data() {
        let cube = Array3::from_shape_fn((1, 4, 4), |(_, s, l)| (s + l) as f64 / 6.0);
        let opts = NormalizeOptions {
            clip: Some((0.0, 1.0)),
            ..Default::default()
        };
        let img = normalize(&cube, 0, &opts).unwrap();
        for (idx, &v) in cube.index_axis(Axis(0), 0).indexed_iter() {
            assert!((img[idx] - v).abs() < 1e-12);
        }
    }

    #[test]
    fn full_percentile_stretch_spans_unit_interval() {
        let cube = ramp_cube();
        let opts = NormalizeOptions {
            percentile: (0.0, 100.0),
            ..Default::default()
        };
        let img = normalize(&cube, 0, &opts).unwrap();
        let min = img.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = img.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!((min - 0.0).abs() < 1e-12);
        assert!((max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_clip_bounds_yield_flat_zero_image() {
        let cube = ramp_cube();
        for clip in [(5.0, 5.0), (9.0, 3.0)] {
            let opts = NormalizeOptions {
                clip: Some(clip),
                ..Default::default()
            };
            let img = normalize(&cube, 0, &opts).unwrap();
            assert_eq!(img.dim(), (10, 4));
            assert!(img.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn constant_image_percentile_yields_flat_zero_image() {
        let cube = Array3::from_elem((1, 5, 5), 7.5);
        let img = normalize(&cube, 0, &NormalizeOptions::default()).unwrap();
        assert!(img.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn all_nan_image_yields_flat_zero_image() {
        let cube = Array3::from_elem((1, 3, 3), f64::NAN);
        let img = normalize(&cube, 0, &NormalizeOptions::default()).unwrap();
        assert!(img.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn nan_pixels_are_ignored_for_bounds_but_preserved_in_output() {
        let mut cube = ramp_cube();
        cube[[0, 2, 2]] = f64::NAN;
        let opts = NormalizeOptions {
            percentile: (0.0, 100.0),
            ..Default::default()
        };
        let img = normalize(&cube, 0, &opts).unwrap();
        assert!(img[[2, 2]].is_nan());
        // Bounds came from finite pixels only: extremes still hit 0 and 1.
        assert_eq!(img[[0, 0]], 0.0);
        assert_eq!(img[[9, 3]], 1.0);
    }

    #[test]
    fn stretch_disabled_passes_values_through() {
        let cube = ramp_cube();
        let opts = NormalizeOptions {
            stretch: false,
            ..Default::default()
        };
        let img = normalize(&cube, 0, &opts).unwrap();
        assert_eq!(img[[9, 3]], 93.0);
    }

    #[test]
    fn percentile_bounds_interpolate_like_numpy() {
        // np.nanpercentile([0..=9], (25, 75)) == (2.25, 6.75)
        let bounds = nan_percentile_bounds((0..10).map(f64::from), (25.0, 75.0)).unwrap();
        assert!((bounds.0 - 2.25).abs() < 1e-12);
        assert!((bounds.1 - 6.75).abs() < 1e-12);
    }
}
