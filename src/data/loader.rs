use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use ndarray::{Array1, Array3};

use super::model::{Channel, ChannelData, DatasetBundle};
use super::npy;

// ---------------------------------------------------------------------------
// Bundle loading
// ---------------------------------------------------------------------------
//
// The upstream pipeline saves one `.npy` file per product under a common
// data directory, the IR variants with an `_ir` stem suffix. Everything is
// required except the VIS detilt cube, whose absence just disables the
// "Detilted (from file)" view.

fn array_path(dir: &Path, stem: &str, channel: Channel) -> PathBuf {
    dir.join(format!("{stem}{}.npy", channel.file_suffix()))
}

fn read_array1(path: &Path) -> Result<Array1<f64>> {
    let (shape, data) =
        npy::read_path(path).with_context(|| format!("reading {}", path.display()))?;
    ensure!(
        shape.len() == 1,
        "{}: expected a 1-d array, found shape {shape:?}",
        path.display()
    );
    Ok(Array1::from_vec(data))
}

fn read_array3(path: &Path) -> Result<Array3<f64>> {
    let (shape, data) =
        npy::read_path(path).with_context(|| format!("reading {}", path.display()))?;
    ensure!(
        shape.len() == 3,
        "{}: expected a 3-d cube, found shape {shape:?}",
        path.display()
    );
    Array3::from_shape_vec((shape[0], shape[1], shape[2]), data)
        .with_context(|| format!("shaping {}", path.display()))
}

/// Load one channel's bundle from `dir`, validating the band-axis invariants.
pub fn load_channel(dir: &Path, channel: Channel) -> Result<ChannelData> {
    let cube = read_array3(&array_path(dir, "cube_array", channel))?;
    let dark_corrected = read_array3(&array_path(dir, "dark_corrected_cube", channel))?;
    let radiance = read_array3(&array_path(dir, "spec_radian", channel))?;
    let reflectance = read_array3(&array_path(dir, "reflectance_val", channel))?;

    let wavelengths = read_array1(&array_path(dir, "wvlen_center", channel))?;
    let radiance_center = read_array1(&array_path(dir, "spec_radian_cen", channel))?;
    let reflectance_center = read_array1(&array_path(dir, "reflectance_val_cen", channel))?;
    let reference_radiance = read_array1(&array_path(dir, "actual_cal", channel))?;
    let calibration_error = read_array1(&array_path(dir, "diff_spe", channel))?;

    // The detilt product only exists for VIS, and even there it is optional.
    let detilt = if channel == Channel::Vis {
        let path = array_path(dir, "detilt_array", channel);
        if path.is_file() {
            Some(read_array3(&path)?)
        } else {
            log::warn!(
                "{} not found; 'Detilted (from file)' view disabled",
                path.display()
            );
            None
        }
    } else {
        None
    };

    let bands = wavelengths.len();
    for (name, cube) in [
        ("cube_array", &cube),
        ("dark_corrected_cube", &dark_corrected),
        ("spec_radian", &radiance),
        ("reflectance_val", &reflectance),
    ] {
        ensure!(
            cube.shape()[0] == bands,
            "{} {name}: {} bands but wavelength table has {bands} entries",
            channel.label(),
            cube.shape()[0],
        );
    }
    if let Some(detilt) = &detilt {
        ensure!(
            detilt.shape()[0] == bands,
            "{} detilt_array: {} bands but wavelength table has {bands} entries",
            channel.label(),
            detilt.shape()[0],
        );
    }
    for (name, spectrum) in [
        ("spec_radian_cen", &radiance_center),
        ("reflectance_val_cen", &reflectance_center),
        ("actual_cal", &reference_radiance),
        ("diff_spe", &calibration_error),
    ] {
        ensure!(
            spectrum.len() == bands,
            "{} {name}: {} values but wavelength table has {bands} entries",
            channel.label(),
            spectrum.len(),
        );
    }

    Ok(ChannelData {
        channel,
        cube,
        dark_corrected,
        radiance,
        reflectance,
        detilt,
        wavelengths,
        radiance_center,
        reflectance_center,
        reference_radiance,
        calibration_error,
    })
}

/// Load both channels eagerly. Any missing required array is an error.
pub fn load_bundle(dir: &Path) -> Result<DatasetBundle> {
    let vis = load_channel(dir, Channel::Vis)
        .with_context(|| format!("loading VIS arrays from {}", dir.display()))?;
    let ir = load_channel(dir, Channel::Ir)
        .with_context(|| format!("loading IR arrays from {}", dir.display()))?;

    log::info!(
        "loaded bundle from {}: VIS {:?}, IR {:?}, detilt {}",
        dir.display(),
        vis.cube.shape(),
        ir.cube.shape(),
        if vis.detilt.is_some() { "present" } else { "absent" },
    );
    Ok(DatasetBundle { vis, ir })
}
