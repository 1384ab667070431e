//! Writes a deterministic synthetic VIS + IR `.npy` bundle so the viewer can
//! be tried without instrument data: `cargo run --bin generate_sample [dir]`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array3};

// ---------------------------------------------------------------------------
// Deterministic PRNG (xoshiro256**), no external crates needed for a demo bin
// ---------------------------------------------------------------------------

struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Minimal .npy writer (f64, C order), same wire layout the viewer reads
// ---------------------------------------------------------------------------

fn write_npy(path: &Path, shape: &[usize], data: &[f64]) -> std::io::Result<()> {
    assert_eq!(shape.iter().product::<usize>(), data.len());
    let mut writer = BufWriter::new(File::create(path)?);

    writer.write_all(b"\x93NUMPY")?;
    writer.write_all(&[1, 0])?;

    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    let shape_str = if dims.len() == 1 {
        format!("({},)", dims[0])
    } else {
        format!("({})", dims.join(", "))
    };
    let dict = format!("{{'descr': '<f8', 'fortran_order': False, 'shape': {shape_str}, }}");
    let pad = (16 - (dict.len() + 1) % 16) % 16;
    let header = format!("{}{}\n", dict, " ".repeat(pad));
    writer.write_all(&(header.len() as u16).to_le_bytes())?;
    writer.write_all(header.as_bytes())?;

    for &v in data {
        writer.write_all(&v.to_le_bytes())?;
    }
    writer.flush()
}

// ---------------------------------------------------------------------------
// Synthetic channel
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct ChannelSpec {
    suffix: &'static str,
    bands: usize,
    samples: usize,
    lines: usize,
    /// Wavelength span in micrometers.
    wl_range: (f64, f64),
    with_detilt: bool,
}

fn gaussian2(x: f64, y: f64, cx: f64, cy: f64, sigma: f64) -> f64 {
    (-((x - cx).powi(2) + (y - cy).powi(2)) / (2.0 * sigma * sigma)).exp()
}

fn generate_channel(dir: &Path, spec: &ChannelSpec, rng: &mut SimpleRng) -> std::io::Result<()> {
    let ChannelSpec {
        suffix,
        bands,
        samples,
        lines,
        wl_range,
        with_detilt,
    } = *spec;

    let wavelengths = Array1::linspace(wl_range.0, wl_range.1, bands);

    // Spatial scene: two bright features over a dim background.
    let scene = |s: f64, l: f64| {
        0.2 + 0.8 * gaussian2(s, l, samples as f64 * 0.35, lines as f64 * 0.4, 8.0)
            + 0.5 * gaussian2(s, l, samples as f64 * 0.7, lines as f64 * 0.65, 5.0)
    };
    // Smooth spectral envelope peaking mid-range.
    let envelope = |b: usize| {
        let t = b as f64 / (bands - 1) as f64;
        0.3 + 0.7 * (std::f64::consts::PI * t).sin().powi(2)
    };

    let dark_level = 120.0;
    let tilt = |s: usize| 1.0 + 0.004 * s as f64; // systematic sample-axis tilt

    let mut cube = Array3::zeros((bands, samples, lines));
    let mut detilted = Array3::zeros((bands, samples, lines));
    for b in 0..bands {
        for s in 0..samples {
            for l in 0..lines {
                let signal = 800.0 * envelope(b) * scene(s as f64, l as f64);
                let noise = rng.gauss(0.0, 4.0);
                detilted[[b, s, l]] = signal + dark_level + noise;
                cube[[b, s, l]] = signal * tilt(s) + dark_level + noise;
            }
        }
    }

    let dark_corrected = &cube - dark_level;
    // Band-dependent radiometric gain and solar spectrum.
    let gain = Array1::from_shape_fn(bands, |b| 0.002 + 0.0005 * envelope(b));
    let solar = Array1::from_shape_fn(bands, |b| 1.2 + 0.6 * envelope(b));

    let mut radiance = dark_corrected.clone();
    let mut reflectance = dark_corrected.clone();
    for b in 0..bands {
        let g = gain[b];
        let sol = solar[b];
        radiance
            .index_axis_mut(ndarray::Axis(0), b)
            .mapv_inplace(|v| v * g);
        reflectance
            .index_axis_mut(ndarray::Axis(0), b)
            .mapv_inplace(|v| v * g / sol);
    }

    let (cx, cy) = (samples / 2, lines / 2);
    let radiance_cen =
        Array1::from_shape_fn(bands, |b| radiance[[b, cx, cy]]);
    let reflectance_cen =
        Array1::from_shape_fn(bands, |b| reflectance[[b, cx, cy]]);
    // Reference calibration: the same spectrum with a small systematic bias.
    let reference = Array1::from_shape_fn(bands, |b| {
        radiance_cen[b] * (1.0 + 0.02 * (b as f64 * 0.3).sin())
    });
    let diff = &radiance_cen - &reference;

    let write3 = |stem: &str, arr: &Array3<f64>| {
        write_npy(
            &dir.join(format!("{stem}{suffix}.npy")),
            arr.shape(),
            arr.as_slice().expect("C-ordered array"),
        )
    };
    let write1 = |stem: &str, arr: &Array1<f64>| {
        write_npy(
            &dir.join(format!("{stem}{suffix}.npy")),
            &[arr.len()],
            arr.as_slice().expect("contiguous array"),
        )
    };

    write3("cube_array", &cube)?;
    write3("dark_corrected_cube", &dark_corrected)?;
    write3("spec_radian", &radiance)?;
    write3("reflectance_val", &reflectance)?;
    if with_detilt {
        write3("detilt_array", &detilted)?;
    }
    write1("wvlen_center", &wavelengths)?;
    write1("spec_radian_cen", &radiance_cen)?;
    write1("reflectance_val_cen", &reflectance_cen)?;
    write1("actual_cal", &reference)?;
    write1("diff_spe", &diff)?;
    Ok(())
}

fn main() -> std::io::Result<()> {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    fs::create_dir_all(&dir)?;

    let mut rng = SimpleRng::new(42);

    let vis = ChannelSpec {
        suffix: "",
        bands: 96,
        samples: 64,
        lines: 48,
        wl_range: (0.25, 1.05),
        with_detilt: true,
    };
    let ir = ChannelSpec {
        suffix: "_ir",
        bands: 108,
        samples: 64,
        lines: 48,
        wl_range: (1.0, 5.1),
        with_detilt: false,
    };

    generate_channel(&dir, &vis, &mut rng)?;
    generate_channel(&dir, &ir, &mut rng)?;

    println!(
        "Wrote synthetic VIS ({} bands) and IR ({} bands) bundle to {}",
        vis.bands,
        ir.bands,
        dir.display()
    );
    Ok(())
}
