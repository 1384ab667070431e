/// Data layer: core types, `.npy` decoding, loading, and normalization.
///
/// Architecture:
/// ```text
///  data/*.npy (one file per pipeline product)
///        │
///        ▼
///   ┌──────────┐
///   │ npy+loader│  decode files → DatasetBundle { vis, ir }
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ ChannelData  │  cubes, wavelength table, center spectra
///   └─────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stretch  │  band slice → drop rows → percentile stretch
///   └──────────┘
/// ```
pub mod loader;
pub mod model;
pub mod npy;
pub mod stretch;
