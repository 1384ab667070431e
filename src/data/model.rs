use ndarray::{Array1, Array3};

// ---------------------------------------------------------------------------
// Channel – which instrument half the arrays come from
// ---------------------------------------------------------------------------

/// The two VIR focal planes. They share every processing stage except the
/// detilt correction, which only exists for the visible channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Vis,
    Ir,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Vis, Channel::Ir];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Vis => "VIS",
            Channel::Ir => "IR",
        }
    }

    /// Suffix appended to every array file stem for this channel.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Channel::Vis => "",
            Channel::Ir => "_ir",
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelData – every precomputed array for one channel
// ---------------------------------------------------------------------------

/// One channel's immutable bundle of upstream pipeline products.
///
/// Cubes are (band, sample, line); spectra are aligned to `wavelengths`
/// (band-axis length), taken at the spatial center pixel upstream.
#[derive(Debug, Clone)]
pub struct ChannelData {
    pub channel: Channel,

    /// Raw counts cube, shown in the fixed "Raw" comparison panel.
    pub cube: Array3<f64>,
    pub dark_corrected: Array3<f64>,
    pub radiance: Array3<f64>,
    pub reflectance: Array3<f64>,
    /// Detilt-corrected cube; only ever produced for VIS, and optional there.
    pub detilt: Option<Array3<f64>>,

    /// Band center wavelengths in micrometers.
    pub wavelengths: Array1<f64>,
    /// Calibrated radiance spectrum at the center pixel.
    pub radiance_center: Array1<f64>,
    /// Reflectance spectrum at the center pixel.
    pub reflectance_center: Array1<f64>,
    /// Reference (archive-calibrated) radiance spectrum.
    pub reference_radiance: Array1<f64>,
    /// Local minus reference calibration difference.
    pub calibration_error: Array1<f64>,
}

impl ChannelData {
    pub fn num_bands(&self) -> usize {
        self.wavelengths.len()
    }

    /// Spatial pixel the center spectra were extracted at.
    pub fn center_pixel(&self) -> (usize, usize) {
        let shape = self.cube.shape();
        (shape[1] / 2, shape[2] / 2)
    }

    /// Band center wavelength in nanometers, for display.
    pub fn wavelength_nm(&self, band_index: usize) -> Option<f64> {
        self.wavelengths.get(band_index).map(|w| w * 1000.0)
    }
}

/// Both channels, loaded eagerly at startup.
#[derive(Debug, Clone)]
pub struct DatasetBundle {
    pub vis: ChannelData,
    pub ir: ChannelData,
}

impl DatasetBundle {
    pub fn channel(&self, channel: Channel) -> &ChannelData {
        match channel {
            Channel::Vis => &self.vis,
            Channel::Ir => &self.ir,
        }
    }
}

// ---------------------------------------------------------------------------
// ViewKind – which processing stage the right-hand panel shows
// ---------------------------------------------------------------------------

/// Every selectable image view, mapped explicitly to its backing cube so an
/// unsupported combination is a `None`, not a lookup miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Detilted,
    DetiltedFromFile,
    DarkCorrected,
    Radiance,
    Reflectance,
}

impl ViewKind {
    pub const ALL: [ViewKind; 5] = [
        ViewKind::Detilted,
        ViewKind::DetiltedFromFile,
        ViewKind::DarkCorrected,
        ViewKind::Radiance,
        ViewKind::Reflectance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewKind::Detilted => "Detilted",
            ViewKind::DetiltedFromFile => "Detilted (from file)",
            ViewKind::DarkCorrected => "Dark Corrected",
            ViewKind::Radiance => "Radiance",
            ViewKind::Reflectance => "Reflectance",
        }
    }

    /// Whether this view can be offered for the given channel data.
    pub fn available(self, data: &ChannelData) -> bool {
        match self {
            ViewKind::Detilted => data.channel == Channel::Vis,
            ViewKind::DetiltedFromFile => data.detilt.is_some(),
            _ => true,
        }
    }

    /// The cube backing this view, or `None` when the data is absent.
    pub fn source(self, data: &ChannelData) -> Option<&Array3<f64>> {
        match self {
            // The in-pipeline detilt view renders the raw cube; the actual
            // correction happened upstream of the saved arrays.
            ViewKind::Detilted => (data.channel == Channel::Vis).then_some(&data.cube),
            ViewKind::DetiltedFromFile => data.detilt.as_ref(),
            ViewKind::DarkCorrected => Some(&data.dark_corrected),
            ViewKind::Radiance => Some(&data.radiance),
            ViewKind::Reflectance => Some(&data.reflectance),
        }
    }
}

// ---------------------------------------------------------------------------
// ChartKind – which spectral charts are drawn below the images
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChartKind {
    Radiance,
    Reflectance,
    ReferenceComparison,
    CalibrationError,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Radiance,
        ChartKind::Reflectance,
        ChartKind::ReferenceComparison,
        ChartKind::CalibrationError,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Radiance => "Radiance vs Wavelength",
            ChartKind::Reflectance => "Reflectance vs Wavelength",
            ChartKind::ReferenceComparison => "Comparison with Reference Calibration",
            ChartKind::CalibrationError => "Calibration Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_data(channel: Channel, detilt: bool) -> ChannelData {
        let cube = Array3::zeros((4, 6, 8));
        ChannelData {
            channel,
            cube: cube.clone(),
            dark_corrected: cube.clone(),
            radiance: cube.clone(),
            reflectance: cube.clone(),
            detilt: detilt.then(|| cube.clone()),
            wavelengths: Array1::linspace(0.25, 1.05, 4),
            radiance_center: Array1::zeros(4),
            reflectance_center: Array1::zeros(4),
            reference_radiance: Array1::zeros(4),
            calibration_error: Array1::zeros(4),
        }
    }

    #[test]
    fn ir_channel_offers_no_detilt_views() {
        let ir = channel_data(Channel::Ir, false);
        assert!(!ViewKind::Detilted.available(&ir));
        assert!(!ViewKind::DetiltedFromFile.available(&ir));
        assert!(ViewKind::DarkCorrected.available(&ir));
        assert!(ViewKind::Detilted.source(&ir).is_none());
    }

    #[test]
    fn detilt_from_file_without_data_is_a_no_op() {
        let vis = channel_data(Channel::Vis, false);
        assert!(!ViewKind::DetiltedFromFile.available(&vis));
        assert!(ViewKind::DetiltedFromFile.source(&vis).is_none());

        let vis = channel_data(Channel::Vis, true);
        assert!(ViewKind::DetiltedFromFile.available(&vis));
        assert!(ViewKind::DetiltedFromFile.source(&vis).is_some());
    }

    #[test]
    fn wavelength_lookup_is_bounds_checked() {
        let vis = channel_data(Channel::Vis, false);
        assert_eq!(vis.wavelength_nm(0), Some(250.0));
        assert!(vis.wavelength_nm(4).is_none());
        assert_eq!(vis.center_pixel(), (3, 4));
    }
}
