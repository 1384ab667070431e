use std::collections::BTreeSet;

use eframe::egui::TextureHandle;

use crate::colormap::Colormap;
use crate::data::model::{Channel, ChannelData, ChartKind, DatasetBundle, ViewKind};
use crate::data::stretch::NormalizeOptions;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything a render depends on: the loaded bundle plus the current
/// selection tuple. Each frame is a pure function of this state; the only
/// memoization is the texture cache, keyed on [`RenderKey`].
pub struct AppState {
    /// Loaded dataset. Required at startup; replaced on folder reload.
    pub bundle: DatasetBundle,

    /// Which focal plane is being viewed.
    pub channel: Channel,

    /// Processing stage shown in the right-hand image panel.
    pub view: ViewKind,

    /// Band index into the current channel's wavelength table.
    pub band_index: usize,

    /// Colormap for the view panel (the raw panel is always gray).
    pub colormap: Colormap,

    /// Percentile stretch bounds, in percent.
    pub percentile_low: u8,
    pub percentile_high: u8,

    /// Half-open sample-axis range dropped from both panels.
    pub drop_start: usize,
    pub drop_end: usize,

    /// Which spectral charts are drawn below the images.
    pub charts: BTreeSet<ChartKind>,

    /// Whether the PNG download buttons are offered.
    pub save_enabled: bool,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Cached image-panel textures for the last rendered selection.
    pub image_cache: ImagePanelCache,
}

impl AppState {
    pub fn new(bundle: DatasetBundle) -> Self {
        let band_index = bundle.vis.num_bands() / 2;
        Self {
            bundle,
            channel: Channel::Vis,
            view: ViewKind::Detilted,
            band_index,
            colormap: Colormap::default(),
            percentile_low: 2,
            percentile_high: 98,
            drop_start: 0,
            drop_end: 3,
            charts: BTreeSet::new(),
            save_enabled: false,
            status_message: None,
            image_cache: ImagePanelCache::default(),
        }
    }

    pub fn channel_data(&self) -> &ChannelData {
        self.bundle.channel(self.channel)
    }

    /// Switch channels, keeping the selection valid: the band index is
    /// clamped to the new wavelength table and a view the new channel does
    /// not offer falls back to Dark Corrected.
    pub fn set_channel(&mut self, channel: Channel) {
        if channel == self.channel {
            return;
        }
        self.channel = channel;
        self.clamp_selection();
    }

    /// Replace the bundle after a folder reload and invalidate the cache.
    pub fn set_bundle(&mut self, bundle: DatasetBundle) {
        self.bundle = bundle;
        self.band_index = self.channel_data().num_bands() / 2;
        self.clamp_selection();
        self.image_cache = ImagePanelCache::default();
        self.status_message = None;
    }

    fn clamp_selection(&mut self) {
        let data = self.bundle.channel(self.channel);
        self.band_index = self.band_index.min(data.num_bands().saturating_sub(1));
        if !self.view.available(data) {
            self.view = ViewKind::DarkCorrected;
        }
    }

    /// Normalizer options for the current selection. Explicit clip bounds
    /// are never set from the UI; the panels always percentile-stretch.
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            drop_ranges: vec![(self.drop_start, self.drop_end)],
            stretch: true,
            clip: None,
            percentile: (f64::from(self.percentile_low), f64::from(self.percentile_high)),
        }
    }

    /// Cache key for the image panels.
    pub fn render_key(&self) -> RenderKey {
        RenderKey {
            channel: self.channel,
            view: self.view,
            band_index: self.band_index,
            colormap: self.colormap,
            percentile: (self.percentile_low, self.percentile_high),
            drop_range: (self.drop_start, self.drop_end),
        }
    }
}

// ---------------------------------------------------------------------------
// Texture cache
// ---------------------------------------------------------------------------

/// The selection subset the image panels depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderKey {
    pub channel: Channel,
    pub view: ViewKind,
    pub band_index: usize,
    pub colormap: Colormap,
    pub percentile: (u8, u8),
    pub drop_range: (usize, usize),
}

/// GPU textures for the two panels, regenerated whenever the key changes.
#[derive(Default)]
pub struct ImagePanelCache {
    pub key: Option<RenderKey>,
    pub raw: Option<TextureHandle>,
    pub view: Option<TextureHandle>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ChannelData;
    use ndarray::{Array1, Array3};

    fn bundle(vis_bands: usize, ir_bands: usize) -> DatasetBundle {
        let channel = |channel, bands| {
            let cube = Array3::zeros((bands, 4, 4));
            ChannelData {
                channel,
                cube: cube.clone(),
                dark_corrected: cube.clone(),
                radiance: cube.clone(),
                reflectance: cube.clone(),
                detilt: None,
                wavelengths: Array1::linspace(0.3, 1.0, bands),
                radiance_center: Array1::zeros(bands),
                reflectance_center: Array1::zeros(bands),
                reference_radiance: Array1::zeros(bands),
                calibration_error: Array1::zeros(bands),
            }
        };
        DatasetBundle {
            vis: channel(Channel::Vis, vis_bands),
            ir: channel(Channel::Ir, ir_bands),
        }
    }

    #[test]
    fn switching_to_ir_clamps_band_and_resets_detilt_view() {
        let mut state = AppState::new(bundle(20, 6));
        state.band_index = 15;
        assert_eq!(state.view, ViewKind::Detilted);

        state.set_channel(Channel::Ir);
        assert_eq!(state.band_index, 5);
        assert_eq!(state.view, ViewKind::DarkCorrected);
    }

    #[test]
    fn render_key_tracks_the_selection() {
        let mut state = AppState::new(bundle(10, 10));
        let before = state.render_key();
        assert_eq!(before, state.render_key());

        state.percentile_high = 95;
        assert_ne!(before, state.render_key());
    }

    #[test]
    fn normalize_options_mirror_the_sliders() {
        let mut state = AppState::new(bundle(10, 10));
        state.drop_start = 1;
        state.drop_end = 4;
        state.percentile_low = 5;

        let opts = state.normalize_options();
        assert_eq!(opts.drop_ranges, vec![(1, 4)]);
        assert_eq!(opts.percentile, (5.0, 98.0));
        assert!(opts.stretch);
        assert!(opts.clip.is_none());
    }
}
