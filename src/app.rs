use eframe::egui::{self, ScrollArea, Slider};

use crate::data::model::DatasetBundle;
use crate::state::AppState;
use crate::ui::{image_view, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VirViewApp {
    pub state: AppState,
}

impl VirViewApp {
    pub fn new(bundle: DatasetBundle) -> Self {
        Self {
            state: AppState::new(bundle),
        }
    }
}

impl eframe::App for VirViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: viewing controls ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: band slider, image comparison, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                let max_band = self.state.channel_data().num_bands().saturating_sub(1);
                ui.add(
                    Slider::new(&mut self.state.band_index, 0..=max_band)
                        .text("Select wavelength (band index)"),
                );
                ui.add_space(6.0);

                image_view::image_comparison(ui, &mut self.state);
                ui.add_space(12.0);
                plot::spectral_plots(ui, &self.state);
            });
        });
    }
}
