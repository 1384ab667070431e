use std::path::Path;

use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Slider, Ui};

use crate::colormap::Colormap;
use crate::data::model::{Channel, ChartKind, ViewKind};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – viewing controls
// ---------------------------------------------------------------------------

/// Render the control panel. Selection changes take effect on the next
/// frame through the render-key comparison in the image panels.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Channel ----
            ui.strong("Mode");
            ui.horizontal(|ui: &mut Ui| {
                for channel in Channel::ALL {
                    if ui
                        .selectable_label(state.channel == channel, channel.label())
                        .clicked()
                    {
                        state.set_channel(channel);
                    }
                }
            });
            ui.separator();

            // ---- Image view ----
            ui.strong("Image view");
            let data = state.channel_data();
            let offered: Vec<ViewKind> = ViewKind::ALL
                .into_iter()
                .filter(|view| view.available(data))
                .collect();
            let current = state.view;
            egui::ComboBox::from_id_salt("image_view")
                .selected_text(current.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for view in offered {
                        if ui.selectable_label(current == view, view.label()).clicked() {
                            state.view = view;
                        }
                    }
                });
            ui.separator();

            // ---- Colormap ----
            ui.strong("Colormap");
            egui::ComboBox::from_id_salt("colormap")
                .selected_text(state.colormap.name())
                .show_ui(ui, |ui: &mut Ui| {
                    for colormap in Colormap::ALL {
                        if ui
                            .selectable_label(state.colormap == colormap, colormap.name())
                            .clicked()
                        {
                            state.colormap = colormap;
                        }
                    }
                });
            ui.separator();

            // ---- Contrast stretch ----
            ui.strong("Percentile stretch");
            ui.add(Slider::new(&mut state.percentile_low, 0..=10).text("Percentile Min"));
            ui.add(Slider::new(&mut state.percentile_high, 90..=100).text("Percentile Max"));
            ui.separator();

            // ---- Drop range ----
            ui.strong("Drop sample range (x-axis)");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("start");
                ui.add(DragValue::new(&mut state.drop_start));
                ui.label("end");
                ui.add(DragValue::new(&mut state.drop_end));
            });
            ui.separator();

            // ---- Spectral charts ----
            ui.strong("Spectral plots");
            for chart in ChartKind::ALL {
                let mut checked = state.charts.contains(&chart);
                if ui.checkbox(&mut checked, chart.label()).changed() {
                    if checked {
                        state.charts.insert(chart);
                    } else {
                        state.charts.remove(&chart);
                    }
                }
            }
            ui.separator();

            ui.checkbox(&mut state.save_enabled, "Enable Image Save");
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let data = state.channel_data();
        let shape = data.cube.shape();
        ui.label(format!(
            "{}: {} bands, {}×{} pixels",
            data.channel.label(),
            shape[0],
            shape[1],
            shape[2]
        ));

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open VIR data folder")
        .pick_folder();

    if let Some(path) = folder {
        reload_bundle(state, &path);
    }
}

fn reload_bundle(state: &mut AppState, path: &Path) {
    match crate::data::loader::load_bundle(path) {
        Ok(bundle) => {
            log::info!("reloaded bundle from {}", path.display());
            state.set_bundle(bundle);
        }
        Err(e) => {
            // Keep the old bundle; just tell the user why the reload failed.
            log::error!("failed to load bundle: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
