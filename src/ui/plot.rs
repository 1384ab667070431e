use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints};
use ndarray::Array1;

use crate::data::model::{ChannelData, ChartKind};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Spectral charts (below the image panels)
// ---------------------------------------------------------------------------

/// Render every selected chart for the current channel.
pub fn spectral_plots(ui: &mut Ui, state: &AppState) {
    if state.charts.is_empty() {
        return;
    }

    ui.heading("Spectral Plots");
    let data = state.channel_data();
    for chart in ChartKind::ALL {
        if state.charts.contains(&chart) {
            single_chart(ui, data, chart);
        }
    }
}

fn single_chart(ui: &mut Ui, data: &ChannelData, chart: ChartKind) {
    let (x_pixel, y_pixel) = data.center_pixel();
    let title = match chart {
        ChartKind::Radiance => format!("Radiance at Pixel ({x_pixel}, {y_pixel})"),
        ChartKind::Reflectance => format!("Reflectance at Pixel ({x_pixel}, {y_pixel})"),
        ChartKind::ReferenceComparison => "Radiance Comparison".to_string(),
        ChartKind::CalibrationError => "Error (Local Cal - Reference Cal)".to_string(),
    };
    let y_label = match chart {
        ChartKind::Radiance | ChartKind::ReferenceComparison => "Radiance (W m⁻² μm⁻¹ sr⁻¹)",
        ChartKind::Reflectance => "Reflectance",
        ChartKind::CalibrationError => "Radiance Difference",
    };

    ui.add_space(8.0);
    ui.strong(title);

    Plot::new(chart.label())
        .legend(Legend::default())
        .x_axis_label("Wavelength (nm)")
        .y_axis_label(y_label)
        .height(240.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            match chart {
                ChartKind::Radiance => {
                    plot_ui.line(
                        spectrum_line(data, &data.radiance_center)
                            .name("Radiance")
                            .color(Color32::LIGHT_GRAY),
                    );
                }
                ChartKind::Reflectance => {
                    plot_ui.line(
                        spectrum_line(data, &data.reflectance_center)
                            .name("Reflectance")
                            .color(Color32::from_rgb(0, 128, 0)),
                    );
                }
                ChartKind::ReferenceComparison => {
                    plot_ui.line(
                        spectrum_line(data, &data.radiance_center)
                            .name("Local Calibrated")
                            .color(Color32::from_rgb(31, 119, 180))
                            .style(LineStyle::dashed_loose()),
                    );
                    plot_ui.line(
                        spectrum_line(data, &data.reference_radiance)
                            .name("Reference Calibrated")
                            .color(Color32::RED),
                    );
                }
                ChartKind::CalibrationError => {
                    plot_ui.line(
                        spectrum_line(data, &data.calibration_error)
                            .name("Difference")
                            .color(Color32::RED),
                    );
                }
            };
        });
}

/// One spectrum as a line over wavelength in nanometers.
fn spectrum_line(data: &ChannelData, spectrum: &Array1<f64>) -> Line<'static> {
    let points: PlotPoints = data
        .wavelengths
        .iter()
        .zip(spectrum.iter())
        .map(|(&wl, &v)| [wl * 1000.0, v])
        .collect();
    Line::new(points).width(1.5)
}
