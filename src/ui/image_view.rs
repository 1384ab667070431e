use anyhow::{Context as _, Result};
use eframe::egui::{self, Color32, ColorImage, TextureOptions, Ui};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use ndarray::Array2;

use crate::colormap::Colormap;
use crate::data::stretch::normalize;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Band image panels (central area, two columns)
// ---------------------------------------------------------------------------

/// Colormap a normalized band image into an egui texture image.
///
/// The array is (sample, line); samples run along x and lines along y with
/// the origin at the lower left, matching the upstream quicklooks. NaN
/// pixels render as the black sentinel.
pub fn band_color_image(image: &Array2<f64>, colormap: Colormap) -> ColorImage {
    let (samples, lines) = image.dim();
    let mut out = ColorImage::new([samples, lines], Color32::BLACK);
    for y in 0..lines {
        for x in 0..samples {
            let v = image[[x, lines - 1 - y]];
            if !v.is_nan() {
                out.pixels[y * samples + x] = colormap.sample(v);
            }
        }
    }
    out
}

/// Encode a panel image to PNG bytes in memory.
pub fn encode_png(image: &ColorImage) -> Result<Vec<u8>> {
    let [width, height] = image.size;
    let mut rgba = Vec::with_capacity(width * height * 4);
    for px in &image.pixels {
        rgba.extend_from_slice(&[px.r(), px.g(), px.b(), px.a()]);
    }

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(&rgba, width as u32, height as u32, ExtendedColorType::Rgba8)
        .context("encoding PNG")?;
    Ok(bytes)
}

/// Deterministic download name derived from the view label.
pub fn download_file_name(view_label: &str) -> String {
    format!("{}_image.png", view_label.to_lowercase().replace(' ', "_"))
}

/// Render the two-panel band image comparison and, when enabled, the
/// download buttons under each panel.
pub fn image_comparison(ui: &mut Ui, state: &mut AppState) {
    let data = state.channel_data();
    let band = state.band_index;
    let Some(wavelength_nm) = data.wavelength_nm(band) else {
        // The slider is bounds-constrained, so this only fires on a stale
        // selection mid-reload; skip the frame rather than panic.
        return;
    };

    ui.heading(format!(
        "Image Comparison at Band {band} ({wavelength_nm:.2} nm)"
    ));
    ui.add_space(4.0);

    if let Err(e) = refresh_textures(ui.ctx(), state) {
        log::error!("band image render failed: {e:#}");
        state.status_message = Some(format!("Render error: {e:#}"));
        return;
    }

    let view_label = state.view.label();
    let save_enabled = state.save_enabled;
    let raw = state.image_cache.raw.clone();
    let view = state.image_cache.view.clone();

    ui.columns(2, |cols| {
        cols[0].strong("Raw Image");
        if let Some(texture) = &raw {
            show_panel(&mut cols[0], texture);
            if save_enabled && cols[0].button("Download Raw Image").clicked() {
                save_texture_png(texture, &download_file_name("Raw"), state);
            }
        }

        cols[1].strong(format!("{view_label} Image"));
        if let Some(texture) = &view {
            show_panel(&mut cols[1], texture);
            if save_enabled
                && cols[1]
                    .button(format!("Download {view_label} Image"))
                    .clicked()
            {
                save_texture_png(texture, &download_file_name(view_label), state);
            }
        } else {
            cols[1].label("No backing data for this view.");
        }
    });
}

fn show_panel(ui: &mut Ui, texture: &egui::TextureHandle) {
    let size = texture.size_vec2();
    let width = ui.available_width();
    let scale = (width / size.x).min(420.0 / size.y);
    ui.image((texture.id(), size * scale));
}

/// Re-render both panel textures if the selection changed since last frame.
fn refresh_textures(ctx: &egui::Context, state: &mut AppState) -> Result<()> {
    let key = state.render_key();
    if state.image_cache.key == Some(key) {
        return Ok(());
    }

    let data = state.channel_data();
    let opts = state.normalize_options();

    // The raw comparison panel is always grayscale, like the original
    // quicklooks; only the view panel honors the colormap selection.
    let raw = normalize(&data.cube, state.band_index, &opts)?;
    let raw_texture = ctx.load_texture(
        "raw_band",
        band_color_image(&raw, Colormap::Gray),
        TextureOptions::NEAREST,
    );

    let view_texture = match state.view.source(data) {
        Some(cube) => {
            let img = normalize(cube, state.band_index, &opts)?;
            Some(ctx.load_texture(
                "view_band",
                band_color_image(&img, state.colormap),
                TextureOptions::NEAREST,
            ))
        }
        // Unsupported view for this channel: no panel, no error.
        None => None,
    };

    state.image_cache.key = Some(key);
    state.image_cache.raw = Some(raw_texture);
    state.image_cache.view = view_texture;
    Ok(())
}

/// Offer the encoded panel through a save dialog.
fn save_texture_png(texture: &egui::TextureHandle, file_name: &str, state: &mut AppState) {
    // Re-read pixel data out of the cache key's source rather than the GPU;
    // the cheapest correct path is to re-render the ColorImage.
    let result = rebuild_color_image(texture, state).and_then(|img| {
        let bytes = encode_png(&img)?;
        let Some(path) = rfd::FileDialog::new()
            .set_title("Save band image")
            .set_file_name(file_name)
            .add_filter("PNG image", &["png"])
            .save_file()
        else {
            return Ok(());
        };
        std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("saved band image to {}", path.display());
        Ok(())
    });

    if let Err(e) = result {
        log::error!("image save failed: {e:#}");
        state.status_message = Some(format!("Save error: {e:#}"));
    }
}

fn rebuild_color_image(texture: &egui::TextureHandle, state: &AppState) -> Result<ColorImage> {
    let data = state.channel_data();
    let opts = state.normalize_options();
    let is_raw = texture.name() == "raw_band";

    let (cube, colormap) = if is_raw {
        (&data.cube, Colormap::Gray)
    } else {
        let cube = state
            .view
            .source(data)
            .context("view has no backing data")?;
        (cube, state.colormap)
    };
    let img = normalize(cube, state.band_index, &opts)?;
    Ok(band_color_image(&img, colormap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn color_image_orientation_and_nan_sentinel() {
        // 3 samples x 2 lines; line index grows upward in the display.
        let mut img = Array2::zeros((3, 2));
        img[[0, 0]] = 1.0; // sample 0, line 0 → bottom-left, white in gray
        img[[2, 1]] = f64::NAN; // sample 2, line 1 → top-right, sentinel

        let color = band_color_image(&img, Colormap::Gray);
        assert_eq!(color.size, [3, 2]);
        // Bottom row is y = 1 in texture space.
        assert_eq!(color.pixels[1 * 3 + 0], Color32::from_rgb(255, 255, 255));
        assert_eq!(color.pixels[0 * 3 + 2], Color32::BLACK);
    }

    #[test]
    fn png_bytes_carry_the_signature() {
        let img = band_color_image(&Array2::zeros((4, 4)), Colormap::Gray);
        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']);
    }

    #[test]
    fn download_names_are_deterministic() {
        assert_eq!(download_file_name("Raw"), "raw_image.png");
        assert_eq!(
            download_file_name("Dark Corrected"),
            "dark_corrected_image.png"
        );
        assert_eq!(
            download_file_name("Detilted (from file)"),
            "detilted_(from_file)_image.png"
        );
    }
}
