// src/app/gfx.rs
use std::path::Path;

use eframe::egui::{self as eg, ColorImage, TextureHandle};

/// Upload an RGBA image to a GPU texture. (UI thread only)
pub fn upload_rgba(ctx: &eg::Context, w: u32, h: u32, bytes: &[u8], name: &str) -> TextureHandle {
    let img = ColorImage::from_rgba_unmultiplied([w as usize, h as usize], bytes);
    ctx.load_texture(name.to_string(), img, eg::TextureOptions::LINEAR)
}

/// Load a texture from a cached poster file. (UI thread only)
pub fn load_texture_from_path(
    ctx: &eg::Context,
    path: &Path,
    cache_name: &str,
) -> Result<TextureHandle, String> {
    let (w, h, bytes) = crate::app::cache::load_rgba(path)?;
    Ok(upload_rgba(ctx, w, h, &bytes, cache_name))
}

/// Grey 2:3 box with a short caption, used while a poster is missing.
pub fn poster_placeholder(ui: &mut eg::Ui, size: eg::Vec2, caption: &str) -> eg::Response {
    let (rect, resp) = ui.allocate_exact_size(size, eg::Sense::hover());
    ui.painter().rect_filled(rect, 4.0, eg::Color32::from_gray(40));
    if !caption.is_empty() {
        ui.painter().text(
            rect.center(),
            eg::Align2::CENTER_CENTER,
            caption,
            eg::FontId::proportional(11.0),
            eg::Color32::from_gray(160),
        );
    }
    resp
}
