use std::fs;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Pixel, RgbaImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut, text_size};

use crate::rendering::domain::result_renderer::{DecodedImage, RenderError};
use crate::rendering::domain::scene::{Color, DrawCommand, Paint, Rect, Scene, TextStyle};
use crate::shared::captured_image::CapturedImage;

/// An in-memory RGBA display surface that rasterises [`Scene`]s.
///
/// Presenting is always a full clear-and-redraw; the surface never keeps
/// anything from a previous scene. Text needs a font; without one, text
/// commands are skipped.
pub struct RasterSurface {
    canvas: RgbaImage,
    font: Option<FontArc>,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
            font: None,
        }
    }

    pub fn with_font(font: FontArc) -> Self {
        Self {
            font: Some(font),
            ..Self::new()
        }
    }

    pub fn load_font(path: &Path) -> Result<FontArc, RenderError> {
        let bytes = fs::read(path).map_err(|e| RenderError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        FontArc::try_from_vec(bytes).map_err(|e| RenderError::Font {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Clears to transparent, keeping the current size.
    pub fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = image::Rgba([0, 0, 0, 0]);
        }
    }

    pub fn is_blank(&self) -> bool {
        self.canvas.pixels().all(|p| p.0[3] == 0)
    }

    pub fn present(&mut self, image: &DecodedImage, scene: &Scene) {
        self.canvas = RgbaImage::new(scene.width, scene.height);
        for command in &scene.commands {
            match command {
                DrawCommand::SourceImage => {
                    image::imageops::replace(&mut self.canvas, image.pixels(), 0, 0);
                }
                DrawCommand::FillRect { rect, paint } => fill_rect(&mut self.canvas, rect, paint),
                DrawCommand::StrokeRect { rect, paint, width } => {
                    stroke_rect(&mut self.canvas, rect, paint, *width)
                }
                DrawCommand::Polyline {
                    points,
                    color,
                    width,
                } => stroke_polyline(&mut self.canvas, points, *color, *width),
                DrawCommand::Text {
                    text,
                    center,
                    style,
                } => self.draw_text(text, *center, style),
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), RenderError> {
        ensure_parent(path)?;
        self.canvas.save(path).map_err(|e| RenderError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn draw_text(&mut self, text: &str, center: (i32, i32), style: &TextStyle) {
        let Some(font) = &self.font else {
            log::debug!("No font configured, skipping text '{text}'");
            return;
        };
        let scale = PxScale::from(style.size);
        let (w, h) = text_size(scale, font, text);
        let x = center.0.saturating_sub(w as i32 / 2);
        let y = center.1.saturating_sub(h as i32 / 2);
        draw_text_mut(&mut self.canvas, style.color, x, y, scale, font, text);
        if style.bold {
            let x = x.saturating_add(1);
            draw_text_mut(&mut self.canvas, style.color, x, y, scale, font, text);
        }
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the raw captured frame exactly as it was encoded.
pub fn write_captured(path: &Path, image: &CapturedImage) -> Result<(), RenderError> {
    ensure_parent(path)?;
    fs::write(path, image.payload()).map_err(|e| RenderError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn ensure_parent(path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RenderError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn blend(canvas: &mut RgbaImage, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }
    canvas.get_pixel_mut(x as u32, y as u32).blend(&color);
}

/// Fills pixels `[x0, x1) × [y0, y1)` except those inside `hole`.
fn fill_span(
    canvas: &mut RgbaImage,
    (x0, y0, x1, y1): (i32, i32, i32, i32),
    hole: Option<(i32, i32, i32, i32)>,
    paint: &Paint,
) {
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(canvas.width() as i32);
    let y1 = y1.min(canvas.height() as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            if let Some((hx0, hy0, hx1, hy1)) = hole {
                if px >= hx0 && px < hx1 && py >= hy0 && py < hy1 {
                    continue;
                }
            }
            let color = paint.color_at(px as f32 + 0.5, py as f32 + 0.5);
            blend(canvas, px, py, color);
        }
    }
}

fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, paint: &Paint) {
    fill_span(
        canvas,
        (rect.x, rect.y, rect.right(), rect.bottom()),
        None,
        paint,
    );
}

fn stroke_rect(canvas: &mut RgbaImage, rect: &Rect, paint: &Paint, width: u32) {
    let half = (width / 2) as i32;
    let rest = width as i32 - half;
    let outer = (
        rect.x.saturating_sub(half),
        rect.y.saturating_sub(half),
        rect.right().saturating_add(rest),
        rect.bottom().saturating_add(rest),
    );
    let inner = (
        rect.x.saturating_add(rest),
        rect.y.saturating_add(rest),
        rect.right().saturating_sub(half),
        rect.bottom().saturating_sub(half),
    );
    fill_span(canvas, outer, Some(inner), paint);
}

fn stroke_polyline(canvas: &mut RgbaImage, points: &[(i32, i32)], color: Color, width: u32) {
    let half = (width / 2) as i32;
    let rest = width as i32 - half;
    for segment in points.windows(2) {
        let ((ax, ay), (bx, by)) = (segment[0], segment[1]);
        if ax == bx || ay == by {
            // Axis aligned: a solid band, extended by half the width at
            // both ends so consecutive segments meet in a square joint.
            let span = (
                ax.min(bx).saturating_sub(half),
                ay.min(by).saturating_sub(half),
                ax.max(bx).saturating_add(rest),
                ay.max(by).saturating_add(rest),
            );
            fill_span(canvas, span, None, &Paint::Solid(color));
        } else {
            for offset in -half..rest {
                draw_line_segment_mut(
                    canvas,
                    (ax.saturating_add(offset) as f32, ay as f32),
                    (bx.saturating_add(offset) as f32, by as f32),
                    color,
                );
            }
        }
    }
}
