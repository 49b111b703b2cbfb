// TrueType text via fontdue

use fontdue::{Font, FontSettings};
use tracing::error;

use super::color::Color;
use super::fb::Frame;

/// Rasterizes and blits text for the scene. A missing or unreadable font
/// leaves the painter empty: drawing becomes a no-op and measurement
/// returns 0, so the dashboard still renders its graphs.
pub struct TextPainter {
    font: Option<Font>,
}

impl TextPainter {
    pub fn load(path: &str) -> Self {
        let font = match std::fs::read(path) {
            Ok(bytes) => match Font::from_bytes(bytes, FontSettings::default()) {
                Ok(font) => Some(font),
                Err(e) => {
                    error!("failed to parse font {path}: {e}");
                    None
                }
            },
            Err(e) => {
                error!("failed to open font {path}: {e}");
                None
            }
        };
        Self { font }
    }

    #[cfg(test)]
    pub fn empty() -> Self {
        Self { font: None }
    }

    pub fn measure(&self, text: &str, size: f32) -> i32 {
        let Some(font) = &self.font else { return 0 };
        let mut width = 0i32;
        for ch in text.chars() {
            width += font.metrics(ch, size).advance_width as i32;
        }
        width
    }

    pub fn draw(&self, frame: &mut Frame, text: &str, x: i32, y: i32, color: Color, size: f32) {
        let (w, h) = (frame.width as i32, frame.height as i32);
        self.draw_clipped(frame, text, x, y, color, size, 0, 0, w, h);
    }

    /// Blit `text` with its top-left at `(x, y)`, dropping pixels outside
    /// the clip rectangle. Only alpha > 0 pixels are written; the glyph
    /// advances by its horizontal metric.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_clipped(
        &self,
        frame: &mut Frame,
        text: &str,
        x: i32,
        y: i32,
        color: Color,
        size: f32,
        clip_x: i32,
        clip_y: i32,
        clip_w: i32,
        clip_h: i32,
    ) {
        let Some(font) = &self.font else { return };
        let ascent = font
            .horizontal_line_metrics(size)
            .map_or(size, |m| m.ascent);
        let baseline = y + ascent as i32;

        let mut cursor = x;
        for ch in text.chars() {
            let (metrics, bitmap) = font.rasterize(ch, size);
            if metrics.width > 0 && metrics.height > 0 {
                let glyph_x = cursor + metrics.xmin;
                let glyph_top = baseline - (metrics.height as i32 + metrics.ymin);
                for row in 0..metrics.height {
                    let py = glyph_top + row as i32;
                    if py < clip_y || py >= clip_y + clip_h {
                        continue;
                    }
                    for col in 0..metrics.width {
                        if bitmap[row * metrics.width + col] == 0 {
                            continue;
                        }
                        let px = glyph_x + col as i32;
                        if px < clip_x || px >= clip_x + clip_w {
                            continue;
                        }
                        frame.set(px, py, color);
                    }
                }
            }
            cursor += metrics.advance_width as i32;
        }
    }

    /// Shorten `s` with a trailing ellipsis until it fits in `max_w`.
    pub fn trim_to_width(&self, s: &str, size: f32, max_w: i32) -> String {
        if max_w <= 0 {
            return String::new();
        }
        if self.measure(s, size) <= max_w {
            return s.to_string();
        }
        const ELLIPSIS: &str = "...";
        if self.measure(ELLIPSIS, size) >= max_w {
            return ELLIPSIS.to_string();
        }
        let mut out: String = s.to_string();
        while !out.is_empty() {
            out.pop();
            let mut candidate = out.clone();
            candidate.push_str(ELLIPSIS);
            if self.measure(&candidate, size) <= max_w {
                return candidate;
            }
        }
        ELLIPSIS.to_string()
    }
}
