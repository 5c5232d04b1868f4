use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use iat_core::BlockPhase;
use iat_timing::{HighPrecisionTimer, Timer};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use string_cache::DefaultAtom as Atom;
use tiny_skia::{Color, Paint, Pixmap, PixmapPaint, PremultipliedColorU8, Rect, Transform};
use tracing::{debug, trace};

use crate::scene::Scene;

const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
const COMPLETE_TEXT: &str = "Block complete";
const ERROR_MARK: &str = "X";

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size_px: f32,
    color: [u8; 4],
}

const STIMULUS_STYLE: TextStyle = TextStyle {
    size_px: 56.0,
    color: [255, 255, 255, 255],
};
const LABEL_STYLE: TextStyle = TextStyle {
    size_px: 30.0,
    color: [120, 200, 255, 255],
};
const HINT_STYLE: TextStyle = TextStyle {
    size_px: 26.0,
    color: [200, 200, 200, 255],
};
const ERROR_STYLE: TextStyle = TextStyle {
    size_px: 80.0,
    color: [230, 30, 30, 255],
};

/// Rasterised text per style, keyed by interned string.
struct TextCache {
    style: TextStyle,
    map: HashMap<Atom, Arc<Pixmap>>,
}

impl TextCache {
    fn new(style: TextStyle) -> Self {
        Self {
            style,
            map: HashMap::new(),
        }
    }

    fn get_or_render<F: Font>(&mut self, font: &F, text: &str) -> Option<Arc<Pixmap>> {
        let atom = Atom::from(text);
        if let Some(p) = self.map.get(&atom) {
            return Some(Arc::clone(p));
        }
        let pm = Arc::new(render_text_pixmap(text, self.style.size_px, font, self.style.color)?);
        trace!(
            text,
            size_px = self.style.size_px,
            w = pm.width(),
            h = pm.height(),
            "rasterised text"
        );
        self.map.insert(atom, Arc::clone(&pm));
        Some(pm)
    }
}

/// Lays out `text` on one line and rasterises it into a tight, premultiplied
/// pixmap. Returns `None` for text with no visible glyphs.
pub fn render_text_pixmap<F: Font>(
    text: &str,
    font_size: f32,
    font: &F,
    color: [u8; 4],
) -> Option<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::with_capacity(text.len());
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();
    let first = outlines.first()?.px_bounds();
    let bounds = outlines.iter().fold(first, |mut acc, o| {
        let b = o.px_bounds();
        acc.min.x = acc.min.x.min(b.min.x);
        acc.min.y = acc.min.y.min(b.min.y);
        acc.max.x = acc.max.x.max(b.max.x);
        acc.max.y = acc.max.y.max(b.max.y);
        acc
    });

    let w = (bounds.max.x.ceil() - bounds.min.x.floor()).max(1.0) as u32;
    let h = (bounds.max.y.ceil() - bounds.min.y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;
    let stride = w as usize;
    let dst = pm.pixels_mut();

    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - bounds.min.x).floor() as i64;
            let iy = (y as f32 + b.min.y - bounds.min.y).floor() as i64;
            if ix < 0 || iy < 0 || ix >= w as i64 || iy >= h as i64 {
                return;
            }
            let i = iy as usize * stride + ix as usize;

            let a = (cov * color[3] as f32 / 255.0).clamp(0.0, 1.0);
            let src = [
                color[0] as f32 * a,
                color[1] as f32 * a,
                color[2] as f32 * a,
                a * 255.0,
            ];
            let bg = dst[i];
            let inv = 1.0 - a;
            // Porter-Duff over, premultiplied
            let r = (src[0] + bg.red() as f32 * inv).min(255.0) as u8;
            let g = (src[1] + bg.green() as f32 * inv).min(255.0) as u8;
            let bl = (src[2] + bg.blue() as f32 * inv).min(255.0) as u8;
            let al = (src[3] + bg.alpha() as f32 * inv).min(255.0) as u8;
            if let Some(px) = PremultipliedColorU8::from_rgba(r.min(al), g.min(al), bl.min(al), al) {
                dst[i] = px;
            }
        });
    }

    Some(pm)
}

/// Fills an RGBA8 buffer with one colour, a word at a time when aligned.
fn fill_rgba(buf: &mut [u8], rgba: [u8; 4]) {
    match bytemuck::try_cast_slice_mut::<u8, u32>(buf) {
        Ok(words) => words.fill(u32::from_ne_bytes(rgba)),
        Err(_) => buf
            .chunks_exact_mut(4)
            .for_each(|px| px.copy_from_slice(&rgba)),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),

    font: FontVec,
    stimulus_text: TextCache,
    label_text: TextCache,
    hint_text: TextCache,
    error_text: TextCache,

    canvas: Pixmap,
    timer: HighPrecisionTimer,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font_bytes: Vec<u8>) -> Result<Self> {
        let font = FontVec::try_from_vec(font_bytes).map_err(|e| anyhow!("font load: {e}"))?;
        let canvas = Self::blank_canvas(width, height)?;

        Ok(SkiaRenderer {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            font,
            stimulus_text: TextCache::new(STIMULUS_STYLE),
            label_text: TextCache::new(LABEL_STYLE),
            hint_text: TextCache::new(HINT_STYLE),
            error_text: TextCache::new(ERROR_STYLE),
            canvas,
            timer: HighPrecisionTimer::new(),
        })
    }

    pub fn from_font_path(width: u32, height: u32, path: &std::path::Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
        Self::new(width, height, bytes)
    }

    fn blank_canvas(width: u32, height: u32) -> Result<Pixmap> {
        let mut canvas = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| anyhow!("invalid canvas size {width}x{height}"))?;
        fill_rgba(canvas.data_mut(), BACKGROUND);
        Ok(canvas)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = Self::blank_canvas(new_width, new_height)?;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        debug!(width = new_width, height = new_height, "canvas resized");
        Ok(())
    }

    /// Draws `scene` and copies it into `frame_buffer` (RGBA8, same size).
    pub fn render_frame(&mut self, scene: &Scene, frame_buffer: &mut [u8]) -> Result<FrameStats> {
        let t_draw = self.timer.now();
        fill_rgba(self.canvas.data_mut(), BACKGROUND);
        self.draw_scene(scene);
        let draw = self.timer.elapsed(t_draw);

        let t_copy = self.timer.now();
        let data = self.canvas.data();
        if frame_buffer.len() != data.len() {
            return Err(anyhow!(
                "frame buffer is {} bytes, canvas is {}",
                frame_buffer.len(),
                data.len()
            ));
        }
        frame_buffer.copy_from_slice(data);
        let copy = self.timer.elapsed(t_copy);

        Ok(FrameStats {
            draw,
            copy,
            total: draw + copy,
        })
    }

    fn draw_scene(&mut self, scene: &Scene) {
        let (cx, cy) = self.center;
        let top = 60.0;

        if !scene.left_label.is_empty() {
            self.blit_text(TextKind::Label, &scene.left_label, (self.width as f32 * 0.15, top));
        }
        if !scene.right_label.is_empty() {
            self.blit_text(TextKind::Label, &scene.right_label, (self.width as f32 * 0.85, top));
        }

        match scene.phase {
            BlockPhase::AwaitingStart => {
                if let Some(notice) = &scene.notice {
                    self.blit_text(TextKind::Error, notice, (cx, cy - 80.0));
                }
                self.blit_text(TextKind::Hint, &scene.start_hint, (cx, cy));
            }
            BlockPhase::Running => {
                if let Some(stimulus) = &scene.stimulus {
                    self.blit_text(TextKind::Stimulus, stimulus, (cx, cy));
                }
                if scene.error_feedback {
                    self.blit_text(TextKind::Error, ERROR_MARK, (cx, cy + 110.0));
                }
                self.draw_progress(scene.progress);
            }
            BlockPhase::Complete => {
                self.blit_text(TextKind::Hint, COMPLETE_TEXT, (cx, cy));
            }
        }
    }

    fn draw_progress(&mut self, fraction: f64) {
        let bar_w = self.width as f32 * 0.6;
        let x = (self.width as f32 - bar_w) * 0.5;
        let y = self.height as f32 - 60.0;

        let mut paint = Paint::default();
        paint.anti_alias = false;
        paint.set_color(Color::from_rgba8(60, 60, 60, 255));
        if let Some(track) = Rect::from_xywh(x, y, bar_w, 8.0) {
            self.canvas
                .fill_rect(track, &paint, Transform::identity(), None);
        }

        let filled = bar_w * fraction.clamp(0.0, 1.0) as f32;
        paint.set_color(Color::from_rgba8(220, 220, 220, 255));
        if let Some(bar) = Rect::from_xywh(x, y, filled, 8.0) {
            self.canvas.fill_rect(bar, &paint, Transform::identity(), None);
        }
    }

    fn blit_text(&mut self, kind: TextKind, text: &str, center: (f32, f32)) {
        if text.is_empty() {
            return;
        }
        let cache = match kind {
            TextKind::Stimulus => &mut self.stimulus_text,
            TextKind::Label => &mut self.label_text,
            TextKind::Hint => &mut self.hint_text,
            TextKind::Error => &mut self.error_text,
        };
        let Some(cached) = cache.get_or_render(&self.font, text) else {
            return;
        };
        let pm: &Pixmap = &cached;
        let x = (center.0 - pm.width() as f32 * 0.5).round() as i32;
        let y = (center.1 - pm.height() as f32 * 0.5).round() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            pm.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

#[derive(Debug, Clone, Copy)]
enum TextKind {
    Stimulus,
    Label,
    Hint,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rgba_writes_every_pixel() {
        let mut buf = vec![0u8; 4 * 5];
        fill_rgba(&mut buf, [1, 2, 3, 4]);
        assert!(buf.chunks_exact(4).all(|px| px == [1, 2, 3, 4]));
    }

    #[test]
    fn invalid_font_is_an_error() {
        assert!(SkiaRenderer::new(64, 64, vec![0, 1, 2, 3]).is_err());
    }
}
