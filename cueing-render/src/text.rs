use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

/// Reads a TrueType/OpenType font from disk.
pub fn load_font(path: impl AsRef<Path>) -> Result<FontVec> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    FontVec::try_from_vec(bytes).with_context(|| format!("parsing font {}", path.display()))
}

/// Rasterises one line of text into a tight, transparent pixmap.
/// Returns `None` for text with no visible glyphs.
pub fn render_text_pixmap(text: &str, font_size: f32, font: &FontVec, color: Color) -> Option<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    // Baseline at ascent
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
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
    if outlines.is_empty() {
        return None;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlines {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;
    let stride = w as usize;
    let dst = pm.pixels_mut();

    let cu = color.to_color_u8();

    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x).floor() as i32;
            let iy = (y as f32 + b.min.y - min_y).floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let i = iy as usize * stride + ix as usize;

            // Source premultiplied by coverage, then src-over.
            let a = (cov * cu.alpha() as f32 / 255.0).clamp(0.0, 1.0);
            let sr = (cu.red() as f32 * a) as u8;
            let sg = (cu.green() as f32 * a) as u8;
            let sb = (cu.blue() as f32 * a) as u8;
            let sa = (a * 255.0) as u8;

            let bg = dst[i];
            let inv = 1.0 - a;
            let r = sr.saturating_add((bg.red() as f32 * inv) as u8);
            let g = sg.saturating_add((bg.green() as f32 * inv) as u8);
            let bl = sb.saturating_add((bg.blue() as f32 * inv) as u8);
            let al = sa.saturating_add((bg.alpha() as f32 * inv) as u8);

            if let Some(px) = PremultipliedColorU8::from_rgba(r.min(al), g.min(al), bl.min(al), al) {
                dst[i] = px;
            }
        });
    }

    Some(pm)
}

/// Rendered strings keyed by size and content. Counters and form text
/// change a few times per second at most, so entries are kept until
/// [`TextCache::clear`].
pub struct TextCache {
    font: FontVec,
    color: Color,
    map: HashMap<(u32, String), Option<Arc<Pixmap>>>,
}

impl TextCache {
    pub fn new(font: FontVec, color: Color) -> Self {
        Self {
            font,
            color,
            map: HashMap::new(),
        }
    }

    pub fn get_or_render(&mut self, text: &str, size_px: u32) -> Option<Arc<Pixmap>> {
        let key = (size_px, text.to_string());
        if let Some(p) = self.map.get(&key) {
            return p.clone();
        }
        let pm = render_text_pixmap(text, size_px as f32, &self.font, self.color).map(Arc::new);
        self.map.insert(key, pm.clone());
        pm
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_reported() {
        let err = load_font("/nonexistent/font.ttf").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/font.ttf"));
    }

    #[test]
    fn garbage_font_file_is_reported() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a font").unwrap();
        assert!(load_font(file.path()).is_err());
    }
}
