use crate::glyph::GlyphAtlas;
use crate::text::TextCache;
use ab_glyph::FontVec;
use anyhow::{Context, Result, bail};
use cueing_core::{BlockProgress, Layout, Letter, Phase, Position, Rotation};
use cueing_timing::Timer;
use std::time::Duration;
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};
use tracing::warn;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
/// Fraction of the shorter window side used by the stimulus square.
const STIMULUS_AREA: f32 = 0.9;
/// Glyph cell size as a fraction of the stimulus square.
const GLYPH_SCALE: f32 = 0.045;

const TITLE_PX: u32 = 36;
const BODY_PX: u32 = 24;
const COUNTER_PX: u32 = 20;

#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    pub clear: Duration,
    pub phase: Duration,
    pub copy: Duration,
    pub total: Duration,
    pub dirty_count: usize,
}

/// Progress of the end-screen submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus<'a> {
    Editing,
    Sending,
    Failed(&'a str),
    Sent,
}

#[derive(Debug, Clone, Copy)]
pub struct EndScreen<'a> {
    pub correct: usize,
    pub total: usize,
    pub participant: &'a str,
    pub condition: &'a str,
    pub status: SubmitStatus<'a>,
}

/// Everything one frame shows.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a, P: Phase> {
    pub phase: P,
    /// Drawn only while a trial waits for its response.
    pub layout: Option<&'a Layout>,
    pub practice_progress: Option<(usize, usize)>,
    pub block_progress: Option<BlockProgress>,
    /// Red incorrect-response pulse.
    pub flash: bool,
    /// Centre cross, used with band placement.
    pub crosshair: bool,
    pub end: Option<EndScreen<'a>>,
}

impl<'a, P: Phase> FrameView<'a, P> {
    pub fn new(phase: P) -> Self {
        Self {
            phase,
            layout: None,
            practice_progress: None,
            block_progress: None,
            flash: false,
            crosshair: false,
            end: None,
        }
    }
}

pub trait Renderer {
    fn clear_dirty(&mut self, dirty: &[Rect]);
    fn blit_glyph(&mut self, letter: Letter, rotation: Rotation, pos: (f32, f32));
    /// Centred at `pos`; a no-op without a font.
    fn blit_text(&mut self, text: &str, size_px: u32, pos: (f32, f32));
}

pub trait PhaseRenderer<P: Phase>: Renderer {
    fn render_phase(&mut self, view: &FrameView<'_, P>) -> Result<()>;
}

pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),

    atlas: GlyphAtlas,
    crosshair: Pixmap,
    text: Option<TextCache>,

    canvas: Pixmap,
    dirty_regions: Vec<Rect>,
    first_frame: bool,
    clear_buffer: Vec<u8>,
}

impl SkiaRenderer {
    /// Without a font the stimuli still render; all text is skipped.
    pub fn new(width: u32, height: u32, font: Option<FontVec>) -> Result<Self> {
        if font.is_none() {
            warn!("no font loaded; instructions and counters will not be drawn");
        }
        let (canvas, atlas, crosshair) = Self::surfaces(width, height)?;

        Ok(SkiaRenderer {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            atlas,
            crosshair,
            text: font.map(|f| TextCache::new(f, Color::BLACK)),
            canvas,
            dirty_regions: Vec::with_capacity(32),
            first_frame: true,
            clear_buffer: background_buffer(width, height),
        })
    }

    fn surfaces(width: u32, height: u32) -> Result<(Pixmap, GlyphAtlas, Pixmap)> {
        let mut canvas = Pixmap::new(width, height).context("canvas must not be empty")?;
        canvas.fill(background());

        let glyph_px = (stimulus_side(width, height) * GLYPH_SCALE).round().max(8.0) as u32;
        let atlas = GlyphAtlas::new(glyph_px, Color::BLACK).context("glyph atlas")?;
        let crosshair = crosshair_pixmap(glyph_px).context("crosshair")?;
        Ok((canvas, atlas, crosshair))
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        let (canvas, atlas, crosshair) = Self::surfaces(new_width, new_height)?;
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        self.canvas = canvas;
        self.atlas = atlas;
        self.crosshair = crosshair;
        self.clear_buffer = background_buffer(new_width, new_height);
        self.dirty_regions.clear();
        self.first_frame = true;
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn glyph_px(&self) -> u32 {
        self.atlas.size_px()
    }

    /// Maps a percentage position to the pixel centre of its glyph.
    pub fn to_pixels(&self, position: &Position) -> (f32, f32) {
        let side = stimulus_side(self.width, self.height);
        let x0 = self.center.0 - side / 2.0;
        let y0 = self.center.1 - side / 2.0;
        (
            x0 + position.left as f32 / 100.0 * side,
            y0 + position.top as f32 / 100.0 * side,
        )
    }

    fn full_rect(&self) -> Option<Rect> {
        Rect::from_xywh(0.0, 0.0, self.width as f32, self.height as f32)
    }

    fn clear_dirty(&mut self, dirty: &[Rect]) {
        let stride = self.width as usize * 4;
        let canvas_data = self.canvas.data_mut();

        for rect in dirty {
            let Some((x0, y0, x1, y1)) = clip(rect, self.width, self.height) else {
                continue;
            };
            let row_len = (x1 - x0) * 4;
            for y in y0..y1 {
                let off = y * stride + x0 * 4;
                canvas_data[off..off + row_len]
                    .copy_from_slice(&self.clear_buffer[off..off + row_len]);
            }
        }
    }

    fn copy_dirty_region(&self, dirty: &Rect, frame_buffer: &mut [u8]) {
        let Some((x0, y0, x1, y1)) = clip(dirty, self.width, self.height) else {
            return;
        };
        let bytes = (x1 - x0) * 4;
        let row_bytes = self.width as usize * 4;
        let canvas_data = self.canvas.data();

        for row in y0..y1 {
            let off = row * row_bytes + x0 * 4;
            frame_buffer[off..off + bytes].copy_from_slice(&canvas_data[off..off + bytes]);
        }
    }

    fn coalesce_dirty(rects: &mut Vec<Rect>) {
        rects.sort_by(|a, b| a.y().total_cmp(&b.y()).then(a.x().total_cmp(&b.x())));
        let mut out: Vec<Rect> = Vec::with_capacity(rects.len());
        for r in rects.drain(..) {
            if let Some(last) = out.last_mut() {
                let same_row =
                    (r.y() - last.y()).abs() < 1.0 && (r.height() - last.height()).abs() < 1.0;
                let touching = r.x() <= last.x() + last.width() + 1.0;
                if same_row && touching {
                    let nx = last.x().min(r.x());
                    let nx2 = (last.x() + last.width()).max(r.x() + r.width());
                    if let Some(merged) = Rect::from_xywh(nx, last.y(), nx2 - nx, last.height()) {
                        *last = merged;
                        continue;
                    }
                }
            }
            out.push(r);
        }
        *rects = out;
    }

    /// Draws `view` off-screen, then copies every changed region into the
    /// RGBA `frame_buffer`.
    pub fn render_frame<P, T>(
        &mut self,
        view: &FrameView<'_, P>,
        frame_buffer: &mut [u8],
        timer: &T,
    ) -> Result<FrameStats>
    where
        P: Phase,
        T: Timer<Timestamp = u64>,
    {
        if frame_buffer.len() != self.clear_buffer.len() {
            bail!(
                "frame buffer holds {} bytes, canvas needs {}",
                frame_buffer.len(),
                self.clear_buffer.len()
            );
        }

        let mut old_dirty = std::mem::take(&mut self.dirty_regions);
        if self.first_frame {
            self.first_frame = false;
            self.canvas.fill(background());
            old_dirty.extend(self.full_rect());
        }

        let t_clear = {
            let t = timer.now();
            SkiaRenderer::clear_dirty(self, &old_dirty);
            timer.elapsed(t)
        };

        let t_phase = {
            let t = timer.now();
            self.render_phase(view)?;
            timer.elapsed(t)
        };
        let dirty_count = self.dirty_regions.len();

        let mut present_rects = old_dirty;
        present_rects.extend_from_slice(&self.dirty_regions);
        SkiaRenderer::coalesce_dirty(&mut present_rects);

        let t_copy = {
            let t = timer.now();
            for rect in &present_rects {
                self.copy_dirty_region(rect, frame_buffer);
            }
            timer.elapsed(t)
        };

        Ok(FrameStats {
            clear: t_clear,
            phase: t_phase,
            copy: t_copy,
            total: t_clear + t_phase + t_copy,
            dirty_count,
        })
    }

    fn render_layout(&mut self, layout: &Layout) {
        for item in layout.items() {
            let pos = self.to_pixels(&item.position);
            self.blit_glyph(item.letter, item.rotation, pos);
        }
    }

    fn render_flash(&mut self) {
        let mut paint = Paint::default();
        paint.set_color(Color::from_rgba8(220, 30, 30, 110));
        if let Some(full) = self.full_rect() {
            self.canvas.fill_rect(full, &paint, Transform::identity(), None);
            self.dirty_regions.push(full);
        }
    }

    fn render_instructions(&mut self, lines: &[(&str, u32)]) {
        let gap = 48.0;
        let top = self.center.1 - gap * (lines.len() as f32 - 1.0) / 2.0;
        for (i, (text, size)) in lines.iter().enumerate() {
            self.blit_text(text, *size, (self.center.0, top + gap * i as f32));
        }
    }

    fn render_end(&mut self, end: &EndScreen<'_>) {
        let score = format!("Correct: {} / {}", end.correct, end.total);
        match end.status {
            SubmitStatus::Sent => {
                self.render_instructions(&[
                    ("Results sent. Thank you!", TITLE_PX),
                    (score.as_str(), BODY_PX),
                ]);
            }
            SubmitStatus::Sending => {
                self.render_instructions(&[
                    ("Sending results...", TITLE_PX),
                    (score.as_str(), BODY_PX),
                ]);
            }
            SubmitStatus::Editing | SubmitStatus::Failed(_) => {
                let name = format!("Name: {}_", end.participant);
                let condition = format!("Condition: {}  (Tab to change)", end.condition);
                let error = match end.status {
                    SubmitStatus::Failed(msg) => format!("Submission failed: {msg}"),
                    _ => String::new(),
                };
                self.render_instructions(&[
                    ("Experiment complete", TITLE_PX),
                    (score.as_str(), BODY_PX),
                    (name.as_str(), BODY_PX),
                    (condition.as_str(), BODY_PX),
                    ("Press ENTER to submit", BODY_PX),
                    (error.as_str(), COUNTER_PX),
                ]);
            }
        }
    }
}

impl Renderer for SkiaRenderer {
    fn clear_dirty(&mut self, dirty: &[Rect]) {
        SkiaRenderer::clear_dirty(self, dirty);
    }

    fn blit_glyph(&mut self, letter: Letter, rotation: Rotation, pos: (f32, f32)) {
        if let Some(rect) = blit(&mut self.canvas, self.atlas.get(letter, rotation), pos) {
            self.dirty_regions.push(rect);
        }
    }

    fn blit_text(&mut self, text: &str, size_px: u32, pos: (f32, f32)) {
        if text.is_empty() {
            return;
        }
        let Some(pm) = self.text.as_mut().and_then(|c| c.get_or_render(text, size_px)) else {
            return;
        };
        if let Some(rect) = blit(&mut self.canvas, &pm, pos) {
            self.dirty_regions.push(rect);
        }
    }
}

impl<P> PhaseRenderer<P> for SkiaRenderer
where
    P: Phase,
{
    fn render_phase(&mut self, view: &FrameView<'_, P>) -> Result<()> {
        let phase = view.phase;
        match phase {
            p if p.awaits_start() && p.next().is_some_and(|n| n.is_practice()) => {
                self.render_instructions(&[
                    ("Find the T among the Ls", TITLE_PX),
                    ("Press LEFT if the T points left, RIGHT if it points right", BODY_PX),
                    ("Press SPACE to start the practice", BODY_PX),
                ]);
            }
            p if p.awaits_start() => {
                self.render_instructions(&[
                    ("Practice complete", TITLE_PX),
                    ("Press SPACE to start the experiment", BODY_PX),
                ]);
            }
            p if p.allows_response() => {
                if view.crosshair {
                    if let Some(rect) = blit(&mut self.canvas, &self.crosshair, self.center) {
                        self.dirty_regions.push(rect);
                    }
                }
                if let Some(layout) = view.layout {
                    self.render_layout(layout);
                }
                let counter = match (view.practice_progress, view.block_progress) {
                    (_, Some(progress)) if p.is_main() => Some(progress.to_string()),
                    (Some((current, total)), _) if p.is_practice() => {
                        Some(format!("Practice {current} / {total}"))
                    }
                    _ => None,
                };
                if let Some(counter) = counter {
                    self.blit_text(&counter, COUNTER_PX, (100.0, 30.0));
                }
            }
            p if p.is_ended() => {
                if let Some(end) = &view.end {
                    self.render_end(end);
                }
            }
            _ => {}
        }

        if view.flash {
            self.render_flash();
        }
        Ok(())
    }
}

fn background() -> Color {
    Color::from_rgba8(BACKGROUND[0], BACKGROUND[1], BACKGROUND[2], BACKGROUND[3])
}

fn background_buffer(width: u32, height: u32) -> Vec<u8> {
    BACKGROUND
        .into_iter()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect()
}

fn stimulus_side(width: u32, height: u32) -> f32 {
    width.min(height) as f32 * STIMULUS_AREA
}

fn crosshair_pixmap(size: u32) -> Option<Pixmap> {
    let mut pm = Pixmap::new(size, size)?;
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(Color::BLACK);

    let s = size as f32;
    let t = (s * 0.08).max(1.0);
    pm.fill_rect(
        Rect::from_xywh(0.0, (s - t) * 0.5, s, t)?,
        &paint,
        Transform::identity(),
        None,
    );
    pm.fill_rect(
        Rect::from_xywh((s - t) * 0.5, 0.0, t, s)?,
        &paint,
        Transform::identity(),
        None,
    );
    Some(pm)
}

/// Pixel bounds of `rect` clamped to the canvas, or `None` when empty.
fn clip(rect: &Rect, width: u32, height: u32) -> Option<(usize, usize, usize, usize)> {
    let x0 = rect.x().floor().clamp(0.0, width as f32) as usize;
    let y0 = rect.y().floor().clamp(0.0, height as f32) as usize;
    let x1 = (rect.x() + rect.width()).ceil().clamp(0.0, width as f32) as usize;
    let y1 = (rect.y() + rect.height()).ceil().clamp(0.0, height as f32) as usize;
    (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
}

/// Source-over of a premultiplied pixmap centred at `pos`. Returns the
/// touched region.
fn blit(canvas: &mut Pixmap, src: &Pixmap, pos: (f32, f32)) -> Option<Rect> {
    let (w, h) = (src.width() as i32, src.height() as i32);
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    let x0 = (pos.0 - w as f32 * 0.5).floor() as i32;
    let y0 = (pos.1 - h as f32 * 0.5).floor() as i32;

    let dst_x = x0.max(0);
    let dst_y = y0.max(0);
    let dst_x_end = (x0 + w).min(cw);
    let dst_y_end = (y0 + h).min(ch);
    if dst_x_end <= dst_x || dst_y_end <= dst_y {
        return None;
    }
    let src_x = (dst_x - x0) as usize;
    let src_y = (dst_y - y0) as usize;
    let copy_w = (dst_x_end - dst_x) as usize;
    let copy_h = (dst_y_end - dst_y) as usize;

    let src_stride = w as usize * 4;
    let dst_stride = cw as usize * 4;
    let src_data = src.data();
    let dst_data = canvas.data_mut();

    for row in 0..copy_h {
        let s_off = (src_y + row) * src_stride + src_x * 4;
        let d_off = (dst_y as usize + row) * dst_stride + dst_x as usize * 4;
        let s_row = &src_data[s_off..s_off + copy_w * 4];
        let d_row = &mut dst_data[d_off..d_off + copy_w * 4];

        for (s, d) in s_row.chunks_exact(4).zip(d_row.chunks_exact_mut(4)) {
            let sa = s[3] as u32;
            if sa == 0 {
                continue;
            }
            if sa == 255 {
                d.copy_from_slice(s);
                continue;
            }
            let inv = 255 - sa;
            for c in 0..4 {
                d[c] = (s[c] as u32 + (d[c] as u32 * inv + 127) / 255).min(255) as u8;
            }
        }
    }

    Rect::from_xywh(dst_x as f32, dst_y as f32, copy_w as f32, copy_h as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cueing_core::{GlyphPlacement, LayoutId, LayoutType, SessionPhase};
    use cueing_timing::ManualTimer;

    const W: u32 = 400;
    const H: u32 = 300;

    fn placement(letter: Letter, rotation: Rotation, top: f64, left: f64) -> GlyphPlacement {
        GlyphPlacement {
            letter,
            rotation,
            position: Position::new(top, left),
            layout_type: LayoutType::Repeated,
            layout_id: LayoutId::repeated(1),
        }
    }

    fn layout() -> Layout {
        Layout::new(
            LayoutId::repeated(1),
            placement(Letter::Target, Rotation::Deg90, 25.0, 25.0),
            vec![placement(Letter::Distractor, Rotation::Deg0, 75.0, 75.0)],
        )
    }

    fn frame() -> Vec<u8> {
        vec![0u8; (W * H * 4) as usize]
    }

    fn pixel(buf: &[u8], x: u32, y: u32) -> [u8; 4] {
        let i = ((y * W + x) * 4) as usize;
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    }

    fn dark_pixels_near(buf: &[u8], (cx, cy): (f32, f32), radius: i32) -> usize {
        let mut n = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (x, y) = (cx as i32 + dx, cy as i32 + dy);
                if x < 0 || y < 0 || x >= W as i32 || y >= H as i32 {
                    continue;
                }
                if pixel(buf, x as u32, y as u32)[0] < 100 {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn first_frame_paints_background() {
        let mut r = SkiaRenderer::new(W, H, None).unwrap();
        let mut buf = frame();
        let view = FrameView::new(SessionPhase::Idle);
        r.render_frame(&view, &mut buf, &ManualTimer::new()).unwrap();
        assert_eq!(pixel(&buf, 0, 0), BACKGROUND);
        assert_eq!(pixel(&buf, W - 1, H - 1), BACKGROUND);
    }

    #[test]
    fn layout_glyphs_land_at_their_percent_positions() {
        let mut r = SkiaRenderer::new(W, H, None).unwrap();
        let layout = layout();
        let mut buf = frame();
        let mut view = FrameView::new(SessionPhase::Main);
        view.layout = Some(&layout);
        r.render_frame(&view, &mut buf, &ManualTimer::new()).unwrap();

        let target = r.to_pixels(&Position::new(25.0, 25.0));
        let distractor = r.to_pixels(&Position::new(75.0, 75.0));
        let radius = r.glyph_px() as i32 / 2;
        assert!(dark_pixels_near(&buf, target, radius) > 0);
        assert!(dark_pixels_near(&buf, distractor, radius) > 0);
        assert_eq!(dark_pixels_near(&buf, r.to_pixels(&Position::new(50.0, 50.0)), 3), 0);
    }

    #[test]
    fn hidden_layout_is_erased_on_next_frame() {
        let mut r = SkiaRenderer::new(W, H, None).unwrap();
        let layout = layout();
        let mut buf = frame();
        let timer = ManualTimer::new();
        let mut view = FrameView::new(SessionPhase::Main);
        view.layout = Some(&layout);
        r.render_frame(&view, &mut buf, &timer).unwrap();

        view.layout = None;
        let stats = r.render_frame(&view, &mut buf, &timer).unwrap();
        assert_eq!(stats.dirty_count, 0);
        let target = r.to_pixels(&Position::new(25.0, 25.0));
        assert_eq!(dark_pixels_near(&buf, target, r.glyph_px() as i32), 0);
    }

    #[test]
    fn incorrect_flash_tints_the_whole_frame() {
        let mut r = SkiaRenderer::new(W, H, None).unwrap();
        let mut buf = frame();
        let mut view = FrameView::<SessionPhase>::new(SessionPhase::Practice);
        view.flash = true;
        r.render_frame(&view, &mut buf, &ManualTimer::new()).unwrap();
        let [red, green, blue, _] = pixel(&buf, 5, 5);
        assert!(red > green && red > blue);
        let [red, green, _, _] = pixel(&buf, W - 5, H - 5);
        assert!(red > green);
    }

    #[test]
    fn crosshair_marks_the_centre_on_request() {
        let mut r = SkiaRenderer::new(W, H, None).unwrap();
        let mut buf = frame();
        let mut view = FrameView::new(SessionPhase::Main);
        view.crosshair = true;
        r.render_frame(&view, &mut buf, &ManualTimer::new()).unwrap();
        assert!(dark_pixels_near(&buf, (W as f32 / 2.0, H as f32 / 2.0), 2) > 0);
    }

    #[test]
    fn mismatched_frame_buffer_is_rejected() {
        let mut r = SkiaRenderer::new(W, H, None).unwrap();
        let mut buf = vec![0u8; 16];
        let view = FrameView::new(SessionPhase::Idle);
        assert!(r.render_frame(&view, &mut buf, &ManualTimer::new()).is_err());
    }

    #[test]
    fn resize_rebuilds_surfaces() {
        let mut r = SkiaRenderer::new(W, H, None).unwrap();
        let before = r.glyph_px();
        r.resize(W * 2, H * 2).unwrap();
        assert_eq!(r.size(), (W * 2, H * 2));
        assert!(r.glyph_px() > before);
        assert!(SkiaRenderer::new(0, 0, None).is_err());
    }

    #[test]
    fn touching_rects_on_one_row_merge() {
        let mut rects = vec![
            Rect::from_xywh(10.0, 0.0, 10.0, 5.0).unwrap(),
            Rect::from_xywh(0.0, 0.0, 10.0, 5.0).unwrap(),
            Rect::from_xywh(0.0, 20.0, 10.0, 5.0).unwrap(),
        ];
        SkiaRenderer::coalesce_dirty(&mut rects);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0].width(), 20.0);
    }
}
