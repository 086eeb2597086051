use cueing_core::{Letter, Rotation};
use tiny_skia::{Color, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

const LETTERS: [Letter; 2] = [Letter::Target, Letter::Distractor];
const ROTATIONS: [Rotation; 4] = [
    Rotation::Deg0,
    Rotation::Deg90,
    Rotation::Deg180,
    Rotation::Deg270,
];

fn slot(letter: Letter, rotation: Rotation) -> usize {
    let l = match letter {
        Letter::Target => 0,
        Letter::Distractor => 1,
    };
    let r = match rotation {
        Rotation::Deg0 => 0,
        Rotation::Deg90 => 1,
        Rotation::Deg180 => 2,
        Rotation::Deg270 => 3,
    };
    l * ROTATIONS.len() + r
}

/// Pre-rasterised T and L glyphs in every rotation, drawn as strokes so no
/// font is needed for the stimuli themselves.
pub struct GlyphAtlas {
    size_px: u32,
    pixmaps: Vec<Pixmap>,
}

impl GlyphAtlas {
    /// `None` only for a zero size.
    pub fn new(size_px: u32, color: Color) -> Option<Self> {
        let mut pixmaps = Vec::with_capacity(LETTERS.len() * ROTATIONS.len());
        for letter in LETTERS {
            for rotation in ROTATIONS {
                pixmaps.push(draw_glyph(letter, rotation, size_px, color)?);
            }
        }
        Some(Self { size_px, pixmaps })
    }

    pub fn size_px(&self) -> u32 {
        self.size_px
    }

    pub fn get(&self, letter: Letter, rotation: Rotation) -> &Pixmap {
        &self.pixmaps[slot(letter, rotation)]
    }
}

/// Upright glyph outline, then rotated clockwise about the cell centre.
pub fn draw_glyph(letter: Letter, rotation: Rotation, size_px: u32, color: Color) -> Option<Pixmap> {
    let mut pm = Pixmap::new(size_px, size_px)?;
    let s = size_px as f32;
    let m = s * 0.15;
    let c = s * 0.5;

    let mut pb = PathBuilder::new();
    match letter {
        Letter::Target => {
            pb.move_to(m, m);
            pb.line_to(s - m, m);
            pb.move_to(c, m);
            pb.line_to(c, s - m);
        }
        Letter::Distractor => {
            let x = s * 0.3;
            pb.move_to(x, m);
            pb.line_to(x, s - m);
            pb.line_to(s - m, s - m);
        }
    }
    let path = pb.finish()?;

    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: (s * 0.14).max(1.0),
        line_cap: LineCap::Square,
        ..Stroke::default()
    };

    pm.stroke_path(
        &path,
        &paint,
        &stroke,
        Transform::from_rotate_at(rotation.degrees() as f32, c, c),
        None,
    );
    Some(pm)
}
