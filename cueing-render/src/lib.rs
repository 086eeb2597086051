pub use ab_glyph::FontVec;

pub mod glyph;
pub mod render;
pub mod text;

pub use glyph::GlyphAtlas;
pub use render::{
    EndScreen, FrameStats, FrameView, PhaseRenderer, Renderer, SkiaRenderer, SubmitStatus,
};
pub use text::{TextCache, load_font, render_text_pixmap};
