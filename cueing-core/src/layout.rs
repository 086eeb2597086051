use crate::glyph::{GlyphPlacement, Letter};
use serde::{Deserialize, Serialize};

/// Experimental category of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    /// Full geometry reused verbatim in every block.
    Repeated,
    /// Target anchored per category, distractors regenerated per block.
    Random,
    /// Built once for the practice run and never recorded.
    Practice,
}

impl LayoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::Repeated => "repeated",
            LayoutType::Random => "random",
            LayoutType::Practice => "practice",
        }
    }
}

impl std::fmt::Display for LayoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category identifier: `"1".."10"`, `"A".."J"` or `"Practice-1".."Practice-10"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutId(String);

impl LayoutId {
    /// Repeated ids are 1-based numbers.
    pub fn repeated(number: usize) -> Self {
        Self(number.to_string())
    }

    /// Random ids are capital letters starting at `A` for index 0.
    pub fn random(index: usize) -> Self {
        let letter = char::from(b'A' + (index % 26) as u8);
        Self(letter.to_string())
    }

    pub fn practice(number: usize) -> Self {
        Self(format!("Practice-{number}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayoutId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One complete stimulus: the target followed by its distractors, in
/// placement order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    layout_id: LayoutId,
    items: Vec<GlyphPlacement>,
}

impl Layout {
    pub fn new(
        layout_id: LayoutId,
        target: GlyphPlacement,
        distractors: Vec<GlyphPlacement>,
    ) -> Self {
        debug_assert_eq!(target.letter, Letter::Target);
        debug_assert!(distractors.iter().all(|d| d.letter == Letter::Distractor));

        let mut items = Vec::with_capacity(distractors.len() + 1);
        items.push(target);
        items.extend(distractors);
        Self { layout_id, items }
    }

    pub fn layout_id(&self) -> &LayoutId {
        &self.layout_id
    }

    pub fn items(&self) -> &[GlyphPlacement] {
        &self.items
    }

    /// The target is always the first item.
    pub fn target(&self) -> &GlyphPlacement {
        &self.items[0]
    }

    pub fn distractors(&self) -> &[GlyphPlacement] {
        &self.items[1..]
    }

    pub fn layout_type(&self) -> LayoutType {
        self.target().layout_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{Position, Rotation};

    fn glyph(letter: Letter, top: f64) -> GlyphPlacement {
        GlyphPlacement {
            letter,
            rotation: Rotation::Deg90,
            position: Position::new(top, 10.0),
            layout_type: LayoutType::Random,
            layout_id: LayoutId::random(2),
        }
    }

    #[test]
    fn ids_follow_category_naming() {
        assert_eq!(LayoutId::repeated(10).as_str(), "10");
        assert_eq!(LayoutId::random(0).as_str(), "A");
        assert_eq!(LayoutId::random(9).as_str(), "J");
        assert_eq!(LayoutId::practice(1).as_str(), "Practice-1");
    }

    #[test]
    fn target_comes_first() {
        let layout = Layout::new(
            LayoutId::random(2),
            glyph(Letter::Target, 1.0),
            vec![glyph(Letter::Distractor, 2.0), glyph(Letter::Distractor, 3.0)],
        );
        assert!(layout.target().is_target());
        assert_eq!(layout.distractors().len(), 2);
        assert_eq!(layout.items()[2].position.top, 3.0);
        assert_eq!(layout.layout_type(), LayoutType::Random);
        assert_eq!(layout.layout_id().as_str(), "C");
    }
}
