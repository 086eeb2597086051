use cueing_core::Position;
use rand::Rng;

/// Axis-aligned sampling rectangle, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub top_min: f64,
    pub top_max: f64,
    pub left_min: f64,
    pub left_max: f64,
}

impl Zone {
    pub fn new(top_min: f64, top_max: f64, left_min: f64, left_max: f64) -> Self {
        Self {
            top_min,
            top_max,
            left_min,
            left_max,
        }
    }

    /// Square band `[min, max]` on both axes.
    pub fn band(min: f64, max: f64) -> Self {
        Self::new(min, max, min, max)
    }

    /// Shrinks every edge inward by `by`.
    pub fn inset(&self, by: f64) -> Self {
        Self::new(
            self.top_min + by,
            self.top_max - by,
            self.left_min + by,
            self.left_max - by,
        )
    }

    pub fn is_empty(&self) -> bool {
        !(self.top_min < self.top_max && self.left_min < self.left_max)
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.top_min + self.top_max) / 2.0,
            (self.left_min + self.left_max) / 2.0,
        )
    }

    pub fn contains(&self, p: &Position) -> bool {
        (self.top_min..=self.top_max).contains(&p.top)
            && (self.left_min..=self.left_max).contains(&p.left)
    }

    /// Uniform point inside the zone. Callers must not pass an empty zone.
    pub fn uniform_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(
            rng.random_range(self.top_min..self.top_max),
            rng.random_range(self.left_min..self.left_max),
        )
    }
}

/// The four screen quadrants around the central crosshair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn zone(&self) -> Zone {
        match self {
            Quadrant::TopLeft => Zone::new(0.0, 50.0, 0.0, 50.0),
            Quadrant::TopRight => Zone::new(0.0, 50.0, 50.0, 100.0),
            Quadrant::BottomLeft => Zone::new(50.0, 100.0, 0.0, 50.0),
            Quadrant::BottomRight => Zone::new(50.0, 100.0, 50.0, 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn quadrants_tile_the_area() {
        let area: f64 = Quadrant::ALL
            .iter()
            .map(|q| {
                let z = q.zone();
                (z.top_max - z.top_min) * (z.left_max - z.left_min)
            })
            .sum();
        assert_eq!(area, 100.0 * 100.0);
    }

    #[test]
    fn inset_keeps_center() {
        let zone = Quadrant::BottomRight.zone();
        let inner = zone.inset(6.25);
        assert_eq!(inner.center(), zone.center());
        assert_eq!(inner.top_min, 56.25);
        assert_eq!(inner.left_max, 93.75);
        assert!(zone.inset(25.0).is_empty());
    }

    #[test]
    fn uniform_points_stay_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let zone = Quadrant::TopRight.zone().inset(6.25);
        for _ in 0..1000 {
            assert!(zone.contains(&zone.uniform_point(&mut rng)));
        }
    }
}
