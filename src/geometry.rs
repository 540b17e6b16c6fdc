use glam::Vec2;

/// Axis-aligned rectangle in viewport pixels (like a DOM client rect).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Has a non-empty box.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Overlaps the viewport at least at an edge.
    pub fn intersects_viewport(&self, viewport: Vec2) -> bool {
        !(self.bottom() < 0.0
            || self.right() < 0.0
            || self.top > viewport.y
            || self.left > viewport.x)
    }

    /// Non-empty and at least partially on screen.
    pub fn is_visible_in(&self, viewport: Vec2) -> bool {
        self.has_area() && self.intersects_viewport(viewport)
    }
}

/// Largest top-left coordinate that keeps a box of `size` inside the viewport.
/// Floors at zero so a viewport smaller than the sprite pins it to the corner.
pub fn max_origin(viewport: Vec2, size: Vec2) -> Vec2 {
    (viewport - size).max(Vec2::ZERO)
}

/// Constrain a sprite origin to `[0, viewport - size]` on both axes.
pub fn clamp_to_viewport(point: Vec2, viewport: Vec2, size: Vec2) -> Vec2 {
    point.clamp(Vec2::ZERO, max_origin(viewport, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_stays_inside_for_any_input() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..500 {
            let viewport = Vec2::new(rng.f32() * 2000.0, rng.f32() * 1400.0);
            let size = Vec2::new(96.0, 160.0);
            let point = Vec2::new(rng.f32() * 6000.0 - 3000.0, rng.f32() * 6000.0 - 3000.0);
            let p = clamp_to_viewport(point, viewport, size);
            let max = max_origin(viewport, size);
            assert!(p.x >= 0.0 && p.x <= max.x, "x out of range: {p:?} max {max:?}");
            assert!(p.y >= 0.0 && p.y <= max.y, "y out of range: {p:?} max {max:?}");
        }
    }

    #[test]
    fn tiny_viewport_pins_to_corner() {
        let p = clamp_to_viewport(Vec2::new(50.0, 80.0), Vec2::new(40.0, 100.0), Vec2::new(96.0, 160.0));
        assert_eq!(p, Vec2::ZERO);
    }

    #[test]
    fn visibility_checks_edges() {
        let viewport = Vec2::new(800.0, 600.0);
        assert!(Rect::new(10.0, 10.0, 50.0, 20.0).is_visible_in(viewport));
        assert!(!Rect::new(-80.0, 10.0, 50.0, 20.0).is_visible_in(viewport));
        assert!(!Rect::new(10.0, 601.0, 50.0, 20.0).is_visible_in(viewport));
        assert!(!Rect::new(10.0, 10.0, 0.0, 20.0).is_visible_in(viewport));
    }
}
