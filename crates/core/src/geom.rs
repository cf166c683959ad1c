use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box stored as center plus half-extents. Screen space: y grows down.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    /// Build from full width/height, the way the host describes rectangles.
    pub fn from_size(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w * 0.5, h * 0.5))
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }

    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    pub fn inflate(&self, by: f32) -> Self {
        Self::new(self.center, self.half + Vec2::splat(by))
    }
}

#[inline]
pub fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_screen_space() {
        let r = Aabb::from_size(100.0, 300.0, 40.0, 60.0);
        assert_eq!(r.top(), 270.0);
        assert_eq!(r.bottom(), 330.0);
        assert_eq!(r.left(), 80.0);
        assert_eq!(r.right(), 120.0);
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Aabb::from_size(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::from_size(0.0, 10.0, 10.0, 10.0);
        assert!(!overlaps(&a, &b));
        assert!(overlaps(&a.inflate(0.5), &b));
    }
}
