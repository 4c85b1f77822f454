//! # Geometry
//!
//! Points, rectangles and the clipping helpers every primitive runs through.

/// 2D point in signed display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const ORIGIN: Point = Point::new(0, 0);
}

/// Rectangle given by two inclusive corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub p1: Point,
    pub p2: Point,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            p1: Point::new(x1, y1),
            p2: Point::new(x2, y2),
        }
    }

    /// Rectangle covering a `width` x `height` area anchored at the origin
    pub const fn with_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width as i32 - 1, height as i32 - 1)
    }

    /// Same rectangle with corners ordered so that `p1 <= p2` on both axes
    pub fn normalized(&self) -> Self {
        Self::new(
            self.p1.x.min(self.p2.x),
            self.p1.y.min(self.p2.y),
            self.p1.x.max(self.p2.x),
            self.p1.y.max(self.p2.y),
        )
    }

    pub fn width(&self) -> i32 {
        self.p2.x - self.p1.x + 1
    }

    pub fn height(&self) -> i32 {
        self.p2.y - self.p1.y + 1
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.p1.x && p.x <= self.p2.x && p.y >= self.p1.y && p.y <= self.p2.y
    }

    /// Intersection of two normalized rectangles, `None` when they do not overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.p1.x.max(other.p1.x),
            self.p1.y.max(other.p1.y),
            self.p2.x.min(other.p2.x),
            self.p2.y.min(other.p2.y),
        );
        if r.p1.x > r.p2.x || r.p1.y > r.p2.y {
            None
        } else {
            Some(r)
        }
    }

    /// Shifted copy; coordinates saturate at the `i32` range
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.p1.x.saturating_add(dx),
            self.p1.y.saturating_add(dy),
            self.p2.x.saturating_add(dx),
            self.p2.y.saturating_add(dy),
        )
    }
}

/// Clips the inclusive span `[a, b]` (in any order) to `[0, limit)`.
///
/// Returns the ordered, in-range span or `None` if nothing is left.
pub fn clip_span(a: i32, b: i32, limit: u16) -> Option<(u16, u16)> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi < 0 || lo >= limit as i32 {
        return None;
    }
    let lo = lo.max(0);
    let hi = hi.min(limit as i32 - 1);
    Some((lo as u16, hi as u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_span_orders_and_clamps() {
        assert_eq!(clip_span(10, 2, 8), Some((2, 7)));
        assert_eq!(clip_span(-5, 3, 8), Some((0, 3)));
        assert_eq!(clip_span(8, 12, 8), None);
        assert_eq!(clip_span(-3, -1, 8), None);
    }

    #[test]
    fn test_rect_intersect() {
        let screen = Rect::with_size(128, 64);
        let r = Rect::new(-10, 60, 5, 80);
        assert_eq!(r.intersect(&screen), Some(Rect::new(0, 60, 5, 63)));
        assert_eq!(Rect::new(200, 0, 210, 5).intersect(&screen), None);
    }

    #[test]
    fn test_rect_normalized() {
        let r = Rect::new(5, 9, 1, 2).normalized();
        assert_eq!(r, Rect::new(1, 2, 5, 9));
        assert_eq!(r.width(), 5);
        assert_eq!(r.height(), 8);
        assert!(r.contains(Point::new(1, 9)));
        assert!(!r.contains(Point::new(0, 9)));
    }
}
