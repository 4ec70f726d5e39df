//! Rectangle primitives shared by the layout heuristics

/// Fragments starting left of another fragment's right edge by more than
/// this fraction of its width are not considered "to the right" of it.
const HORIZONTAL_OVERLAP_FACTOR: f32 = 0.2;

/// An axis-aligned rectangle in top-left page space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    /// The degenerate result of intersecting disjoint rectangles
    pub const ZERO: Rectangle = Rectangle {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Intersection of two rectangles, or [`Rectangle::ZERO`] when they do
/// not overlap.
pub fn intersect(a: &Rectangle, b: &Rectangle) -> Rectangle {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = a.right().min(b.right());
    let y2 = a.bottom().min(b.bottom());

    if x2 >= x1 && y2 >= y1 {
        Rectangle::new(x1, y1, x2 - x1, y2 - y1)
    } else {
        Rectangle::ZERO
    }
}

/// Whether the two rectangles share some vertical extent
pub fn is_vertical_overlap(a: &Rectangle, b: &Rectangle) -> bool {
    b.y < a.bottom() && b.bottom() > a.y
}

/// Percentage (0 to 100) of `b`'s height that overlaps `a` vertically.
/// Not symmetric: a tall `b` over a short `a` scores low.
pub fn vertical_overlap_percentage(a: &Rectangle, b: &Rectangle) -> f32 {
    if b.height <= 0.0 {
        return 0.0;
    }
    let y1 = a.y.max(b.y);
    let y2 = a.bottom().min(b.bottom());
    if y2 < y1 {
        0.0
    } else {
        ((y2 - y1) * 100.0 / b.height).min(100.0)
    }
}

/// Squared distance from the right-middle of `a` to the left-middle of `b`.
///
/// Returns `f32::MAX` when `b` starts too far left of `a`'s right edge.
pub fn distance_squared(a: &Rectangle, b: &Rectangle) -> f32 {
    let (x1, y1) = (a.right(), a.y + a.height / 2.0);
    let (x2, y2) = (b.x, b.y + b.height / 2.0);
    if x2 < x1 - a.width * HORIZONTAL_OVERLAP_FACTOR {
        return f32::MAX;
    }
    (x2 - x1) * (x2 - x1) + (y2 - y1) * (y2 - y1)
}
