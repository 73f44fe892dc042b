//!
//! # Geometric Primitives
//!
//! Integer [Point]s and axis-aligned [Rect]s in database units,
//! plus the placement [Transform]s applied while flattening a hierarchy.
//!

// Crates.io
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// # Location Integer Type-Alias
/// Database units. One micron is [crate::DB_UNITS_PER_MICRON] of these.
pub type Int = isize;

/// # Point in two-dimensional layout-space
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: Int,
    pub y: Int,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }
    /// Apply the transformation `trans` to our [Point]
    pub fn transform(&self, trans: &Transform) -> Self {
        let y = if trans.reflect_vert { -self.y } else { self.y };
        Self::new(self.x + trans.offset.x, y + trans.offset.y)
    }
}

///
/// # Axis-Aligned Rectangle
///
/// `p0` is the lower-left corner and `p1` the upper-right.
/// Constructors normalize their arguments, so that `p0.x <= p1.x` and `p0.y <= p1.y`.
/// Zero-width and zero-height rectangles are valid, and arise from point and line pin labels.
///
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct Rect {
    pub p0: Point,
    pub p1: Point,
}
impl Rect {
    /// Create a new [Rect] from two opposite corners, in any order
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            p0: Point::new(a.x.min(b.x), a.y.min(b.y)),
            p1: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }
    /// Create a new [Rect] from its edge coordinates
    pub fn new(left: Int, bottom: Int, right: Int, top: Int) -> Self {
        Self::from_points(Point::new(left, bottom), Point::new(right, top))
    }
    /// The (nearly) infinite [Rect], used for whole-plane searches
    pub fn everything() -> Self {
        let big = Int::MAX / 4;
        Self::new(-big, -big, big, big)
    }
    pub fn left(&self) -> Int {
        self.p0.x
    }
    pub fn bottom(&self) -> Int {
        self.p0.y
    }
    pub fn right(&self) -> Int {
        self.p1.x
    }
    pub fn top(&self) -> Int {
        self.p1.y
    }
    pub fn width(&self) -> Int {
        self.p1.x - self.p0.x
    }
    pub fn height(&self) -> Int {
        self.p1.y - self.p0.y
    }
    /// Area, in square database units
    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }
    /// Boolean indication of zero area
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
    /// Smallest [Rect] containing both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            p0: Point::new(self.p0.x.min(other.p0.x), self.p0.y.min(other.p0.y)),
            p1: Point::new(self.p1.x.max(other.p1.x), self.p1.y.max(other.p1.y)),
        }
    }
    /// Intersection of `self` and `other`, if they share any points (including edges)
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let p0 = Point::new(self.p0.x.max(other.p0.x), self.p0.y.max(other.p0.y));
        let p1 = Point::new(self.p1.x.min(other.p1.x), self.p1.y.min(other.p1.y));
        if p0.x > p1.x || p0.y > p1.y {
            return None;
        }
        Some(Rect { p0, p1 })
    }
    /// Boolean indication of whether `self` and `other` share positive area
    pub fn overlaps(&self, other: &Rect) -> bool {
        match self.intersection(other) {
            Some(r) => !r.is_empty(),
            None => false,
        }
    }
    /// The parts of `self` outside `cut`, as up to four non-overlapping rectangles:
    /// full-width bands below and above `cut`, then the pieces left and right of it.
    pub fn minus(&self, cut: &Rect) -> Vec<Rect> {
        if !self.overlaps(cut) {
            return vec![*self];
        }
        let (l, b, r, t) = (self.left(), self.bottom(), self.right(), self.top());
        let (cb, ct) = (cut.bottom().max(b), cut.top().min(t));
        let pieces = [
            Rect::new(l, b, r, cb),
            Rect::new(l, ct, r, t),
            Rect::new(l, cb, cut.left().max(l), ct),
            Rect::new(cut.right().min(r), cb, r, ct),
        ];
        pieces.iter().filter(|p| !p.is_empty()).copied().collect()
    }
    /// Grow by `delta` on every side
    pub fn expand(&self, delta: Int) -> Rect {
        Rect::new(
            self.p0.x - delta,
            self.p0.y - delta,
            self.p1.x + delta,
            self.p1.y + delta,
        )
    }
    /// Apply the transformation `trans`, re-normalizing the corners
    pub fn transform(&self, trans: &Transform) -> Rect {
        Rect::from_points(self.p0.transform(trans), self.p1.transform(trans))
    }
}

///
/// # Placement Transform
///
/// Instances are placed by an optional vertical reflection (about the x-axis),
/// followed by a translation to `offset`.
///
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    /// X-Y Translation
    pub offset: Point,
    /// Reflection about the x-axis, applied before translation
    pub reflect_vert: bool,
}
impl Transform {
    /// The identity transform, leaving any transformed object unmodified
    pub fn identity() -> Self {
        Self::default()
    }
    /// Create a transform from instance fields: location and reflection
    pub fn from_instance(loc: &Point, reflect_vert: bool) -> Self {
        Self {
            offset: *loc,
            reflect_vert,
        }
    }
    /// Create a new [Transform] that is the cascade of `parent` and `child`.
    ///
    /// Applying the result is equivalent to applying `child`, and then `parent`.
    /// Note this operation *is not* commutative.
    pub fn cascade(parent: &Transform, child: &Transform) -> Transform {
        Self {
            offset: child.offset.transform(parent),
            reflect_vert: parent.reflect_vert ^ child.reflect_vert,
        }
    }
}
