//! Planar geometry shared by every gauge: points, rectangles, affine
//! transforms and the rect-anchor helpers used to place text.
//!
//! Coordinates are scene pixels with y growing downward. Transforms follow
//! the retained-scene convention where each call to [`Transform::rotate`] or
//! [`Transform::translate`] acts in the item's local frame, so
//! `Transform::identity().rotate(a).translate(0.0, d)` first shifts a point by
//! `d` and then rotates the result by `a` degrees clockwise on screen.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A point (or offset vector) in scene pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size with its top-left corner at the origin.
    #[must_use]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Normalized rectangle spanning two corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self::new(left, top, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Smallest rectangle containing every point, `None` for an empty input.
    pub fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        Some(Rect::from_corners(min, max))
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    #[must_use]
    pub fn translated(&self, offset: Point) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Grow the rectangle by `margin` on every side.
    #[must_use]
    pub fn inflated(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    #[must_use]
    pub fn united(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Position this rectangle's size so that `anchor` lands on `target`.
    #[must_use]
    pub fn anchored_at(&self, anchor: Anchor, target: Point) -> Rect {
        let origin = target + anchor.offset(self);
        Rect::new(origin.x, origin.y, self.width, self.height)
    }
}

// ============================================================================
// RECT ANCHORS
// ============================================================================

/// Reference point of a bounding box used when placing labels.
///
/// [`Anchor::offset`] returns the vector to add to a target point so that a box
/// whose top-left corner is placed at the result has this anchor on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    TopCenter,
    TopLeft,
    TopRight,
    BottomCenter,
    BottomLeft,
    BottomRight,
    LeftCenter,
    RightCenter,
}

impl Anchor {
    #[must_use]
    pub fn offset(self, rect: &Rect) -> Point {
        let (w, h) = (rect.width, rect.height);
        match self {
            Anchor::Center => Point::new(-w / 2.0, -h / 2.0),
            Anchor::TopCenter => Point::new(-w / 2.0, 0.0),
            Anchor::TopLeft => Point::new(0.0, 0.0),
            Anchor::TopRight => Point::new(-w, 0.0),
            Anchor::BottomCenter => Point::new(-w / 2.0, -h),
            Anchor::BottomLeft => Point::new(0.0, -h),
            Anchor::BottomRight => Point::new(-w, -h),
            Anchor::LeftCenter => Point::new(0.0, -h / 2.0),
            Anchor::RightCenter => Point::new(-w, -h / 2.0),
        }
    }
}

// ============================================================================
// AFFINE TRANSFORM
// ============================================================================

/// 2D affine transform: `x' = m11*x + m21*y + dx`, `y' = m12*x + m22*y + dy`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            m11: 1.0,
            m12: 0.0,
            m21: 0.0,
            m22: 1.0,
            dx: 0.0,
            dy: 0.0,
        }
    }

    #[must_use]
    pub fn from_translation(dx: f64, dy: f64) -> Self {
        Self::identity().translate(dx, dy)
    }

    #[must_use]
    pub fn from_rotation(degrees: f64) -> Self {
        Self::identity().rotate(degrees)
    }

    /// Rotate by `degrees`, clockwise on screen, in the local frame.
    #[must_use]
    pub fn rotate(self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            m11: cos * self.m11 + sin * self.m21,
            m12: cos * self.m12 + sin * self.m22,
            m21: -sin * self.m11 + cos * self.m21,
            m22: -sin * self.m12 + cos * self.m22,
            dx: self.dx,
            dy: self.dy,
        }
    }

    /// Translate by `(x, y)` in the local frame.
    #[must_use]
    pub fn translate(self, x: f64, y: f64) -> Self {
        Self {
            dx: self.dx + x * self.m11 + y * self.m21,
            dy: self.dy + x * self.m12 + y * self.m22,
            ..self
        }
    }

    /// Scale by `(sx, sy)` in the local frame.
    #[must_use]
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Self {
            m11: self.m11 * sx,
            m12: self.m12 * sx,
            m21: self.m21 * sy,
            m22: self.m22 * sy,
            ..self
        }
    }

    /// Transform that applies `self` first and then `outer`.
    #[must_use]
    pub fn then(&self, outer: &Transform) -> Transform {
        Transform {
            m11: self.m11 * outer.m11 + self.m12 * outer.m21,
            m12: self.m11 * outer.m12 + self.m12 * outer.m22,
            m21: self.m21 * outer.m11 + self.m22 * outer.m21,
            m22: self.m21 * outer.m12 + self.m22 * outer.m22,
            dx: self.dx * outer.m11 + self.dy * outer.m21 + outer.dx,
            dy: self.dx * outer.m12 + self.dy * outer.m22 + outer.dy,
        }
    }

    #[must_use]
    pub fn map(&self, p: Point) -> Point {
        Point::new(
            self.m11 * p.x + self.m21 * p.y + self.dx,
            self.m12 * p.x + self.m22 * p.y + self.dy,
        )
    }

    /// Bounding box of the four mapped corners of `rect`.
    #[must_use]
    pub fn map_rect(&self, rect: &Rect) -> Rect {
        Rect::bounding(rect.corners().into_iter().map(|c| self.map(c))).unwrap_or_default()
    }

    /// Rotation component in degrees, clockwise on screen.
    #[must_use]
    pub fn rotation_degrees(&self) -> f64 {
        self.m12.atan2(self.m11).to_degrees()
    }

    /// Where the local origin lands.
    #[must_use]
    pub fn translation(&self) -> Point {
        Point::new(self.dx, self.dy)
    }

    /// Uniform scale factor, assuming no shear.
    #[must_use]
    pub fn scale_factor(&self) -> f64 {
        (self.m11 * self.m11 + self.m12 * self.m12).sqrt()
    }

    /// Inverse transform, `None` when the matrix is singular.
    #[must_use]
    pub fn inverse(&self) -> Option<Transform> {
        let det = self.m11 * self.m22 - self.m12 * self.m21;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let m11 = self.m22 / det;
        let m12 = -self.m12 / det;
        let m21 = -self.m21 / det;
        let m22 = self.m11 / det;
        Some(Transform {
            m11,
            m12,
            m21,
            m22,
            dx: -(self.dx * m11 + self.dy * m21),
            dy: -(self.dx * m12 + self.dy * m22),
        })
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Transform::identity()
    }
}
