//! Rectangles, sizes and margins in DIPs.

use cgmath::{EuclideanSpace, Point2, Vector2};
use std::{f64, ops};

/// A two-axis size in DIPs.
///
/// Components may be infinite, which means “no limit in this axis” when the size is used as a
/// constraint or as a preferred size limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Size {
        Size { width, height }
    }

    pub fn zero() -> Size {
        Size::new(0., 0.)
    }

    /// A size with no limit in either axis.
    pub fn none() -> Size {
        Size::new(f64::INFINITY, f64::INFINITY)
    }

    /// Raises each component to the corresponding minimum.
    ///
    /// Infinite components of `min` are ignored.
    pub fn apply_minimum(&mut self, min: Size) {
        if min.width.is_finite() && self.width < min.width {
            self.width = min.width;
        }
        if min.height.is_finite() && self.height < min.height {
            self.height = min.height;
        }
    }

    /// Lowers each component to the corresponding maximum.
    ///
    /// Infinite components of `max` are ignored.
    pub fn apply_maximum(&mut self, max: Size) {
        if max.width.is_finite() && self.width > max.width {
            self.width = max.width;
        }
        if max.height.is_finite() && self.height > max.height {
            self.height = max.height;
        }
    }

    /// Clamps both components at zero.
    pub(crate) fn clamp_non_negative(&mut self) {
        if self.width < 0. {
            self.width = 0.;
        }
        if self.height < 0. {
            self.height = 0.;
        }
    }
}

impl Default for Size {
    fn default() -> Size {
        Size::zero()
    }
}

impl From<Vector2<f64>> for Size {
    fn from(v: Vector2<f64>) -> Size {
        Size::new(v.x, v.y)
    }
}

impl Into<Vector2<f64>> for Size {
    fn into(self) -> Vector2<f64> {
        Vector2::new(self.width, self.height)
    }
}

/// Adds the margin to the size (horizontal sides to the width, vertical sides to the height).
impl ops::Add<Margin> for Size {
    type Output = Size;
    fn add(self, margin: Margin) -> Size {
        Size::new(
            self.width + margin.left + margin.right,
            self.height + margin.top + margin.bottom,
        )
    }
}

impl ops::AddAssign<Margin> for Size {
    fn add_assign(&mut self, margin: Margin) {
        *self = *self + margin;
    }
}

/// Removes the margin from the size. Infinite components stay infinite; finite ones do not drop
/// below zero.
impl ops::Sub<Margin> for Size {
    type Output = Size;
    fn sub(self, margin: Margin) -> Size {
        let mut size = Size::new(
            self.width - (margin.left + margin.right),
            self.height - (margin.top + margin.bottom),
        );
        size.clamp_non_negative();
        size
    }
}

/// A four-sided margin in DIPs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    /// Creates a new margin (clockwise from the top, like CSS).
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Margin {
        Margin {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn zero() -> Margin {
        Margin::default()
    }

    /// The same margin on all four sides.
    pub fn uniform(value: f64) -> Margin {
        Margin::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Size,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            origin: Point2::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Creates a new rectangle from an origin and a size.
    pub fn from_parts(origin: Point2<f64>, size: Size) -> Rect {
        Rect { origin, size }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect::new(0., 0., 0., 0.)
    }

    /// The opposite corner of the origin.
    pub fn max(&self) -> Point2<f64> {
        self.origin + Vector2::new(self.size.width, self.size.height)
    }

    /// Returns true if the point is inside the rectangle.
    pub fn contains(&self, point: Point2<f64>) -> bool {
        let max = self.max();
        point.x >= self.origin.x && point.y >= self.origin.y && point.x < max.x && point.y < max.y
    }

    /// Returns a new rectangle inset by the margin.
    ///
    /// The size will not become negative.
    pub fn inset(&self, margin: Margin) -> Rect {
        Rect {
            origin: Point2::new(self.origin.x + margin.left, self.origin.y + margin.top),
            size: self.size - margin,
        }
    }

    /// Returns a new rectangle with the given origin.
    pub fn with_origin(&self, origin: Point2<f64>) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }
}

impl ops::Add<Point2<f64>> for Rect {
    type Output = Rect;
    fn add(self, point: Point2<f64>) -> Rect {
        Rect {
            origin: self.origin + point.to_vec(),
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_ignore_infinite_components() {
        let mut size = Size::new(50., 20.);
        size.apply_minimum(Size::new(f64::INFINITY, 30.));
        assert_eq!(size, Size::new(50., 30.));

        size.apply_maximum(Size::new(40., f64::INFINITY));
        assert_eq!(size, Size::new(40., 30.));
    }

    #[test]
    fn margin_arithmetic() {
        let padding = Margin::new(1., 10., 3., 10.);
        assert_eq!(Size::new(50., 20.) + padding, Size::new(70., 24.));
        assert_eq!(Size::new(15., 2.) - padding, Size::new(0., 0.));

        let unconstrained = Size::none() - padding;
        assert!(unconstrained.width.is_infinite() && unconstrained.height.is_infinite());
    }

    #[test]
    fn inset_moves_origin() {
        let rect = Rect::new(5., 5., 100., 50.).inset(Margin::new(2., 3., 4., 1.));
        assert_eq!(rect, Rect::new(6., 7., 96., 44.));
        assert!(rect.contains(Point2::new(6., 7.)));
        assert!(!rect.contains(rect.max()));
    }

    #[test]
    fn moving_keeps_size() {
        let rect = Rect::new(1., 2., 30., 40.);
        assert_eq!(rect.with_origin(Point2::new(5., 6.)), Rect::new(5., 6., 30., 40.));
        assert_eq!(rect + Point2::new(10., 20.), Rect::new(11., 22., 30., 40.));
    }
}
