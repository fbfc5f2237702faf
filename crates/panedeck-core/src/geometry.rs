#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All measurements are CSS pixels in page coordinates (origin at top-left).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Axis {
    /// Left to right.
    X,
    /// Top to bottom.
    Y,
}

impl Axis {
    /// The perpendicular axis.
    #[must_use]
    pub const fn cross(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }
}

/// A point in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Coordinate along `axis`.
    #[inline]
    #[must_use]
    pub const fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along `axis`.
    #[inline]
    #[must_use]
    pub const fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// An axis-aligned rectangle used for layout bounds and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Start coordinate along `axis`.
    #[inline]
    #[must_use]
    pub const fn start(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Extent along `axis`.
    #[inline]
    #[must_use]
    pub const fn extent(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Midpoint along `axis`.
    #[inline]
    #[must_use]
    pub fn midpoint(&self, axis: Axis) -> f64 {
        self.start(axis) + self.extent(axis) / 2.0
    }

    /// Whether the rectangle is at least as wide as it is tall.
    #[inline]
    #[must_use]
    pub fn is_wide(&self) -> bool {
        self.width >= self.height
    }

    /// Pointer position as fractions `(rx, ry)` of this rectangle.
    ///
    /// Degenerate rectangles report the center.
    #[must_use]
    pub fn relative(&self, point: Point) -> (f64, f64) {
        let rx = if self.width > 0.0 {
            (point.x - self.x) / self.width
        } else {
            0.5
        };
        let ry = if self.height > 0.0 {
            (point.y - self.y) / self.height
        } else {
            0.5
        };
        (rx, ry)
    }

    /// A sub-rectangle that keeps this rect's cross extent and takes
    /// `[offset, offset + length)` along `axis`.
    #[must_use]
    pub fn slice(&self, axis: Axis, offset: f64, length: f64) -> Rect {
        match axis {
            Axis::X => Rect::new(self.x + offset, self.y, length, self.height),
            Axis::Y => Rect::new(self.x, self.y + offset, self.width, length),
        }
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[must_use]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, Point, Rect, Size};

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2.0, 3.0, 4.0, 5.0);
        assert!(rect.contains(Point::new(2.0, 3.0)));
        assert!(rect.contains(Point::new(5.9, 7.9)));
        assert!(!rect.contains(Point::new(6.0, 3.0)));
        assert!(!rect.contains(Point::new(2.0, 8.0)));
    }

    #[test]
    fn rect_relative_fractions() {
        let rect = Rect::new(100.0, 0.0, 200.0, 100.0);
        assert_eq!(rect.relative(Point::new(150.0, 25.0)), (0.25, 0.25));
        assert_eq!(Rect::default().relative(Point::new(4.0, 4.0)), (0.5, 0.5));
    }

    #[test]
    fn rect_slice_along_axis() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.slice(Axis::X, 30.0, 10.0), Rect::new(40.0, 20.0, 10.0, 50.0));
        assert_eq!(rect.slice(Axis::Y, 5.0, 5.0), Rect::new(10.0, 25.0, 100.0, 5.0));
    }

    #[test]
    fn rect_intersection_no_overlap_is_none() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(3.0, 3.0, 2.0, 2.0);
        assert_eq!(a.intersection_opt(&b), None);
        let c = Rect::new(1.0, 1.0, 2.0, 2.0);
        assert_eq!(a.intersection_opt(&c), Some(Rect::new(1.0, 1.0, 1.0, 1.0)));
    }

    #[test]
    fn axis_accessors_agree() {
        let size = Size::new(3.0, 4.0);
        assert_eq!(size.along(Axis::X), 3.0);
        assert_eq!(size.along(Axis::Y.cross()), 3.0);
        let rect = Rect::from_size(size);
        assert_eq!(rect.midpoint(Axis::Y), 2.0);
        assert!(!rect.is_wide());
    }

    mod proptests {
        use super::{Point, Rect};
        use proptest::prelude::*;

        fn rect_strategy() -> impl Strategy<Value = Rect> {
            (-500.0f64..500.0, -500.0f64..500.0, 1.0f64..800.0, 1.0f64..800.0)
                .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
        }

        proptest! {
            #[test]
            fn relative_is_within_unit_square_for_contained_points(
                rect in rect_strategy(),
                fx in 0.0f64..0.999,
                fy in 0.0f64..0.999,
            ) {
                let point = Point::new(rect.x + rect.width * fx, rect.y + rect.height * fy);
                prop_assert!(rect.contains(point));
                let (rx, ry) = rect.relative(point);
                prop_assert!((0.0..1.0).contains(&rx));
                prop_assert!((0.0..1.0).contains(&ry));
            }

            #[test]
            fn intersection_is_contained_in_both(a in rect_strategy(), b in rect_strategy()) {
                if let Some(i) = a.intersection_opt(&b) {
                    prop_assert!(i.x >= a.x && i.right() <= a.right() + 1e-9);
                    prop_assert!(i.y >= b.y.min(a.y) && i.bottom() <= b.bottom() + 1e-9);
                    prop_assert!(!i.is_empty());
                }
            }
        }
    }
}
