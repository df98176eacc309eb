//! Geographic coordinates and axis-aligned bounding boxes.
//!
//! The module is home to the following items:
//! - [`LatLon`], a point on the globe given in degrees
//! - [`BBox`], an axis-aligned box in latitude/longitude space, using longitude as the x axis and latitude as the y axis
//! - [`Bounded`], the trait for everything which can be stored in [`QuadBuckets`]
//!
//! All comparisons are done on closed intervals: two boxes which only share an edge or a corner intersect.
//!
//! [`LatLon`]: struct.LatLon.html " "
//! [`BBox`]: struct.BBox.html " "
//! [`Bounded`]: trait.Bounded.html " "
//! [`QuadBuckets`]: ../quadbuckets/struct.QuadBuckets.html " "

use core::fmt::{self, Formatter, Display};
use std::{rc::Rc, sync::Arc};
use arrayvec::ArrayVec;

/// Smallest valid latitude.
pub const MIN_LAT: f64 = -90.0;
/// Largest valid latitude.
pub const MAX_LAT: f64 = 90.0;
/// Smallest valid longitude.
pub const MIN_LON: f64 = -180.0;
/// Largest valid longitude.
pub const MAX_LON: f64 = 180.0;

/// A point on the globe, in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LatLon {
    /// Latitude, the north-south position.
    pub lat: f64,
    /// Longitude, the east-west position.
    pub lon: f64,
}
impl LatLon {
    /// Creates a point from its latitude and longitude. No range checks are done; see [`is_valid`].
    ///
    /// [`is_valid`]: #method.is_valid " "
    #[inline(always)]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
    /// Returns `true` if both coordinates lie within the world, `false` otherwise.
    ///
    /// # Example
    /// ```rust
    /// # use quadbuckets::LatLon;
    /// assert!(LatLon::new(51.5, -0.12).is_valid());
    /// assert!(!LatLon::new(91.0, 0.0).is_valid());
    /// ```
    #[inline]
    pub fn is_valid(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.lat) && (MIN_LON..=MAX_LON).contains(&self.lon)
    }
}
impl Display for LatLon {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// An axis-aligned bounding box in latitude/longitude space.
///
/// The box is always normalized: the constructors sort the coordinates so that the minimum never exceeds the maximum.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BBox {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}
impl BBox {
    /// Creates a box spanning the two specified corners, in any order.
    #[inline]
    pub fn new(a: LatLon, b: LatLon) -> Self {
        Self::from_coords(a.lon, a.lat, b.lon, b.lat)
    }
    /// Creates a box from two longitude/latitude pairs, in any order.
    ///
    /// # Example
    /// ```rust
    /// # use quadbuckets::{BBox, LatLon};
    /// let bbox = BBox::from_coords(10.0, 5.0, -10.0, -5.0);
    /// assert_eq!(bbox.bottom_left(), LatLon::new(-5.0, -10.0));
    /// assert_eq!(bbox.top_right(), LatLon::new(5.0, 10.0));
    /// ```
    #[inline]
    pub fn from_coords(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Self {
        Self {
            xmin: lon1.min(lon2),
            ymin: lat1.min(lat2),
            xmax: lon1.max(lon2),
            ymax: lat1.max(lat2),
        }
    }
    /// Creates a degenerate box covering a single point.
    #[inline]
    pub const fn from_point(point: LatLon) -> Self {
        Self {
            xmin: point.lon,
            ymin: point.lat,
            xmax: point.lon,
            ymax: point.lat,
        }
    }
    /// Returns the box covering the entire coordinate domain.
    #[inline]
    pub const fn world() -> Self {
        Self {
            xmin: MIN_LON,
            ymin: MIN_LAT,
            xmax: MAX_LON,
            ymax: MAX_LAT,
        }
    }

    /// Grows the box to include the specified point.
    pub fn add_point(&mut self, point: LatLon) {
        self.xmin = self.xmin.min(point.lon);
        self.ymin = self.ymin.min(point.lat);
        self.xmax = self.xmax.max(point.lon);
        self.ymax = self.ymax.max(point.lat);
    }
    /// Grows the box to include another box.
    pub fn add_bbox(&mut self, other: &BBox) {
        self.add_point(other.bottom_left());
        self.add_point(other.top_right());
    }

    /// Returns `true` if the boxes share at least one point, `false` otherwise.
    #[inline]
    pub fn intersects(&self, other: &BBox) -> bool {
        self.xmin <= other.xmax
            && self.xmax >= other.xmin
            && self.ymin <= other.ymax
            && self.ymax >= other.ymin
    }
    /// Returns `true` if `other` lies entirely within this box, `false` otherwise.
    ///
    /// # Example
    /// ```rust
    /// # use quadbuckets::BBox;
    /// let outer = BBox::from_coords(0.0, 0.0, 10.0, 10.0);
    /// assert!(outer.bounds(&BBox::from_coords(2.0, 2.0, 10.0, 3.0)));
    /// assert!(!outer.bounds(&BBox::from_coords(2.0, 2.0, 11.0, 3.0)));
    /// ```
    #[inline]
    pub fn bounds(&self, other: &BBox) -> bool {
        self.xmin <= other.xmin
            && self.xmax >= other.xmax
            && self.ymin <= other.ymin
            && self.ymax >= other.ymax
    }
    /// Returns `true` if the box lies entirely within the coordinate domain.
    #[inline]
    pub fn is_in_world(&self) -> bool {
        Self::world().bounds(self)
    }

    /// Returns the corner points of the box: bottom-left, top-left, bottom-right, top-right. Corners which coincide because the box is degenerate are only listed once.
    pub fn points(&self) -> ArrayVec<[LatLon; 4]> {
        let mut points = ArrayVec::new();
        points.push(LatLon::new(self.ymin, self.xmin));
        if self.ymax != self.ymin {
            points.push(LatLon::new(self.ymax, self.xmin));
        }
        if self.xmax != self.xmin {
            points.push(LatLon::new(self.ymin, self.xmax));
            if self.ymax != self.ymin {
                points.push(LatLon::new(self.ymax, self.xmax));
            }
        }
        points
    }
    /// The corner with the smallest latitude and longitude.
    #[inline(always)]
    pub const fn bottom_left(&self) -> LatLon {
        LatLon::new(self.ymin, self.xmin)
    }
    /// The corner with the largest latitude and longitude.
    #[inline(always)]
    pub const fn top_right(&self) -> LatLon {
        LatLon::new(self.ymax, self.xmax)
    }
    /// Extent along the longitude axis, in degrees.
    #[inline(always)]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }
    /// Extent along the latitude axis, in degrees.
    #[inline(always)]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}
impl Default for BBox {
    /// The world box.
    #[inline]
    fn default() -> Self {
        Self::world()
    }
}
impl From<LatLon> for BBox {
    #[inline]
    fn from(op: LatLon) -> Self {
        Self::from_point(op)
    }
}
impl Display for BBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.bottom_left(), self.top_right())
    }
}

/// Values which occupy an area on the globe and thus can be indexed by [`QuadBuckets`].
///
/// The returned box **must not change** while the value is stored in an index. To move an entity, remove it, update it and add it back.
///
/// [`QuadBuckets`]: ../quadbuckets/struct.QuadBuckets.html " "
pub trait Bounded {
    /// Returns the bounding box of the value.
    fn bbox(&self) -> BBox;
}
impl Bounded for BBox {
    #[inline(always)]
    fn bbox(&self) -> BBox {
        *self
    }
}
impl Bounded for LatLon {
    #[inline(always)]
    fn bbox(&self) -> BBox {
        BBox::from_point(*self)
    }
}
impl<T: Bounded + ?Sized> Bounded for &T {
    #[inline(always)]
    fn bbox(&self) -> BBox {
        (**self).bbox()
    }
}
impl<T: Bounded + ?Sized> Bounded for Box<T> {
    #[inline(always)]
    fn bbox(&self) -> BBox {
        (**self).bbox()
    }
}
impl<T: Bounded + ?Sized> Bounded for Rc<T> {
    #[inline(always)]
    fn bbox(&self) -> BBox {
        (**self).bbox()
    }
}
impl<T: Bounded + ?Sized> Bounded for Arc<T> {
    #[inline(always)]
    fn bbox(&self) -> BBox {
        (**self).bbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect() {
        let a = BBox::from_coords(0.0, 0.0, 1.0, 1.0);
        let b = BBox::from_coords(1.0, 1.0, 2.0, 2.0);
        let c = BBox::from_coords(1.5, 0.0, 2.0, 0.5);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn world_bounds_everything_inside() {
        let world = BBox::world();
        assert!(world.bounds(&BBox::from_coords(-180.0, -90.0, 180.0, 90.0)));
        assert!(world.bounds(&BBox::from_point(LatLon::new(12.0, 34.0))));
        assert!(!BBox::from_coords(0.0, 0.0, 200.0, 10.0).is_in_world());
    }

    #[test]
    fn degenerate_points_are_collapsed() {
        assert_eq!(BBox::from_point(LatLon::new(1.0, 2.0)).points().len(), 1);
        assert_eq!(BBox::from_coords(0.0, 1.0, 5.0, 1.0).points().len(), 2);
        assert_eq!(BBox::from_coords(0.0, 1.0, 0.0, 4.0).points().len(), 2);
        let full = BBox::from_coords(0.0, 0.0, 1.0, 1.0).points();
        assert_eq!(full.len(), 4);
        assert!(full.contains(&LatLon::new(1.0, 0.0)));
        assert!(full.contains(&LatLon::new(0.0, 1.0)));
    }

    #[test]
    fn growing() {
        let mut bbox = BBox::from_point(LatLon::new(0.0, 0.0));
        bbox.add_point(LatLon::new(-3.0, 4.0));
        bbox.add_bbox(&BBox::from_coords(-1.0, 1.0, 2.0, 2.0));
        assert_eq!(bbox, BBox::from_coords(-1.0, -3.0, 4.0, 2.0));
        assert_eq!(bbox.width(), 5.0);
        assert_eq!(bbox.height(), 5.0);
    }
}
