//! Spatial index over geographic bounding boxes, built as an adaptive quadtree of buckets.
//!
//! Every bucket covers one cell of the recursive subdivision described in the [`quad_tiling`] module. Entities are stored in the deepest bucket whose cell contains every corner of their bounding box; entities which straddle a quadrant boundary stay in the bucket above it. A leaf bucket which accumulates more entities than allowed by the [`Config`] is split, pushing its content down into lazily created child buckets, and buckets which become empty are unlinked again.
//!
//! # Example
//! ```rust
//! use quadbuckets::{QuadBuckets, BBox, LatLon};
//!
//! let mut buckets = QuadBuckets::new();
//! for i in 0..100 {
//!     let lon = -170.0 + f64::from(i) * 3.0;
//!     buckets.add(BBox::from_coords(lon, 10.0, lon + 1.0, 11.0));
//! }
//! // A bucket holds 16 entities by default before being split:
//! assert!(buckets.root().is_branch());
//!
//! // Boxes sharing an edge intersect
//! let query = BBox::from_coords(-169.0, 0.0, -166.0, 10.0);
//! assert_eq!(buckets.search(&query).len(), 2);
//!
//! buckets.retain(|bbox| bbox.bottom_left().lon < 0.0);
//! assert!(buckets.search(&BBox::from_point(LatLon::new(10.5, 1.5))).is_empty());
//! ```
//!
//! [`quad_tiling`]: ../quad_tiling/index.html " "
//! [`Config`]: ../config/struct.Config.html " "

mod base;
mod iter;
mod node;
mod node_ref;
mod search;

use node::Node;
use base::NO_CACHE;
pub use base::QuadBuckets;
pub use node_ref::NodeRef;
pub use iter::{Iter, CursorMut};

#[cfg(test)]
mod tests;
