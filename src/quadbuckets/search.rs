//! Intersection queries and the search cache.
//!
//! Consecutive searches tend to look at nearby areas, so the index remembers the deepest bucket which enclosed the previous search box. The next search starts from that bucket, walking up only as far as needed to contain the new box, instead of descending from the root every time.

use core::sync::atomic::Ordering;
use tracing::debug;
use crate::bbox::{BBox, Bounded};
use super::{QuadBuckets, NO_CACHE};

impl<T: Bounded> QuadBuckets<T> {
    /// Returns all entities whose bounding boxes intersect the specified box, in no particular order.
    ///
    /// Boxes which lie partially or entirely outside the world are accepted; the parts outside simply never match anything.
    ///
    /// # Example
    /// ```rust
    /// # use quadbuckets::{QuadBuckets, BBox, LatLon};
    /// let mut buckets = QuadBuckets::new();
    /// buckets.add(LatLon::new(48.85, 2.35));
    /// buckets.add(LatLon::new(40.71, -74.0));
    ///
    /// let europe = BBox::from_coords(-10.0, 35.0, 30.0, 60.0);
    /// assert_eq!(buckets.search(&europe), vec![&LatLon::new(48.85, 2.35)]);
    /// ```
    pub fn search(&self, bbox: &BBox) -> Vec<&T> {
        let mut out = Vec::new();
        self.search_into(bbox, &mut out);
        out
    }
    /// Same as [`search`], but appends the results to an existing vector, allowing its allocation to be reused between queries.
    ///
    /// [`search`]: #method.search " "
    pub fn search_into<'a>(&'a self, bbox: &BBox, out: &mut Vec<&'a T>) {
        let cached = self.search_cache.load(Ordering::Relaxed);
        let start = if cached == NO_CACHE { self.root } else { cached };
        let start = self.containing_ancestor(start, bbox);
        let deepest = self.search_from(start, bbox, out);
        self.search_cache.store(deepest, Ordering::Relaxed);
    }
    /// Same as [`search`], but always starts from the root and neither reads nor updates the search cache.
    ///
    /// [`search`]: #method.search " "
    pub fn search_uncached(&self, bbox: &BBox) -> Vec<&T> {
        let mut out = Vec::new();
        self.search_from(self.root, bbox, &mut out);
        out
    }

    /// Walks up from `key` until reaching a bucket which fully contains `bbox`, falling back to the root.
    fn containing_ancestor(&self, key: usize, bbox: &BBox) -> usize {
        let mut key = key;
        loop {
            let node = self.node(key);
            if node.encloses(bbox) {
                return key;
            }
            match node.parent {
                Some(parent) => key = parent,
                None => {
                    debug!(%bbox, "search box is out of the world");
                    return key;
                }
            }
        }
    }
    /// Searches the subtree of `start`, then the content of its ancestors, which may hold entities spanning several quadrants. Returns the deepest bucket which encloses `bbox`.
    fn search_from<'a>(&'a self, start: usize, bbox: &BBox, out: &mut Vec<&'a T>) -> usize {
        // Saved before descending, since the descent moves the cache candidate down
        let mut ancestor = self.node(start).parent;
        let mut deepest = start;
        self.search_subtree(start, bbox, out, &mut deepest);
        while let Some(key) = ancestor {
            let node = self.node(key);
            node.search_contents(bbox, out);
            ancestor = node.parent;
        }
        deepest
    }
    fn search_subtree<'a>(
        &'a self,
        key: usize,
        bbox: &BBox,
        out: &mut Vec<&'a T>,
        deepest: &mut usize,
    ) {
        let node = self.node(key);
        if !node.bbox.intersects(bbox) {
            return;
        }
        if node.encloses(bbox) {
            *deepest = key;
        }
        node.search_contents(bbox, out);
        if let Some(children) = node.children() {
            for child in children.iter().flatten() {
                self.search_subtree(*child, bbox, out, deepest);
            }
        }
    }
}
