//! Iteration over every stored entity.
//!
//! Buckets are visited depth-first, parents before children and children in quadrant order; within a bucket, entities are produced in insertion order.

use core::iter::FusedIterator;
use crate::util::corrupted;
use super::QuadBuckets;

impl<T> QuadBuckets<T> {
    fn next_sibling(&self, key: usize) -> Option<usize> {
        let parent = self.node(key).parent?;
        self.node(parent).child_after(key)
    }
    /// The bucket following `key` in depth-first order.
    fn next_node(&self, key: usize) -> Option<usize> {
        if let Some(child) = self.node(key).first_child() {
            return Some(child);
        }
        let mut key = key;
        loop {
            if let Some(sibling) = self.next_sibling(key) {
                return Some(sibling);
            }
            key = self.node(key).parent?;
        }
    }
    /// The first bucket after `start` in depth-first order which holds entities.
    fn next_content_node(&self, start: usize) -> Option<usize> {
        let mut key = start;
        loop {
            key = self.next_node(key)?;
            if key == start {
                corrupted("depth-first traversal looped back to its starting bucket");
            }
            if self.node(key).has_content() {
                return Some(key);
            }
        }
    }
    fn first_content_node(&self) -> Option<usize> {
        if self.node(self.root).has_content() {
            Some(self.root)
        } else {
            self.next_content_node(self.root)
        }
    }
    #[inline]
    fn content_len(&self, key: usize) -> usize {
        self.node(key).content.as_ref().map_or(0, Vec::len)
    }
}

/// An iterator over all entities of a [`QuadBuckets`] index.
///
/// Created by the [`iter`] method.
///
/// [`QuadBuckets`]: struct.QuadBuckets.html " "
/// [`iter`]: struct.QuadBuckets.html#method.iter " "
#[derive(Debug)]
pub struct Iter<'a, T> {
    tree: &'a QuadBuckets<T>,
    current: Option<usize>,
    content_index: usize,
    produced: usize,
}
impl<'a, T> Iter<'a, T> {
    pub(super) fn new(tree: &'a QuadBuckets<T>) -> Self {
        Self {
            tree,
            current: tree.first_content_node(),
            content_index: 0,
            produced: 0,
        }
    }
}
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            let key = self.current?;
            let content = tree.node(key).content.as_deref().unwrap_or(&[]);
            if let Some(entity) = content.get(self.content_index) {
                self.content_index += 1;
                self.produced += 1;
                return Some(entity);
            }
            self.current = tree.next_content_node(key);
            self.content_index = 0;
        }
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tree.len() - self.produced;
        (remaining, Some(remaining))
    }
}
impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// A cursor over all entities of a [`QuadBuckets`] index which can remove the entity it last produced.
///
/// Created by the [`cursor_mut`] method. Entities are visited in the same order as with [`Iter`], and every entity which is not removed is produced exactly once.
///
/// # Example
/// ```rust
/// # use quadbuckets::{QuadBuckets, LatLon};
/// let mut buckets: QuadBuckets<_> = (-30..30)
///     .map(|i| LatLon::new(f64::from(i), f64::from(i) * 2.0))
///     .collect();
/// let mut cursor = buckets.cursor_mut();
/// while let Some(point) = cursor.advance() {
///     if point.lat < 0.0 {
///         cursor.remove_current();
///     }
/// }
/// assert_eq!(buckets.len(), 30);
/// ```
///
/// [`QuadBuckets`]: struct.QuadBuckets.html " "
/// [`cursor_mut`]: struct.QuadBuckets.html#method.cursor_mut " "
/// [`Iter`]: struct.Iter.html " "
#[derive(Debug)]
pub struct CursorMut<'a, T> {
    tree: &'a mut QuadBuckets<T>,
    current: Option<usize>,
    content_index: usize,
    /// Set by `advance` and reset by `remove_current`.
    removable: bool,
}
impl<'a, T> CursorMut<'a, T> {
    pub(super) fn new(tree: &'a mut QuadBuckets<T>) -> Self {
        let current = tree.first_content_node();
        Self {
            tree,
            current,
            content_index: 0,
            removable: false,
        }
    }
    /// Moves to the next bucket with entities if the current one is exhausted. Returns the bucket and the position of the next entity.
    fn seek(&mut self) -> Option<(usize, usize)> {
        loop {
            let key = self.current?;
            if self.content_index < self.tree.content_len(key) {
                return Some((key, self.content_index));
            }
            self.current = self.tree.next_content_node(key);
            self.content_index = 0;
        }
    }
    fn entity(&self, key: usize, position: usize) -> Option<&T> {
        self.tree.node(key).content.as_ref()?.get(position)
    }

    /// Returns the entity which the next call to [`advance`] will produce, without moving the cursor.
    ///
    /// [`advance`]: #method.advance " "
    pub fn peek(&mut self) -> Option<&T> {
        let (key, position) = self.seek()?;
        self.entity(key, position)
    }
    /// Produces the next entity, which can then be removed with [`remove_current`]. Returns `None` once every entity was visited.
    ///
    /// [`remove_current`]: #method.remove_current " "
    pub fn advance(&mut self) -> Option<&T> {
        let (key, position) = match self.seek() {
            Some(x) => x,
            None => {
                self.removable = false;
                return None;
            }
        };
        self.content_index += 1;
        self.removable = true;
        self.entity(key, position)
    }
    /// Removes the entity last produced by [`advance`] and returns it. Returns `None` if nothing was produced since the last removal or the cursor is exhausted.
    ///
    /// The cursor stays in place: the following call to `advance` produces the entity which would have come next had nothing been removed.
    ///
    /// [`advance`]: #method.advance " "
    pub fn remove_current(&mut self) -> Option<T> {
        if !self.removable {
            return None;
        }
        self.removable = false;
        let key = self.current?;
        let position = self.content_index.checked_sub(1)?;
        let node = self.tree.node(key);
        // Removing the last entity of a childless bucket unlinks it, so the way forward has to be found first
        let unlinks = self.tree.content_len(key) == 1 && !node.has_children();
        let successor = if unlinks {
            self.tree.next_content_node(key)
        } else {
            None
        };
        let entity = self.tree.remove_content_at(key, position);
        if unlinks {
            self.current = successor;
            self.content_index = 0;
        } else {
            self.content_index = position;
        }
        self.tree.len -= 1;
        self.tree.clear_search_cache();
        Some(entity)
    }
}
