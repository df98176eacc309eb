use core::{
    fmt::{self, Formatter, Debug},
    iter::FromIterator,
    sync::atomic::{AtomicUsize, Ordering},
};
use granite::{Storage, SparseVec};
use crate::{
    bbox::Bounded,
    config::Config,
};
use super::{Node, NodeRef, Iter, CursorMut};

/// Marks an empty search cache.
pub(super) const NO_CACHE: usize = usize::MAX;

/// An adaptive quadtree which stores entities in buckets according to their bounding boxes.
///
/// See the [module-level documentation] for more.
///
/// [module-level documentation]: index.html " "
pub struct QuadBuckets<T> {
    pub(super) storage: SparseVec<Node<T>>,
    pub(super) root: usize,
    pub(super) len: usize,
    /// The deepest bucket which fully contained the previous search box, or `NO_CACHE`.
    pub(super) search_cache: AtomicUsize,
    pub(super) config: Config,
}
impl<T> QuadBuckets<T> {
    /// Creates an empty index with the default configuration.
    ///
    /// # Example
    /// ```rust
    /// # use quadbuckets::{QuadBuckets, BBox};
    /// let buckets = QuadBuckets::<BBox>::new();
    /// assert!(buckets.is_empty());
    /// assert!(buckets.root().is_leaf());
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::with_config(Config::new())
    }
    /// Creates an empty index with the specified splitting parameters.
    pub fn with_config(config: Config) -> Self {
        let mut storage = SparseVec::new();
        let root = storage.add(Node::root());
        Self {
            storage,
            root,
            len: 0,
            search_cache: AtomicUsize::new(NO_CACHE),
            config,
        }
    }

    /// Returns the number of entities in the index. Duplicates are counted separately.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }
    /// Returns `true` if the index holds no entities, `false` otherwise.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Returns the splitting parameters the index was created with.
    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }
    /// Removes all entities, leaving a single empty root bucket.
    pub fn clear(&mut self) {
        self.storage = SparseVec::new();
        self.root = self.add_node(Node::root());
        self.len = 0;
        self.clear_search_cache();
    }

    /// Returns a reference to the root bucket, which can be used to inspect the structure of the tree.
    #[inline]
    pub fn root(&self) -> NodeRef<'_, T> {
        unsafe {
            // SAFETY: the root is never unlinked
            NodeRef::new_raw_unchecked(self, self.root)
        }
    }
    /// Returns the number of buckets currently linked into the tree, including the root.
    pub fn node_count(&self) -> usize {
        self.storage.len() - self.storage.num_holes()
    }
    /// Returns the number of arena slots left behind by unlinked buckets, which get reused as new buckets are created.
    #[inline]
    pub fn num_holes(&self) -> usize {
        self.storage.num_holes()
    }

    /// Returns an iterator over all entities, visiting every one of them exactly once.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }
    /// Returns a cursor which walks over all entities and allows removing them along the way.
    #[inline]
    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::new(self)
    }
    /// Copies references to all entities into a vector.
    pub fn to_vec(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len);
        out.extend(self.iter());
        out
    }
    /// Removes every entity for which the predicate returns `false`. Returns `true` if anything was removed.
    ///
    /// # Example
    /// ```rust
    /// # use quadbuckets::{QuadBuckets, LatLon};
    /// let mut buckets: QuadBuckets<_> = (0..40)
    ///     .map(|i| LatLon::new(f64::from(i), f64::from(i)))
    ///     .collect();
    /// assert!(buckets.retain(|point| point.lat < 10.0));
    /// assert_eq!(buckets.len(), 10);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) -> bool {
        let mut changed = false;
        let mut cursor = self.cursor_mut();
        while let Some(entity) = cursor.advance() {
            if !f(entity) {
                cursor.remove_current();
                changed = true;
            }
        }
        changed
    }

    #[inline]
    pub(super) fn clear_search_cache(&self) {
        self.search_cache.store(NO_CACHE, Ordering::Relaxed);
    }

    #[inline]
    pub(super) fn node(&self, key: usize) -> &Node<T> {
        debug_assert!(
            self.storage.contains_key(&key),
            "\
debug key check failed: tried to reference key {:?} which is not present in the storage",
            key,
        );
        unsafe {
            // SAFETY: keys of linked buckets are always valid; sparse storage panics on holes
            self.storage.get_unchecked(&key)
        }
    }
    #[inline]
    pub(super) fn node_mut(&mut self, key: usize) -> &mut Node<T> {
        debug_assert!(
            self.storage.contains_key(&key),
            "\
debug key check failed: tried to reference key {:?} which is not present in the storage",
            key,
        );
        unsafe {
            // SAFETY: as above
            self.storage.get_unchecked_mut(&key)
        }
    }
    #[inline]
    pub(super) fn add_node(&mut self, node: Node<T>) -> usize {
        self.storage.add(node)
    }
    #[inline]
    pub(super) fn remove_node(&mut self, key: usize) -> Node<T> {
        self.storage.remove(&key)
    }
}
impl<T: Bounded> QuadBuckets<T> {
    /// Adds an entity to the index. Always returns `true`: equal entities may be stored several times.
    ///
    /// # Example
    /// ```rust
    /// # use quadbuckets::{QuadBuckets, LatLon};
    /// let mut buckets = QuadBuckets::new();
    /// assert!(buckets.add(LatLon::new(52.52, 13.40)));
    /// assert!(buckets.add(LatLon::new(52.52, 13.40)));
    /// assert_eq!(buckets.len(), 2);
    /// ```
    pub fn add(&mut self, entity: T) -> bool {
        let bucket = self.find_or_create_bucket(&entity.bbox());
        self.insert_here(bucket, entity);
        self.len += 1;
        true
    }
    /// Adds every entity from the iterator. Returns `true` if anything was added.
    pub fn add_all(&mut self, entities: impl IntoIterator<Item = T>) -> bool {
        let mut changed = false;
        for entity in entities {
            changed |= self.add(entity);
        }
        changed
    }
}
impl<T: Bounded + PartialEq> QuadBuckets<T> {
    /// Removes an entity equal to the specified one and returns it, or returns `None` if there was none.
    ///
    /// The entity is found through its bounding box, without scanning the tree.
    pub fn take(&mut self, entity: &T) -> Option<T> {
        // Removal may unlink the cached bucket
        self.clear_search_cache();
        let bucket = self.find_bucket(&entity.bbox());
        let removed = self.remove_content(bucket, entity)?;
        self.len -= 1;
        Some(removed)
    }
    /// Removes an entity equal to the specified one. Returns `true` if one was found, `false` otherwise.
    ///
    /// # Example
    /// ```rust
    /// # use quadbuckets::{QuadBuckets, BBox};
    /// let mut buckets = QuadBuckets::new();
    /// let bbox = BBox::from_coords(1.0, 1.0, 2.0, 2.0);
    /// buckets.add(bbox);
    /// assert!(buckets.remove(&bbox));
    /// assert!(!buckets.remove(&bbox));
    /// ```
    #[inline]
    pub fn remove(&mut self, entity: &T) -> bool {
        self.take(entity).is_some()
    }
    /// Returns `true` if an entity equal to the specified one is stored in the index, `false` otherwise.
    pub fn contains(&self, entity: &T) -> bool {
        let bucket = self.node(self.find_bucket(&entity.bbox()));
        bucket
            .content
            .as_ref()
            .map_or(false, |content| content.contains(entity))
    }

    /// Removes an entity equal to each of the specified ones. Returns `true` if anything was removed.
    pub fn remove_all<'a>(&mut self, entities: impl IntoIterator<Item = &'a T>) -> bool
    where T: 'a,
    {
        let mut changed = false;
        for entity in entities {
            changed |= self.remove(entity);
        }
        changed
    }
    /// Returns `true` if every specified entity is stored in the index.
    pub fn contains_all<'a>(&self, entities: impl IntoIterator<Item = &'a T>) -> bool
    where T: 'a,
    {
        entities.into_iter().all(|entity| self.contains(entity))
    }
    /// Removes every entity which is not equal to one of the specified ones. Every removal is attempted; returns `true` if anything was removed.
    pub fn retain_all(&mut self, keep: &[T]) -> bool {
        self.retain(|entity| keep.contains(entity))
    }
}

impl<T> Default for QuadBuckets<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
impl<T> Debug for QuadBuckets<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuadBuckets")
            .field("len", &self.len)
            .field("node_count", &self.node_count())
            .field("config", &self.config)
            .finish()
    }
}
impl<T: Bounded> Extend<T> for QuadBuckets<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}
impl<T: Bounded> FromIterator<T> for QuadBuckets<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buckets = Self::new();
        buckets.add_all(iter);
        buckets
    }
}
impl<'a, T> IntoIterator for &'a QuadBuckets<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
