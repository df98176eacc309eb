use core::fmt::{self, Formatter, Debug};
use crate::{
    bbox::BBox,
    quad_tiling::TILES_PER_LEVEL,
    util::ArrayMap,
};
use super::{QuadBuckets, Node};

/// A reference to a bucket in a [`QuadBuckets`] index.
///
/// Since this type does not point to the bucket directly, but rather to the index the bucket is in and the key of the bucket in the storage, it can be used to walk the structure of the tree.
///
/// [`QuadBuckets`]: struct.QuadBuckets.html " "
pub struct NodeRef<'a, T> {
    tree: &'a QuadBuckets<T>,
    key: usize,
}
impl<'a, T> NodeRef<'a, T> {
    /// Creates a new `NodeRef` pointing to the specified key in the storage without doing bounds checking.
    ///
    /// # Safety
    /// Causes *immediate* undefined behavior if the specified key does not belong to a bucket linked into the tree.
    #[inline(always)]
    pub(super) unsafe fn new_raw_unchecked(tree: &'a QuadBuckets<T>, key: usize) -> Self {
        Self { tree, key }
    }
    /// Returns the raw storage key for the bucket.
    #[inline(always)]
    pub fn raw_key(&self) -> usize {
        self.key
    }
    /// Returns a reference to the parent bucket, or `None` if this is the root.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|x| unsafe {
            // SAFETY: buckets never outlive their parents
            Self::new_raw_unchecked(self.tree, x)
        })
    }
    /// Returns `true` if the bucket is the root, `false` otherwise.
    #[inline(always)]
    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }
    /// Returns `true` if the bucket was never split, `false` otherwise.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }
    /// Returns `true` if the bucket was split, `false` otherwise. A branch may have no children left after its quadrants were emptied.
    #[inline]
    pub fn is_branch(&self) -> bool {
        !self.is_leaf()
    }
    /// Returns `true` if at least one child bucket exists.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.node().has_children()
    }
    /// Returns the depth of the bucket. The root is at level 0.
    #[inline(always)]
    pub fn level(&self) -> u8 {
        self.node().level
    }
    /// Returns the quad path of the bucket, as described in the [`quad_tiling`] module.
    ///
    /// [`quad_tiling`]: ../quad_tiling/index.html " "
    #[inline(always)]
    pub fn quad(&self) -> u64 {
        self.node().quad
    }
    /// Returns the area covered by the bucket.
    #[inline(always)]
    pub fn bbox(&self) -> BBox {
        self.node().bbox
    }
    /// Returns the entities stored directly in this bucket, which is empty for most branches.
    #[inline]
    pub fn content(&self) -> &'a [T] {
        self.node().content.as_deref().unwrap_or(&[])
    }

    /// Returns references to the children in quadrant order, or `None` if the bucket is a leaf. Quadrants which hold nothing have no bucket.
    #[inline]
    pub fn children(&self) -> Option<[Option<Self>; TILES_PER_LEVEL]> {
        let tree = self.tree;
        self.node().children().map(|children| {
            (*children).array_map(|child| {
                child.map(|key| unsafe {
                    // SAFETY: unlinked buckets are removed from their parent's children
                    Self::new_raw_unchecked(tree, key)
                })
            })
        })
    }
    /// Returns a reference to the `n`-th child, or `None` if the bucket is a leaf or has no bucket in that quadrant. Indexing follows the quadrant order, from 0 to 3.
    ///
    /// # Panics
    /// Will panic if `n > 3`.
    #[inline]
    pub fn nth_child(&self, n: u8) -> Option<Self> {
        assert!(
            (n as usize) < TILES_PER_LEVEL,
            "\
buckets have up to 4 children, at indices from 0 to 3, \
but child at index {} was requested",
            n,
        );
        let key = self.node().children()?[n as usize]?;
        Some(unsafe {
            // SAFETY: as in `children`
            Self::new_raw_unchecked(self.tree, key)
        })
    }

    #[inline(always)]
    fn node(&self) -> &'a Node<T> {
        self.tree.node(self.key)
    }
}
impl<T> Copy for NodeRef<'_, T> {}
impl<T> Clone for NodeRef<'_, T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: Debug> Debug for NodeRef<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", &self.key)
            .field("level", &self.level())
            .field("bbox", &self.bbox())
            .field("content", &self.content())
            .finish()
    }
}
