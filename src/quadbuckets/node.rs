use core::num::NonZeroIsize;
use granite::MoveFix;
use tracing::trace;
use crate::{
    bbox::{BBox, Bounded, LatLon, MAX_LAT, MAX_LON},
    quad_tiling::{self, TILES_PER_LEVEL},
    util::corrupted,
};
use super::QuadBuckets;

/// A bucket of a quad buckets index.
///
/// Created by the index internally; the public view of a bucket is [`NodeRef`].
///
/// [`NodeRef`]: struct.NodeRef.html " "
#[derive(Clone, Debug)]
pub struct Node<T> {
    pub(super) level: u8,
    pub(super) quad: u64,
    pub(super) bbox: BBox,
    pub(super) parent: Option<usize>,
    pub(super) content: Option<Vec<T>>,
    pub(super) data: NodeData,
}
impl<T> Node<T> {
    /// Creates the root bucket, which spans the whole world.
    #[inline]
    pub(super) fn root() -> Self {
        Self {
            level: 0,
            quad: 0,
            bbox: BBox::world(),
            parent: None,
            content: None,
            data: NodeData::Leaf,
        }
    }
    /// Creates an empty leaf for the `index`-th quadrant of `parent`, which is stored at `parent_key`.
    pub(super) fn child(parent: &Node<T>, parent_key: usize, index: u8) -> Self {
        let quad = quad_tiling::child_quad(parent.quad, parent.level, index);
        let bottom_left = quad_tiling::tile_to_lat_lon(quad);
        let top_right = LatLon::new(
            bottom_left.lat + parent.bbox.height() / 2.0,
            bottom_left.lon + parent.bbox.width() / 2.0,
        );
        Self {
            level: parent.level + 1,
            quad,
            bbox: BBox::new(bottom_left, top_right),
            parent: Some(parent_key),
            content: None,
            data: NodeData::Leaf,
        }
    }

    #[inline]
    pub(super) fn is_leaf(&self) -> bool {
        match self.data {
            NodeData::Leaf => true,
            NodeData::Branch { .. } => false,
        }
    }
    #[inline]
    pub(super) fn children(&self) -> Option<&[Option<usize>; TILES_PER_LEVEL]> {
        match &self.data {
            NodeData::Branch { children } => Some(children),
            NodeData::Leaf => None,
        }
    }
    #[inline]
    pub(super) fn has_children(&self) -> bool {
        self.children()
            .map_or(false, |children| children.iter().any(Option::is_some))
    }
    #[inline(always)]
    pub(super) fn has_content(&self) -> bool {
        self.content.is_some()
    }
    /// Whether the bucket may be unlinked from its parent.
    #[inline]
    pub(super) fn can_remove(&self) -> bool {
        !self.has_content() && !self.has_children()
    }
    /// Returns the first child in quadrant order.
    #[inline]
    pub(super) fn first_child(&self) -> Option<usize> {
        self.children()
            .and_then(|children| children.iter().find_map(|c| *c))
    }
    /// Returns the first child stored after `key` in quadrant order.
    pub(super) fn child_after(&self, key: usize) -> Option<usize> {
        let children = match self.children() {
            Some(x) => x,
            None => corrupted("a leaf bucket was referenced as a parent"),
        };
        let position = match children.iter().position(|c| *c == Some(key)) {
            Some(x) => x,
            None => corrupted("a bucket is missing from its parent's children"),
        };
        children[position + 1..].iter().find_map(|c| *c)
    }
    /// Whether `bbox` lies within the cell of the bucket, treating the cell as half-open on its north and east edges except where they are the edges of the world.
    ///
    /// Entities touching such an edge from the outside are stored in the neighboring cell, so a search box merely reaching it is not enclosed.
    pub(super) fn encloses(&self, bbox: &BBox) -> bool {
        let top_right = self.bbox.top_right();
        let other = bbox.top_right();
        self.bbox.bounds(bbox)
            && (other.lon < top_right.lon || top_right.lon >= MAX_LON)
            && (other.lat < top_right.lat || top_right.lat >= MAX_LAT)
    }
    /// Appends the entities of the bucket which intersect `bbox` to `out`.
    #[inline]
    pub(super) fn search_contents<'a>(&'a self, bbox: &BBox, out: &mut Vec<&'a T>)
    where T: Bounded,
    {
        if let Some(content) = &self.content {
            out.extend(content.iter().filter(|x| x.bbox().intersects(bbox)));
        }
    }
}
impl<T> MoveFix for Node<T> {
    #[inline]
    unsafe fn fix_shift<S>(storage: &mut S, shifted_from: usize, shifted_by: NonZeroIsize)
    where S: granite::ListStorage<Element = Self>,
    {
        let fix_starting_from = if shifted_by.get() > 0 {
            shifted_from + 1 // Insertions don't move the new element
        } else {
            shifted_from
        };
        for i in fix_starting_from..granite::ListStorage::len(storage) {
            let old_index = (i as isize - shifted_by.get()) as usize;
            Self::fix_move(storage, old_index, i);
        }
    }

    #[inline]
    unsafe fn fix_move<S>(storage: &mut S, previous_index: usize, current_index: usize)
    where S: granite::ListStorage<Element = Self>,
    {
        let children = granite::ListStorage::get_unchecked(storage, current_index)
            .children()
            .copied();
        if let Some(children) = children {
            for child in children.iter().flatten() {
                granite::ListStorage::get_unchecked_mut(storage, *child).parent = Some(current_index);
            }
        }
        let parent_index = match granite::ListStorage::get_unchecked(storage, current_index).parent {
            Some(x) => x,
            None => return,
        };
        let parent = granite::ListStorage::get_unchecked_mut(storage, parent_index);
        let children = match &mut parent.data {
            NodeData::Branch { children } => children,
            NodeData::Leaf => corrupted("a leaf bucket was referenced as a parent"),
        };
        for child in children.iter_mut() {
            if *child == Some(previous_index) {
                *child = Some(current_index);
                return;
            }
        }
        corrupted("failed to find a moved bucket in its parent's children")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(super) enum NodeData {
    /// A bucket which was never split.
    Leaf,
    /// A bucket which was split at least once. Children are created lazily and unlinked once empty.
    Branch {
        children: [Option<usize>; TILES_PER_LEVEL],
    },
}

/// Returns the quadrant which every corner of `bbox` falls into at the specified level, or `None` if the box spans several quadrants.
pub(super) fn quadrant_index(bbox: &BBox, level: u8) -> Option<u8> {
    let mut points = bbox.points().into_iter();
    let index = quad_tiling::index(points.next()?, level);
    if points.all(|point| quad_tiling::index(point, level) == index) {
        Some(index)
    } else {
        None
    }
}

impl<T: Bounded> QuadBuckets<T> {
    /// Finds the bucket which holds, or would hold, an entity with the specified box, without creating buckets.
    pub(super) fn find_bucket(&self, bbox: &BBox) -> usize {
        let mut key = self.root;
        loop {
            let node = self.node(key);
            if !node.has_children() {
                return key;
            }
            let child = quadrant_index(bbox, node.level).and_then(|index| {
                node.children().and_then(|children| children[usize::from(index)])
            });
            match child {
                Some(child) => key = child,
                None => return key,
            }
        }
    }
    /// Finds the bucket in which a new entity with the specified box should be stored, creating the child buckets on the way if they were unlinked.
    pub(super) fn find_or_create_bucket(&mut self, bbox: &BBox) -> usize {
        let mut key = self.root;
        loop {
            let node = self.node(key);
            if !node.has_children() {
                return key;
            }
            match quadrant_index(bbox, node.level) {
                Some(index) => key = self.get_or_create_child(key, index),
                None => return key,
            }
        }
    }
    /// Returns the `index`-th child of a branch bucket, creating it if it does not exist yet.
    fn get_or_create_child(&mut self, key: usize, index: u8) -> usize {
        let node = self.node(key);
        let existing = match &node.data {
            NodeData::Branch { children } => children[usize::from(index)],
            NodeData::Leaf => corrupted("tried to create a child of a leaf bucket"),
        };
        if let Some(child) = existing {
            return child;
        }
        let child = Node::child(node, key, index);
        let child = self.add_node(child);
        if let NodeData::Branch { children } = &mut self.node_mut(key).data {
            children[usize::from(index)] = Some(child);
        }
        child
    }

    /// Stores an entity in the specified bucket, splitting it if it overflows.
    pub(super) fn insert_here(&mut self, key: usize, entity: T) {
        let max_objects = self.config.max_objects_per_level();
        let max_level = self.config.max_level();
        let node = self.node_mut(key);
        let can_split = node.is_leaf() && node.level < max_level;
        let content = node.content.get_or_insert_with(Vec::new);
        content.push(entity);
        if can_split && content.len() > max_objects {
            self.split(key);
        }
    }
    /// Pushes the content of a leaf bucket down into child buckets, keeping the entities which span several quadrants.
    fn split(&mut self, key: usize) {
        let node = self.node_mut(key);
        let content = node.content.take().unwrap_or_default();
        // Even if everything stays here, the bucket is not a leaf anymore
        node.data = NodeData::Branch {
            children: [None; TILES_PER_LEVEL],
        };
        let level = node.level;
        trace!(
            level,
            quad = %format_args!("{:x}", node.quad),
            entities = content.len(),
            "splitting bucket"
        );
        for entity in content {
            match quadrant_index(&entity.bbox(), level) {
                Some(index) => {
                    let child = self.get_or_create_child(key, index);
                    self.insert_here(child, entity);
                }
                None => self
                    .node_mut(key)
                    .content
                    .get_or_insert_with(Vec::new)
                    .push(entity),
            }
        }
    }
}

impl<T> QuadBuckets<T> {
    /// Removes the entity at `position` from the content of the bucket, then unlinks the bucket and its ancestors if they became empty.
    pub(super) fn remove_content_at(&mut self, key: usize, position: usize) -> T {
        let node = self.node_mut(key);
        let content = match &mut node.content {
            Some(x) => x,
            None => corrupted("tried to remove an entity from an empty bucket"),
        };
        let entity = content.remove(position);
        if content.is_empty() {
            node.content = None;
        }
        if node.can_remove() {
            self.unlink(key);
        }
        entity
    }
    /// Unlinks an empty bucket from its parent, propagating to the ancestors which become empty in turn. The root is never unlinked.
    pub(super) fn unlink(&mut self, key: usize) {
        let mut key = key;
        loop {
            let node = self.node(key);
            let parent = match node.parent {
                Some(x) => x,
                None => return,
            };
            if !node.can_remove() {
                corrupted("attempt to unlink a bucket which still has content or children");
            }
            let children = match &mut self.node_mut(parent).data {
                NodeData::Branch { children } => children,
                NodeData::Leaf => corrupted("a leaf bucket was referenced as a parent"),
            };
            match children.iter_mut().find(|c| **c == Some(key)) {
                Some(slot) => *slot = None,
                None => corrupted("a bucket is missing from its parent's children"),
            }
            let removed = self.remove_node(key);
            trace!(
                level = removed.level,
                quad = %format_args!("{:x}", removed.quad),
                "unlinked empty bucket"
            );
            if !self.node(parent).can_remove() {
                return;
            }
            key = parent;
        }
    }
}
impl<T: PartialEq> QuadBuckets<T> {
    /// Removes the first entity equal to `entity` from the content of the bucket, unlinking empty buckets afterwards.
    pub(super) fn remove_content(&mut self, key: usize, entity: &T) -> Option<T> {
        let position = self
            .node(key)
            .content
            .as_ref()?
            .iter()
            .position(|x| x == entity)?;
        Some(self.remove_content_at(key, position))
    }
}
