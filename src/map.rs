extern crate alloc;

use alloc::{boxed::Box, vec::Vec};
use core::{fmt, marker::PhantomPinned, ptr::NonNull};

use cordyceps::Linked;

use crate::{AvlTree, Error, Key, Links, Result, TreeNode};

/// An ordered map from integer keys to values, based on a size-augmented [AVL tree].
///
/// Besides lookups, the map answers order-statistic queries ([`rank`](Self::rank),
/// [`select`](Self::select)) and can be [`split`](Self::split) and [`join`](Self::join)ed in
/// logarithmic time.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlMap<V> {
    tree: AvlTree<MapNode<V>>,
}

struct MapNode<V> {
    links: Links<MapNode<V>>,
    key: Key,
    value: V,
    _unpin: PhantomPinned,
}

impl<V> MapNode<V> {
    fn new(key: Key, value: V) -> Box<Self> {
        Box::new(MapNode {
            links: Links::new(),
            key,
            value,
            _unpin: PhantomPinned,
        })
    }
}

unsafe impl<V> Linked<Links<MapNode<V>>> for MapNode<V> {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<MapNode<V>>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl<V> TreeNode<Links<MapNode<V>>> for MapNode<V> {
    fn key(&self) -> Key {
        self.key
    }
}

impl<V> AvlMap<V> {
    /// Creates a new, empty `AvlMap`.
    pub const fn new() -> Self {
        Self {
            tree: AvlTree::new(),
        }
    }

    /// Returns `true` if the map contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns the height of the underlying tree, or `-1` if the map is empty.
    pub fn height(&self) -> i8 {
        self.tree.height()
    }

    /// Returns `true` if the map contains a value associated with `key`.
    #[inline]
    pub fn contains_key(&self, key: Key) -> bool {
        self.tree.contains_key(key)
    }

    /// Returns a reference to the value associated with `key`.
    #[inline]
    pub fn get(&self, key: Key) -> Option<&V> {
        self.tree.get(key).map(|node| &node.get_ref().value)
    }

    /// Returns a mutable reference to the value associated with `key`.
    #[inline]
    pub fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        self.tree
            .get_mut(key)
            // SAFETY: Pinning is not structural for `node.value`.
            .map(|node| unsafe { &mut node.get_unchecked_mut().value })
    }

    /// Returns the entry for `key` if present; otherwise, the entry under which `key` would be
    /// inserted.
    ///
    /// Returns `None` only if the map is empty.
    pub fn search_closest(&self, key: Key) -> Option<(Key, &V)> {
        self.tree
            .search_closest(key)
            .map(|node| (node.key, &node.get_ref().value))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Returns the number of rotations performed to rebalance the tree. Keys are unique: if `key`
    /// is already present, the map is not modified and [`Error::DuplicateKey`] is returned.
    pub fn insert(&mut self, key: Key, value: V) -> Result<usize> {
        self.tree
            .insert(MapNode::new(key, value))
            .map_err(|node| Error::DuplicateKey(node.key))
    }

    /// Removes the value associated with `key` from the map.
    #[inline]
    pub fn remove(&mut self, key: Key) -> Option<V> {
        self.tree.remove(key).map(|node| node.value)
    }

    /// Removes `key` from the map, returning the number of rebalancing steps taken.
    pub fn delete(&mut self, key: Key) -> Result<usize> {
        let node = self.tree.get_raw(key).ok_or(Error::KeyNotFound(key))?;

        // SAFETY: `node` was just found in `self.tree`.
        let (_, steps) = unsafe { self.tree.remove_at(node) };
        Ok(steps)
    }

    /// Returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map. This operation completes in _O(1)_ time.
    #[inline]
    pub fn first_key_value(&self) -> Option<(Key, &V)> {
        self.tree
            .first()
            .map(|node| (node.key, &node.get_ref().value))
    }

    /// Removes and returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn pop_first(&mut self) -> Option<(Key, V)> {
        self.tree.pop_first().map(|node| {
            let MapNode { key, value, .. } = *node;
            (key, value)
        })
    }

    /// Returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn last_key_value(&self) -> Option<(Key, &V)> {
        self.tree
            .last()
            .map(|node| (node.key, &node.get_ref().value))
    }

    /// Removes and returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn pop_last(&mut self) -> Option<(Key, V)> {
        self.tree.pop_last().map(|node| {
            let MapNode { key, value, .. } = *node;
            (key, value)
        })
    }

    /// Returns the 1-based position of `key` in ascending key order.
    #[inline]
    pub fn rank(&self, key: Key) -> Option<usize> {
        self.tree.rank(key)
    }

    /// Returns the key-value pair at 1-based position `rank` in ascending key order.
    ///
    /// Returns `None` if `rank` is zero or greater than [`len`](Self::len).
    #[inline]
    pub fn select(&self, rank: usize) -> Option<(Key, &V)> {
        self.tree
            .select(rank)
            .map(|node| (node.key, &node.get_ref().value))
    }

    /// Returns an iterator over the key-value pairs of the map in ascending key order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Key, &V)> + ExactSizeIterator + '_ {
        self.tree.iter().map(|node| (node.key, &node.value))
    }

    /// Returns an iterator over the keys of the map in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = Key> + ExactSizeIterator + '_ {
        self.tree.iter().map(|node| node.key)
    }

    /// Returns the key-value pairs of the map in ascending key order.
    pub fn to_vec(&self) -> Vec<(Key, V)>
    where
        V: Clone,
    {
        self.iter().map(|(key, value)| (key, value.clone())).collect()
    }

    /// Splits the map at `key`.
    ///
    /// Returns a map of every entry with a key less than `key`, the value at `key`, and a map of
    /// every entry with a greater key. `self` is left empty.
    ///
    /// If `key` is not present, the map is not modified and [`Error::KeyNotFound`] is returned.
    pub fn split(&mut self, key: Key) -> Result<(Self, V, Self)> {
        let (left, pivot, right) = self.tree.split(key).ok_or(Error::KeyNotFound(key))?;

        Ok((AvlMap { tree: left }, pivot.value, AvlMap { tree: right }))
    }

    /// Joins `other` and the entry `key`/`value` into `self`, leaving `other` empty.
    ///
    /// Every key of one map must be less than `key` and every key of the other greater; either map
    /// may hold the lesser keys. Returns the height difference of the two maps plus one, or the
    /// height of the non-empty map plus one if the other is empty.
    ///
    /// If `key` does not divide the maps, neither is modified and [`Error::UnorderedJoin`] is
    /// returned.
    pub fn join(&mut self, key: Key, value: V, other: &mut Self) -> Result<usize> {
        self.tree
            .join(MapNode::new(key, value), &mut other.tree)
            .map_err(|node| Error::UnorderedJoin(node.key))
    }

    /// Clears the map, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.assert_invariants();
    }
}

impl<V> Default for AvlMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for AvlMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
