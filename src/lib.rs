//! An intrusive AVL tree augmented with subtree sizes.
//!
//! Besides the usual dictionary operations the tree supports order statistics (`rank` and
//! `select`) and whole-tree `split` and `join`, both of which run in time proportional to tree
//! heights rather than sizes.

// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`; a missing child (the sentinel) has height -1.
// - The size of a node `x` is denoted `s(x)`; a missing child has size 0.
// - The balance factor of `x` is `bf(x) = h(left(x)) - h(right(x))`.
//
// The invariants of the tree are:
// 1. `h(x) = 1 + max(h(left(x)), h(right(x)))`.
// 2. `s(x) = 1 + s(left(x)) + s(right(x))`.
// 3. `bf(x) ∈ {-1, 0, 1}` for every node once an operation completes.
//
// A `bf` of ±2 may exist transiently during rebalancing, and is always repaired by exactly one
// single or double rotation at that node.

use core::{
    cell::UnsafeCell,
    cmp::Ordering,
    fmt,
    marker::PhantomPinned,
    mem,
    ops::Not,
    pin::Pin,
    ptr::{self, NonNull},
};

use cordyceps::Linked;

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::trace!($($arg)*);
    };
}

mod cursor;
mod debug;
pub mod error;
mod iter;
pub mod map;
#[cfg(any(test, feature = "model"))]
pub mod model;
mod rank;
mod split;

#[cfg(test)]
mod tests;

pub use cursor::{Cursor, CursorMut};
pub use error::{Error, Result};
pub use iter::Iter;
pub use map::AvlMap;

/// The key type of every tree. Keys are unique within a tree.
pub type Key = i64;

pub trait TreeNode<L>: Linked<L> {
    fn key(&self) -> Key;
}

/// An intrusive AVL tree whose nodes also track the size of their subtree.
///
/// The tree caches a pointer to its minimum element, so [`first`](Self::first) is _O(1)_.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    first: Link<T>,
}

pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    height: i8,
    size: usize,
    _unpin: PhantomPinned,
}

// `None` plays the role of the sentinel node: height -1, size 0.
type Link<T> = Option<NonNull<T>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Fixup {
    // Stop rotating after the first rotation or the first node whose height is unchanged.
    Insert,
    // Check balance all the way to the root.
    Delete,
}

#[derive(Copy, Clone, Debug, Default)]
struct Rebalance {
    rotations: usize,
    height_changes: usize,
}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree {
            root: None,
            first: None,
        }
    }

    // Wraps a detached subtree root, recomputing the minimum.
    unsafe fn from_root(root: Link<T>) -> AvlTree<T> {
        let first = root.map(|r| unsafe { Self::extreme_at_height(r, -1, Dir::Left) });
        AvlTree { root, first }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        unsafe { Self::size_of(self.root) }
    }

    /// Returns the height of the tree, or `-1` if it is empty.
    pub fn height(&self) -> i8 {
        unsafe { Self::height_of(self.root) }
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let Some(root) = self.root else {
            assert!(self.first.is_none(), "empty tree must not cache a minimum");
            return;
        };

        unsafe {
            assert!(
                Self::links(root).parent().is_none(),
                "root must not have a parent"
            );
            self.assert_invariants_at(root, None, None);
            assert!(
                Self::same_node(
                    self.first,
                    Some(Self::extreme_at_height(root, -1, Dir::Left))
                ),
                "cached minimum is stale"
            );
        }
    }

    #[allow(clippy::only_used_in_recursion)]
    unsafe fn assert_invariants_at(&self, node: NonNull<T>, lower: Option<Key>, upper: Option<Key>) {
        unsafe {
            let key = node.as_ref().key();
            assert!(lower.map_or(true, |lo| lo < key), "key {key} out of order");
            assert!(upper.map_or(true, |hi| key < hi), "key {key} out of order");

            let links = Self::links(node);
            let (left, right) = (links.left(), links.right());

            assert_eq!(
                links.height(),
                1 + Self::height_of(left).max(Self::height_of(right)),
                "height of {key} is stale"
            );
            assert_eq!(
                links.size(),
                1 + Self::size_of(left) + Self::size_of(right),
                "size of {key} is stale"
            );
            assert!(
                Self::balance_factor(node).abs() <= 1,
                "node {key} is unbalanced"
            );

            for (child, lower, upper) in [(left, lower, Some(key)), (right, Some(key), upper)] {
                if let Some(child) = child {
                    let parent = Self::links(child)
                        .parent()
                        .expect("child parent pointer not set");
                    assert!(Self::same_node(Some(node), Some(parent)));

                    self.assert_invariants_at(child, lower, upper);
                }
            }
        }
    }

    /// Returns a reference to the node corresponding to `key`.
    pub fn get(&self, key: Key) -> Option<Pin<&T>> {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the node corresponding to `key`.
    ///
    /// The key of a node is read through [`TreeNode::key`]; callers must not change it.
    pub fn get_mut(&mut self, key: Key) -> Option<Pin<&mut T>> {
        let mut ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_mut())) }
    }

    /// Returns `true` if the tree contains a node with `key`.
    pub fn contains_key(&self, key: Key) -> bool {
        self.get_raw(key).is_some()
    }

    fn get_raw(&self, key: Key) -> Link<T> {
        self.search_closest_raw(key)
            .filter(|node| unsafe { node.as_ref().key() } == key)
    }

    /// Returns the node with `key` if present; otherwise, the node under which `key` would be
    /// inserted.
    ///
    /// Returns `None` only if the tree is empty.
    pub fn search_closest(&self, key: Key) -> Option<Pin<&T>> {
        let ptr = self.search_closest_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    fn search_closest_raw(&self, key: Key) -> Link<T> {
        let mut cur = self.root?;

        loop {
            unsafe {
                let next = match key.cmp(&cur.as_ref().key()) {
                    Ordering::Less => Self::links(cur).left(),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => Self::links(cur).right(),
                };

                match next {
                    Some(next) => cur = next,
                    None => return Some(cur),
                }
            }
        }
    }

    /// Returns the minimum element of the tree.
    ///
    /// This operation completes in _O(1)_ time.
    pub fn first(&self) -> Option<Pin<&T>> {
        self.first
            .map(|first| unsafe { Pin::new_unchecked(first.as_ref()) })
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        self.last_raw()
            .map(|last| unsafe { Pin::new_unchecked(last.as_ref()) })
    }

    fn last_raw(&self) -> Link<T> {
        self.root
            .map(|root| unsafe { Self::extreme_at_height(root, -1, Dir::Right) })
    }

    /// Returns an iterator over the elements of the tree in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns a cursor pointing at the minimum element.
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        Cursor::first(self)
    }

    /// Returns a cursor pointing at the maximum element.
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        Cursor::last(self)
    }

    /// Returns an editing cursor pointing at the minimum element.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::first(self)
    }

    /// Returns an editing cursor pointing at the maximum element.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::last(self)
    }

    /// Inserts an item into the tree.
    ///
    /// Returns the number of rotations performed to restore balance: at most one single (1) or
    /// double (2) rotation. If an item with the same key is already present, the tree is left
    /// untouched and `item` is handed back.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> core::result::Result<usize, T::Handle> {
        let ptr = T::into_ptr(item);

        unsafe {
            Self::links_mut(ptr).reset();
            let key = ptr.as_ref().key();

            let Some(parent) = self.search_closest_raw(key) else {
                // Tree is empty. Set `item` as the root and return.
                self.root = Some(ptr);
                self.first = Some(ptr);
                return Ok(0);
            };

            if parent.as_ref().key() == key {
                trace!(key, "rejecting duplicate key");
                return Err(T::from_ptr(ptr));
            }

            Self::set_parent(ptr, Some(parent), false);

            if self.first.map_or(true, |first| key < first.as_ref().key()) {
                self.first = Some(ptr);
            }

            let fixed = Self::fix_upward(&mut self.root, Some(parent), Fixup::Insert);
            Ok(fixed.rotations)
        }
    }

    /// Removes the node with `key` from the tree, returning it.
    pub fn remove(&mut self, key: Key) -> Option<T::Handle> {
        let node = self.get_raw(key)?;
        Some(unsafe { self.remove_at(node).0 })
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let first = self.first?;
        Some(unsafe { self.remove_at(first).0 })
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let last = self.last_raw()?;
        Some(unsafe { self.remove_at(last).0 })
    }

    /// Removes an arbitrary node from the tree.
    ///
    /// Along with the removed node, returns the number of rebalancing steps taken: rotations (1
    /// for single, 2 for double) plus every ancestor whose height changed without a rotation.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> (T::Handle, usize) {
        // There are two cases:
        //
        // 1. `node` has at most one child.
        //
        //    The child (or the sentinel) takes its place under its parent. Rebalancing starts at
        //    the parent.
        //
        // 2. `node` has two children.
        //
        //    `node`'s successor, the minimum of its right subtree, has no left child. It is
        //    unlinked by elevating its right child, then assumes `node`'s place, children and
        //    height. Rebalancing starts where the successor was unlinked, which is the successor
        //    itself if it was `node`'s right child.
        //
        // Unlike insertion, deletion may require a rotation at every level, so the walk always
        // continues to the root.

        unsafe {
            if Self::same_node(self.first, Some(node)) {
                self.first = Self::successor_raw(node);
            }

            let parent = Self::links(node).parent();
            let left = Self::links(node).left();
            let right = Self::links(node).right();

            let fix_from = match (left, right) {
                (Some(left), Some(right)) => {
                    let successor = Self::extreme_at_height(right, -1, Dir::Left);

                    let fix_from = if Self::same_node(Some(successor), Some(right)) {
                        successor
                    } else {
                        let successor_parent = Self::links(successor)
                            .parent()
                            .expect("successor below `right` must have a parent");
                        let successor_right = Self::links(successor).right();

                        // Elevate the successor's right child to replace it.
                        Self::replace_child_or_set_root(
                            &mut self.root,
                            Some(successor_parent),
                            successor,
                            successor_right,
                        );

                        Self::links_mut(successor).set_right(Some(right));
                        Self::links_mut(right).set_parent(Some(successor));
                        successor_parent
                    };

                    Self::links_mut(successor).set_left(Some(left));
                    Self::links_mut(left).set_parent(Some(successor));

                    // Transfer the height of `node`; the walk below counts it if it changes.
                    let node_height = Self::links(node).height();
                    Self::links_mut(successor).set_height(node_height);

                    Self::replace_child_or_set_root(&mut self.root, parent, node, Some(successor));

                    Some(fix_from)
                }

                (Some(child), None) | (None, Some(child)) => {
                    Self::replace_child_or_set_root(&mut self.root, parent, node, Some(child));
                    parent
                }

                (None, None) => {
                    if Self::detach_from_parent(node) {
                        self.root = None;
                    }
                    parent
                }
            };

            let fixed = Self::fix_upward(&mut self.root, fix_from, Fixup::Delete);

            Self::links_mut(node).reset();

            (
                T::from_ptr(node),
                fixed.rotations + fixed.height_changes,
            )
        }
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let cur = Self::extreme_at_height(cur, -1, Dir::Left);
                let parent = Self::links(cur).parent();
                let right = Self::links(cur).right();

                // Elevate the node's right child (which may be None).
                Self::replace_child_or_set_root(&mut self.root, parent, cur, right);

                // Drop the node.
                Self::links_mut(cur).reset();
                drop(T::from_ptr(cur));

                // If the node had no right child, climb to the parent. If the node had no parent,
                // the tree is empty.
                opt_cur = right.or(parent);
            }
        }

        self.first = None;
        debug_assert!(self.root.is_none());
    }

    // Node primitives ========================================================

    #[inline]
    unsafe fn links<'a>(node: NonNull<T>) -> &'a Links<T> {
        unsafe { T::links(node).as_ref() }
    }

    #[inline]
    unsafe fn links_mut<'a>(node: NonNull<T>) -> &'a mut Links<T> {
        unsafe { T::links(node).as_mut() }
    }

    #[inline]
    fn is_real(link: Link<T>) -> bool {
        link.is_some()
    }

    // Compares links by address only, so unsized node types compare without their metadata.
    #[inline]
    fn same_node(a: Link<T>, b: Link<T>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => ptr::addr_eq(a.as_ptr(), b.as_ptr()),
            (None, None) => true,
            _ => false,
        }
    }

    /// Returns the height of the pointed-to subtree.
    #[inline]
    unsafe fn height_of(link: Link<T>) -> i8 {
        link.map_or(-1, |n| unsafe { Self::links(n).height() })
    }

    /// Returns the size of the pointed-to subtree.
    #[inline]
    unsafe fn size_of(link: Link<T>) -> usize {
        link.map_or(0, |n| unsafe { Self::links(n).size() })
    }

    #[inline]
    unsafe fn balance_factor(node: NonNull<T>) -> i8 {
        unsafe {
            let links = Self::links(node);
            Self::height_of(links.left()) - Self::height_of(links.right())
        }
    }

    // Recomputes the size and/or height of `node` from its children.
    //
    // Returns `true` if the height changed.
    unsafe fn update(node: NonNull<T>, size: bool, height: bool) -> bool {
        unsafe {
            let left = Self::links(node).left();
            let right = Self::links(node).right();

            if size {
                let new_size = 1 + Self::size_of(left) + Self::size_of(right);
                Self::links_mut(node).set_size(new_size);
            }

            if !height {
                return false;
            }

            let new_height = 1 + Self::height_of(left).max(Self::height_of(right));
            Self::links_mut(node).set_height(new_height) != new_height
        }
    }

    // Descends from `node` in direction `dir` while a child exists there and the current height
    // exceeds `height`. With `height == -1` this yields the subtree's extreme element.
    unsafe fn extreme_at_height(node: NonNull<T>, height: i8, dir: Dir) -> NonNull<T> {
        let mut cur = node;

        unsafe {
            while let Some(next) = Self::links(cur).child(dir) {
                if Self::links(cur).height() <= height {
                    break;
                }
                cur = next;
            }
        }

        cur
    }

    unsafe fn successor_raw(node: NonNull<T>) -> Link<T> {
        unsafe { Self::neighbor_raw(node, Dir::Right) }
    }

    unsafe fn predecessor_raw(node: NonNull<T>) -> Link<T> {
        unsafe { Self::neighbor_raw(node, Dir::Left) }
    }

    // Returns the in-order neighbor of `node` in direction `dir`.
    unsafe fn neighbor_raw(node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            if let Some(child) = Self::links(node).child(dir) {
                return Some(Self::extreme_at_height(child, -1, !dir));
            }

            // Ascend until arriving from the `!dir` side.
            let mut cur = node;
            while let Some(parent) = Self::links(cur).parent() {
                if Self::which_child(parent, cur) == !dir {
                    return Some(parent);
                }
                cur = parent;
            }

            None
        }
    }

    unsafe fn which_child(parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if Self::same_node(unsafe { Self::links(parent).left() }, Some(child)) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    // Links `node` under `parent`, on the side given by comparing keys. If `detach` is set, the
    // slot `node` occupied under its old parent is replaced with a sentinel first.
    //
    // Returns `true` if `node` is now a root.
    unsafe fn set_parent(node: NonNull<T>, parent: Link<T>, detach: bool) -> bool {
        unsafe {
            if detach {
                Self::detach_from_parent(node);
            }

            Self::links_mut(node).set_parent(parent);

            let Some(parent) = parent else {
                return true;
            };

            let dir = if node.as_ref().key() > parent.as_ref().key() {
                Dir::Right
            } else {
                Dir::Left
            };
            Self::links_mut(parent).set_child(dir, Some(node));

            false
        }
    }

    // Installs a sentinel as `node`'s `dir` child, returning the detached subtree.
    unsafe fn replace_with_sentinel(node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            let child = Self::links_mut(node).set_child(dir, None);
            if let Some(child) = child {
                Self::links_mut(child).set_parent(None);
            }
            child
        }
    }

    // Replaces the slot `node` occupies under its parent with a sentinel.
    //
    // Returns `true` if `node` was a root.
    unsafe fn detach_from_parent(node: NonNull<T>) -> bool {
        unsafe {
            let Some(parent) = Self::links_mut(node).set_parent(None) else {
                return true;
            };

            let dir = Self::which_child(parent, node);
            Self::links_mut(parent).set_child(dir, None);

            false
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`, or the root
    // if `parent` is `None`. `new_child`'s parent pointer is set to `parent`.
    //
    // # Safety
    //
    // The caller must ensure that `old_child` is a child node of `parent`, or the root if
    // `parent` is `None`.
    #[inline]
    unsafe fn replace_child_or_set_root(
        root: &mut Link<T>,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            match parent {
                Some(parent) => {
                    let dir = Self::which_child(parent, old_child);
                    debug_assert!(Self::same_node(
                        Self::links(parent).child(dir),
                        Some(old_child)
                    ));
                    Self::links_mut(parent).set_child(dir, new_child);
                }
                None => *root = new_child,
            }

            if let Some(new_child) = new_child {
                Self::links_mut(new_child).set_parent(parent);
            }
        }
    }

    // Rebalancing ============================================================

    // Performs a single rotation at `down` in direction `dir`: `down`'s `!dir` child moves up and
    // `down` becomes its `dir` child.
    //
    // Returns the node moved up. Sizes and heights of both nodes are updated.
    unsafe fn rotate(root: &mut Link<T>, down: NonNull<T>, dir: Dir) -> NonNull<T> {
        unsafe {
            let up = Self::links(down)
                .child(!dir)
                .expect("rotation requires a child to move up");

            // `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
            let across = Self::links(up).child(dir);
            let parent = Self::links(down).parent();

            Self::links_mut(down).set_child(!dir, across);
            if let Some(across) = across {
                Self::links_mut(across).set_parent(Some(down));
            }

            Self::replace_child_or_set_root(root, parent, down, Some(up));
            Self::links_mut(up).set_child(dir, Some(down));
            Self::links_mut(down).set_parent(Some(up));

            Self::update(down, true, true);
            Self::update(up, true, true);

            trace!(down = down.as_ref().key(), up = up.as_ref().key(), ?dir, "rotated");

            up
        }
    }

    // Repairs a balance factor of ±2 at `node` with a single or double rotation.
    //
    // Returns the number of single rotations performed.
    unsafe fn rotate_to_balance(root: &mut Link<T>, node: NonNull<T>) -> usize {
        unsafe {
            let bf = Self::balance_factor(node);
            debug_assert_eq!(bf.abs(), 2);

            // The heavy side, and the balance factor of a heavy child leaning the other way.
            let (heavy, opposite_lean) = if bf > 0 { (Dir::Left, -1) } else { (Dir::Right, 1) };

            let child = Self::links(node)
                .child(heavy)
                .expect("heavy side must have a child");

            let mut rotations = 1;
            if Self::balance_factor(child) == opposite_lean {
                Self::rotate(root, child, heavy);
                rotations += 1;
            }

            Self::rotate(root, node, !heavy);
            rotations
        }
    }

    // Walks from `start` to the root, refreshing sizes and heights and rotating wherever the
    // balance factor reaches ±2.
    unsafe fn fix_upward(root: &mut Link<T>, start: Link<T>, mode: Fixup) -> Rebalance {
        let mut fixed = Rebalance::default();
        let mut balancing = true;
        let mut cur = start;

        while let Some(node) = cur {
            unsafe {
                // Capture the parent first: a rotation moves `node` down.
                let parent = Self::links(node).parent();

                if balancing {
                    let height_changed = Self::update(node, true, true);

                    if Self::balance_factor(node).abs() == 2 {
                        fixed.rotations += Self::rotate_to_balance(root, node);
                        balancing = mode == Fixup::Delete;
                    } else if height_changed {
                        fixed.height_changes += 1;
                    } else {
                        balancing = mode == Fixup::Delete;
                    }
                } else {
                    Self::update(node, true, false);
                }

                cur = parent;
            }
        }

        fixed
    }
}

impl<T> Default for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> fmt::Debug for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree")
            .field("len", &self.len())
            .field("height", &self.height())
            .finish()
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                height: 0,
                size: 1,
                _unpin: PhantomPinned,
            }),
        }
    }

    // Returns the links to the state of a detached leaf.
    #[inline]
    fn reset(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.height = 0;
        inner.size = 1;
    }

    #[inline]
    fn height(&self) -> i8 {
        unsafe { (*self.inner.get()).height }
    }

    #[inline]
    fn size(&self) -> usize {
        unsafe { (*self.inner.get()).size }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: Link<T>) -> Link<T> {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: Link<T>) -> Link<T> {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_height(&mut self, height: i8) -> i8 {
        mem::replace(&mut self.inner.get_mut().height, height)
    }

    #[inline]
    fn set_size(&mut self, size: usize) {
        self.inner.get_mut().size = size;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent().map(NonNull::as_ptr))
            .field("left", &self.left().map(NonNull::as_ptr))
            .field("right", &self.right().map(NonNull::as_ptr))
            .field("height", &self.height())
            .field("size", &self.size())
            .finish()
    }
}
