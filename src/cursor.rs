use core::pin::Pin;

use crate::{AvlTree, Key, Link, Links, TreeNode};

/// A read-only cursor over an [`AvlTree`] that knows its own rank.
///
/// The cursor points either at an element or at the "ghost" position between the last element
/// and the first. The ghost has rank 0, so [`rank`](Self::rank) is answered without walking the
/// tree. Besides stepping, the cursor can jump to any rank or key in _O(log(n))_ time using the
/// subtree sizes.
pub struct Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: &'tree AvlTree<T>,
    pos: Position<T>,
}

/// A cursor over an [`AvlTree`] that can also remove elements.
///
/// See [`Cursor`] for the positioning rules.
pub struct CursorMut<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: &'tree mut AvlTree<T>,
    pos: Position<T>,
}

// A node together with its 1-based rank. The ghost is `ptr == None, rank == 0`.
struct Position<T: ?Sized> {
    ptr: Link<T>,
    rank: usize,
}

impl<T: ?Sized> Clone for Position<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Position<T> {}

impl<T> Position<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    const GHOST: Self = Position { ptr: None, rank: 0 };

    fn first(tree: &AvlTree<T>) -> Self {
        Position {
            ptr: tree.first,
            rank: usize::from(tree.first.is_some()),
        }
    }

    fn last(tree: &AvlTree<T>) -> Self {
        Position {
            ptr: tree.last_raw(),
            rank: tree.len(),
        }
    }

    fn at_rank(tree: &AvlTree<T>, rank: usize) -> Self {
        match tree.select_raw(rank) {
            Some(node) => Position {
                ptr: Some(node),
                rank,
            },
            None => Self::GHOST,
        }
    }

    // The least element whose key is at least `key`.
    fn at_key(tree: &AvlTree<T>, key: Key) -> Self {
        let Some(closest) = tree.search_closest_raw(key) else {
            return Self::GHOST;
        };

        unsafe {
            // `closest` is the insertion parent of `key`: either its floor or its ceiling.
            let ptr = if closest.as_ref().key() < key {
                AvlTree::successor_raw(closest)
            } else {
                Some(closest)
            };

            match ptr {
                Some(node) => Position {
                    ptr,
                    rank: tree.rank_at(node),
                },
                None => Self::GHOST,
            }
        }
    }

    fn next(self, tree: &AvlTree<T>) -> Self {
        let Some(node) = self.ptr else {
            return Self::first(tree);
        };

        match unsafe { AvlTree::successor_raw(node) } {
            Some(next) => Position {
                ptr: Some(next),
                rank: self.rank + 1,
            },
            None => Self::GHOST,
        }
    }

    fn prev(self, tree: &AvlTree<T>) -> Self {
        let Some(node) = self.ptr else {
            return Self::last(tree);
        };

        // Only the first element lacks a predecessor, and its rank drops to the ghost's 0.
        Position {
            ptr: unsafe { AvlTree::predecessor_raw(node) },
            rank: self.rank - 1,
        }
    }

    fn offset(self, tree: &AvlTree<T>, delta: isize) -> Self {
        match self.rank.checked_add_signed(delta) {
            Some(rank) => Self::at_rank(tree, rank),
            None => Self::GHOST,
        }
    }

    fn rank(self) -> Option<usize> {
        self.ptr.map(|_| self.rank)
    }

    fn get<'a>(self) -> Option<&'a T> {
        self.ptr.map(|p| unsafe { p.as_ref() })
    }
}

impl<'tree, T> Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn first(tree: &'tree AvlTree<T>) -> Cursor<'tree, T> {
        let pos = Position::first(tree);
        Cursor { tree, pos }
    }

    pub(crate) fn last(tree: &'tree AvlTree<T>) -> Cursor<'tree, T> {
        let pos = Position::last(tree);
        Cursor { tree, pos }
    }

    /// Moves to the next element, or from the ghost to the first element.
    pub fn move_next(&mut self) {
        self.pos = self.pos.next(self.tree);
    }

    /// Moves to the previous element, or from the ghost to the last element.
    pub fn move_prev(&mut self) {
        self.pos = self.pos.prev(self.tree);
    }

    /// Moves `delta` ranks forward (or backward, if negative).
    ///
    /// The ghost counts as rank 0. Landing outside `1..=len` moves the cursor to the ghost.
    ///
    /// This operation completes in _O(log(n))_ time regardless of `delta`.
    pub fn move_by(&mut self, delta: isize) {
        self.pos = self.pos.offset(self.tree, delta);
    }

    /// Moves to the element with 1-based rank `rank`, or to the ghost if there is none.
    pub fn seek_rank(&mut self, rank: usize) {
        self.pos = Position::at_rank(self.tree, rank);
    }

    /// Moves to the least element with a key of at least `key`, or to the ghost if there is none.
    pub fn seek_key(&mut self, key: Key) {
        self.pos = Position::at_key(self.tree, key);
    }

    /// Returns the current element, or `None` at the ghost.
    pub fn get(&self) -> Option<&'tree T> {
        self.pos.get()
    }

    /// Returns the element [`move_next`](Self::move_next) would move to.
    pub fn peek_next(&self) -> Option<&'tree T> {
        self.pos.next(self.tree).get()
    }

    /// Returns the element [`move_prev`](Self::move_prev) would move to.
    pub fn peek_prev(&self) -> Option<&'tree T> {
        self.pos.prev(self.tree).get()
    }

    /// Returns the 1-based rank of the current element, or `None` at the ghost.
    ///
    /// This operation completes in _O(1)_ time.
    pub fn rank(&self) -> Option<usize> {
        self.pos.rank()
    }
}

impl<'tree, T> CursorMut<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn first(tree: &'tree mut AvlTree<T>) -> CursorMut<'tree, T> {
        let pos = Position::first(tree);
        CursorMut { tree, pos }
    }

    pub(crate) fn last(tree: &'tree mut AvlTree<T>) -> CursorMut<'tree, T> {
        let pos = Position::last(tree);
        CursorMut { tree, pos }
    }

    /// Returns a read-only cursor at the same position.
    ///
    /// The `CursorMut` remains immutably borrowed for the lifetime of the returned `Cursor`.
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            tree: self.tree,
            pos: self.pos,
        }
    }

    /// Moves to the next element, or from the ghost to the first element.
    pub fn move_next(&mut self) {
        self.pos = self.pos.next(self.tree);
    }

    /// Moves to the previous element, or from the ghost to the last element.
    pub fn move_prev(&mut self) {
        self.pos = self.pos.prev(self.tree);
    }

    /// Moves `delta` ranks forward (or backward, if negative).
    ///
    /// The ghost counts as rank 0. Landing outside `1..=len` moves the cursor to the ghost.
    pub fn move_by(&mut self, delta: isize) {
        self.pos = self.pos.offset(self.tree, delta);
    }

    /// Moves to the element with 1-based rank `rank`, or to the ghost if there is none.
    pub fn seek_rank(&mut self, rank: usize) {
        self.pos = Position::at_rank(self.tree, rank);
    }

    /// Moves to the least element with a key of at least `key`, or to the ghost if there is none.
    pub fn seek_key(&mut self, key: Key) {
        self.pos = Position::at_key(self.tree, key);
    }

    /// Returns the current element, or `None` at the ghost.
    pub fn get(&self) -> Option<&T> {
        self.pos.get()
    }

    /// Returns a pinned mutable reference to the current element, or `None` at the ghost.
    ///
    /// The key of the element must not be changed.
    pub fn get_mut(&mut self) -> Option<Pin<&mut T>> {
        self.pos
            .ptr
            .map(|mut p| unsafe { Pin::new_unchecked(p.as_mut()) })
    }

    /// Returns the element [`move_next`](Self::move_next) would move to.
    pub fn peek_next(&self) -> Option<&T> {
        self.pos.next(self.tree).get()
    }

    /// Returns the element [`move_prev`](Self::move_prev) would move to.
    pub fn peek_prev(&self) -> Option<&T> {
        self.pos.prev(self.tree).get()
    }

    /// Returns the 1-based rank of the current element, or `None` at the ghost.
    pub fn rank(&self) -> Option<usize> {
        self.pos.rank()
    }

    /// Removes the current element and moves to its successor, which takes over its rank.
    ///
    /// At the ghost this returns `None` and changes nothing.
    pub fn remove_current(&mut self) -> Option<T::Handle> {
        let node = self.pos.ptr?;

        let next = unsafe { AvlTree::successor_raw(node) };
        let removed = unsafe { self.tree.remove_at(node).0 };

        self.pos = match next {
            Some(_) => Position {
                ptr: next,
                rank: self.pos.rank,
            },
            None => Position::GHOST,
        };

        Some(removed)
    }

    /// Removes the current element and moves to its predecessor.
    ///
    /// At the ghost this returns `None` and changes nothing.
    pub fn remove_current_and_move_prev(&mut self) -> Option<T::Handle> {
        let node = self.pos.ptr?;

        let prev = self.pos.prev(self.tree);
        let removed = unsafe { self.tree.remove_at(node).0 };
        self.pos = prev;

        Some(removed)
    }
}
