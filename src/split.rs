use core::ptr::NonNull;

use crate::{AvlTree, Dir, Fixup, Key, Link, Links, TreeNode};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Joins `other` and `separator` into `self`, leaving `other` empty.
    ///
    /// All keys of one tree must be less than the separator's key, and all keys of the other
    /// greater; either tree may hold the lesser keys, and either may be empty. If this does not
    /// hold, neither tree is modified and `separator` is handed back.
    ///
    /// Returns the absolute difference between the heights of the joined trees plus one, which
    /// bounds the work done. If one tree is empty, this is the other tree's height plus one; if
    /// both are, it is 1.
    ///
    /// This operation completes in _O(|h1 - h2| + 1)_ time.
    pub fn join(
        &mut self,
        separator: T::Handle,
        other: &mut AvlTree<T>,
    ) -> core::result::Result<usize, T::Handle> {
        let sep = T::into_ptr(separator);

        unsafe {
            let key = sep.as_ref().key();

            let self_below = self.all_below(key);
            let self_above = self.all_above(key);
            let other_below = other.all_below(key);
            let other_above = other.all_above(key);

            let (lesser, greater) = if self_below && other_above {
                (&mut *self, &mut *other)
            } else if other_below && self_above {
                (&mut *other, &mut *self)
            } else {
                trace!(key, "rejecting join: separator does not divide the trees");
                return Err(T::from_ptr(sep));
            };

            let first = lesser.first.or(Some(sep));
            let left = lesser.root.take();
            let right = greater.root.take();
            lesser.first = None;
            greater.first = None;

            let (root, cost) = Self::join_raw(left, sep, right);

            self.root = Some(root);
            self.first = first;

            Ok(cost)
        }
    }

    // Returns `true` if every key in the tree is less than `key`.
    fn all_below(&self, key: Key) -> bool {
        self.last_raw()
            .map_or(true, |last| unsafe { last.as_ref().key() } < key)
    }

    // Returns `true` if every key in the tree is greater than `key`.
    fn all_above(&self, key: Key) -> bool {
        self.first
            .map_or(true, |first| unsafe { first.as_ref().key() } > key)
    }

    // Joins the detached subtrees `left` and `right` with `sep` between them.
    //
    // Returns the root of the joined tree and `|h(left) - h(right)| + 1`, or `h + 1` when only one
    // side (of height `h`) is non-empty.
    //
    // # Safety
    //
    // `left` and `right` must be detached subtree roots (or sentinels), with every key in `left`
    // less than `sep`'s and every key in `right` greater. `sep` must not be linked into any tree.
    unsafe fn join_raw(left: Link<T>, sep: NonNull<T>, right: Link<T>) -> (NonNull<T>, usize) {
        unsafe {
            Self::links_mut(sep).reset();

            let left_height = Self::height_of(left);
            let right_height = Self::height_of(right);
            let cost = usize::from(left_height.abs_diff(right_height)) + 1;

            let mut root = match (left, right) {
                (None, None) => return (sep, cost),

                // One side is empty: `sep` becomes the new extreme of the other, at a cost of that
                // tree's height plus one.
                (Some(tree), None) | (None, Some(tree)) => {
                    let cost = usize::from(Self::links(tree).height().unsigned_abs()) + 1;

                    let dir = if Self::is_real(left) { Dir::Right } else { Dir::Left };
                    let extreme = Self::extreme_at_height(tree, -1, dir);
                    Self::set_parent(sep, Some(extreme), false);

                    let mut root = Some(tree);
                    Self::fix_upward(&mut root, Some(extreme), Fixup::Insert);
                    return (root.expect("joined tree is not empty"), cost);
                }

                // Heights are close enough for `sep` to become the root.
                (Some(left), Some(right)) if left_height.abs_diff(right_height) <= 1 => {
                    Self::set_parent(left, Some(sep), false);
                    Self::set_parent(right, Some(sep), false);
                    Self::update(sep, true, true);
                    return (sep, cost);
                }

                // Descend the inner spine of the taller tree to the first node no taller than the
                // shorter tree, and splice `sep` in above it.
                (Some(left), Some(right)) => {
                    let (taller, shorter, spine) = if left_height > right_height {
                        (left, right, Dir::Right)
                    } else {
                        (right, left, Dir::Left)
                    };

                    let splice = Self::extreme_at_height(taller, Self::height_of(Some(shorter)), spine);
                    let above = Self::links(splice)
                        .parent()
                        .expect("splice point below the root of the taller tree");

                    Self::set_parent(splice, Some(sep), true);
                    Self::set_parent(shorter, Some(sep), false);
                    Self::update(sep, true, true);
                    Self::set_parent(sep, Some(above), false);

                    trace!(
                        sep = sep.as_ref().key(),
                        left_height,
                        right_height,
                        "spliced join separator"
                    );

                    let mut root = Some(taller);
                    Self::fix_upward(&mut root, Some(above), Fixup::Delete);
                    root
                }
            };

            (root.take().expect("joined tree is not empty"), cost)
        }
    }

    /// Splits the tree at the node with `key`.
    ///
    /// Returns a tree holding every key less than `key`, the node itself, and a tree holding every
    /// key greater than `key`. `self` is left empty. If `key` is not present, the tree is left
    /// untouched and `None` is returned.
    pub fn split(&mut self, key: Key) -> Option<(AvlTree<T>, T::Handle, AvlTree<T>)> {
        let node = self.get_raw(key)?;
        Some(unsafe { self.split_at(node) })
    }

    /// Splits the tree at `node`.
    ///
    /// Returns a tree holding every key less than `node`'s key, `node` itself, and a tree holding
    /// every key greater. `self` is left empty.
    ///
    /// This operation completes in _O(log(n))_ time: each ancestor of `node` is joined back in as a
    /// separator, and the costs of those joins telescope along the path.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn split_at(&mut self, node: NonNull<T>) -> (AvlTree<T>, T::Handle, AvlTree<T>) {
        unsafe {
            let mut left = Self::replace_with_sentinel(node, Dir::Left);
            let mut right = Self::replace_with_sentinel(node, Dir::Right);

            let mut below = node;
            let mut above = Self::links(node).parent();

            while let Some(ancestor) = above {
                // Read everything needed from the path before `ancestor` is relinked.
                above = Self::links(ancestor).parent();
                let came_from = Self::which_child(ancestor, below);

                match came_from {
                    // `ancestor` and its left subtree are less than `node`.
                    Dir::Right => {
                        let side = Self::replace_with_sentinel(ancestor, Dir::Left);
                        left = Some(Self::join_raw(side, ancestor, left).0);
                    }

                    // `ancestor` and its right subtree are greater than `node`.
                    Dir::Left => {
                        let side = Self::replace_with_sentinel(ancestor, Dir::Right);
                        right = Some(Self::join_raw(right, ancestor, side).0);
                    }
                }

                below = ancestor;
            }

            self.root = None;
            self.first = None;

            let left = AvlTree::from_root(left);
            let right = AvlTree::from_root(right);

            trace!(
                pivot = node.as_ref().key(),
                left = left.len(),
                right = right.len(),
                "split tree"
            );

            Self::links_mut(node).reset();

            (left, T::from_ptr(node), right)
        }
    }
}
