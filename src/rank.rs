use core::{cmp::Ordering, pin::Pin, ptr::NonNull};

use crate::{AvlTree, Key, Link, Links, TreeNode};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns the 1-based position of `key` in ascending key order, or `None` if the key is not
    /// present.
    pub fn rank(&self, key: Key) -> Option<usize> {
        let node = self.get_raw(key)?;
        Some(unsafe { self.rank_at(node) })
    }

    /// Returns the 1-based position of `node` in ascending key order.
    ///
    /// This operation completes in _O(log(n))_ time.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn rank_at(&self, node: NonNull<T>) -> usize {
        unsafe {
            let mut rank = Self::size_of(Self::links(node).left()) + 1;
            let mut cur = node;

            // Every ancestor reached from its right side precedes `node`, as does its left subtree.
            while let Some(parent) = Self::links(cur).parent() {
                if Self::same_node(Self::links(parent).right(), Some(cur)) {
                    rank += Self::size_of(Self::links(parent).left()) + 1;
                }
                cur = parent;
            }

            rank
        }
    }

    /// Returns the element at 1-based position `rank` in ascending key order, or `None` if `rank`
    /// is zero or greater than the number of elements.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn select(&self, rank: usize) -> Option<Pin<&T>> {
        let ptr = self.select_raw(rank)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    pub(crate) fn select_raw(&self, rank: usize) -> Link<T> {
        if rank == 0 || rank > self.len() {
            return None;
        }

        let root = self.root?;

        unsafe {
            let root_rank = Self::size_of(Self::links(root).left()) + 1;

            let start = if rank >= root_rank {
                root
            } else {
                // The target lies in the root's left subtree. Climb from the minimum to the
                // smallest subtree on the left spine holding ranks `1..=rank`.
                let mut cur = self.first?;
                while Self::links(cur).size() < rank {
                    cur = Self::links(cur)
                        .parent()
                        .expect("left spine ends at the root");
                }
                cur
            };

            Some(Self::descend_to_rank(start, rank))
        }
    }

    // Finds the element at 1-based position `rank` within the subtree rooted at `node`.
    unsafe fn descend_to_rank(node: NonNull<T>, mut rank: usize) -> NonNull<T> {
        let mut cur = node;

        unsafe {
            loop {
                let left = Self::links(cur).left();
                let here = Self::size_of(left) + 1;

                cur = match rank.cmp(&here) {
                    Ordering::Equal => return cur,
                    Ordering::Less => left.expect("rank within the left subtree"),
                    Ordering::Greater => {
                        rank -= here;
                        Self::links(cur)
                            .right()
                            .expect("rank within the right subtree")
                    }
                };
            }
        }
    }
}
