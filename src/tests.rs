extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model::{self, ItemValue, Op, TestNode};

use super::*;

fn tree_of(keys: &[Key]) -> AvlTree<TestNode> {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(TestNode::new(key)).is_ok(), "duplicate key {key}");
        tree.assert_invariants();
    }

    tree
}

fn keys_of(tree: &AvlTree<TestNode>) -> Vec<Key> {
    tree.iter().map(|node| node.key).collect()
}

// A permutation of `0..n` that is far from sorted, for `n` coprime with 37.
fn scrambled(n: Key) -> Vec<Key> {
    (0..n).map(|i| (i * 37) % n).collect()
}

fn insert_find_all(keys: &[Key]) {
    let tree = tree_of(keys);

    for &key in keys {
        let node = tree.get_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, key);
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn four_elems_find() {
    insert_find_all(&[0, 1, 2, 3]);
    insert_find_all(&[0, 1, 3, 2]);
    insert_find_all(&[0, 2, 1, 3]);
    insert_find_all(&[0, 2, 3, 1]);
    insert_find_all(&[0, 3, 1, 2]);
    insert_find_all(&[0, 3, 2, 1]);

    insert_find_all(&[1, 0, 2, 3]);
    insert_find_all(&[1, 0, 3, 2]);
    insert_find_all(&[1, 2, 0, 3]);
    insert_find_all(&[1, 2, 3, 0]);
    insert_find_all(&[1, 3, 0, 2]);
    insert_find_all(&[1, 3, 2, 0]);

    insert_find_all(&[2, 0, 1, 3]);
    insert_find_all(&[2, 0, 3, 1]);
    insert_find_all(&[2, 1, 0, 3]);
    insert_find_all(&[2, 1, 3, 0]);
    insert_find_all(&[2, 3, 0, 1]);
    insert_find_all(&[2, 3, 1, 0]);

    insert_find_all(&[3, 0, 1, 2]);
    insert_find_all(&[3, 0, 2, 1]);
    insert_find_all(&[3, 1, 0, 2]);
    insert_find_all(&[3, 1, 2, 0]);
    insert_find_all(&[3, 2, 0, 1]);
    insert_find_all(&[3, 2, 1, 0]);
}

fn insert_remove_all(keys: &[Key]) {
    let mut tree = tree_of(keys);

    for &key in keys {
        let node = tree.get_raw(key).expect("item not found");
        unsafe { tree.remove_at(node) };
        tree.assert_invariants();
    }

    for &key in keys {
        assert!(tree.insert(TestNode::new(key)).is_ok());
        tree.assert_invariants();
    }

    for &key in keys.iter().rev() {
        let node = tree.get_raw(key).expect("item not found");
        unsafe { tree.remove_at(node) };
        tree.assert_invariants();
    }

    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_four() {
    insert_remove_all(&[0, 1, 2, 3]);
    insert_remove_all(&[0, 1, 3, 2]);
    insert_remove_all(&[0, 2, 1, 3]);
    insert_remove_all(&[0, 2, 3, 1]);
    insert_remove_all(&[0, 3, 1, 2]);
    insert_remove_all(&[0, 3, 2, 1]);

    insert_remove_all(&[1, 0, 2, 3]);
    insert_remove_all(&[1, 0, 3, 2]);
    insert_remove_all(&[1, 2, 0, 3]);
    insert_remove_all(&[1, 2, 3, 0]);
    insert_remove_all(&[1, 3, 0, 2]);
    insert_remove_all(&[1, 3, 2, 0]);

    insert_remove_all(&[2, 0, 1, 3]);
    insert_remove_all(&[2, 0, 3, 1]);
    insert_remove_all(&[2, 1, 0, 3]);
    insert_remove_all(&[2, 1, 3, 0]);
    insert_remove_all(&[2, 3, 0, 1]);
    insert_remove_all(&[2, 3, 1, 0]);

    insert_remove_all(&[3, 0, 1, 2]);
    insert_remove_all(&[3, 0, 2, 1]);
    insert_remove_all(&[3, 1, 0, 2]);
    insert_remove_all(&[3, 1, 2, 0]);
    insert_remove_all(&[3, 2, 0, 1]);
    insert_remove_all(&[3, 2, 1, 0]);
}

#[test]
fn remove_many() {
    insert_remove_all(&scrambled(101));
    insert_remove_all(&(0..128).collect::<Vec<_>>());
}

#[test]
fn ascending_inserts_rotate_once() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    assert_eq!(tree.insert(TestNode::new(10)).ok(), Some(0));
    assert_eq!(tree.insert(TestNode::new(20)).ok(), Some(0));
    assert_eq!(tree.insert(TestNode::new(30)).ok(), Some(1));
    tree.assert_invariants();

    let root = tree.root.unwrap();
    unsafe {
        assert_eq!(root.as_ref().key(), 20);

        let links = AvlTree::links(root);
        let sizes = [
            AvlTree::size_of(links.left()),
            links.size(),
            AvlTree::size_of(links.right()),
        ];
        assert_eq!(sizes, [1, 3, 1]);
    }
}

#[test]
fn zigzag_insert_rotates_twice() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    assert_eq!(tree.insert(TestNode::new(10)).ok(), Some(0));
    assert_eq!(tree.insert(TestNode::new(30)).ok(), Some(0));
    assert_eq!(tree.insert(TestNode::new(20)).ok(), Some(2));
    tree.assert_invariants();

    assert_eq!(tree.root.map(|r| unsafe { r.as_ref().key() }), Some(20));
}

#[test]
fn duplicate_insert_returns_item() {
    let mut tree = tree_of(&[1, 2, 3]);

    let rejected = tree.insert(TestNode::new(2)).unwrap_err();
    assert_eq!(rejected.key, 2);
    assert_eq!(tree.len(), 3);
    tree.assert_invariants();
}

#[test]
fn remove_root_of_three() {
    let mut tree = tree_of(&[2, 1, 3]);

    let root = tree.root.unwrap();
    let (removed, steps) = unsafe { tree.remove_at(root) };
    assert_eq!(removed.key, 2);
    assert_eq!(steps, 0);
    tree.assert_invariants();

    assert_eq!(keys_of(&tree), vec![1, 3]);
    assert!(tree.height() <= 1);
}

fn remove_steps(keys: &[Key], remove: Key) -> (AvlTree<TestNode>, usize) {
    let mut tree = tree_of(keys);

    let node = tree.get_raw(remove).expect("item not found");
    let (removed, steps) = unsafe { tree.remove_at(node) };
    assert_eq!(removed.key, remove);
    tree.assert_invariants();

    (tree, steps)
}

fn root_key(tree: &AvlTree<TestNode>) -> Option<Key> {
    tree.root.map(|r| unsafe { r.as_ref().key() })
}

#[test]
fn remove_counts_rotation() {
    // Removing 1 leaves 2 right-heavy by two; 3 rotates up.
    let (tree, steps) = remove_steps(&[2, 1, 3, 4], 1);

    assert_eq!(steps, 1);
    assert_eq!(keys_of(&tree), vec![2, 3, 4]);
    assert_eq!(root_key(&tree), Some(3));
}

#[test]
fn remove_counts_successor_height_change() {
    // 3 is the root's right child and takes its place, but is one shorter than the old root.
    let (tree, steps) = remove_steps(&[2, 1, 3, 4], 2);

    assert_eq!(steps, 1);
    assert_eq!(keys_of(&tree), vec![1, 3, 4]);
    assert_eq!(root_key(&tree), Some(3));
    assert_eq!(tree.height(), 1);
}

#[test]
fn remove_counts_deep_successor() {
    // 3 is unlinked from under 4, which shrinks, then replaces the root, which shrinks too.
    let (tree, steps) = remove_steps(&[2, 1, 4, 3], 2);

    assert_eq!(steps, 2);
    assert_eq!(keys_of(&tree), vec![1, 3, 4]);
    assert_eq!(root_key(&tree), Some(3));
    assert_eq!(tree.height(), 1);
}

#[test]
fn remove_counts_height_changes() {
    // No rotation: 3 and then the root each lose one level.
    let (tree, steps) = remove_steps(&[2, 1, 3, 4], 4);

    assert_eq!(steps, 2);
    assert_eq!(keys_of(&tree), vec![1, 2, 3]);
    assert_eq!(root_key(&tree), Some(2));
    assert_eq!(tree.height(), 1);
}

#[test]
fn first_tracks_minimum() {
    let mut tree = tree_of(&scrambled(41));
    assert_eq!(tree.first().map(|n| n.key), Some(0));

    assert!(tree.insert(TestNode::new(-5)).is_ok());
    assert_eq!(tree.first().map(|n| n.key), Some(-5));

    for expected in [-5, 0, 1, 2] {
        assert_eq!(tree.pop_first().map(|n| n.key), Some(expected));
        tree.assert_invariants();
    }
    assert_eq!(tree.first().map(|n| n.key), Some(3));

    assert_eq!(tree.pop_last().map(|n| n.key), Some(40));
    assert_eq!(tree.last().map(|n| n.key), Some(39));
}

#[test]
fn search_closest_returns_insertion_point() {
    let tree = tree_of(&[20, 10, 30]);

    assert_eq!(tree.search_closest(10).map(|n| n.key), Some(10));
    assert_eq!(tree.search_closest(15).map(|n| n.key), Some(10));
    assert_eq!(tree.search_closest(35).map(|n| n.key), Some(30));
    assert!(tree.get(15).is_none());

    let empty: AvlTree<TestNode> = AvlTree::new();
    assert!(empty.search_closest(1).is_none());
    assert_eq!(empty.height(), -1);
    assert_eq!(empty.len(), 0);
}

#[test]
fn iter_both_ends() {
    let tree = tree_of(&scrambled(23));

    assert_eq!(keys_of(&tree), (0..23).collect::<Vec<_>>());
    assert_eq!(
        tree.iter().rev().map(|n| n.key).collect::<Vec<_>>(),
        (0..23).rev().collect::<Vec<_>>()
    );

    let mut iter = tree.iter();
    assert_eq!(iter.len(), 23);
    assert_eq!(iter.next().map(|n| n.key), Some(0));
    assert_eq!(iter.next_back().map(|n| n.key), Some(22));
    assert_eq!(iter.len(), 21);
}

#[test]
fn rank_select_inverse() {
    let tree = tree_of(&scrambled(97));

    for i in 1..=tree.len() {
        let node = tree.select(i).expect("rank in range");
        assert_eq!(node.key as usize, i - 1);
        assert_eq!(tree.rank(node.key), Some(i));
    }

    assert!(tree.select(0).is_none());
    assert!(tree.select(98).is_none());
    assert_eq!(tree.rank(1000), None);
}

#[test]
fn select_left_of_root() {
    // Ranks below the root's rank are found by climbing from the cached minimum.
    let tree = tree_of(&(0..64).collect::<Vec<_>>());
    let root_rank = tree.rank(tree.root.map(|r| unsafe { r.as_ref().key() }).unwrap());

    for i in 1..root_rank.unwrap() {
        assert_eq!(tree.select(i).map(|n| n.key), Some(i as Key - 1));
    }
}

#[test]
fn join_example() {
    let mut left = tree_of(&[1, 3, 5]);
    let mut right = tree_of(&[9, 11]);

    let cost = left.join(TestNode::new(7), &mut right).ok();
    assert_eq!(cost, Some(1));
    left.assert_invariants();
    right.assert_invariants();

    assert!(right.is_empty());
    assert_eq!(keys_of(&left), vec![1, 3, 5, 7, 9, 11]);
    assert_eq!(left.first().map(|n| n.key), Some(1));
}

#[test]
fn join_uneven_heights() {
    let mut tall = tree_of(&scrambled(101));
    let mut short = tree_of(&[200, 201]);
    let (tall_height, short_height) = (tall.height(), short.height());

    // `short` holds the greater keys and receives the result.
    let cost = short.join(TestNode::new(150), &mut tall).ok();
    assert_eq!(cost, Some(usize::from(tall_height.abs_diff(short_height)) + 1));
    short.assert_invariants();

    assert!(tall.is_empty());
    assert_eq!(short.len(), 104);
    assert_eq!(short.first().map(|n| n.key), Some(0));
    assert_eq!(short.last().map(|n| n.key), Some(201));
}

#[test]
fn join_with_empty_sides() {
    let mut a: AvlTree<TestNode> = AvlTree::new();
    let mut b: AvlTree<TestNode> = AvlTree::new();

    assert_eq!(a.join(TestNode::new(5), &mut b).ok(), Some(1));
    a.assert_invariants();
    assert_eq!(keys_of(&a), vec![5]);

    let mut low = tree_of(&[1, 2, 3]);
    let mut empty: AvlTree<TestNode> = AvlTree::new();
    assert_eq!(low.join(TestNode::new(10), &mut empty).ok(), Some(2));
    low.assert_invariants();
    assert_eq!(keys_of(&low), vec![1, 2, 3, 10]);

    let mut high = tree_of(&[20, 30]);
    let mut empty: AvlTree<TestNode> = AvlTree::new();
    assert_eq!(empty.join(TestNode::new(10), &mut high).ok(), Some(2));
    empty.assert_invariants();
    assert_eq!(keys_of(&empty), vec![10, 20, 30]);
    assert_eq!(empty.first().map(|n| n.key), Some(10));
}

#[test]
fn join_rejects_unordered_separator() {
    let mut left = tree_of(&[1, 3, 5]);
    let mut right = tree_of(&[9, 11]);

    let rejected = left.join(TestNode::new(10), &mut right).unwrap_err();
    assert_eq!(rejected.key, 10);
    assert_eq!(keys_of(&left), vec![1, 3, 5]);
    assert_eq!(keys_of(&right), vec![9, 11]);
}

#[test]
fn split_join_round_trip() {
    let keys = scrambled(67);

    for &pivot in &keys {
        let mut tree = tree_of(&keys);

        let (mut left, node, mut right) = tree.split(pivot).expect("pivot present");
        assert!(tree.is_empty());
        left.assert_invariants();
        right.assert_invariants();

        assert_eq!(node.key, pivot);
        assert_eq!(keys_of(&left), (0..pivot).collect::<Vec<_>>());
        assert_eq!(keys_of(&right), (pivot + 1..67).collect::<Vec<_>>());

        assert!(left.join(node, &mut right).is_ok());
        left.assert_invariants();
        assert_eq!(keys_of(&left), (0..67).collect::<Vec<_>>());
    }
}

#[test]
fn split_at_extreme_keys() {
    let mut tree = tree_of(&[Key::MIN, 0, Key::MAX]);

    let (left, node, right) = tree.split(Key::MAX).expect("pivot present");
    assert_eq!(node.key, Key::MAX);
    assert_eq!(keys_of(&left), vec![Key::MIN, 0]);
    assert!(right.is_empty());

    model::run_btree_equivalence(vec![
        Op::Insert(ItemValue::Index(Key::MAX as usize)),
        Op::Insert(ItemValue::Random(5)),
        Op::SplitJoin(ItemValue::Index(1)),
        Op::Insert(ItemValue::Random(6)),
        Op::SplitJoin(ItemValue::Index(2)),
    ]);
}

#[test]
fn split_missing_key() {
    let mut tree = tree_of(&[1, 2, 3]);

    assert!(tree.split(4).is_none());
    assert_eq!(keys_of(&tree), vec![1, 2, 3]);
}

#[test]
fn cursor_reports_rank() {
    let mut tree = tree_of(&scrambled(11));

    let mut cursor = tree.cursor_first();
    for expected in 1..=11 {
        assert_eq!(cursor.rank(), Some(expected));
        cursor.move_next();
    }
    assert_eq!(cursor.rank(), None);

    let mut cursor = tree.cursor_last_mut();
    assert_eq!(cursor.rank(), Some(11));
    assert_eq!(cursor.remove_current().map(|n| n.key), Some(10));
    assert!(cursor.get().is_none());
    cursor.move_prev();
    assert_eq!(cursor.rank(), Some(10));

    tree.assert_invariants();
}

#[test]
fn cursor_seeks() {
    let keys = scrambled(11).into_iter().map(|k| k * 2).collect::<Vec<_>>();
    let tree = tree_of(&keys);
    let mut cursor = tree.cursor_first();

    let at = |cursor: &Cursor<'_, TestNode>| (cursor.get().map(|n| n.key), cursor.rank());

    cursor.seek_rank(4);
    assert_eq!(at(&cursor), (Some(6), Some(4)));
    cursor.seek_rank(11);
    assert_eq!(at(&cursor), (Some(20), Some(11)));
    cursor.seek_rank(12);
    assert_eq!(at(&cursor), (None, None));
    cursor.seek_rank(0);
    assert_eq!(at(&cursor), (None, None));

    cursor.seek_key(7);
    assert_eq!(at(&cursor), (Some(8), Some(5)));
    cursor.seek_key(8);
    assert_eq!(at(&cursor), (Some(8), Some(5)));
    cursor.seek_key(-3);
    assert_eq!(at(&cursor), (Some(0), Some(1)));
    cursor.seek_key(21);
    assert_eq!(at(&cursor), (None, None));

    assert_eq!(cursor.peek_next().map(|n| n.key), Some(0));
    assert_eq!(cursor.peek_prev().map(|n| n.key), Some(20));
}

#[test]
fn cursor_moves_by_offset() {
    let keys = scrambled(11).into_iter().map(|k| k * 2).collect::<Vec<_>>();
    let tree = tree_of(&keys);
    let mut cursor = tree.cursor_first();

    cursor.seek_rank(2);
    cursor.move_by(5);
    assert_eq!(cursor.rank(), Some(7));
    assert_eq!(cursor.get().map(|n| n.key), Some(12));

    cursor.move_by(-6);
    assert_eq!(cursor.get().map(|n| n.key), Some(0));

    // Off either end lands on the ghost, which counts as rank 0.
    cursor.move_by(-1);
    assert_eq!(cursor.rank(), None);
    cursor.move_by(3);
    assert_eq!(cursor.get().map(|n| n.key), Some(4));
    cursor.move_by(100);
    assert_eq!(cursor.rank(), None);
}

#[test]
fn cursor_removal_keeps_rank() {
    let mut tree = tree_of(&(0..8).collect::<Vec<_>>());

    {
        let mut cursor = tree.cursor_first_mut();
        cursor.seek_rank(3);

        assert_eq!(cursor.remove_current().map(|n| n.key), Some(2));
        assert_eq!(cursor.get().map(|n| n.key), Some(3));
        assert_eq!(cursor.rank(), Some(3));

        assert_eq!(cursor.remove_current_and_move_prev().map(|n| n.key), Some(3));
        assert_eq!(cursor.get().map(|n| n.key), Some(1));
        assert_eq!(cursor.rank(), Some(2));

        cursor.seek_key(7);
        assert_eq!(cursor.remove_current().map(|n| n.key), Some(7));
        assert_eq!(cursor.rank(), None);
    }

    tree.assert_invariants();
    assert_eq!(keys_of(&tree), vec![0, 1, 4, 5, 6]);
}

#[test]
fn dotgraph_labels_nodes() {
    let tree = tree_of(&[2, 1, 3]);

    let mut out = String::new();
    tree.dotgraph("t", &mut out).unwrap();

    assert!(out.contains("\"grapht-2\" [label=\"2 (h=1, n=3)\"]"));
    assert!(out.contains("\"grapht-2\" -> \"grapht-1\";"));
    assert!(out.contains("[shape=point]"));

    let empty: AvlTree<TestNode> = AvlTree::new();
    let mut out = String::new();
    empty.dotgraph("e", &mut out).unwrap();
    assert_eq!(out, "digraph \"graph-e\" {}");
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        values in proptest::collection::vec(-500i64..500, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(values, ops);
    }
}
