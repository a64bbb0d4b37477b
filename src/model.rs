extern crate std;

use std::{
    collections::BTreeSet,
    ops::Bound::{Excluded, Unbounded},
    prelude::v1::*,
    ptr::NonNull,
};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{AvlTree, Key, Links, TreeNode};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: Key,
}

impl TestNode {
    pub fn new(key: Key) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::new(Box::into_raw(r)).unwrap()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    fn key(&self) -> Key {
        self.key
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn value_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue),
    Get(ItemValue),
    Remove(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
    Rank(ItemValue),
    Select(usize),
    SplitJoin(ItemValue),
}

impl Op {
    fn finalize(self, sorted: &[Key]) -> FinalOp {
        fn get_value(v: &[Key], i: ItemValue) -> Key {
            match i {
                ItemValue::Index(idx) => {
                    if v.is_empty() {
                        idx as Key
                    } else {
                        v[idx % v.len()]
                    }
                }
                ItemValue::Random(v) => Key::from(v),
            }
        }

        match self {
            Op::Insert(item) => FinalOp::Insert(get_value(sorted, item)),
            Op::Get(item) => FinalOp::Get(get_value(sorted, item)),
            Op::Remove(item) => FinalOp::Remove(get_value(sorted, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
            Op::Rank(item) => FinalOp::Rank(get_value(sorted, item)),
            // Ranks are 1-based; aim mostly inside the tree, occasionally one past the end.
            Op::Select(idx) => FinalOp::Select(idx % (sorted.len() + 2)),
            Op::SplitJoin(item) => FinalOp::SplitJoin(get_value(sorted, item)),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(Key),
    Get(Key),
    Remove(Key),
    First,
    PopFirst,
    Last,
    PopLast,
    Rank(Key),
    Select(usize),
    SplitJoin(Key),
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        value_strategy().prop_map(Op::Insert),
        value_strategy().prop_map(Op::Get),
        value_strategy().prop_map(Op::Remove),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
        value_strategy().prop_map(Op::Rank),
        (0usize..1000).prop_map(Op::Select),
        value_strategy().prop_map(Op::SplitJoin),
    ]
}

pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut sorted_values = Vec::with_capacity(ops.len());
    let mut btree = BTreeSet::new();
    let mut avl: AvlTree<TestNode> = AvlTree::new();

    fn insert_sorted(v: &mut Vec<Key>, value: Key) {
        if let Err(idx) = v.binary_search(&value) {
            v.insert(idx, value);
        }
    }

    fn remove_sorted(v: &mut Vec<Key>, value: Key) {
        if let Ok(idx) = v.binary_search(&value) {
            v.remove(idx);
        }
    }

    #[inline]
    #[allow(clippy::boxed_local)]
    fn node_key(node: Box<TestNode>) -> Key {
        node.key
    }

    let mut final_ops = Vec::with_capacity(ops.len());
    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&sorted_values);
        final_ops.push(final_op);

        match final_op {
            FinalOp::Insert(value) => {
                insert_sorted(&mut sorted_values, value);

                let from_btree = !btree.insert(value);
                let inserted = avl.insert(TestNode::new(value));

                assert_eq!(from_btree, inserted.is_err(), "FinalOp #{op_id}: {op:?}");
                if let Ok(rotations) = inserted {
                    assert!(rotations <= 2, "FinalOp #{op_id}: {op:?}: {rotations} rotations");
                }
            }

            FinalOp::Get(value) => {
                let from_btree = btree.get(&value).copied();
                let from_avl = avl.get(value).map(|node| node.key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Remove(value) => {
                remove_sorted(&mut sorted_values, value);

                let from_btree = btree.remove(&value).then_some(value);

                // At most a double rotation, or a single height change, per level.
                let max_steps = 2 * usize::from((avl.height() + 1).unsigned_abs());
                let from_avl = avl.get_raw(value).map(|node| {
                    let (node, steps) = unsafe { avl.remove_at(node) };
                    assert!(steps <= max_steps, "FinalOp #{op_id}: {op:?}: {steps} steps");
                    node_key(node)
                });

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first().copied();
                let from_avl = avl.first().map(|node| node.key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_avl = avl.pop_first().map(node_key);

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last().copied();
                let from_avl = avl.last().map(|node| node.key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_avl = avl.pop_last().map(node_key);

                if let Some(value) = from_btree {
                    remove_sorted(&mut sorted_values, value);
                }

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Rank(value) => {
                let from_btree = btree.contains(&value).then(|| btree.range(..=value).count());
                let from_avl = avl.rank(value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::Select(rank) => {
                let from_btree = rank
                    .checked_sub(1)
                    .and_then(|idx| btree.iter().nth(idx).copied());
                let from_avl = avl.select(rank).map(|node| node.key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {op:?}");
            }

            FinalOp::SplitJoin(value) => {
                let split = avl.split(value);
                assert_eq!(
                    split.is_some(),
                    btree.contains(&value),
                    "FinalOp #{op_id}: {op:?}"
                );

                if let Some((mut left, pivot, mut right)) = split {
                    assert!(avl.is_empty());
                    left.assert_invariants();
                    right.assert_invariants();
                    assert_eq!(pivot.key, value);

                    let left_keys = left.iter().map(|node| node.key);
                    assert!(left_keys.eq(btree.range(..value).copied()));

                    let right_keys = right.iter().map(|node| node.key);
                    assert!(right_keys.eq(btree.range((Excluded(value), Unbounded)).copied()));

                    let expected_cost = match (left.height(), right.height()) {
                        (-1, -1) => 1,
                        (-1, h) | (h, -1) => usize::from(h.unsigned_abs()) + 1,
                        (l, r) => usize::from(l.abs_diff(r)) + 1,
                    };

                    let cost = left
                        .join(pivot, &mut right)
                        .unwrap_or_else(|_| panic!("FinalOp #{op_id}: {op:?}: rejoin failed"));
                    assert_eq!(cost, expected_cost, "FinalOp #{op_id}: {op:?}");
                    assert!(right.is_empty());
                    avl = left;
                }
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().zip(avl.iter()).all(|(&a, b)| a == b.key));
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum CursorOp {
    // Get is not an operation as it's executed on every loop iteration to check equivalence.
    MovePrev,
    MoveNext,
    PeekNext,
    PeekPrev,
    RemoveCurrent,
    RemoveCurrentMovePrev,
    SeekRank(usize),
    SeekKey(Key),
    MoveBy(isize),
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::MovePrev),
        Just(CursorOp::MoveNext),
        Just(CursorOp::PeekNext),
        Just(CursorOp::PeekPrev),
        Just(CursorOp::RemoveCurrent),
        Just(CursorOp::RemoveCurrentMovePrev),
        (0usize..120).prop_map(CursorOp::SeekRank),
        (-600i64..600).prop_map(CursorOp::SeekKey),
        (-20isize..20).prop_map(CursorOp::MoveBy),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub values: Vec<Key>,
    pub ops: Vec<CursorOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        fn value(u: &mut arbitrary::Unstructured<'_>) -> Key {
            Key::arbitrary(u).unwrap_or(0)
        }

        fn op(u: &mut arbitrary::Unstructured<'_>) -> CursorOp {
            CursorOp::arbitrary(u).unwrap_or(CursorOp::MoveNext)
        }

        let num_values = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let values = core::iter::repeat_with(|| value(u))
            .take(num_values.into())
            .collect();

        let ops = core::iter::repeat_with(|| op(u))
            .take(num_ops.into())
            .collect();

        Ok(CursorEquivalenceInput { values, ops })
    }
}

pub fn run_cursor_equivalence(mut values: Vec<Key>, ops: Vec<CursorOp>) {
    values.sort_unstable();
    values.dedup();

    let mut vec = Vec::new();
    let mut avl: AvlTree<TestNode> = AvlTree::new();

    for val in values {
        vec.push(val);
        assert!(avl.insert(TestNode::new(val)).is_ok());
    }

    fn vec_curs_prev(v: &[Key], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_sub(1),
            None => v.len().checked_sub(1),
        }
    }

    fn vec_curs_next(v: &[Key], curs: Option<usize>) -> Option<usize> {
        match curs {
            Some(i) => i.checked_add(1).filter(|&i| i < v.len()),
            None => (!v.is_empty()).then_some(0),
        }
    }

    let mut vec_curs = vec_curs_next(&vec, None);
    let mut avl_curs = avl.cursor_first_mut();

    // Check that the initial states are equivalent.
    {
        let v = vec_curs.map(|i| vec[i]);
        let a = avl_curs.get().map(TestNode::key);

        assert_eq!(v, a);
    }

    for op in ops {
        match op {
            CursorOp::MoveNext => {
                vec_curs = vec_curs_next(&vec, vec_curs);
                avl_curs.move_next();
            }

            CursorOp::MovePrev => {
                vec_curs = vec_curs_prev(&vec, vec_curs);
                avl_curs.move_prev();
            }

            CursorOp::PeekNext => {
                let v = vec_curs_next(&vec, vec_curs).map(|i| vec[i]);
                let a = avl_curs.peek_next().map(TestNode::key);

                assert_eq!(v, a);
            }

            CursorOp::PeekPrev => {
                let v = vec_curs_prev(&vec, vec_curs).map(|i| vec[i]);
                let a = avl_curs.peek_prev().map(TestNode::key);

                assert_eq!(v, a);
            }

            CursorOp::RemoveCurrent => {
                let v = vec_curs.map(|i| vec.remove(i));

                if vec_curs == Some(vec.len()) {
                    vec_curs = None;
                }

                let a = avl_curs.remove_current().map(|node| node.key);

                assert_eq!(v, a);
            }

            CursorOp::RemoveCurrentMovePrev => {
                let new_v_curs = vec_curs.is_some().then(|| vec_curs_prev(&vec, vec_curs));
                let v = vec_curs.map(|i| vec.remove(i));

                if let Some(vc) = new_v_curs {
                    vec_curs = vc;
                }

                let a = avl_curs
                    .remove_current_and_move_prev()
                    .map(|node| node.key);

                assert_eq!(v, a);
            }

            CursorOp::SeekRank(rank) => {
                vec_curs = rank.checked_sub(1).filter(|&i| i < vec.len());
                avl_curs.seek_rank(rank);
            }

            CursorOp::SeekKey(key) => {
                let idx = vec.partition_point(|&v| v < key);
                vec_curs = (idx < vec.len()).then_some(idx);
                avl_curs.seek_key(key);
            }

            CursorOp::MoveBy(delta) => {
                let rank = vec_curs.map_or(0, |i| i + 1);
                vec_curs = rank
                    .checked_add_signed(delta)
                    .and_then(|r| r.checked_sub(1))
                    .filter(|&i| i < vec.len());
                avl_curs.move_by(delta);
            }
        }

        let v = vec_curs.map(|i| vec[i]);
        let a = avl_curs.get().map(TestNode::key);
        assert_eq!(v, a);

        // Positions are 1-based.
        assert_eq!(vec_curs.map(|i| i + 1), avl_curs.rank());
    }
}
