use std::ptr::NonNull;

use cordyceps::Linked;
use cordyceps_avl::{AvlTree, Key, Links, TreeNode};

#[derive(Debug)]
#[repr(C)]
struct DemoNode {
    links: Links<DemoNode>,
    key: Key,
}

impl DemoNode {
    fn new(key: Key) -> Box<DemoNode> {
        Box::new(DemoNode {
            links: Links::new(),
            key,
        })
    }
}

unsafe impl Linked<Links<DemoNode>> for DemoNode {
    type Handle = Box<DemoNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::new(Box::into_raw(r)).unwrap()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<DemoNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<DemoNode>> for DemoNode {
    fn key(&self) -> Key {
        self.key
    }
}

fn keys(tree: &AvlTree<DemoNode>) -> Vec<Key> {
    tree.iter().map(|node| node.key).collect()
}

fn main() {
    let mut tree: AvlTree<DemoNode> = AvlTree::new();

    for key in [10, 20, 30, 5, 25, 1, 40] {
        let rotations = tree.insert(DemoNode::new(key)).ok().unwrap();
        tree.assert_invariants();
        println!("insert {key}: {rotations} rotation(s), {:?}", keys(&tree));
    }

    for rank in 1..=tree.len() {
        let key = tree.select(rank).unwrap().key;
        assert_eq!(tree.rank(key), Some(rank));
    }

    let (mut left, pivot, mut right) = tree.split(20).unwrap();
    println!("split at 20: {:?} | {:?}", keys(&left), keys(&right));

    let cost = left.join(pivot, &mut right).ok().unwrap();
    left.assert_invariants();
    println!("join cost {cost}: {:?}", keys(&left));

    let mut dot = String::new();
    left.dotgraph("demo", &mut dot).unwrap();
    println!("{dot}");

    let min = left.pop_first().unwrap().key;
    assert_eq!(min, 1);
    left.assert_invariants();

    drop(left);
}
