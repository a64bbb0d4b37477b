extern crate std;

use core::ptr::NonNull;
use std::{collections::VecDeque, fmt, prelude::v1::*};

use crate::{AvlTree, Links, TreeNode};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Renders the tree as a Graphviz digraph, one row per level.
    ///
    /// Nodes are labelled with their key, height and subtree size; sentinels are drawn as points.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item<T: ?Sized> {
            Node(NonNull<T>),
            Sentinel(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut sentinels = 0;
        let mut edges = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let Some(item) = queue.pop_front() else {
                    break;
                };

                let node = match item {
                    Item::Node(node) => node,
                    Item::Sentinel(id) => {
                        write!(w, "\"graph{name}-sentinel{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let (key, height, size, left, right) = unsafe {
                    let links = Self::links(node);
                    (
                        node.as_ref().key(),
                        links.height(),
                        links.size(),
                        links.left(),
                        links.right(),
                    )
                };

                write!(
                    w,
                    "\"graph{name}-{key}\" [label=\"{key} (h={height}, n={size})\"]; "
                )?;

                for child in [left, right] {
                    match child {
                        Some(child) => {
                            let child_key = unsafe { child.as_ref().key() };

                            queue.push_back(Item::Node(child));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                            )?;
                        }
                        None => {
                            queue.push_back(Item::Sentinel(sentinels));
                            writeln!(
                                edges,
                                "\"graph{name}-{key}\" -> \"graph{name}-sentinel{sentinels}\";"
                            )?;
                            sentinels += 1;
                        }
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&edges)?;

        w.write_str(" }\n}")
    }
}
