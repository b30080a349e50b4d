//! Depth-first, pre-order traversal of a subtree.

use super::Node;

/// One step of a [`Walk`]: a node and its depth below the walked root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit<'t> {
    pub node: Node<'t>,
    /// 1 for direct children of the walked root.
    pub depth: usize,
}

/// Lazy pre-order iterator over the descendants of a root node.
///
/// The root itself is not yielded. Each call to [`walk`] starts a fresh
/// traversal, so the same root can be walked any number of times.
pub struct Walk<'t> {
    stack: Vec<Visit<'t>>,
}

/// Walk all descendants of `root` in document order.
pub fn walk(root: Node<'_>) -> Walk<'_> {
    let mut w = Walk { stack: Vec::new() };
    w.push_children(root, 1);
    w
}

impl<'t> Walk<'t> {
    fn push_children(&mut self, node: Node<'t>, depth: usize) {
        self.stack
            .extend(node.children().rev().map(|node| Visit { node, depth }));
    }
}

impl<'t> Iterator for Walk<'t> {
    type Item = Visit<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        self.push_children(visit.node, visit.depth + 1);
        Some(visit)
    }
}
