//! The MAT as a tree of circles.
//!
//! Two circles are adjacent when a boundary piece runs from a contact of
//! one directly to a contact of the other. Starting from the circle of the
//! first contact of the outer loop, circles are visited depth first; a
//! circle already reached is never entered again, so the cycle a hole
//! would close is cut.

use crate::contact::{CircleId, ContactId, Contacts};

/// Handle of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a node hangs off its parent: the boundary piece from
/// `parent_contact` to `contact` runs between the two circles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub parent_contact: ContactId,
    pub contact: ContactId,
}

#[derive(Debug, Clone)]
pub struct MatNode {
    pub circle: CircleId,
    pub parent: Option<NodeId>,
    /// None for the root.
    pub link: Option<Link>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct MatTree {
    nodes: Vec<MatNode>,
}

impl MatTree {
    /// Build the tree over every circle reachable from the outer loop.
    ///
    /// Returns None when the outer loop has no contacts.
    pub fn build(contacts: &Contacts) -> Option<Self> {
        let head = contacts.head(0)?;
        let root_circle = contacts.contact(head).circle;

        let mut node_of: Vec<Option<NodeId>> = vec![None; contacts.circle_count()];
        let mut nodes = vec![MatNode {
            circle: root_circle,
            parent: None,
            link: None,
            children: Vec::new(),
        }];
        node_of[root_circle.index()] = Some(NodeId(0));

        let mut stack = vec![NodeId(0)];
        while let Some(id) = stack.pop() {
            let circle = nodes[id.0].circle;
            for &d in &contacts.circle(circle).contacts {
                let a = contacts.next(d);
                let next_circle = contacts.contact(a).circle;
                if next_circle == circle || node_of[next_circle.index()].is_some() {
                    continue;
                }
                let child = NodeId(nodes.len());
                nodes.push(MatNode {
                    circle: next_circle,
                    parent: Some(id),
                    link: Some(Link {
                        parent_contact: d,
                        contact: a,
                    }),
                    children: Vec::new(),
                });
                nodes[id.0].children.push(child);
                node_of[next_circle.index()] = Some(child);
                stack.push(child);
            }
        }
        Some(Self { nodes })
    }

    pub fn start(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &MatNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[MatNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visit every node depth first from the start, parents before
    /// children, passing each node with its parent.
    pub fn traverse<F>(&self, mut f: F)
    where
        F: FnMut(&MatNode, Option<&MatNode>),
    {
        let mut stack = vec![self.start()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            f(node, node.parent.map(|p| &self.nodes[p.0]));
            stack.extend(node.children.iter().rev());
        }
    }
}
