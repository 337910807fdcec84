//! Inverted binary sum tree.
//!
//! The tree is built "upside down": construction starts from a non-empty
//! sequence of leaf payloads and repeatedly joins adjacent nodes into
//! parents until a single root remains. Every parent stores the monoidal
//! sum of its children, so the root always holds the sum over all leaves,
//! and changing one leaf only requires re-summing the `O(log N)` ancestors
//! on its path to the root.
//!
//! Nodes live in a flat arena; child and parent links are indices into it.
//! Leaves occupy indices `[0, N)` in insertion order. The structure is
//! fixed at construction: no nodes are added or removed afterwards.

/// Index of a node in the tree's arena.
pub type NodeIndex = usize;

/// Payload that can be combined under a monoidal sum.
///
/// Joining an odd level pads it with a missing-child slot; the missing
/// child contributes [`identity`](SumPayload::identity) to its parent's
/// sum.
pub trait SumPayload: Clone {
    /// The element contributed by a missing child.
    fn identity() -> Self;

    /// Monoidal sum of two payloads.
    fn sum(&self, rhs: &Self) -> Self;
}

impl SumPayload for f64 {
    fn identity() -> Self {
        0.0
    }

    fn sum(&self, rhs: &Self) -> Self {
        self + rhs
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SumNode<T> {
    data: T,
    left: Option<NodeIndex>,
    right: Option<NodeIndex>,
    parent: Option<NodeIndex>,
}

/// Binary tree with a monoidal sum at every internal node.
#[derive(Debug, Clone, PartialEq)]
pub struct InvertedSumTree<T> {
    /// Arena of all nodes; leaves first, then each join level in order,
    /// ending with the root.
    nodes: Vec<SumNode<T>>,
    /// Number of leaves (arena indices `[0, leaf_count)`).
    leaf_count: usize,
    /// Arena index of the root.
    root: NodeIndex,
}

impl<T: SumPayload> InvertedSumTree<T> {
    /// Build a tree with `leaf_values` at the leaves, in order.
    ///
    /// Adjacent nodes are joined pairwise level by level; a level with an
    /// odd number of nodes (above one) is padded with a missing-child
    /// slot whose parent takes the sum of its present child and the
    /// identity.
    ///
    /// # Panics
    ///
    /// Panics if `leaf_values` is empty.
    #[must_use]
    pub fn new(leaf_values: Vec<T>) -> Self {
        assert!(
            !leaf_values.is_empty(),
            "sum tree requires at least one leaf"
        );
        let leaf_count = leaf_values.len();
        let mut nodes: Vec<SumNode<T>> = leaf_values
            .into_iter()
            .map(|data| SumNode {
                data,
                left: None,
                right: None,
                parent: None,
            })
            .collect();

        let mut level: Vec<Option<NodeIndex>> = (0..leaf_count).map(Some).collect();
        while level.len() > 1 {
            if level.len() % 2 != 0 {
                level.push(None);
            }
            let mut joined = Vec::with_capacity(level.len() / 2);
            for pair in level.chunks(2) {
                let (left, right) = (pair[0], pair[1]);
                let data = summed_data(&nodes, left, right);
                let parent = nodes.len();
                nodes.push(SumNode {
                    data,
                    left,
                    right,
                    parent: None,
                });
                if let Some(child) = left {
                    nodes[child].parent = Some(parent);
                }
                if let Some(child) = right {
                    nodes[child].parent = Some(parent);
                }
                joined.push(Some(parent));
            }
            level = joined;
        }

        let root = level[0].expect("joining a non-empty level always ends at a real node");
        Self {
            nodes,
            leaf_count,
            root,
        }
    }

    /// Number of leaves.
    #[must_use]
    pub const fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Total number of nodes in the arena.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Arena index of the root node.
    #[must_use]
    pub const fn root(&self) -> NodeIndex {
        self.root
    }

    /// Payload of the root node.
    #[must_use]
    pub fn root_data(&self) -> &T {
        &self.nodes[self.root].data
    }

    /// Payload of an arbitrary node.
    #[must_use]
    pub fn data(&self, node: NodeIndex) -> &T {
        &self.nodes[node].data
    }

    /// Left and right child indices of a node. Leaves have none.
    #[must_use]
    pub fn children(&self, node: NodeIndex) -> (Option<NodeIndex>, Option<NodeIndex>) {
        (self.nodes[node].left, self.nodes[node].right)
    }

    /// Whether `node` is a leaf.
    #[must_use]
    pub const fn is_leaf(&self, node: NodeIndex) -> bool {
        node < self.leaf_count
    }

    /// The leaf payloads in insertion order.
    pub fn leaves(&self) -> impl Iterator<Item = &T> {
        self.nodes[..self.leaf_count].iter().map(|node| &node.data)
    }

    /// Number of levels from the leaves to the root (inclusive).
    ///
    /// Equals `ceil(log2(leaf_count)) + 1`; every leaf sits at the same
    /// depth because joining proceeds level by level.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = 0;
        while let Some(parent) = self.nodes[current].parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Overwrite the payload of leaf `leaf_index` and re-sum its
    /// ancestors up to the root.
    ///
    /// # Panics
    ///
    /// Panics if `leaf_index` is not a valid leaf index.
    pub fn update(&mut self, leaf_index: usize, value: T) {
        assert!(
            leaf_index < self.leaf_count,
            "leaf index {leaf_index} out of range for {} leaves",
            self.leaf_count
        );
        self.nodes[leaf_index].data = value;
        let mut current = leaf_index;
        while let Some(parent) = self.nodes[current].parent {
            let (left, right) = (self.nodes[parent].left, self.nodes[parent].right);
            let data = summed_data(&self.nodes, left, right);
            self.nodes[parent].data = data;
            current = parent;
        }
    }
}

/// Sum of the payloads of two possibly-missing children.
fn summed_data<T: SumPayload>(
    nodes: &[SumNode<T>],
    left: Option<NodeIndex>,
    right: Option<NodeIndex>,
) -> T {
    match (left, right) {
        (Some(left), Some(right)) => nodes[left].data.sum(&nodes[right].data),
        (Some(only), None) | (None, Some(only)) => nodes[only].data.sum(&T::identity()),
        (None, None) => unreachable!("a joined node has at least one child"),
    }
}
