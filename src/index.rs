// Ordered-key lookup over the merged player set.
//
// A plain (unbalanced) binary search tree keyed by the composite player
// identifier (case-folded last name + position + team). The tree is built
// once at startup from the assembler's output and is read-only afterwards:
// no deletion, no rebalancing, no interior mutability. Worst-case height is
// linear in player count when the upstream key order happens to be
// monotonic; accepted for a pool of a few hundred players.

use std::cmp::Ordering;

use tracing::debug;

use crate::player::PlayerRecord;

/// One tree node. Each node exclusively owns its subtrees; there are no
/// parent links and no balance metadata.
struct Node {
    record: PlayerRecord,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

impl Node {
    fn new(record: PlayerRecord) -> Box<Node> {
        Box::new(Node {
            record,
            left: None,
            right: None,
        })
    }
}

/// Binary search tree over [`PlayerRecord`]s, keyed by `record.key`.
///
/// Lookup misses are a normal outcome and surface as `None`, never as an
/// error. Inserting a key that is already present is a silent no-op: the
/// first record wins. Both behaviors are part of the API contract.
#[derive(Default)]
pub struct PlayerIndex {
    root: Option<Box<Node>>,
    len: usize,
}

impl PlayerIndex {
    /// Create an empty index. Every search on it resolves to `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index by inserting records in iteration order.
    pub fn build(records: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a record at the position its key orders it to. If the key is
    /// already present the record is dropped and the existing one kept.
    pub fn insert(&mut self, record: PlayerRecord) {
        match &mut self.root {
            None => {
                self.root = Some(Node::new(record));
                self.len += 1;
            }
            Some(root) => {
                if insert_below(root, record) {
                    self.len += 1;
                }
            }
        }
    }

    /// Exact-match point lookup by composite key.
    pub fn search(&self, key: &str) -> Option<&PlayerRecord> {
        self.root.as_deref().and_then(|node| search_below(node, key))
    }

    /// Number of levels in the tree: 0 when empty, 1 for a single node,
    /// N for a degenerate chain of N nodes.
    pub fn height(&self) -> usize {
        self.root.as_deref().map_or(0, height_below)
    }

    /// All keys in ascending order (in-order traversal). Diagnostic only;
    /// lookup never goes through this path.
    pub fn keys_in_order(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.len);
        if let Some(root) = self.root.as_deref() {
            collect_keys(root, &mut keys);
        }
        keys
    }
}

/// Returns true if a new node was attached, false on a duplicate key.
fn insert_below(node: &mut Node, record: PlayerRecord) -> bool {
    match record.key.cmp(&node.record.key) {
        Ordering::Less => match &mut node.left {
            None => {
                node.left = Some(Node::new(record));
                true
            }
            Some(left) => insert_below(left, record),
        },
        Ordering::Greater => match &mut node.right {
            None => {
                node.right = Some(Node::new(record));
                true
            }
            Some(right) => insert_below(right, record),
        },
        Ordering::Equal => {
            debug!("duplicate key '{}' ignored, keeping first record", record.key);
            false
        }
    }
}

fn search_below<'a>(node: &'a Node, key: &str) -> Option<&'a PlayerRecord> {
    match key.cmp(node.record.key.as_str()) {
        Ordering::Equal => Some(&node.record),
        Ordering::Less => node.left.as_deref().and_then(|left| search_below(left, key)),
        Ordering::Greater => node
            .right
            .as_deref()
            .and_then(|right| search_below(right, key)),
    }
}

fn height_below(node: &Node) -> usize {
    let left = node.left.as_deref().map_or(0, height_below);
    let right = node.right.as_deref().map_or(0, height_below);
    1 + left.max(right)
}

fn collect_keys<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    if let Some(left) = node.left.as_deref() {
        collect_keys(left, out);
    }
    out.push(node.record.key.as_str());
    if let Some(right) = node.right.as_deref() {
        collect_keys(right, out);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
