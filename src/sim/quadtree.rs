//! Region quadtree for broad-phase collision
//!
//! Rebuilt from scratch every tick. Nodes live in a flat arena and refer to
//! their children by index; traversal is top-down only.
//!
//! Items are opaque `usize` handles (the world uses entity slots) paired with
//! the bounds they were inserted with. A query returns candidates: every item
//! whose bounds overlap the query is included, but so are its leaf
//! neighbors. Callers run the exact collision test.

use super::collision::Bounds;

/// Items a leaf may hold before it splits
pub const MAX_OBJECTS: usize = 10;
/// Deepest level a split may create
pub const MAX_DEPTH: u32 = 10;

#[derive(Debug, Clone)]
struct Node {
    bounds: Bounds,
    depth: u32,
    /// Held items (leaf only)
    items: Vec<(usize, Bounds)>,
    /// Quadrants: 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right
    children: Option<[usize; 4]>,
}

impl Node {
    fn leaf(bounds: Bounds, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }
}

/// Spatial index over a rectangular region
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<Node>,
    len: usize,
    /// Items reaching past the root region (wrap band overhang)
    overhanging: usize,
}

impl QuadTree {
    /// Empty tree covering `region`
    pub fn new(region: Bounds) -> Self {
        Self {
            nodes: vec![Node::leaf(region, 0)],
            len: 0,
            overhanging: 0,
        }
    }

    /// Region covered by the root
    pub fn region(&self) -> Bounds {
        self.nodes[0].bounds
    }

    /// Number of distinct inserted items
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the root has ever split
    pub fn is_split(&self) -> bool {
        self.nodes[0].children.is_some()
    }

    /// Total nodes allocated (root included)
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert an item. Items straddling a quadrant boundary land in every
    /// quadrant they overlap.
    pub fn insert(&mut self, handle: usize, bounds: Bounds) {
        self.len += 1;
        if !self.region().contains(&bounds) {
            self.overhanging += 1;
        }
        self.insert_at(0, handle, bounds);
    }

    /// Insert many items at once
    pub fn extend<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = (usize, Bounds)>,
    {
        for (handle, bounds) in items {
            self.insert(handle, bounds);
        }
    }

    fn insert_at(&mut self, node_idx: usize, handle: usize, bounds: Bounds) {
        if let Some(children) = self.nodes[node_idx].children {
            for child in self.routed_children(node_idx, children, &bounds) {
                self.insert_at(child, handle, bounds);
            }
            return;
        }

        let node = &mut self.nodes[node_idx];
        node.items.push((handle, bounds));

        if node.items.len() > MAX_OBJECTS && node.depth < MAX_DEPTH {
            let held = std::mem::take(&mut self.nodes[node_idx].items);
            let children = self.split(node_idx);
            for (held_handle, held_bounds) in held {
                for child in self.routed_children(node_idx, children, &held_bounds) {
                    self.insert_at(child, held_handle, held_bounds);
                }
            }
        }
    }

    /// Turn a leaf into four equal quadrants and return their indices
    fn split(&mut self, node_idx: usize) -> [usize; 4] {
        let Node { bounds, depth, .. } = self.nodes[node_idx];
        let width = bounds.width / 2.0;
        let height = bounds.height / 2.0;

        let first = self.nodes.len();
        for i in 0..4 {
            let x = bounds.x + if i % 2 == 1 { width } else { 0.0 };
            let y = bounds.y + if i >= 2 { height } else { 0.0 };
            self.nodes
                .push(Node::leaf(Bounds::new(x, y, width, height), depth + 1));
        }

        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[node_idx].children = Some(children);
        children
    }

    /// Children whose quadrant `bounds` reaches, by the midpoint rule
    fn routed_children(&self, node_idx: usize, children: [usize; 4], bounds: &Bounds) -> Vec<usize> {
        let region = self.nodes[node_idx].bounds;
        let vertical_mid = region.x + region.width / 2.0;
        let horizontal_mid = region.y + region.height / 2.0;

        let top = bounds.y < horizontal_mid;
        let bottom = bounds.y + bounds.height >= horizontal_mid;
        let left = bounds.x < vertical_mid;
        let right = bounds.x + bounds.width >= vertical_mid;

        let mut routed = Vec::with_capacity(4);
        if left && top {
            routed.push(children[0]);
        }
        if right && top {
            routed.push(children[1]);
        }
        if left && bottom {
            routed.push(children[2]);
        }
        if right && bottom {
            routed.push(children[3]);
        }
        routed
    }

    /// Handles of every item that may overlap `bounds`, deduplicated.
    ///
    /// An unsplit tree returns everything it holds. Once split, bounds
    /// entirely outside the root region return nothing unless some item
    /// overhangs the region; those are still routed by the midpoint rule.
    pub fn query_near(&self, bounds: &Bounds) -> Vec<usize> {
        let root = &self.nodes[0];
        if root.children.is_none() {
            return root.items.iter().map(|(handle, _)| *handle).collect();
        }
        if self.overhanging == 0 && !root.bounds.intersects(bounds) {
            return Vec::new();
        }

        let mut found = Vec::new();
        self.collect(0, bounds, &mut found);
        found.sort_unstable();
        found.dedup();
        found
    }

    fn collect(&self, node_idx: usize, bounds: &Bounds, found: &mut Vec<usize>) {
        match self.nodes[node_idx].children {
            None => found.extend(self.nodes[node_idx].items.iter().map(|(handle, _)| *handle)),
            Some(children) => {
                for child in self.routed_children(node_idx, children, bounds) {
                    self.collect(child, bounds, found);
                }
            }
        }
    }
}
