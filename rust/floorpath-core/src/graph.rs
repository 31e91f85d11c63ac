//! Geometric floor graph built from loosely-drawn corridor segments.
//!
//! Segment endpoints are snapped into nodes: a point joins the *first*
//! created node within the snapping tolerance, so merging depends on input
//! order. Candidates come from an R-tree query; among all nodes within
//! tolerance the lowest id wins, which matches a scan in creation order.

use rstar::primitives::GeomWithData;
use rstar::RTree;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::engine::Adjacency;
use crate::geometry::{Point, Segment};

pub type NodeId = u32;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f64,
    /// Connector with no drawn geometry behind it (Stop pairs).
    pub teleport: bool,
}

/// One directed teleport hop between two points on the same floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TeleportLink {
    pub from: Point,
    pub to: Point,
}

type IndexedNode = GeomWithData<[f64; 2], NodeId>;

fn indexed(p: Point, id: NodeId) -> IndexedNode {
    GeomWithData::new([p.x, p.y], id)
}

/// Nodes and undirected weighted edges of one floor. Immutable once built.
#[derive(Clone, Debug)]
pub struct FloorGraph {
    nodes: Vec<Point>,
    edges: Vec<Edge>,
    walk: Adjacency,
    tree: RTree<IndexedNode>,
}

impl Default for FloorGraph {
    fn default() -> Self {
        Self { nodes: Vec::new(), edges: Vec::new(), walk: Adjacency::build(0, &[]), tree: RTree::new() }
    }
}

impl FloorGraph {
    pub fn build(segments: &[Segment], tolerance: f64) -> Self {
        let mut nodes: Vec<Point> = Vec::new();
        let mut tree: RTree<IndexedNode> = RTree::new();
        let max_d2 = tolerance.max(0.0).powi(2);
        let mut seen: FxHashSet<(NodeId, NodeId)> = FxHashSet::default();
        let mut edges = Vec::new();
        let mut self_loops = 0usize;
        let mut parallel = 0usize;

        let mut snap = |p: Point, nodes: &mut Vec<Point>| -> NodeId {
            let first = tree.locate_within_distance([p.x, p.y], max_d2).map(|n| n.data).min();
            if let Some(id) = first {
                return id;
            }
            let id = nodes.len() as NodeId;
            nodes.push(p);
            tree.insert(indexed(p, id));
            id
        };

        for seg in segments {
            let a = snap(seg.a, &mut nodes);
            let b = snap(seg.b, &mut nodes);
            if a == b {
                self_loops += 1;
                continue;
            }
            let key = if a < b { (a, b) } else { (b, a) };
            if !seen.insert(key) {
                parallel += 1;
                continue;
            }
            // Weights use snapped node coordinates so they agree with the
            // node positions the search reports.
            let weight = nodes[a as usize].distance(nodes[b as usize]);
            edges.push(Edge { from: a, to: b, weight, teleport: false });
        }

        let walk = Adjacency::from_undirected(nodes.len(), &edges);
        debug!(
            segments = segments.len(),
            nodes = nodes.len(),
            edges = edges.len(),
            self_loops,
            parallel,
            "floor graph built"
        );
        Self { nodes, edges, walk, tree }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Point] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Point {
        self.nodes[id as usize]
    }

    pub fn walk(&self) -> &Adjacency {
        &self.walk
    }

    /// Nearest node by Euclidean distance; ties go to the lower node id.
    pub fn nearest_node(&self, p: Point) -> Option<NodeId> {
        let mut iter = self.tree.nearest_neighbor_iter_with_distance_2(&[p.x, p.y]);
        let (first, best_d2) = iter.next()?;
        let tied = iter.take_while(|&(_, d2)| d2 <= best_d2).map(|(n, _)| n.data);
        Some(tied.fold(first.data, NodeId::min))
    }
}
