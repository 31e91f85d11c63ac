use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bitvec::prelude::*;
use serde::Serialize;

use crate::geometry::Point;
use crate::graph::NodeId;

use super::neighbors::NeighborProvider;

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub found: bool,
    pub path: Vec<NodeId>,
    pub cost: f64,
}

/// A shortest path expressed in node coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub points: Vec<Point>,
    #[serde(skip)]
    pub nodes: Vec<NodeId>,
    pub cost: f64,
}

#[derive(Copy, Clone, Debug)]
struct State {
    dist: f64,
    node: NodeId,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-heap on distance, lower node id first on ties
        other.dist.total_cmp(&self.dist).then_with(|| other.node.cmp(&self.node))
    }
}
impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for State {}

/// Single-source Dijkstra from `start`, stopping once `goal` is settled.
pub fn dijkstra(provider: &NeighborProvider<'_>, start: NodeId, goal: NodeId) -> SearchResult {
    let n = provider.nodes();
    if start as usize >= n || goal as usize >= n {
        return SearchResult { found: false, path: Vec::new(), cost: f64::INFINITY };
    }
    let mut dist = vec![f64::INFINITY; n];
    let mut parent = vec![NodeId::MAX; n];
    let mut settled = bitvec![usize, Lsb0; 0; n];
    let mut open = BinaryHeap::new();

    dist[start as usize] = 0.0;
    open.push(State { dist: 0.0, node: start });

    while let Some(State { dist: d, node: u }) = open.pop() {
        if settled[u as usize] {
            continue;
        }
        settled.set(u as usize, true);
        if u == goal {
            break;
        }
        for (v, w) in provider.all_neighbors(u) {
            let nd = d + w;
            if nd < dist[v as usize] {
                dist[v as usize] = nd;
                parent[v as usize] = u;
                open.push(State { dist: nd, node: v });
            }
        }
    }

    if goal != start && parent[goal as usize] == NodeId::MAX {
        return SearchResult { found: false, path: Vec::new(), cost: f64::INFINITY };
    }
    let mut path = vec![goal];
    let mut cur = goal;
    while cur != start {
        cur = parent[cur as usize];
        path.push(cur);
    }
    path.reverse();
    SearchResult { found: true, path, cost: dist[goal as usize] }
}

/// Snap both points to their nearest nodes and return the shortest node path
/// between them, or `None` when the graph is empty or the nodes are disconnected.
pub fn find_path(provider: &NeighborProvider<'_>, start: Point, end: Point) -> Option<PathResult> {
    let graph = provider.graph();
    let s = graph.nearest_node(start)?;
    let g = graph.nearest_node(end)?;
    if s == g {
        return Some(PathResult { points: vec![graph.node(s)], nodes: vec![s], cost: 0.0 });
    }
    let res = dijkstra(provider, s, g);
    if !res.found {
        return None;
    }
    let points = res.path.iter().map(|&id| graph.node(id)).collect();
    Some(PathResult { points, nodes: res.path, cost: res.cost })
}
