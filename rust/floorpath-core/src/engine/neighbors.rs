use tracing::debug;

use crate::graph::{Edge, FloorGraph, NodeId, TeleportLink};

/// Compressed adjacency: `dst`/`w` rows for node `u` live in `offsets[u]..offsets[u + 1]`,
/// sorted by destination then weight.
#[derive(Clone, Debug)]
pub struct Adjacency {
    pub nodes: usize,
    pub offsets: Vec<usize>,
    pub dst: Vec<NodeId>,
    pub w: Vec<f64>,
}

impl Adjacency {
    /// Build from directed `(src, dst, weight)` triples.
    pub fn build(nodes: usize, arcs: &[(NodeId, NodeId, f64)]) -> Self {
        let mut counts = vec![0usize; nodes];
        for &(s, _, _) in arcs {
            counts[s as usize] += 1;
        }
        let mut offsets = vec![0usize; nodes + 1];
        for i in 0..nodes {
            offsets[i + 1] = offsets[i] + counts[i];
        }
        let mut rows: Vec<(NodeId, f64)> = vec![(0, 0.0); arcs.len()];
        let mut cur = offsets[..nodes].to_vec();
        for &(s, d, w) in arcs {
            let p = cur[s as usize];
            rows[p] = (d, w);
            cur[s as usize] += 1;
        }
        for u in 0..nodes {
            rows[offsets[u]..offsets[u + 1]].sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));
        }
        let (dst, w) = rows.into_iter().unzip();
        Adjacency { nodes, offsets, dst, w }
    }

    /// Both directions of every edge.
    pub fn from_undirected(nodes: usize, edges: &[Edge]) -> Self {
        let arcs: Vec<(NodeId, NodeId, f64)> = edges
            .iter()
            .flat_map(|e| [(e.from, e.to, e.weight), (e.to, e.from, e.weight)])
            .collect();
        Self::build(nodes, &arcs)
    }

    pub fn neighbors(&self, u: NodeId) -> (&[NodeId], &[f64]) {
        let u = u as usize;
        let s = self.offsets[u];
        let e = self.offsets[u + 1];
        (&self.dst[s..e], &self.w[s..e])
    }
}

/// A floor graph's walk edges plus a per-query overlay of directed teleport
/// edges. The base graph is borrowed and never modified.
pub struct NeighborProvider<'g> {
    graph: &'g FloorGraph,
    teleport: Adjacency,
    teleport_edges: Vec<Edge>,
}

impl<'g> NeighborProvider<'g> {
    pub fn walk_only(graph: &'g FloorGraph) -> Self {
        Self::with_teleports(graph, &[], 0.0)
    }

    /// Each link's endpoints are snapped to their nearest nodes; links whose
    /// ends land on the same node add nothing.
    pub fn with_teleports(graph: &'g FloorGraph, links: &[TeleportLink], weight: f64) -> Self {
        let mut teleport_edges = Vec::with_capacity(links.len());
        for link in links {
            let (Some(from), Some(to)) = (graph.nearest_node(link.from), graph.nearest_node(link.to)) else { continue };
            if from == to {
                continue;
            }
            teleport_edges.push(Edge { from, to, weight, teleport: true });
        }
        let arcs: Vec<(NodeId, NodeId, f64)> = teleport_edges.iter().map(|e| (e.from, e.to, e.weight)).collect();
        let teleport = Adjacency::build(graph.node_count(), &arcs);
        if !teleport_edges.is_empty() {
            debug!(teleports = teleport_edges.len(), "teleport overlay built");
        }
        NeighborProvider { graph, teleport, teleport_edges }
    }

    pub fn graph(&self) -> &'g FloorGraph {
        self.graph
    }

    pub fn nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub fn teleport_edges(&self) -> &[Edge] {
        &self.teleport_edges
    }

    pub fn all_neighbors(&self, u: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        let (wd, ww) = self.graph.walk().neighbors(u);
        let (td, tw) = self.teleport.neighbors(u);
        wd.iter().copied().zip(ww.iter().copied()).chain(td.iter().copied().zip(tw.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Segment};

    #[test]
    fn adjacency_rows_are_sorted_by_destination() {
        let adj = Adjacency::build(3, &[(0, 2, 1.0), (0, 1, 5.0), (1, 0, 5.0), (0, 1, 2.0)]);
        let (d, w) = adj.neighbors(0);
        assert_eq!(d, &[1, 1, 2]);
        assert_eq!(w, &[2.0, 5.0, 1.0]);
        assert!(adj.neighbors(2).0.is_empty());
    }

    #[test]
    fn teleport_overlay_is_directed_and_leaves_base_untouched() {
        let graph = FloorGraph::build(
            &[
                Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0)),
                Segment::new(Point::new(100.0, 0.0), Point::new(110.0, 0.0)),
            ],
            1.0,
        );
        let link = TeleportLink { from: Point::new(10.0, 0.0), to: Point::new(100.0, 0.0) };
        let provider = NeighborProvider::with_teleports(&graph, &[link], 0.001);
        assert_eq!(provider.teleport_edges().len(), 1);
        let out: Vec<_> = provider.all_neighbors(1).collect();
        assert_eq!(out, vec![(0, 10.0), (2, 0.001)]);
        let back: Vec<_> = provider.all_neighbors(2).map(|(v, _)| v).collect();
        assert_eq!(back, vec![3]);
        assert_eq!(graph.walk().neighbors(1).0, &[0]);
    }
}
