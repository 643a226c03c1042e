//! Component I: lifts polylines to a directed graph keyed by endpoint
//! coordinates, plus the `StreamGraph` data model components J-L annotate.

use crate::error::{CoreError, CoreResult};
use std::collections::{HashMap, VecDeque};

pub type NodeIndex = usize;
pub type EdgeIndex = usize;
pub type Point = (f64, f64);

/// World coordinates are snapped to this grid (map units) before being
/// hashed into the coordinate table, per the specification's Design Notes:
/// an index-based DAG avoids float-keyed maps, built from either exact or
/// snap-quantized equality. The router emits cell-center world coordinates
/// deterministically, so snapping only guards against floating-point noise
/// introduced upstream (e.g. a reprojection) rather than doing real work.
const SNAP_GRID: f64 = 1e-6;

fn snap_key(p: Point) -> (i64, i64) {
    (
        (p.0 / SNAP_GRID).round() as i64,
        (p.1 / SNAP_GRID).round() as i64,
    )
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub coord: Point,
    pub in_edges: Vec<EdgeIndex>,
    pub out_edges: Vec<EdgeIndex>,
}

/// Attributes populated by the later graph stages (J, K, L). All start
/// unset; [`crate::error::CoreError::MissingAttribute`] is how a downstream
/// stage reports that an upstream one never ran.
#[derive(Debug, Clone, Default)]
pub struct EdgeAttrs {
    pub strahler: Option<u32>,
    pub max_upstream_length: Option<f64>,
    pub mainstem: Option<bool>,
    pub hack_order: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct EdgeData {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub geometry: Vec<Point>,
    pub length: f64,
    pub attrs: EdgeAttrs,
}

/// A directed multigraph over 2-D coordinate nodes: the vector
/// representation of a routed stream network. Nodes are stored densely and
/// referenced by index rather than by coordinate, per the specification's
/// Design Notes; a coordinate-to-index table is built once as edges are
/// added.
///
/// In a graph derived from a routed segment raster, every node has
/// out-degree <= 1 (the tributary model: a forest of trees rooted at
/// outlets) — callers that build graphs from other sources are not required
/// to preserve that, but [`StreamGraph::topo_order`] still works for any
/// DAG.
#[derive(Debug, Clone, Default)]
pub struct StreamGraph {
    nodes: Vec<NodeData>,
    edges: Vec<EdgeData>,
    coord_index: HashMap<(i64, i64), NodeIndex>,
}

impl StreamGraph {
    pub fn new() -> StreamGraph {
        StreamGraph::default()
    }

    fn get_or_create_node(&mut self, coord: Point) -> NodeIndex {
        let key = snap_key(coord);
        *self.coord_index.entry(key).or_insert_with(|| {
            self.nodes.push(NodeData {
                coord,
                in_edges: Vec::new(),
                out_edges: Vec::new(),
            });
            self.nodes.len() - 1
        })
    }

    /// Lifts one polyline `(p0..pn)` to an edge `p0 -> pn`, carrying the full
    /// geometry and its total Euclidean length.
    pub fn add_edge(&mut self, geometry: Vec<Point>) -> EdgeIndex {
        assert!(geometry.len() >= 2, "a polyline needs at least two points");
        let length = geometry
            .windows(2)
            .map(|w| {
                let (x0, y0) = w[0];
                let (x1, y1) = w[1];
                ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt()
            })
            .sum();

        let from = self.get_or_create_node(geometry[0]);
        let to = self.get_or_create_node(*geometry.last().unwrap());

        let edge_idx = self.edges.len();
        self.edges.push(EdgeData {
            from,
            to,
            geometry,
            length,
            attrs: EdgeAttrs::default(),
        });
        self.nodes[from].out_edges.push(edge_idx);
        self.nodes[to].in_edges.push(edge_idx);
        edge_idx
    }

    pub fn node(&self, idx: NodeIndex) -> &NodeData {
        &self.nodes[idx]
    }

    pub fn edge(&self, idx: EdgeIndex) -> &EdgeData {
        &self.edges[idx]
    }

    pub fn edge_mut(&mut self, idx: EdgeIndex) -> &mut EdgeData {
        &mut self.edges[idx]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        0..self.edges.len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        0..self.nodes.len()
    }

    /// Nodes with out-degree 0: the outlets, one per rooted tree.
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.node_indices()
            .filter(|&n| self.nodes[n].out_edges.is_empty())
            .collect()
    }

    /// Nodes with in-degree 0: the headwaters.
    pub fn headwaters(&self) -> Vec<NodeIndex> {
        self.node_indices()
            .filter(|&n| self.nodes[n].in_edges.is_empty())
            .collect()
    }

    /// Topological order over nodes, upstream (headwaters) to downstream
    /// (roots), via Kahn's algorithm. Node IDs break ties between
    /// simultaneously-ready nodes, so the order is deterministic.
    ///
    /// Errs with `MissingAttribute` only in the degenerate sense that a
    /// cyclic graph has no topological order; a `StreamGraph` built from a
    /// routed segment raster is a DAG by construction, so this only
    /// surfaces a caller bug (e.g. a hand-built graph with a cycle).
    pub fn topo_order(&self) -> CoreResult<Vec<NodeIndex>> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.in_edges.len()).collect();
        let mut ready: VecDeque<NodeIndex> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect();
        let mut ready_sorted: Vec<NodeIndex> = ready.drain(..).collect();
        ready_sorted.sort_unstable();
        let mut queue: VecDeque<NodeIndex> = ready_sorted.into();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(n) = queue.pop_front() {
            order.push(n);
            let mut newly_ready = Vec::new();
            for &e in &self.nodes[n].out_edges {
                let to = self.edges[e].to;
                in_degree[to] -= 1;
                if in_degree[to] == 0 {
                    newly_ready.push(to);
                }
            }
            newly_ready.sort_unstable();
            for n in newly_ready {
                queue.push_back(n);
            }
        }

        if order.len() != self.nodes.len() {
            return Err(CoreError::MissingAttribute {
                attribute: "acyclic graph (topo_order found a cycle)",
            });
        }
        Ok(order)
    }

    /// Inverse of [`StreamGraph::add_edge`]: recovers an edge's geometry,
    /// either as a 2-point polyline (endpoints only) or the stored full
    /// geometry.
    pub fn edge_to_polyline(&self, edge: EdgeIndex, two_point: bool) -> Vec<Point> {
        let e = &self.edges[edge];
        if two_point {
            vec![self.nodes[e.from].coord, self.nodes[e.to].coord]
        } else {
            e.geometry.clone()
        }
    }
}

/// Builds a `StreamGraph` from a set of polylines (e.g. the tail-stitched
/// output of [`crate::router::route_segment`] run over every labeled
/// segment).
pub fn build_from_polylines(polylines: &[Vec<Point>]) -> StreamGraph {
    let mut g = StreamGraph::new();
    for line in polylines {
        g.add_edge(line.clone());
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_endpoints_share_a_node() {
        let mut g = StreamGraph::new();
        let e1 = g.add_edge(vec![(0.0, 0.0), (1.0, 1.0)]);
        let e2 = g.add_edge(vec![(1.0, 1.0), (2.0, 0.0)]);
        assert_eq!(g.edge(e1).to, g.edge(e2).from);
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn topo_order_is_upstream_to_downstream() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (1.0, 0.0)]);
        g.add_edge(vec![(1.0, 0.0), (2.0, 0.0)]);
        let order = g.topo_order().unwrap();
        let head = g.node_indices().find(|&n| g.node(n).coord == (0.0, 0.0)).unwrap();
        let tail = g.node_indices().find(|&n| g.node(n).coord == (2.0, 0.0)).unwrap();
        let head_pos = order.iter().position(|&n| n == head).unwrap();
        let tail_pos = order.iter().position(|&n| n == tail).unwrap();
        assert!(head_pos < tail_pos);
    }

    #[test]
    fn near_coincident_points_snap_together() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (1.0, 0.0)]);
        g.add_edge(vec![(1.0 + 1e-9, 0.0), (2.0, 0.0)]);
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn inverse_two_point_vs_full_geometry() {
        let mut g = StreamGraph::new();
        let e = g.add_edge(vec![(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)]);
        assert_eq!(g.edge_to_polyline(e, true), vec![(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(
            g.edge_to_polyline(e, false),
            vec![(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)]
        );
    }
}
