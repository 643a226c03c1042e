//! Hack stream order: the trunk is order 1, and order only increases when a
//! tributary leaves the dominant channel, propagating from every outlet
//! upstream through the whole network (not just along one mainstem path).
//!
//! Grounded in `hack_order.rs`'s tool description ("the main stream is
//! assigned an order of one... tributaries to the main stream are assigned
//! an order of two... increases from the catchment outlet towards the
//! channel heads"); the dominant-branch selection at each junction reuses
//! [`crate::mainstem::label_mainstem`]'s tie-break convention (highest
//! Strahler, then largest `max_upstream_length`, then lowest edge index) so
//! the two labelers agree on which branch is "the" channel at any junction.

use crate::error::{CoreError, CoreResult};
use crate::graph::{EdgeIndex, StreamGraph};

/// Assigns `hack_order` to every edge in `graph`.
///
/// Processes nodes in reverse topological order (outlets upstream to
/// headwaters). An edge draining into a root node (no out-edges) starts at
/// order 1. At every node with more than one in-edge, the dominant in-edge
/// (by the same rule `mainstem` uses) inherits the order of the node's
/// out-edge; every other in-edge gets `order + 1`. A node with a single
/// in-edge passes its out-edge's order through unchanged.
///
/// Requires every edge to already carry `strahler` and `max_upstream_length`
/// (run [`crate::strahler::strahler_order`] and
/// [`crate::upstream_length_graph::upstream_length`] first).
pub fn hack_order(graph: &mut StreamGraph) -> CoreResult<()> {
    let topo = graph.topo_order()?;

    for &n in topo.iter().rev() {
        let out_edges = graph.node(n).out_edges.clone();
        let base_order = if out_edges.is_empty() {
            1
        } else {
            out_edges
                .iter()
                .map(|&e| {
                    graph
                        .edge(e)
                        .attrs
                        .hack_order
                        .expect("processed downstream-first in reverse topo order")
                })
                .max()
                .unwrap()
        };

        let in_edges = graph.node(n).in_edges.clone();
        if in_edges.is_empty() {
            continue;
        }
        if in_edges.len() == 1 {
            graph.edge_mut(in_edges[0]).attrs.hack_order = Some(base_order);
            continue;
        }

        let dominant = dominant_in_edge(graph, &in_edges)?;
        for &e in &in_edges {
            let order = if e == dominant { base_order } else { base_order + 1 };
            graph.edge_mut(e).attrs.hack_order = Some(order);
        }
    }
    Ok(())
}

fn dominant_in_edge(graph: &StreamGraph, in_edges: &[EdgeIndex]) -> CoreResult<EdgeIndex> {
    let mut candidates = Vec::with_capacity(in_edges.len());
    for &e in in_edges {
        let edge = graph.edge(e);
        let strahler = edge
            .attrs
            .strahler
            .ok_or(CoreError::MissingAttribute { attribute: "strahler" })?;
        let length = edge
            .attrs
            .max_upstream_length
            .ok_or(CoreError::MissingAttribute { attribute: "max_upstream_length" })?;
        candidates.push((e, strahler, length));
    }
    candidates.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.2.partial_cmp(&a.2).unwrap())
            .then_with(|| a.0.cmp(&b.0))
    });
    Ok(candidates[0].0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mainstem::label_mainstem;
    use crate::report::NullReporter;
    use crate::strahler::strahler_order;
    use crate::upstream_length_graph::upstream_length;

    fn hack_of(graph: &StreamGraph, from: (f64, f64), to: (f64, f64)) -> u32 {
        for e in graph.edge_indices() {
            let edge = graph.edge(e);
            if graph.node(edge.from).coord == from && graph.node(edge.to).coord == to {
                return edge.attrs.hack_order.unwrap();
            }
        }
        panic!("no such edge");
    }

    #[test]
    fn trunk_is_order_one_tributary_is_order_two() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (0.0, 3.0)]); // short arm, length 3
        g.add_edge(vec![(0.0, 10.0), (0.0, 3.0)]); // long arm, length 7
        g.add_edge(vec![(0.0, 3.0), (0.0, 5.0)]); // trunk
        strahler_order(&mut g).unwrap();
        upstream_length(&mut g).unwrap();
        hack_order(&mut g).unwrap();

        assert_eq!(hack_of(&g, (0.0, 3.0), (0.0, 5.0)), 1);
        assert_eq!(hack_of(&g, (0.0, 10.0), (0.0, 3.0)), 1);
        assert_eq!(hack_of(&g, (0.0, 0.0), (0.0, 3.0)), 2);
    }

    #[test]
    fn agrees_with_mainstem_on_the_dominant_branch() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (0.0, 3.0)]);
        g.add_edge(vec![(0.0, 10.0), (0.0, 3.0)]);
        g.add_edge(vec![(0.0, 3.0), (0.0, 5.0)]);
        strahler_order(&mut g).unwrap();
        upstream_length(&mut g).unwrap();
        hack_order(&mut g).unwrap();
        let mut reporter = NullReporter;
        label_mainstem(&mut g, &mut reporter).unwrap();

        for e in g.edge_indices() {
            let is_order_one = g.edge(e).attrs.hack_order == Some(1);
            let is_mainstem = g.edge(e).attrs.mainstem == Some(true);
            assert_eq!(is_order_one, is_mainstem);
        }
    }

    #[test]
    fn missing_attribute_errors() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (1.0, 1.0)]);
        g.add_edge(vec![(2.0, 0.0), (1.0, 1.0)]);
        g.add_edge(vec![(1.0, 1.0), (2.0, 2.0)]);
        let err = hack_order(&mut g).unwrap_err();
        assert_eq!(err, CoreError::MissingAttribute { attribute: "strahler" });
    }
}
