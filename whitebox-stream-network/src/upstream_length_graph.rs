//! Component K: topological propagation of the longest upstream path length.

use crate::error::{CoreError, CoreResult};
use crate::graph::StreamGraph;
use crate::report::CancellationToken;

/// Assigns `max_upstream_length` to every edge in `graph` via one
/// topological sweep.
///
/// For each node, in topological (upstream-to-downstream) order:
/// - if it has no in-edges (a headwater), each out-edge's length is its own
///   geometric length;
/// - otherwise, let `m` be the maximum, over its in-edges `u`, of
///   `u.max_upstream_length + u.geometry.length`; every out-edge gets `m`.
///
/// so the value carried by an edge is the cumulative path length from the
/// furthest headwater through to the *downstream* end of whichever edge fed
/// this node — the specification's contract describes this as the longest
/// path to the edge's upstream endpoint, but the procedure (and the
/// reference implementation it is grounded on) always folds each in-edge's
/// own length into the running total, which is the behavior preserved here.
///
/// `cancel` is polled once per topological node; if it fires, returns
/// `CoreError::Cancelled` without writing partial output.
pub fn upstream_length(graph: &mut StreamGraph, cancel: Option<&CancellationToken>) -> CoreResult<()> {
    let order = graph.topo_order()?;
    for n in order {
        if cancel.map_or(false, |c| c.is_cancelled()) {
            return Err(CoreError::Cancelled);
        }
        let in_edges = graph.node(n).in_edges.clone();
        let out_edges = graph.node(n).out_edges.clone();

        if in_edges.is_empty() {
            for &e in &out_edges {
                let len = graph.edge(e).length;
                graph.edge_mut(e).attrs.max_upstream_length = Some(len);
            }
            continue;
        }

        let m = in_edges
            .iter()
            .map(|&e| {
                let edge = graph.edge(e);
                edge.attrs.max_upstream_length.unwrap_or(0.0) + edge.length
            })
            .fold(f64::MIN, f64::max);

        for &e in &out_edges {
            graph.edge_mut(e).attrs.max_upstream_length = Some(m);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StreamGraph;

    fn length_of(graph: &StreamGraph, from: (f64, f64), to: (f64, f64)) -> f64 {
        for e in graph.edge_indices() {
            let edge = graph.edge(e);
            if graph.node(edge.from).coord == from && graph.node(edge.to).coord == to {
                return edge.attrs.max_upstream_length.unwrap();
            }
        }
        panic!("no such edge");
    }

    #[test]
    fn headwater_edge_gets_its_own_length() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (3.0, 4.0)]); // length 5
        upstream_length(&mut g, None).unwrap();
        assert_eq!(length_of(&g, (0.0, 0.0), (3.0, 4.0)), 5.0);
    }

    #[test]
    fn downstream_edge_accumulates_through_confluence() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (0.0, 3.0)]); // length 3, short arm
        g.add_edge(vec![(0.0, 10.0), (0.0, 3.0)]); // length 7, long arm
        g.add_edge(vec![(0.0, 3.0), (0.0, 5.0)]); // trunk, length 2
        upstream_length(&mut g, None).unwrap();
        // m = max(3+3, 7+7) = 14
        assert_eq!(length_of(&g, (0.0, 3.0), (0.0, 5.0)), 14.0);
    }

    #[test]
    fn monotone_along_downstream_walk() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (0.0, 1.0)]);
        g.add_edge(vec![(0.0, 1.0), (0.0, 2.0)]);
        upstream_length(&mut g, None).unwrap();
        let first = length_of(&g, (0.0, 0.0), (0.0, 1.0));
        let second = length_of(&g, (0.0, 1.0), (0.0, 2.0));
        assert!(second >= first);
    }

    #[test]
    fn cancellation_returns_err() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (1.0, 1.0)]);
        let token = CancellationToken::new();
        token.cancel();
        let err = upstream_length(&mut g, Some(&token)).unwrap_err();
        assert_eq!(err, CoreError::Cancelled);
    }
}
