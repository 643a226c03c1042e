//! Component L: from each outlet, walk upstream selecting the dominant
//! branch at every junction to trace the mainstem.

use crate::error::{CoreError, CoreResult};
use crate::graph::StreamGraph;
use crate::report::{CancellationToken, Reporter};

/// Labels the mainstem edge of every rooted tree in `graph`.
///
/// From each root (out-degree 0 node), walks upstream. At a junction, picks
/// the in-edge with the highest Strahler order, breaking ties by the
/// largest `max_upstream_length`, and any remaining tie by the lowest edge
/// index (a warning is emitted only in that last case, since it means the
/// choice really was arbitrary). The chosen edge is marked `mainstem =
/// true` and the walk continues from its upstream endpoint, stopping at a
/// headwater.
///
/// Note this walks a single path per root — tributary junctions that the
/// chosen mainstem never passes through are left with every in-edge
/// `mainstem = false`, matching the reference behavior this is grounded on.
///
/// Requires every edge to already carry `strahler` and `max_upstream_length`
/// (run [`crate::strahler::strahler_order`] and
/// [`crate::upstream_length_graph::upstream_length`] first); errs with
/// `MissingAttribute` otherwise.
///
/// `cancel` is polled once per root; if it fires, returns
/// `CoreError::Cancelled` without writing partial output.
pub fn label_mainstem(
    graph: &mut StreamGraph,
    reporter: &mut dyn Reporter,
    cancel: Option<&CancellationToken>,
) -> CoreResult<()> {
    for e in graph.edge_indices() {
        graph.edge_mut(e).attrs.mainstem = Some(false);
    }

    let mut roots = graph.roots();
    roots.sort_unstable();

    for root in roots {
        if cancel.map_or(false, |c| c.is_cancelled()) {
            return Err(CoreError::Cancelled);
        }
        let mut current = root;
        loop {
            let in_edges = graph.node(current).in_edges.clone();
            if in_edges.is_empty() {
                break;
            }

            let mut candidates = Vec::with_capacity(in_edges.len());
            for &e in &in_edges {
                let edge = graph.edge(e);
                let strahler = edge
                    .attrs
                    .strahler
                    .ok_or(CoreError::MissingAttribute { attribute: "strahler" })?;
                let length = edge.attrs.max_upstream_length.ok_or(CoreError::MissingAttribute {
                    attribute: "max_upstream_length",
                })?;
                candidates.push((e, strahler, length));
            }

            candidates.sort_by(|a, b| {
                b.1.cmp(&a.1)
                    .then_with(|| b.2.partial_cmp(&a.2).unwrap())
                    .then_with(|| a.0.cmp(&b.0))
            });

            let (best_edge, best_strahler, best_length) = candidates[0];
            if candidates.len() > 1 {
                let (_, s2, l2) = candidates[1];
                if s2 == best_strahler && l2 == best_length {
                    reporter.warn(&format!(
                        "tie in both strahler order and max upstream length at node {}; arbitrarily choosing edge {}",
                        current, best_edge
                    ));
                }
            }

            graph.edge_mut(best_edge).attrs.mainstem = Some(true);
            current = graph.edge(best_edge).from;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StreamGraph;
    use crate::report::NullReporter;
    use crate::strahler::strahler_order;
    use crate::upstream_length_graph::upstream_length;

    fn mainstem_of(graph: &StreamGraph, from: (f64, f64), to: (f64, f64)) -> bool {
        for e in graph.edge_indices() {
            let edge = graph.edge(e);
            if graph.node(edge.from).coord == from && graph.node(edge.to).coord == to {
                return edge.attrs.mainstem.unwrap();
            }
        }
        panic!("no such edge");
    }

    /// Scenario S5: two Strahler-3 in-edges at a confluence, one with
    /// max_upstream_length 1000, the other 1200 — the 1200 branch wins.
    #[test]
    fn s5_tiebreak_by_upstream_length() {
        let mut g = StreamGraph::new();
        let short = g.add_edge(vec![(0.0, 0.0), (0.0, 1.0)]);
        let long = g.add_edge(vec![(0.0, 10.0), (0.0, 1.0)]);
        g.add_edge(vec![(0.0, 1.0), (0.0, 2.0)]);
        graph_force_strahler(&mut g, short, 3);
        graph_force_strahler(&mut g, long, 3);
        graph_force_length(&mut g, short, 1000.0);
        graph_force_length(&mut g, long, 1200.0);
        graph_force_strahler_for_trunk(&mut g);

        let mut reporter = NullReporter;
        label_mainstem(&mut g, &mut reporter, None).unwrap();

        assert!(!mainstem_of(&g, (0.0, 0.0), (0.0, 1.0)));
        assert!(mainstem_of(&g, (0.0, 10.0), (0.0, 1.0)));
    }

    fn graph_force_strahler(g: &mut StreamGraph, e: crate::graph::EdgeIndex, s: u32) {
        g.edge_mut(e).attrs.strahler = Some(s);
    }
    fn graph_force_length(g: &mut StreamGraph, e: crate::graph::EdgeIndex, l: f64) {
        g.edge_mut(e).attrs.max_upstream_length = Some(l);
    }
    fn graph_force_strahler_for_trunk(g: &mut StreamGraph) {
        for e in g.edge_indices() {
            if g.edge(e).attrs.strahler.is_none() {
                g.edge_mut(e).attrs.strahler = Some(4);
                g.edge_mut(e).attrs.max_upstream_length = Some(2200.0);
            }
        }
    }

    #[test]
    fn mainstem_reaches_unique_headwater() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (1.0, 1.0)]);
        g.add_edge(vec![(2.0, 0.0), (1.0, 1.0)]);
        g.add_edge(vec![(1.0, 1.0), (2.0, 2.0)]);
        strahler_order(&mut g, None).unwrap();
        upstream_length(&mut g, None).unwrap();
        let mut reporter = NullReporter;
        label_mainstem(&mut g, &mut reporter, None).unwrap();

        let root = g.roots()[0];
        let mut current = root;
        let mut steps = 0;
        loop {
            let in_edges = g.node(current).in_edges.clone();
            let mainstem_edges: Vec<_> = in_edges
                .iter()
                .filter(|&&e| g.edge(e).attrs.mainstem == Some(true))
                .collect();
            if mainstem_edges.is_empty() {
                break;
            }
            assert_eq!(mainstem_edges.len(), 1, "exactly one mainstem in-edge expected");
            current = g.edge(*mainstem_edges[0]).from;
            steps += 1;
            assert!(steps < 10, "should terminate at a headwater");
        }
        assert!(g.node(current).in_edges.is_empty());
    }

    #[test]
    fn missing_attribute_errors() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (1.0, 1.0)]);
        g.add_edge(vec![(2.0, 0.0), (1.0, 1.0)]);
        g.add_edge(vec![(1.0, 1.0), (2.0, 2.0)]);
        let mut reporter = NullReporter;
        let err = label_mainstem(&mut g, &mut reporter, None).unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingAttribute { attribute: "strahler" }
        );
    }

    #[test]
    fn cancellation_returns_err() {
        let mut g = StreamGraph::new();
        g.add_edge(vec![(0.0, 0.0), (1.0, 1.0)]);
        let mut reporter = NullReporter;
        let token = CancellationToken::new();
        token.cancel();
        let err = label_mainstem(&mut g, &mut reporter, Some(&token)).unwrap_err();
        assert_eq!(err, CoreError::Cancelled);
    }
}
