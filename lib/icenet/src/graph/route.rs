use rayon::prelude::*;
use tracing::*;
use super::*;
use crate::data::*;

/// Distance used in place of a port-to-port route that does not exist.
pub const UNREACHABLE_NM: f64 = 1000.0;

/// Ports as nodes, physical connections as edges weighted by their length in nautical miles.
#[derive(Debug, Clone)]
pub struct RouteGraph {
  pub graph: WeightedGraph,
}

impl RouteGraph {
  pub fn new(data: &NsrInstance) -> Self {
    let mut graph = WeightedGraph::with_nodes(data.ports.len());
    for (a, b) in data.connections() {
      if let Some(e) = data.edge_between(a, b) {
        graph.add_edge(a, b, data.edges[e].distance);
      }
    }
    RouteGraph { graph }
  }

  pub fn k_shortest_paths(&self, from: PortIdx, to: PortIdx, k: usize) -> Result<(Vec<f64>, Vec<Vec<PortIdx>>), Unreachable> {
    k_shortest_paths(&self.graph, from, to, k)
  }

  /// Shortest route lengths between all pairs of ports, one search per port in parallel.
  #[instrument(level="debug", skip(self))]
  pub fn port_distances(&self) -> PortDistances {
    let n = self.graph.num_nodes();
    let rows: Vec<Vec<f64>> = (0..n).into_par_iter()
      .map(|p| self.graph.dijkstra(p, None, &Exclusions::default()).dist)
      .collect();
    let unreachable = rows.iter().map(|r| r.iter().filter(|d| d.is_infinite()).count()).sum::<usize>();
    if unreachable > 0 {
      warn!(unreachable, "some port pairs have no route");
    }
    PortDistances { n, dist: rows.into_iter().flatten().collect() }
  }
}

/// Symmetric table of minimum route lengths between ports.
#[derive(Debug, Clone, PartialEq)]
pub struct PortDistances {
  n: usize,
  dist: Vec<f64>,
}

impl PortDistances {
  pub fn get(&self, a: PortIdx, b: PortIdx) -> Result<f64, Unreachable> {
    let d = self.dist[a * self.n + b];
    if d.is_finite() { Ok(d) } else { Err(Unreachable { from: a, to: b }) }
  }

  /// Like [`PortDistances::get`], but substitutes [`UNREACHABLE_NM`] for a missing route.
  pub fn get_or_sentinel(&self, a: PortIdx, b: PortIdx) -> f64 {
    self.get(a, b).unwrap_or(UNREACHABLE_NM)
  }
}
