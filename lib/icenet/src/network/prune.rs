use bit_set::BitSet;
use itertools::Itertools;
use rayon::prelude::*;
use tracing::*;
use crate::data::*;
use crate::graph::route::RouteGraph;

/// What remains of the network for one vessel after looking at its best routes.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselRoutes {
  pub possible_edges: BitSet,
  /// Ports on some route, where the vessel may wait.
  pub possible_ports: BitSet,
  pub lengths: Vec<f64>,
  pub routes: Vec<Vec<PortIdx>>,
}

impl VesselRoutes {
  /// Only the start port, for a vessel that cannot get anywhere.
  fn stranded(start: PortIdx) -> Self {
    let mut possible_ports = BitSet::new();
    possible_ports.insert(start);
    VesselRoutes { possible_edges: BitSet::new(), possible_ports, lengths: Vec::new(), routes: Vec::new() }
  }

  #[inline]
  pub fn has_route(&self) -> bool { !self.routes.is_empty() }
}

fn vessel_routes(data: &NsrInstance, rg: &RouteGraph, v: VesselIdx, k: usize) -> Option<VesselRoutes> {
  let vessel = &data.vessels[v];
  if vessel.is_icebreaker {
    return None;
  }
  let end = match vessel.end_port {
    Some(p) => p,
    None => {
      warn!(vessel=v, name=%vessel.name, "vessel has no destination");
      return Some(VesselRoutes::stranded(vessel.start_port));
    }
  };

  let (lengths, routes) = match rg.k_shortest_paths(vessel.start_port, end, k) {
    Ok(x) => x,
    Err(e) => {
      warn!(vessel=v, name=%vessel.name, %e, "no route to destination");
      return Some(VesselRoutes::stranded(vessel.start_port));
    }
  };

  let mut possible_edges = BitSet::with_capacity(data.edges.len());
  let mut possible_ports = BitSet::with_capacity(data.ports.len());
  for route in &routes {
    possible_ports.extend(route.iter().copied());
    for (&a, &b) in route.iter().tuple_windows() {
      if let Some(e) = data.edge_between(a, b) {
        possible_edges.insert(e);
      }
    }
  }
  trace!(vessel=v, routes=routes.len(), edges=possible_edges.len(), shortest=?lengths.first());
  Some(VesselRoutes { possible_edges, possible_ports, lengths, routes })
}

/// The `k` best routes of every non-icebreaker, searched in parallel. Icebreakers get `None`.
#[instrument(level="info", skip(data, rg))]
pub fn prune_vessels(data: &NsrInstance, rg: &RouteGraph, k: usize) -> Vec<Option<VesselRoutes>> {
  let routes: Vec<_> = (0..data.vessels.len()).into_par_iter()
    .map(|v| vessel_routes(data, rg, v, k))
    .collect();
  let stranded = routes.iter().flatten().filter(|r| !r.has_route()).count();
  info!(vessels=data.vessels.len(), stranded, "pruned vessel edges");
  routes
}
