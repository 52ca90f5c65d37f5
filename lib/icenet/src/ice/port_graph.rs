use rayon::prelude::*;
use tracing::*;
use super::*;
use crate::data::*;
use crate::graph::{WeightedGraph, NodeIdx, Unreachable, route::UNREACHABLE_NM};

pub const KM_TO_NM: f64 = 0.539957;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathNode {
  Port(PortIdx),
  Cell(Cell),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridPath {
  pub nodes: Vec<PathNode>,
  /// Nautical miles
  pub distance: f64,
  /// Mean severity over the grid cells strictly between the two ends.
  pub avg_severity: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortGraphReport {
  /// Ports with no passable cell within the search radius.
  pub isolated_ports: Vec<PortIdx>,
  pub grid_edges: usize,
  pub port_links: usize,
}

/// Grid cells and ports joined into one undirected graph weighted in kilometres. Cell `(r, c)`
/// is node `r * ncols + c`; port `p` is node `num_cells + p`.
#[derive(Debug, Clone)]
pub struct PortGraph {
  grid: IceGrid,
  graph: WeightedGraph,
  pub report: PortGraphReport,
}

impl PortGraph {
  #[instrument(level="info", skip(grid, ports), fields(cells=grid.num_cells(), ports=ports.len()))]
  pub fn build(grid: IceGrid, ports: &[Port]) -> Self {
    let (nrows, ncols) = grid.dim();
    let mut graph = WeightedGraph::with_nodes(grid.num_cells() + ports.len());
    let mut report = PortGraphReport::default();

    for r in 0..nrows {
      for c in 0..ncols {
        if !grid.is_passable((r, c)) { continue }
        let here = grid.coords((r, c));
        for (nr, nc) in grid.neighbors(1, r, c) {
          // each pair once
          if (nr, nc) > (r, c) {
            let d = spherical_distance(here, grid.coords((nr, nc)));
            graph.add_edge(r * ncols + c, nr * ncols + nc, d);
            report.grid_edges += 1;
          }
        }
      }
    }

    let num_cells = grid.num_cells();
    for (p, port) in ports.iter().enumerate() {
      let port_pos = (port.latitude, port.longitude);
      let attach = grid.nearest_cell(port.latitude, port.longitude)
        .and_then(|cell| grid.neighbors_within_cap(cell));

      let (radius, mut cells) = match attach {
        Some(x) => x,
        None => {
          warn!(port=p, name=%port.name, "no passable cell near port, port is isolated");
          report.isolated_ports.push(p);
          continue;
        }
      };
      if radius > 1 {
        // the port sits in impassable ice: take only the closest way out
        cells.sort_by(|&a, &b| {
          spherical_distance(port_pos, grid.coords(a))
            .partial_cmp(&spherical_distance(port_pos, grid.coords(b)))
            .unwrap_or(std::cmp::Ordering::Equal)
        });
        cells.truncate(1);
      }
      for cell in cells {
        let d = spherical_distance(port_pos, grid.coords(cell));
        graph.add_edge(num_cells + p, cell.0 * ncols + cell.1, d);
        report.port_links += 1;
      }
    }

    info!(grid_edges=report.grid_edges, port_links=report.port_links, isolated=report.isolated_ports.len(), "built port graph");
    PortGraph { grid, graph, report }
  }

  #[inline]
  fn port_node(&self, p: PortIdx) -> NodeIdx { self.grid.num_cells() + p }

  fn path_node(&self, n: NodeIdx) -> PathNode {
    let num_cells = self.grid.num_cells();
    if n >= num_cells {
      PathNode::Port(n - num_cells)
    } else {
      let ncols = self.grid.dim().1;
      PathNode::Cell((n / ncols, n % ncols))
    }
  }

  pub fn grid(&self) -> &IceGrid { &self.grid }

  /// Shortest way between two ports through passable cells.
  pub fn shortest_path(&self, from: PortIdx, to: PortIdx) -> Result<GridPath, Unreachable> {
    let (nodes, km) = self.graph.shortest_path(self.port_node(from), self.port_node(to))
      .map_err(|_| Unreachable { from, to })?;
    let nodes: Vec<PathNode> = nodes.into_iter().map(|n| self.path_node(n)).collect();

    let inner = if nodes.len() > 2 { &nodes[1..nodes.len() - 1] } else { &[][..] };
    let severities: Vec<f64> = inner.iter()
      .filter_map(|n| match n {
        PathNode::Cell(c) => Some(self.grid.severity(*c)),
        PathNode::Port(_) => None,
      })
      .collect();
    let avg_severity = if severities.is_empty() {
      0.0
    } else {
      severities.iter().sum::<f64>() / severities.len() as f64
    };

    Ok(GridPath { nodes, distance: km * KM_TO_NM, avg_severity })
  }
}

/// Length and severity derived for one physical connection.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeConditions {
  pub from: PortIdx,
  pub to: PortIdx,
  pub result: Result<(f64, f64), Unreachable>,
}

/// Replaces the length and severity of every connection with the values found on the selected
/// ice snapshot. Connections without a way through the ice get [`UNREACHABLE_NM`] and severity 0,
/// which no vessel can sail. Does nothing if the scenario has no ice grid.
#[instrument(level="info", skip(data))]
pub fn derive_edge_conditions(data: &mut NsrInstance) -> Option<(PortGraphReport, Vec<EdgeConditions>)> {
  let snapshot = data.ice.as_ref()?;
  let pg = PortGraph::build(IceGrid::from_snapshot(snapshot), &data.ports);

  let conditions: Vec<EdgeConditions> = data.connections()
    .into_par_iter()
    .map(|(from, to)| {
      let result = pg.shortest_path(from, to).map(|p| (p.distance, p.avg_severity));
      EdgeConditions { from, to, result }
    })
    .collect();

  let mut unreachable = 0;
  for c in &conditions {
    let (distance, avg_norm) = match c.result {
      Ok(x) => x,
      Err(_) => {
        warn!(from=c.from, to=c.to, "no way through the ice, edge is closed");
        unreachable += 1;
        (UNREACHABLE_NM, 0.0)
      }
    };
    trace!(from=c.from, to=c.to, distance, avg_norm);
    data.set_edge_conditions(c.from, c.to, distance, avg_norm);
  }
  info!(edges=conditions.len(), unreachable, "derived edge conditions");
  Some((pg.report, conditions))
}
