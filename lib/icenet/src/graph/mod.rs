use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use crate::Set;

pub mod ksp;
pub mod route;

pub use ksp::k_shortest_paths;

pub type NodeIdx = usize;

/// No path joins the two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unreachable {
  pub from: NodeIdx,
  pub to: NodeIdx,
}

impl fmt::Display for Unreachable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "node {} is unreachable from node {}", self.to, self.from)
  }
}

impl std::error::Error for Unreachable {}

/// Undirected graph with non-negative edge weights.
#[derive(Debug, Clone, Default)]
pub struct WeightedGraph {
  adj: Vec<Vec<(NodeIdx, f64)>>,
  num_edges: usize,
}

/// Nodes and (undirected) edges hidden from a search without touching the graph itself.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
  nodes: Set<NodeIdx>,
  edges: Set<(NodeIdx, NodeIdx)>,
}

impl Exclusions {
  pub fn exclude_node(&mut self, n: NodeIdx) {
    self.nodes.insert(n);
  }

  pub fn exclude_edge(&mut self, a: NodeIdx, b: NodeIdx) {
    self.edges.insert((a.min(b), a.max(b)));
  }

  #[inline]
  fn node_ok(&self, n: NodeIdx) -> bool {
    self.nodes.is_empty() || !self.nodes.contains(&n)
  }

  #[inline]
  fn edge_ok(&self, a: NodeIdx, b: NodeIdx) -> bool {
    self.edges.is_empty() || !self.edges.contains(&(a.min(b), a.max(b)))
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Dist(f64);

impl Eq for Dist {}

impl PartialOrd for Dist {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Dist {
  fn cmp(&self, other: &Self) -> Ordering {
    self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
  }
}

/// Result of a single-source search: distance and predecessor of every settled node.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
  pub source: NodeIdx,
  pub dist: Vec<f64>,
  pred: Vec<Option<NodeIdx>>,
}

impl ShortestPathTree {
  pub fn reachable(&self, n: NodeIdx) -> bool {
    self.dist[n].is_finite()
  }

  pub fn path_to(&self, target: NodeIdx) -> Result<(Vec<NodeIdx>, f64), Unreachable> {
    if !self.reachable(target) {
      return Err(Unreachable { from: self.source, to: target });
    }
    let mut path = vec![target];
    let mut n = target;
    while let Some(p) = self.pred[n] {
      path.push(p);
      n = p;
    }
    path.reverse();
    Ok((path, self.dist[target]))
  }
}

impl WeightedGraph {
  pub fn with_nodes(n: usize) -> Self {
    WeightedGraph { adj: vec![Vec::new(); n], num_edges: 0 }
  }

  pub fn add_node(&mut self) -> NodeIdx {
    self.adj.push(Vec::new());
    self.adj.len() - 1
  }

  /// Adds an undirected edge. Parallel edges are allowed; searches use the lightest one.
  pub fn add_edge(&mut self, a: NodeIdx, b: NodeIdx, w: f64) {
    debug_assert!(w >= 0.0);
    self.adj[a].push((b, w));
    if a != b {
      self.adj[b].push((a, w));
    }
    self.num_edges += 1;
  }

  #[inline]
  pub fn num_nodes(&self) -> usize { self.adj.len() }

  #[inline]
  pub fn num_edges(&self) -> usize { self.num_edges }

  #[inline]
  pub fn neighbours(&self, n: NodeIdx) -> &[(NodeIdx, f64)] { &self.adj[n] }

  /// Weight of the lightest edge joining `a` and `b`.
  pub fn weight(&self, a: NodeIdx, b: NodeIdx) -> Option<f64> {
    self.adj[a].iter()
      .filter(|(n, _)| *n == b)
      .map(|(_, w)| *w)
      .min_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal))
  }

  pub fn path_weight(&self, path: &[NodeIdx]) -> Option<f64> {
    path.windows(2).map(|w| self.weight(w[0], w[1])).sum()
  }

  /// Dijkstra from `source`. Stops early once `target` is settled. Among equally distant nodes,
  /// the one discovered first is settled first.
  pub fn dijkstra(&self, source: NodeIdx, target: Option<NodeIdx>, excl: &Exclusions) -> ShortestPathTree {
    let n = self.num_nodes();
    let mut dist = vec![f64::INFINITY; n];
    let mut pred = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();
    let mut seq: u64 = 0;

    if excl.node_ok(source) {
      dist[source] = 0.0;
      heap.push(Reverse((Dist(0.0), seq, source)));
    }

    while let Some(Reverse((Dist(d), _, node))) = heap.pop() {
      if settled[node] { continue }
      settled[node] = true;
      if Some(node) == target { break }

      for &(next, w) in &self.adj[node] {
        if settled[next] || !excl.node_ok(next) || !excl.edge_ok(node, next) {
          continue;
        }
        let nd = d + w;
        if nd < dist[next] {
          dist[next] = nd;
          pred[next] = Some(node);
          seq += 1;
          heap.push(Reverse((Dist(nd), seq, next)));
        }
      }
    }

    ShortestPathTree { source, dist, pred }
  }

  pub fn shortest_path(&self, source: NodeIdx, target: NodeIdx) -> Result<(Vec<NodeIdx>, f64), Unreachable> {
    self.shortest_path_excluding(source, target, &Exclusions::default())
  }

  pub fn shortest_path_excluding(&self, source: NodeIdx, target: NodeIdx, excl: &Exclusions) -> Result<(Vec<NodeIdx>, f64), Unreachable> {
    if source == target && excl.node_ok(source) {
      return Ok((vec![source], 0.0));
    }
    self.dijkstra(source, Some(target), excl).path_to(target)
  }
}
