use super::*;

/// Yen's algorithm: the `k` lightest loopless paths from `source` to `target`, lightest first.
/// Fewer than `k` are returned when the graph has fewer distinct paths. Paths of equal weight
/// keep the order in which they were found.
///
/// The graph is never modified: each spur search hides the relevant nodes and edges through an
/// [`Exclusions`] set, so one graph can serve many concurrent callers.
pub fn k_shortest_paths(graph: &WeightedGraph, source: NodeIdx, target: NodeIdx, k: usize) -> Result<(Vec<f64>, Vec<Vec<NodeIdx>>), Unreachable> {
  if source == target {
    return Ok((vec![0.0], vec![vec![source]]));
  }

  let (first, first_len) = graph.shortest_path(source, target)?;
  let mut lengths = vec![first_len];
  let mut paths = vec![first];
  // (length, discovery order, path)
  let mut candidates: Vec<(f64, usize, Vec<NodeIdx>)> = Vec::new();
  let mut discovered = 0usize;

  while paths.len() < k {
    let prev = &paths[paths.len() - 1];

    for i in 0..prev.len() - 1 {
      let spur = prev[i];
      let root = &prev[..=i];

      let mut excl = Exclusions::default();
      for p in &paths {
        if p.len() > i + 1 && &p[..=i] == root {
          excl.exclude_edge(p[i], p[i + 1]);
        }
      }
      for &n in &root[..i] {
        excl.exclude_node(n);
      }

      if let Ok((spur_path, spur_len)) = graph.shortest_path_excluding(spur, target, &excl) {
        let root_len = match graph.path_weight(root) {
          Some(w) => w,
          None => continue,
        };
        let mut path = root[..i].to_vec();
        path.extend_from_slice(&spur_path);
        if !paths.contains(&path) && !candidates.iter().any(|(_, _, c)| c == &path) {
          candidates.push((root_len + spur_len, discovered, path));
          discovered += 1;
        }
      }
    }

    let best = candidates.iter()
      .enumerate()
      .min_by(|(_, a), (_, b)| {
        a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1))
      })
      .map(|(pos, _)| pos);

    match best {
      Some(pos) => {
        let (len, _, path) = candidates.swap_remove(pos);
        lengths.push(len);
        paths.push(path);
      }
      None => break,
    }
  }

  Ok((lengths, paths))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::tests::diamond;
  use proptest::prelude::*;

  #[test]
  fn diamond_routes_in_order() {
    let g = diamond();
    let (lengths, paths) = k_shortest_paths(&g, 0, 3, 2).unwrap();
    assert_eq!(lengths, vec![2.0, 4.0]);
    assert_eq!(paths, vec![vec![0, 1, 3], vec![0, 2, 3]]);
  }

  #[test]
  fn same_node() {
    let g = diamond();
    assert_eq!(k_shortest_paths(&g, 0, 0, 1), Ok((vec![0.0], vec![vec![0]])));
    assert_eq!(k_shortest_paths(&g, 2, 2, 5), Ok((vec![0.0], vec![vec![2]])));
  }

  #[test]
  fn fewer_paths_than_asked() {
    let g = diamond();
    let (lengths, paths) = k_shortest_paths(&g, 0, 3, 10).unwrap();
    assert_eq!(paths.len(), 2);
    assert_eq!(lengths.len(), 2);
  }

  #[test]
  fn unreachable_target() {
    let mut g = diamond();
    let n = g.add_node();
    assert_eq!(k_shortest_paths(&g, 0, n, 3), Err(Unreachable { from: 0, to: n }));
  }

  #[test]
  fn yen_classic() {
    // C=0 D=1 E=2 F=3 G=4 H=5
    let mut g = WeightedGraph::with_nodes(6);
    for &(a, b, w) in &[(0, 1, 3.0), (0, 2, 2.0), (1, 3, 4.0), (2, 1, 1.0), (2, 3, 2.0),
                        (2, 4, 3.0), (3, 4, 2.0), (3, 5, 1.0), (4, 5, 2.0)] {
      g.add_edge(a, b, w);
    }
    let (lengths, paths) = k_shortest_paths(&g, 0, 5, 3).unwrap();
    assert_eq!(lengths, vec![5.0, 7.0, 7.0]);
    assert_eq!(paths[0], vec![0, 2, 3, 5]);
    assert!(paths[1..].contains(&vec![0, 2, 4, 5]));
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn sorted_distinct_loopless(
      edges in proptest::collection::vec((0usize..7, 0usize..7, 1.0f64..50.0), 1..25),
      k in 1usize..6,
    ) {
      let mut g = WeightedGraph::with_nodes(7);
      for &(a, b, w) in &edges { g.add_edge(a, b, w); }
      if let Ok((lengths, paths)) = k_shortest_paths(&g, 0, 6, k) {
        prop_assert!(paths.len() <= k);
        prop_assert_eq!(lengths.len(), paths.len());
        for w in lengths.windows(2) {
          prop_assert!(w[0] <= w[1] + 1e-9);
        }
        for (p, &l) in paths.iter().zip(&lengths) {
          prop_assert_eq!(p[0], 0);
          prop_assert_eq!(*p.last().unwrap(), 6);
          let nodes: Set<_> = p.iter().collect();
          prop_assert_eq!(nodes.len(), p.len());
          prop_assert!((g.path_weight(p).unwrap() - l).abs() < 1e-9);
        }
        for i in 0..paths.len() {
          for j in (i+1)..paths.len() {
            prop_assert_ne!(&paths[i], &paths[j]);
          }
        }
      }
    }
  }
}
