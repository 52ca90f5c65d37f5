use std::time::Instant;
use tracing::*;
use super::*;
use crate::model::Sense;
use crate::Idx;

const EPS: f64 = 1e-9;

/// Depth-first branch and bound over the binaries, with activity-based propagation on every row.
///
/// Rows of the form `x_1 + .. + x_k = 1` with disjoint supports are treated as choices: the bound
/// counts the cheapest open member of every undecided choice, and branching picks that member
/// first. That is enough to solve small scenarios; use an external solver for anything big.
#[derive(Debug, Clone, Copy)]
pub struct BranchAndBound {
  /// Nodes between two looks at the clock.
  pub check_interval: u64,
}

impl Default for BranchAndBound {
  fn default() -> Self {
    BranchAndBound { check_interval: 256 }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value {
  Free,
  Zero,
  One,
}

/// `terms . x <= rhs`
#[derive(Debug, Clone)]
struct Row {
  terms: Vec<(usize, f64)>,
  rhs: f64,
  /// Smallest activity still possible under the current fixings.
  min_activity: f64,
}

impl Row {
  fn new(mut terms: Vec<(usize, f64)>, rhs: f64) -> Self {
    terms.sort_by_key(|&(j, _)| j);
    let mut merged: Vec<(usize, f64)> = Vec::with_capacity(terms.len());
    for (j, a) in terms {
      match merged.last_mut() {
        Some(last) if last.0 == j => last.1 += a,
        _ => merged.push((j, a)),
      }
    }
    merged.retain(|&(_, a)| a != 0.0);
    let min_activity = merged.iter().map(|&(_, a)| a.min(0.0)).sum();
    Row { terms: merged, rhs, min_activity }
  }
}

struct Frame {
  var: usize,
  trail_len: usize,
  alternative: Option<bool>,
}

struct Search<'a> {
  model: &'a MipModel,
  rows: Vec<Row>,
  var_rows: Vec<Vec<(usize, f64)>>,
  choices: Vec<Vec<usize>>,
  in_choice: Vec<bool>,
  values: Vec<Value>,
  trail: Vec<usize>,
  frames: Vec<Frame>,
  forced: Vec<(usize, bool)>,
  incumbent: Option<(f64, Vec<bool>)>,
  nodes: u64,
}

impl<'a> Search<'a> {
  fn new(model: &'a MipModel) -> Self {
    let n = model.num_vars();
    let mut rows = Vec::with_capacity(model.constraints.len());
    let mut choices = Vec::new();
    let mut in_choice = vec![false; n];

    for c in &model.constraints {
      let terms: Vec<(usize, f64)> = c.expr.iter().map(|&(v, a)| (v.index(), a)).collect();
      let negated = || terms.iter().map(|&(j, a)| (j, -a)).collect::<Vec<_>>();
      match c.sense {
        Sense::Le => rows.push(Row::new(terms.clone(), c.rhs)),
        Sense::Ge => rows.push(Row::new(negated(), -c.rhs)),
        Sense::Eq => {
          rows.push(Row::new(terms.clone(), c.rhs));
          rows.push(Row::new(negated(), -c.rhs));
          let is_choice = c.rhs == 1.0 && !terms.is_empty()
            && terms.iter().all(|&(j, a)| a == 1.0 && !in_choice[j]);
          if is_choice {
            let mut members: Vec<usize> = terms.iter().map(|&(j, _)| j).collect();
            members.sort_unstable();
            members.dedup();
            if members.len() == terms.len() {
              for &j in &members { in_choice[j] = true; }
              choices.push(members);
            }
          }
        }
      }
    }

    let mut var_rows = vec![Vec::new(); n];
    for (r, row) in rows.iter().enumerate() {
      for &(j, a) in &row.terms {
        var_rows[j].push((r, a));
      }
    }

    Search {
      model,
      rows,
      var_rows,
      choices,
      in_choice,
      values: vec![Value::Free; n],
      trail: Vec::with_capacity(n),
      frames: Vec::new(),
      forced: Vec::new(),
      incumbent: None,
      nodes: 0,
    }
  }

  #[inline]
  fn cost(&self, j: usize) -> f64 { self.model.vars[j].cost }

  fn assign(&mut self, j: usize, one: bool) {
    debug_assert_eq!(self.values[j], Value::Free);
    self.values[j] = if one { Value::One } else { Value::Zero };
    self.trail.push(j);
    for &(r, a) in &self.var_rows[j] {
      if a > 0.0 && one {
        self.rows[r].min_activity += a;
      } else if a < 0.0 && !one {
        self.rows[r].min_activity -= a;
      }
    }
  }

  fn undo_to(&mut self, len: usize) {
    while self.trail.len() > len {
      let j = match self.trail.pop() {
        Some(j) => j,
        None => break,
      };
      let one = self.values[j] == Value::One;
      for &(r, a) in &self.var_rows[j] {
        if a > 0.0 && one {
          self.rows[r].min_activity -= a;
        } else if a < 0.0 && !one {
          self.rows[r].min_activity += a;
        }
      }
      self.values[j] = Value::Free;
    }
  }

  /// Fixes whatever row `r` forces. False if the row cannot be satisfied any more.
  fn propagate_row(&mut self, r: usize) -> bool {
    let row = &self.rows[r];
    let slack = row.rhs - row.min_activity;
    if slack < -EPS {
      return false;
    }
    let mut forced = std::mem::take(&mut self.forced);
    forced.clear();
    for &(j, a) in &row.terms {
      if self.values[j] != Value::Free { continue }
      if a > slack + EPS {
        forced.push((j, false));
      } else if -a > slack + EPS {
        forced.push((j, true));
      }
    }
    // fixings forced by a row leave its minimum activity unchanged
    for &(j, one) in &forced {
      self.assign(j, one);
    }
    self.forced = forced;
    true
  }

  /// Propagates every fixing on the trail from position `from` onwards.
  fn propagate(&mut self, from: usize) -> bool {
    let mut head = from;
    while head < self.trail.len() {
      let j = self.trail[head];
      head += 1;
      for k in 0..self.var_rows[j].len() {
        let r = self.var_rows[j][k].0;
        if !self.propagate_row(r) {
          return false;
        }
      }
    }
    true
  }

  fn propagate_all(&mut self) -> bool {
    for r in 0..self.rows.len() {
      if !self.propagate_row(r) {
        return false;
      }
    }
    self.propagate(0)
  }

  fn lower_bound(&self) -> f64 {
    let mut lb = 0.0;
    for (j, &x) in self.values.iter().enumerate() {
      match x {
        Value::One => lb += self.cost(j),
        Value::Free if !self.in_choice[j] => lb += self.cost(j).min(0.0),
        _ => {}
      }
    }
    for members in &self.choices {
      if members.iter().any(|&j| self.values[j] == Value::One) { continue }
      let cheapest = members.iter()
        .filter(|&&j| self.values[j] == Value::Free)
        .map(|&j| self.cost(j))
        .fold(f64::INFINITY, f64::min);
      lb += cheapest;
    }
    lb
  }

  fn pruned(&self, lb: f64, gap: f64) -> bool {
    match &self.incumbent {
      Some((best, _)) => lb >= best - gap * best.abs() - EPS,
      None => lb.is_infinite(),
    }
  }

  /// The next variable to branch on and the value to try first.
  fn choose(&self) -> Option<(usize, bool)> {
    for members in &self.choices {
      if members.iter().any(|&j| self.values[j] == Value::One) { continue }
      let cheapest = members.iter().copied()
        .filter(|&j| self.values[j] == Value::Free)
        .min_by(|&a, &b| self.cost(a).partial_cmp(&self.cost(b)).unwrap_or(std::cmp::Ordering::Equal));
      if let Some(j) = cheapest {
        return Some((j, true));
      }
    }
    self.values.iter()
      .position(|&x| x == Value::Free)
      .map(|j| (j, self.cost(j) < 0.0))
  }

  fn record_incumbent(&mut self) {
    let values: Vec<bool> = self.values.iter().map(|&x| x == Value::One).collect();
    let objective = self.model.objective_value(&values);
    if self.incumbent.as_ref().map_or(true, |(best, _)| objective < best - EPS) {
      debug!(objective, nodes=self.nodes, "new incumbent");
      self.incumbent = Some((objective, values));
    }
  }

  /// Steps back to the deepest decision with an untried value and tries it. False once the
  /// tree is exhausted.
  fn backtrack(&mut self) -> bool {
    while let Some(frame) = self.frames.pop() {
      self.undo_to(frame.trail_len);
      if let Some(one) = frame.alternative {
        self.frames.push(Frame { var: frame.var, trail_len: frame.trail_len, alternative: None });
        self.assign(frame.var, one);
        if self.propagate(frame.trail_len) {
          return true;
        }
      }
    }
    false
  }

  /// Runs until the tree is exhausted (`true`) or the time limit hits (`false`).
  fn run(&mut self, config: &SolverConfig, check_interval: u64) -> bool {
    let start = Instant::now();
    let check_interval = check_interval.max(1);
    let mut backtrack = false;
    loop {
      if backtrack {
        if !self.backtrack() {
          return true;
        }
        backtrack = false;
      }
      self.nodes += 1;
      if self.nodes % check_interval == 0 && start.elapsed() >= config.time_limit {
        return false;
      }
      if self.pruned(self.lower_bound(), config.mip_gap) {
        backtrack = true;
        continue;
      }
      match self.choose() {
        None => {
          self.record_incumbent();
          backtrack = true;
        }
        Some((j, one)) => {
          let trail_len = self.trail.len();
          self.frames.push(Frame { var: j, trail_len, alternative: Some(!one) });
          self.assign(j, one);
          if !self.propagate(trail_len) {
            backtrack = true;
          }
        }
      }
    }
  }
}

impl MipSolver for BranchAndBound {
  fn name(&self) -> &str { "bnb" }

  fn solve(&self, model: &MipModel, config: &SolverConfig) -> Result<Assignment, SolveError> {
    let start = Instant::now();
    let mut search = Search::new(model);
    debug!(rows=search.rows.len(), choices=search.choices.len());
    if !search.propagate_all() {
      info!("infeasible at the root");
      return Err(SolveError::Infeasible);
    }
    let exhausted = search.run(config, self.check_interval);
    info!(nodes=search.nodes, exhausted, elapsed=?start.elapsed(), "branch and bound finished");

    match (search.incumbent, exhausted) {
      (Some((objective, values)), true) => Ok(Assignment { values, objective, status: SolveStatus::Optimal }),
      (Some((objective, values)), false) => Ok(Assignment { values, objective, status: SolveStatus::Feasible }),
      (None, true) => Err(SolveError::Infeasible),
      (None, false) => Err(SolveError::TimeLimit),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;
  use proptest::prelude::*;
  use crate::model::{formulate, Var, VarKind, VarIdx, Constraint, ConstraintKind};
  use crate::network::{Network, DepartureIdx};
  use crate::test_utils::*;
  use crate::init_test_logging;

  fn config() -> SolverConfig {
    SolverConfig { time_limit: Duration::from_secs(30), mip_gap: 0.0 }
  }

  fn toy(costs: &[f64], rows: &[(Vec<f64>, Sense, f64)]) -> MipModel {
    let mut m = MipModel::default();
    for (i, &cost) in costs.iter().enumerate() {
      m.vars.push(Var { kind: VarKind::Use(DepartureIdx::new(i)), name: format!("x{}", i), cost });
    }
    for (i, (coefs, sense, rhs)) in rows.iter().enumerate() {
      m.constraints.push(Constraint {
        kind: ConstraintKind::Convoy(i),
        name: format!("r{}", i),
        expr: coefs.iter().enumerate()
          .filter(|&(_, &a)| a != 0.0)
          .map(|(j, &a)| (VarIdx::new(j), a))
          .collect(),
        sense: *sense,
        rhs: *rhs,
      });
    }
    m
  }

  fn brute_force(m: &MipModel) -> Option<f64> {
    let n = m.num_vars();
    (0u32..(1 << n))
      .map(|mask| (0..n).map(|j| mask & (1 << j) != 0).collect::<Vec<_>>())
      .filter(|x| m.is_feasible(x))
      .map(|x| m.objective_value(&x))
      .fold(None, |best: Option<f64>, o| Some(best.map_or(o, |b| b.min(o))))
  }

  #[test]
  fn pick_one() {
    let m = toy(&[3.0, -1.0, 2.0], &[(vec![1.0, 1.0, 1.0], Sense::Eq, 1.0)]);
    let a = BranchAndBound::default().solve(&m, &config()).unwrap();
    assert_eq!(a.values, vec![false, true, false]);
    assert_eq!(a.objective, -1.0);
    assert_eq!(a.status, SolveStatus::Optimal);
  }

  #[test]
  fn infeasible() {
    let m = toy(&[1.0, 1.0], &[
      (vec![1.0, 1.0], Sense::Eq, 1.0),
      (vec![1.0, 1.0], Sense::Le, 0.0),
    ]);
    assert_eq!(BranchAndBound::default().solve(&m, &config()), Err(SolveError::Infeasible));
  }

  #[test]
  fn scenario_a_arrives() {
    let _g = init_test_logging(None::<&str>);
    let data = scenario_a();
    let net = Network::build(&data).unwrap();
    let model = formulate(&net);
    let a = solve(&BranchAndBound::default(), &model, &config()).unwrap();
    assert_eq!(a.status, SolveStatus::Optimal);
    assert_eq!(a.objective, -290.0);
    let stop = net.find_location(0, 1, 10).unwrap();
    assert!(a.values[model.stop_var(stop).index()]);
    let ab = data.edge_between(0, 1).unwrap();
    assert!(a.values[model.use_var(net.find_departure(0, ab, 0, false).unwrap()).index()]);
  }

  #[test]
  fn scenario_b_stays() {
    for &require_escort in &[true, false] {
      let data = scenario_b(require_escort);
      let net = Network::build(&data).unwrap();
      let model = formulate(&net);
      let a = BranchAndBound::default().solve(&model, &config()).unwrap();
      let stop = net.find_location(0, 0, 0).unwrap();
      assert!(a.values[model.stop_var(stop).index()]);
      assert_eq!(a.objective, 5.0 * 150.0 / 15.0);
    }
  }

  #[test]
  fn escorted_crossing() {
    let data = convoy_scenario(1);
    let net = Network::build(&data).unwrap();
    let model = formulate(&net);
    let a = BranchAndBound::default().solve(&model, &config()).unwrap();
    assert_eq!(a.objective, 14.0 - 300.0);
    let stop = net.find_location(1, 1, 14).unwrap();
    assert!(a.values[model.stop_var(stop).index()]);
    let ab = data.edge_between(0, 1).unwrap();
    assert!(a.values[model.use_var(net.find_departure(0, ab, 0, false).unwrap()).index()]);
  }

  #[test]
  fn time_limit_without_solution() {
    let m = toy(&[1.0, 1.0, 1.0], &[(vec![1.0, 1.0, 1.0], Sense::Ge, 1.0)]);
    let config = SolverConfig { time_limit: Duration::from_secs(0), mip_gap: 0.0 };
    let r = BranchAndBound { check_interval: 1 }.solve(&m, &config);
    assert_eq!(r, Err(SolveError::TimeLimit));
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn matches_brute_force(
      costs in proptest::collection::vec(-5i32..6, 1..9),
      rows in proptest::collection::vec(
        (proptest::collection::vec(-2i32..3, 8), 0usize..3, -2i32..4), 0..5),
      choice in proptest::option::of(proptest::collection::vec(0usize..8, 1..4)),
    ) {
      let n = costs.len();
      let costs: Vec<f64> = costs.into_iter().map(f64::from).collect();
      let mut rows: Vec<(Vec<f64>, Sense, f64)> = rows.into_iter()
        .map(|(coefs, sense, rhs)| {
          let sense = [Sense::Le, Sense::Eq, Sense::Ge][sense];
          (coefs[..n].iter().map(|&a| f64::from(a)).collect(), sense, f64::from(rhs))
        })
        .collect();
      if let Some(members) = choice {
        let mut coefs = vec![0.0; n];
        for j in members { coefs[j % n] = 1.0; }
        rows.push((coefs, Sense::Eq, 1.0));
      }
      let m = toy(&costs, &rows);
      let expected = brute_force(&m);
      match BranchAndBound::default().solve(&m, &config()) {
        Ok(a) => {
          prop_assert!(m.is_feasible(&a.values));
          prop_assert_eq!(Some(a.objective), expected);
        }
        Err(e) => {
          prop_assert_eq!(e, SolveError::Infeasible);
          prop_assert_eq!(expected, None);
        }
      }
    }
  }
}
