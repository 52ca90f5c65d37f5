use std::fmt;
use crate::*;
use crate::network::{DepartureIdx, LocationIdx};
use crate::data::VesselIdx;

mod formulation;
pub mod lp;
pub use formulation::formulate;

define_u32_idx_type!(VarIdx);

/// Tolerance used when checking an assignment against the constraints.
pub const FEAS_TOL: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
  /// The departure is taken.
  Use(DepartureIdx),
  /// The vessel ends the planning window at this location.
  Stop(LocationIdx),
}

/// A binary variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
  pub kind: VarKind,
  pub name: String,
  /// Objective coefficient
  pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
  Le,
  Eq,
  Ge,
}

impl fmt::Display for Sense {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let s = match self {
      Sense::Le => "<=",
      Sense::Eq => "=",
      Sense::Ge => ">=",
    };
    f.write_str(s)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
  FlowBalance(LocationIdx),
  OneStop(VesselIdx),
  /// Index into [`Network::slots`](crate::network::Network::slots)
  Convoy(usize),
  Escort(DepartureIdx),
}

pub type LinExpr = Vec<(VarIdx, f64)>;

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
  pub kind: ConstraintKind,
  pub name: String,
  pub expr: LinExpr,
  pub sense: Sense,
  pub rhs: f64,
}

impl Constraint {
  pub fn lhs(&self, values: &[bool]) -> f64 {
    self.expr.iter()
      .filter(|(v, _)| values[v.index()])
      .map(|(_, c)| c)
      .sum()
  }

  pub fn is_satisfied(&self, values: &[bool]) -> bool {
    let lhs = self.lhs(values);
    match self.sense {
      Sense::Le => lhs <= self.rhs + FEAS_TOL,
      Sense::Ge => lhs >= self.rhs - FEAS_TOL,
      Sense::Eq => (lhs - self.rhs).abs() <= FEAS_TOL,
    }
  }
}

/// A pure binary program: minimise the sum of `cost` over the variables set to one.
#[derive(Debug, Clone, Default)]
pub struct MipModel {
  pub vars: Vec<Var>,
  pub constraints: Vec<Constraint>,
  use_vars: Vec<VarIdx>,
  stop_vars: Vec<VarIdx>,
}

impl MipModel {
  #[inline]
  pub fn use_var(&self, d: DepartureIdx) -> VarIdx { self.use_vars[d.index()] }

  #[inline]
  pub fn stop_var(&self, l: LocationIdx) -> VarIdx { self.stop_vars[l.index()] }

  #[inline]
  pub fn num_vars(&self) -> usize { self.vars.len() }

  pub fn objective_value(&self, values: &[bool]) -> f64 {
    self.vars.iter().zip(values)
      .filter(|(_, &x)| x)
      .map(|(v, _)| v.cost)
      .sum()
  }

  /// Constraints the assignment breaks.
  pub fn violations<'a>(&'a self, values: &'a [bool]) -> impl Iterator<Item=&'a Constraint> + 'a {
    self.constraints.iter().filter(move |c| !c.is_satisfied(values))
  }

  pub fn is_feasible(&self, values: &[bool]) -> bool {
    values.len() == self.vars.len() && self.violations(values).next().is_none()
  }

  /// All-zero assignment with the given variables set.
  pub fn assignment(&self, ones: impl IntoIterator<Item=VarIdx>) -> Vec<bool> {
    let mut values = vec![false; self.vars.len()];
    for v in ones {
      values[v.index()] = true;
    }
    values
  }
}
