use std::fmt;
use std::time::Duration;
use tracing::*;
use crate::data::ScenarioConfig;
use crate::model::MipModel;

mod bnb;
pub use bnb::BranchAndBound;

#[cfg(feature = "gurobi")]
mod gurobi;
#[cfg(feature = "gurobi")]
pub use gurobi::Gurobi;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
  pub time_limit: Duration,
  /// Relative gap at which the search may stop.
  pub mip_gap: f64,
}

impl SolverConfig {
  pub fn from_scenario(config: &ScenarioConfig) -> Self {
    SolverConfig { time_limit: Duration::from_secs(config.timelimit), mip_gap: config.mip_gap }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
  Optimal,
  /// The time limit was hit with a solution in hand.
  Feasible,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
  /// One value per model variable.
  pub values: Vec<bool>,
  pub objective: f64,
  pub status: SolveStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
  Infeasible,
  /// The time limit was hit before any solution was found.
  TimeLimit,
  Solver(String),
}

impl fmt::Display for SolveError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      SolveError::Infeasible => f.write_str("model is infeasible"),
      SolveError::TimeLimit => f.write_str("time limit reached without a solution"),
      SolveError::Solver(msg) => write!(f, "solver error: {}", msg),
    }
  }
}

impl std::error::Error for SolveError {}

pub trait MipSolver {
  fn name(&self) -> &str;

  fn solve(&self, model: &MipModel, config: &SolverConfig) -> Result<Assignment, SolveError>;
}

/// Runs `solver` and checks whatever it returns against the model.
#[instrument(name="solve", level="info", skip(solver, model, config), fields(solver=solver.name()))]
pub fn solve(solver: &dyn MipSolver, model: &MipModel, config: &SolverConfig) -> Result<Assignment, SolveError> {
  let result = solver.solve(model, config);
  match &result {
    Ok(a) => {
      if !model.is_feasible(&a.values) {
        let broken: Vec<_> = model.violations(&a.values).map(|c| c.name.as_str()).take(10).collect();
        error!(?broken, "solver returned an infeasible assignment");
        return Err(SolveError::Solver(format!("assignment breaks {} constraints", model.violations(&a.values).count())));
      }
      info!(objective=a.objective, status=?a.status, "solved");
    }
    Err(e) => warn!(%e, "solve failed"),
  }
  result
}
