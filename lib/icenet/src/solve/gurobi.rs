use grb::prelude::*;
use grb::expr::LinExpr as GrbExpr;
use super::*;
use crate::model::Sense;
use crate::Idx;

/// Hands the model to Gurobi. Needs a licence at run time.
#[derive(Debug, Clone, Default)]
pub struct Gurobi {
  pub verbose: bool,
}

fn grb_err(e: grb::Error) -> SolveError {
  SolveError::Solver(e.to_string())
}

impl Gurobi {
  fn run(&self, model: &MipModel, config: &SolverConfig) -> grb::Result<Result<Assignment, SolveError>> {
    let mut env = Env::empty()?;
    env.set(param::OutputFlag, if self.verbose { 1 } else { 0 })?;
    let env = env.start()?;
    let mut m = Model::with_env("icenet", &env)?;
    m.set_param(param::TimeLimit, config.time_limit.as_secs_f64())?;
    m.set_param(param::MIPGap, config.mip_gap)?;

    let mut vars = Vec::with_capacity(model.vars.len());
    for v in &model.vars {
      vars.push(add_binvar!(m, name: &v.name, obj: v.cost)?);
    }
    for c in &model.constraints {
      let mut expr = GrbExpr::new();
      for &(v, coef) in &c.expr {
        expr.add_term(coef, vars[v.index()]);
      }
      let constr = match c.sense {
        Sense::Le => c!(expr <= c.rhs),
        Sense::Eq => c!(expr == c.rhs),
        Sense::Ge => c!(expr >= c.rhs),
      };
      m.add_constr(&c.name, constr)?;
    }

    m.optimize()?;
    let status = m.status()?;
    let solutions = m.get_attr(attr::SolCount)?;
    let status = match status {
      Status::Optimal => SolveStatus::Optimal,
      Status::Infeasible | Status::InfOrUnbd => return Ok(Err(SolveError::Infeasible)),
      Status::TimeLimit if solutions > 0 => SolveStatus::Feasible,
      Status::TimeLimit => return Ok(Err(SolveError::TimeLimit)),
      other => return Ok(Err(SolveError::Solver(format!("unexpected status {:?}", other)))),
    };
    let x = m.get_obj_attr_batch(attr::X, vars)?;
    let objective = m.get_attr(attr::ObjVal)?;
    Ok(Ok(Assignment { values: x.into_iter().map(|x| x > 0.5).collect(), objective, status }))
  }
}

impl MipSolver for Gurobi {
  fn name(&self) -> &str { "gurobi" }

  fn solve(&self, model: &MipModel, config: &SolverConfig) -> Result<Assignment, SolveError> {
    self.run(model, config).map_err(grb_err)?
  }
}
