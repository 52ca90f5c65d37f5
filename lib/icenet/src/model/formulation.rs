use tracing::*;
use super::*;
use crate::network::Network;
use crate::data::*;

fn add_var(model: &mut MipModel, kind: VarKind, name: String, cost: f64) -> VarIdx {
  let idx = VarIdx::new(model.vars.len());
  model.vars.push(Var { kind, name, cost });
  idx
}

fn stop_cost(network: &Network, l: LocationIdx) -> f64 {
  let config = &network.data.config;
  let loc = network.location(l);
  let vessel = &network.data.vessels[loc.vessel];
  if vessel.is_icebreaker {
    return 0.0;
  }
  let mut cost = (loc.time - vessel.time_start) as f64 + config.distance_penalty * loc.min_time_to_end_port;
  if vessel.end_port == Some(loc.port) {
    cost -= config.arrival_bonus;
  }
  cost
}

/// Turns the network into a binary program: one `use` variable per departure and one `stop`
/// variable per location, with flow balance, one stop per vessel and the convoy limit. With
/// `require_escort` set, every escorted departure also needs an icebreaker departure alongside.
#[instrument(name="formulate", level="info", skip(network))]
pub fn formulate(network: &Network) -> MipModel {
  let data = network.data;
  let config = &data.config;
  let mut model = MipModel::default();

  for d in network.departure_indices() {
    let dep = network.departure(d);
    let vessel = &data.vessels[dep.vessel];
    let cost = if vessel.is_icebreaker && !data.edges[dep.edge].is_fict() { config.icebreaker_move_cost } else { 0.0 };
    let name = format!("u{}", d.index());
    let v = add_var(&mut model, VarKind::Use(d), name, cost);
    model.use_vars.push(v);
  }
  for l in network.location_indices() {
    let name = format!("s{}", l.index());
    let v = add_var(&mut model, VarKind::Stop(l), name, stop_cost(network, l));
    model.stop_vars.push(v);
  }

  // injection + inputs == outputs + stop
  for l in network.location_indices() {
    let loc = network.location(l);
    let injection = if network.start_location(loc.vessel) == Some(l) { 1.0 } else { 0.0 };
    let mut expr: LinExpr = loc.inputs.iter().map(|&d| (model.use_var(d), 1.0)).collect();
    expr.extend(loc.outputs.iter().map(|&d| (model.use_var(d), -1.0)));
    expr.push((model.stop_var(l), -1.0));
    model.constraints.push(Constraint {
      kind: ConstraintKind::FlowBalance(l),
      name: format!("flow{}", l.index()),
      expr,
      sense: Sense::Eq,
      rhs: -injection,
    });
  }

  for v in 0..data.vessels.len() {
    let expr: LinExpr = network.vessel_locations(v).map(|l| (model.stop_var(l), 1.0)).collect();
    if expr.is_empty() { continue }
    model.constraints.push(Constraint {
      kind: ConstraintKind::OneStop(v),
      name: format!("stop{}", v),
      expr,
      sense: Sense::Eq,
      rhs: 1.0,
    });
  }

  for (s, slot) in network.slots.iter().enumerate() {
    let mut escorted = false;
    let mut expr = LinExpr::new();
    for &d in &slot.departures {
      let dep = network.departure(d);
      if data.vessels[dep.vessel].is_icebreaker {
        expr.push((model.use_var(d), -config.convoy_ratio));
      } else if dep.escort {
        escorted = true;
        expr.push((model.use_var(d), 1.0));
      }
    }
    if !escorted { continue }
    model.constraints.push(Constraint {
      kind: ConstraintKind::Convoy(s),
      name: format!("convoy{}", s),
      expr,
      sense: Sense::Le,
      rhs: 0.0,
    });
  }

  if config.require_escort {
    for d in network.departure_indices() {
      let dep = network.departure(d);
      if !dep.escort { continue }
      let mut expr = vec![(model.use_var(d), 1.0)];
      expr.extend(dep.companions.iter().map(|&c| (model.use_var(c), -1.0)));
      model.constraints.push(Constraint {
        kind: ConstraintKind::Escort(d),
        name: format!("escort{}", d.index()),
        expr,
        sense: Sense::Le,
        rhs: 0.0,
      });
    }
  }

  info!(vars=model.vars.len(), constraints=model.constraints.len(), "formulated model");
  model
}
