use chrono::NaiveDateTime;
use json::JsonValue;
use crate::Idx;
use crate::data::*;
use crate::model::MipModel;
use crate::network::Network;
use crate::solve::{Assignment, SolveStatus};

/// A departure taken in the solution. Waiting in port shows up as a move with `from == to`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledMove {
  pub vessel: VesselIdx,
  pub from: PortIdx,
  pub to: PortIdx,
  pub time_from: Tick,
  pub duration: Tick,
  pub speed: f64,
  pub escort: bool,
  pub icebreaker: bool,
  pub departure: NaiveDateTime,
  pub arrival: NaiveDateTime,
}

impl ScheduledMove {
  #[inline]
  pub fn is_wait(&self) -> bool { self.from == self.to }
}

/// Where a vessel is when the planning window closes.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalStop {
  pub vessel: VesselIdx,
  pub port: PortIdx,
  pub time: Tick,
  pub date: NaiveDateTime,
  /// Reached its destination. Icebreakers never count.
  pub arrived: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
  /// Sorted by vessel, then time.
  pub moves: Vec<ScheduledMove>,
  /// One per vessel in the network, sorted by vessel.
  pub stops: Vec<FinalStop>,
  pub objective: f64,
  pub status: SolveStatus,
}

impl Schedule {
  pub fn extract(network: &Network, model: &MipModel, assignment: &Assignment) -> Schedule {
    let data = network.data;
    let config = &data.config;

    let mut moves: Vec<ScheduledMove> = network.departure_indices()
      .filter(|&d| assignment.values[model.use_var(d).index()])
      .map(|d| {
        let dep = network.departure(d);
        let edge = &data.edges[dep.edge];
        ScheduledMove {
          vessel: dep.vessel,
          from: edge.from,
          to: edge.to,
          time_from: dep.time,
          duration: dep.duration,
          speed: dep.speed,
          escort: dep.escort,
          icebreaker: data.vessels[dep.vessel].is_icebreaker,
          departure: config.tick_to_date(dep.time),
          arrival: config.tick_to_date(dep.arrival()),
        }
      })
      .collect();
    moves.sort_by_key(|m| (m.vessel, m.time_from));

    let mut stops: Vec<FinalStop> = network.location_indices()
      .filter(|&l| assignment.values[model.stop_var(l).index()])
      .map(|l| {
        let loc = network.location(l);
        let vessel = &data.vessels[loc.vessel];
        FinalStop {
          vessel: loc.vessel,
          port: loc.port,
          time: loc.time,
          date: config.tick_to_date(loc.time),
          arrived: !vessel.is_icebreaker && vessel.end_port == Some(loc.port),
        }
      })
      .collect();
    stops.sort_by_key(|s| s.vessel);

    Schedule { moves, stops, objective: assignment.objective, status: assignment.status }
  }

  pub fn vessel_moves(&self, vessel: VesselIdx) -> impl Iterator<Item=&ScheduledMove> + '_ {
    self.moves.iter().filter(move |m| m.vessel == vessel)
  }

  pub fn stop(&self, vessel: VesselIdx) -> Option<&FinalStop> {
    self.stops.iter().find(|s| s.vessel == vessel)
  }

  /// Non-icebreakers at their destination.
  pub fn num_arrived(&self) -> usize {
    self.stops.iter().filter(|s| s.arrived).count()
  }

  /// Non-icebreakers that end somewhere other than their destination.
  pub fn num_stopped_early(&self, data: &NsrInstance) -> usize {
    self.stops.iter().filter(|s| !s.arrived && !data.vessels[s.vessel].is_icebreaker).count()
  }

  pub fn to_json(&self, data: &NsrInstance) -> JsonValue {
    let fmt_date = |d: &NaiveDateTime| d.format("%Y-%m-%d %H:%M").to_string();
    let moves: Vec<JsonValue> = self.moves.iter().map(|m| json::object!{
      vessel_id: data.vessels[m.vessel].id,
      vessel_name: data.vessels[m.vessel].name.as_str(),
      from: data.ports[m.from].id,
      to: data.ports[m.to].id,
      time_from: m.time_from,
      duration: m.duration,
      speed: m.speed,
      escort: m.escort,
      icebreaker: m.icebreaker,
      departure: fmt_date(&m.departure),
      arrival: fmt_date(&m.arrival),
    }).collect();
    let stops: Vec<JsonValue> = self.stops.iter().map(|s| json::object!{
      vessel_id: data.vessels[s.vessel].id,
      vessel_name: data.vessels[s.vessel].name.as_str(),
      port: data.ports[s.port].id,
      time: s.time,
      date: fmt_date(&s.date),
      arrived: s.arrived,
    }).collect();
    json::object!{
      objective: self.objective,
      optimal: self.status == SolveStatus::Optimal,
      moves: moves,
      stops: stops,
    }
  }

  pub fn summary_json(&self, data: &NsrInstance) -> JsonValue {
    json::object!{
      objective: self.objective,
      optimal: self.status == SolveStatus::Optimal,
      moves: self.moves.iter().filter(|m| !m.is_wait()).count(),
      arrived: self.num_arrived(),
      stopped_early: self.num_stopped_early(data),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;
  use chrono::NaiveDate;
  use crate::model::formulate;
  use crate::solve::{MipSolver, BranchAndBound, SolverConfig};
  use crate::test_utils::*;

  fn schedule(data: &NsrInstance) -> Schedule {
    let net = Network::build(data).unwrap();
    let model = formulate(&net);
    let config = SolverConfig { time_limit: Duration::from_secs(30), mip_gap: 0.0 };
    let a = BranchAndBound::default().solve(&model, &config).unwrap();
    Schedule::extract(&net, &model, &a)
  }

  #[test]
  fn direct_crossing() {
    let data = scenario_a();
    let s = schedule(&data);
    assert_eq!(s.moves.len(), 1);
    let m = &s.moves[0];
    assert_eq!((m.from, m.to, m.time_from, m.duration), (0, 1, 0, 10));
    assert!(!m.escort && !m.icebreaker && !m.is_wait());
    assert_eq!(m.departure, NaiveDate::from_ymd(2022, 3, 1).and_hms(0, 0, 0));
    assert_eq!(m.arrival, NaiveDate::from_ymd(2022, 3, 1).and_hms(10, 0, 0));
    assert_eq!(s.stop(0).map(|s| (s.port, s.time, s.arrived)), Some((1, 10, true)));
    assert_eq!(s.num_arrived(), 1);
    assert_eq!(s.num_stopped_early(&data), 0);

    let j = s.to_json(&data);
    assert_eq!(j["moves"].len(), 1);
    assert_eq!(j["moves"][0]["arrival"], "2022-03-01 10:00");
    assert_eq!(j["stops"][0]["arrived"], true);
    let summary = s.summary_json(&data);
    assert_eq!(summary["arrived"], 1);
    assert_eq!(summary["moves"], 1);
  }

  #[test]
  fn stuck_without_escort() {
    let data = scenario_b(true);
    let s = schedule(&data);
    assert!(s.moves.is_empty());
    assert_eq!(s.stop(0).map(|s| (s.port, s.time, s.arrived)), Some((0, 0, false)));
    assert_eq!(s.num_stopped_early(&data), 1);
  }

  #[test]
  fn escorted_moves_are_marked() {
    let data = convoy_scenario(1);
    let s = schedule(&data);
    let ib: Vec<_> = s.vessel_moves(0).filter(|m| !m.is_wait()).collect();
    assert_eq!(ib.len(), 1);
    assert!(ib[0].icebreaker && !ib[0].escort);
    let v: Vec<_> = s.vessel_moves(1).collect();
    assert_eq!(v.len(), 1);
    assert!(v[0].escort && !v[0].icebreaker);
    assert_eq!(v[0].time_from, ib[0].time_from);
    assert_eq!(s.num_arrived(), 1);
    assert!(!s.stop(0).unwrap().arrived);
  }
}
