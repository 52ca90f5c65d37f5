use instances::rules::{SpeedTable, MIN_RULE_SEVERITY, MAX_RULE_SEVERITY};
use crate::data::*;

/// One way a vessel may cross an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedOption {
  /// Knots, zero for waiting in port
  pub speed: f64,
  pub escort: bool,
}

/// Severity as looked up in the speed table: rounded half away from zero.
#[inline]
pub fn severity_bucket(avg_norm: f64) -> i32 {
  avg_norm.round() as i32
}

/// Maps (vessel, edge) to the ways the vessel can cross the edge.
#[derive(Debug, Clone, Copy)]
pub struct SpeedModel<'a> {
  table: &'a SpeedTable,
}

impl<'a> SpeedModel<'a> {
  pub fn new(table: &'a SpeedTable) -> Self {
    SpeedModel { table }
  }

  /// Every feasible option, escorted first. An empty result means the edge cannot be used.
  /// Options without positive speed are dropped.
  pub fn evaluate(&self, vessel: &Vessel, edge: &Edge) -> Vec<SpeedOption> {
    if edge.is_fict() {
      return vec![SpeedOption { speed: 0.0, escort: false }];
    }
    let s = severity_bucket(edge.avg_norm);
    if s < MIN_RULE_SEVERITY {
      return Vec::new();
    }
    let mut opts = if s > MAX_RULE_SEVERITY {
      vec![SpeedOption { speed: vessel.max_speed, escort: false }]
    } else {
      self.table.lookup(&vessel.name, &vessel.ice_class, s).iter()
        .filter(|r| r.feasible && !(vessel.is_icebreaker && r.escort))
        .map(|r| SpeedOption { speed: r.speed(vessel.max_speed), escort: r.escort })
        .collect()
    };
    opts.retain(|o| o.speed > 0.0);
    opts
  }
}

/// Ticks needed to cross `edge` at `speed`, rounded to the nearest tick. Waiting always takes one
/// tick.
#[inline]
pub fn duration(edge: &Edge, speed: f64, hours_per_tick: f64) -> Tick {
  if edge.is_fict() {
    1
  } else {
    (edge.distance / (speed * hours_per_tick)).round() as Tick
  }
}
