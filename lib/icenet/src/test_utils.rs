use chrono::NaiveDate;
use instances::rules::DEFAULT_SPEED_TABLE;
use crate::data::*;

pub fn start_date() -> NaiveDate {
  NaiveDate::from_ymd(2022, 3, 1)
}

pub fn config(hours_in_interval: u32, hours_in_horizon: u32) -> ScenarioConfig {
  ScenarioConfig::new(hours_in_interval, hours_in_horizon, 0, start_date())
}

pub fn port(name: &str, longitude: f64, latitude: f64) -> Port {
  Port { id: 0, name: name.to_string(), longitude, latitude }
}

pub fn vessel(name: &str, class: &str, max_speed: f64, start_port: PortIdx, end_port: Option<PortIdx>) -> Vessel {
  Vessel {
    id: 0,
    name: name.to_string(),
    ice_class: class.to_string(),
    max_speed,
    is_icebreaker: false,
    start_port,
    end_port,
    time_start: 0,
  }
}

pub fn icebreaker(name: &str, class: &str, max_speed: f64, start_port: PortIdx) -> Vessel {
  Vessel { is_icebreaker: true, ..vessel(name, class, max_speed, start_port, None) }
}

fn renumber(mut data: NsrInstance) -> NsrInstance {
  for (i, p) in data.ports.iter_mut().enumerate() {
    p.id = i as i64 + 1;
  }
  for (i, v) in data.vessels.iter_mut().enumerate() {
    v.id = i as i64 + 1;
  }
  data
}

/// Ports `P0, P1, ..` on a parallel, each joined to the next by an edge of the given length.
/// The first edge of the instance is `P0 -> P1`. No vessels; one-hour ticks over two days.
pub fn line_scenario(lengths: &[f64], avg_norm: f64) -> NsrInstance {
  let ports: Vec<Port> = (0..=lengths.len())
    .map(|i| port(&format!("P{}", i), 60.0 + i as f64, 72.0))
    .collect();
  let raw_edges: Vec<_> = lengths.iter().enumerate()
    .map(|(i, &d)| (i, i + 1, d, avg_norm))
    .collect();
  renumber(NsrInstance::new("line".to_string(), config(1, 48), ports, &raw_edges, Vec::new(), DEFAULT_SPEED_TABLE.clone()))
}

/// Ports A and B, 150 nmi apart.
pub fn two_ports(avg_norm: f64, hours_in_horizon: u32, vessels: Vec<Vessel>) -> NsrInstance {
  let mut data = line_scenario(&[150.0], avg_norm);
  data.id = "two-ports".to_string();
  data.ports[0].name = "A".to_string();
  data.ports[1].name = "B".to_string();
  data.config = config(1, hours_in_horizon);
  data.vessels = vessels;
  renumber(data)
}

/// Clear water, an Arc 4 vessel at 15 kn from A to B. Exactly one crossing (t = 0, ten ticks)
/// fits into the horizon.
pub fn scenario_a() -> NsrInstance {
  two_ports(25.0, 11, vec![vessel("Штурман", "Arc 4", 15.0, 0, Some(1))])
}

/// Light ice: the Arc 4 vessel may only cross with escort, at 10.5 kn (14 ticks). No icebreaker.
pub fn scenario_b(require_escort: bool) -> NsrInstance {
  let mut data = two_ports(12.0, 20, vec![vessel("Штурман", "Arc 4", 15.0, 0, Some(1))]);
  data.config.require_escort = require_escort;
  data
}

/// Five ticks of horizon, but the crossing takes six.
pub fn scenario_c() -> NsrInstance {
  let mut data = line_scenario(&[60.0], 25.0);
  data.config = config(1, 5);
  data.vessels = vec![vessel("Штурман", "Arc 4", 10.0, 0, Some(1))];
  renumber(data)
}

/// One icebreaker and `n` Arc 4 vessels waiting at A for escort to B. The icebreaker crosses in
/// 13 ticks, the others in 14.
pub fn convoy_scenario(n: usize) -> NsrInstance {
  let mut vessels = vec![icebreaker("Ямал", "Arc 9", 22.0, 0)];
  for i in 0..n {
    vessels.push(vessel(&format!("Сухогруз-{}", i + 1), "Arc 4", 15.0, 0, Some(1)));
  }
  let mut data = two_ports(12.0, 20, vessels);
  data.config.require_escort = true;
  data
}
