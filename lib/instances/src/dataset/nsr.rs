use super::*;
use crate::parsers::{ParseInstance, JsonFmt};
use crate::raw::{FromRaw, nsr::*};
use crate::config::{ScenarioConfig, Tick};
use crate::rules::{SpeedTable, DEFAULT_SPEED_TABLE};
use crate::{Map, Set};
use ndarray::Array2;
use tracing::{info, warn};

pub type PortIdx = usize;
pub type EdgeIdx = usize;
pub type VesselIdx = usize;

/// Ice severity assigned to the waiting loop at every port.
pub const PORT_LOOP_AVG_NORM: f64 = 21.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Port {
  pub id: PortId,
  pub name: String,
  pub longitude: f64,
  pub latitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
  pub from: PortIdx,
  pub to: PortIdx,
  /// Nautical miles
  pub distance: f64,
  pub avg_norm: f64,
}

impl Edge {
  /// Waiting in port.
  #[inline(always)]
  pub fn is_fict(&self) -> bool { self.from == self.to }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vessel {
  pub id: VesselId,
  pub name: String,
  pub ice_class: String,
  pub max_speed: f64,
  pub is_icebreaker: bool,
  pub start_port: PortIdx,
  pub end_port: Option<PortIdx>,
  pub time_start: Tick,
}

/// The severity snapshot selected for the scenario's start date.
#[derive(Debug, Clone, PartialEq)]
pub struct IceSnapshot {
  pub label: String,
  pub lon: Array2<f64>,
  pub lat: Array2<f64>,
  pub severity: Array2<f64>,
}

/// A scenario with dense indices. Every raw connection yields two opposite edges, and every port
/// gets a self-loop edge.
#[derive(Debug, Clone)]
pub struct NsrInstance {
  pub id: String,
  pub config: ScenarioConfig,
  pub ports: Vec<Port>,
  pub edges: Vec<Edge>,
  pub vessels: Vec<Vessel>,
  pub speed_table: SpeedTable,
  pub ice: Option<IceSnapshot>,
  edge_lookup: Map<(PortIdx, PortIdx), EdgeIdx>,
}

impl NsrInstance {
  pub fn new(id: String, config: ScenarioConfig, ports: Vec<Port>, raw_edges: &[(PortIdx, PortIdx, f64, f64)],
             vessels: Vec<Vessel>, speed_table: SpeedTable) -> Self {
    let mut edges = Vec::with_capacity(raw_edges.len() * 2 + ports.len());
    let mut edge_lookup = Map::default();

    let mut push = |edges: &mut Vec<Edge>, from: PortIdx, to: PortIdx, distance: f64, avg_norm: f64| {
      if !edge_lookup.contains_key(&(from, to)) {
        edge_lookup.insert((from, to), edges.len());
        edges.push(Edge { from, to, distance, avg_norm });
      }
    };

    for &(a, b, distance, avg_norm) in raw_edges {
      if a == b { continue }
      push(&mut edges, a, b, distance, avg_norm);
      push(&mut edges, b, a, distance, avg_norm);
    }
    for p in 0..ports.len() {
      push(&mut edges, p, p, 0.0, PORT_LOOP_AVG_NORM);
    }

    NsrInstance { id, config, ports, edges, vessels, speed_table, ice: None, edge_lookup }
  }

  pub fn edge_between(&self, from: PortIdx, to: PortIdx) -> Option<EdgeIdx> {
    self.edge_lookup.get(&(from, to)).copied()
  }

  /// Physical connections, each listed once as `(lo, hi)` with `lo < hi`.
  pub fn connections(&self) -> Vec<(PortIdx, PortIdx)> {
    let mut pairs: Vec<_> = self.edges.iter()
      .filter(|e| e.from < e.to)
      .map(|e| (e.from, e.to))
      .collect();
    pairs.sort_unstable();
    pairs
  }

  /// Overwrites the length and severity of both directions of a connection.
  pub fn set_edge_conditions(&mut self, a: PortIdx, b: PortIdx, distance: f64, avg_norm: f64) {
    for &(from, to) in &[(a, b), (b, a)] {
      if let Some(&e) = self.edge_lookup.get(&(from, to)) {
        self.edges[e].distance = distance;
        self.edges[e].avg_norm = avg_norm;
      }
    }
  }

  pub fn port_by_id(&self, id: PortId) -> Option<PortIdx> {
    self.ports.iter().position(|p| p.id == id)
  }

  pub fn icebreakers(&self) -> impl Iterator<Item=VesselIdx> + '_ {
    self.vessels.iter().enumerate().filter(|(_, v)| v.is_icebreaker).map(|(i, _)| i)
  }
}

impl FromRaw<RawScenario> for NsrInstance {
  fn from_raw(raw: RawScenario, id: Cow<str>) -> Result<NsrInstance> {
    let RawScenario { config, ports: raw_ports, edges: raw_edges, vessels: raw_vessels, speed_rules, ice_grid } = raw;
    config.validate()?;

    let mut port_idx: Map<PortId, PortIdx> = Map::default();
    let mut ports = Vec::with_capacity(raw_ports.len());
    for p in raw_ports {
      if port_idx.insert(p.id, ports.len()).is_some() {
        return Err(Error::DuplicateId("port", p.id).into());
      }
      ports.push(Port { id: p.id, name: p.name, longitude: p.longitude, latitude: p.latitude });
    }
    let lookup = |id: PortId| port_idx.get(&id).copied().ok_or(Error::UnknownPort(id));

    let edges = raw_edges.iter()
      .map(|e| Ok((lookup(e.start_point_id)?, lookup(e.end_point_id)?, e.length, e.avg_norm)))
      .collect::<std::result::Result<Vec<_>, Error>>()?;

    let mut seen = Set::default();
    let mut vessels = Vec::with_capacity(raw_vessels.len());
    for v in raw_vessels {
      if !seen.insert(v.vessel_id) {
        return Err(Error::DuplicateId("vessel", v.vessel_id).into());
      }
      let end_port = match (v.is_icebreaker, v.end_point_id) {
        (true, _) => None,
        (false, Some(p)) => Some(lookup(p)?),
        (false, None) => return Err(Error::MissingField("end_point_id").into()),
      };
      let time_start = match (v.is_icebreaker, v.date_start) {
        (false, Some(date)) => config.date_to_tick(date),
        _ => 0,
      };
      vessels.push(Vessel {
        id: v.vessel_id,
        name: v.vessel_name,
        ice_class: v.class_type,
        max_speed: v.max_speed,
        is_icebreaker: v.is_icebreaker,
        start_port: lookup(v.start_point_id)?,
        end_port,
        time_start,
      });
    }

    let speed_table = match speed_rules {
      Some(rules) => SpeedTable::new(rules),
      None => DEFAULT_SPEED_TABLE.clone(),
    };

    let ice = match ice_grid {
      Some(grid) => {
        grid.check_shape()?;
        let (label, severity) = grid.snapshot_for(config.start_date)?;
        info!(label, "selected ice snapshot");
        Some(IceSnapshot {
          label: label.to_string(),
          severity: severity.clone(),
          lon: grid.lon.clone(),
          lat: grid.lat.clone(),
        })
      }
      None => None,
    };

    for v in &vessels {
      if v.max_speed <= 0.0 {
        warn!(vessel=v.id, max_speed=v.max_speed, "vessel cannot move");
      }
    }

    let mut instance = NsrInstance::new(id.into_owned(), config, ports, &edges, vessels, speed_table);
    instance.ice = ice;
    Ok(instance)
  }
}


pub enum NsrJson {}

impl StdLayout<NsrJson> {
  pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
    StdLayout::new(dir, "json")
  }
}

impl Dataset for StdLayout<NsrJson> {
  type Instance = NsrInstance;

  fn load_instance(&self, idx: usize) -> Result<Self::Instance> {
    let (instance, path) = self.instance_path(idx)?;
    let raw = RawScenario::parse(JsonFmt(&path)).context(format!("failed to load {:?}", path))?;
    NsrInstance::from_raw(raw, instance)
  }
}

/// Loads a single scenario file, named after its file stem.
pub fn load_scenario_file(path: impl AsRef<Path>) -> Result<NsrInstance> {
  let path = path.as_ref();
  let raw = RawScenario::parse(JsonFmt(path))?;
  let name = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or(Cow::Borrowed("scenario"));
  NsrInstance::from_raw(raw, name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parsers::parse_scenario;

  const SCENARIO: &str = r#"{
    "config": {"hours_in_interval": 6, "hours_in_horizon": 72, "start_date": "2022-03-01"},
    "ports": [{"id": 7, "longitude": 33.0, "latitude": 69.0},
              {"id": 3, "longitude": 72.0, "latitude": 71.3},
              {"id": 5, "longitude": 80.0, "latitude": 73.0}],
    "edges": [{"start_point_id": 7, "end_point_id": 3, "length": 600, "avg_norm": 14.2},
              {"start_point_id": 3, "end_point_id": 7, "length": 610, "avg_norm": 14.0},
              {"start_point_id": 3, "end_point_id": 5, "length": 300, "avg_norm": 19.6}],
    "vessels": [{"vessel_id": 1, "vessel_name": "Штурман", "class_type": "Arc 4", "max_speed": 14,
                 "start_point_id": 7, "end_point_id": 5, "date_start": "2022-03-02T03:00:00"},
                {"vessel_id": 2, "vessel_name": "Ямал", "class_type": "Arc 9", "max_speed": 21,
                 "start_point_id": 3, "is_icebreaker": true, "date_start": "2022-03-02T03:00:00"}]
  }"#;

  fn instance() -> NsrInstance {
    NsrInstance::from_raw(parse_scenario(SCENARIO).unwrap(), Cow::Borrowed("t")).unwrap()
  }

  #[test]
  fn edges_both_ways_and_loops() {
    let inst = instance();
    // 7<->3 listed twice collapses to one pair, plus 3<->5 and three loops
    assert_eq!(inst.edges.len(), 7);
    let e = inst.edge_between(0, 1).unwrap();
    assert_eq!(inst.edges[e].distance, 600.0);
    assert_eq!(inst.edges[inst.edge_between(1, 0).unwrap()].distance, 600.0);
    for p in 0..3 {
      let l = &inst.edges[inst.edge_between(p, p).unwrap()];
      assert!(l.is_fict());
      assert_eq!(l.distance, 0.0);
      assert_eq!(l.avg_norm, PORT_LOOP_AVG_NORM);
    }
    assert_eq!(inst.connections(), vec![(0, 1), (1, 2)]);
    assert_eq!(inst.edge_between(0, 2), None);
  }

  #[test]
  fn vessel_ticks_and_ports() {
    let inst = instance();
    let v = &inst.vessels[0];
    assert_eq!((v.start_port, v.end_port), (0, Some(2)));
    // 27 hours after the start with 6-hour ticks
    assert_eq!(v.time_start, 5);
    let ib = &inst.vessels[1];
    assert_eq!((ib.time_start, ib.end_port), (0, None));
    assert_eq!(inst.icebreakers().collect::<Vec<_>>(), vec![1]);
    assert!(inst.speed_table.len() > 0);
  }

  #[test]
  fn set_conditions_updates_both_directions() {
    let mut inst = instance();
    inst.set_edge_conditions(2, 1, 123.0, 11.0);
    for &(a, b) in &[(1, 2), (2, 1)] {
      let e = &inst.edges[inst.edge_between(a, b).unwrap()];
      assert_eq!((e.distance, e.avg_norm), (123.0, 11.0));
    }
  }

  #[test]
  fn bad_references() {
    let raw = parse_scenario(&SCENARIO.replace(r#""end_point_id": 5"#, r#""end_point_id": 99"#)).unwrap();
    let err = NsrInstance::from_raw(raw, Cow::Borrowed("t")).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::UnknownPort(99)));

    let raw = parse_scenario(&SCENARIO.replace(r#""vessel_id": 2"#, r#""vessel_id": 1"#)).unwrap();
    let err = NsrInstance::from_raw(raw, Cow::Borrowed("t")).unwrap_err();
    assert_eq!(err.downcast_ref::<Error>(), Some(&Error::DuplicateId("vessel", 1)));

    let mut raw = parse_scenario(SCENARIO).unwrap();
    raw.config.hours_in_interval = 0;
    let err = NsrInstance::from_raw(raw, Cow::Borrowed("t")).unwrap_err();
    assert!(err.downcast_ref::<crate::ConfigError>().is_some());
  }
}
