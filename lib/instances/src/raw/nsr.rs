use chrono::NaiveDateTime;
use ndarray::Array2;
use crate::Map;
use crate::config::ScenarioConfig;
use crate::rules::SpeedDecreaseRule;

pub type PortId = i64;
pub type VesselId = i64;

#[derive(Debug, Clone, PartialEq)]
pub struct RawPort {
  pub id: PortId,
  pub name: String,
  pub longitude: f64,
  pub latitude: f64,
}

/// A physical connection between two ports. Only one direction is listed; the reverse edge and
/// the per-port waiting loops are added when the instance is built.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEdge {
  pub start_point_id: PortId,
  pub end_point_id: PortId,
  /// Nautical miles
  pub length: f64,
  pub avg_norm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawVessel {
  pub vessel_id: VesselId,
  pub vessel_name: String,
  pub class_type: String,
  /// Knots
  pub max_speed: f64,
  pub start_point_id: PortId,
  /// `None` for icebreakers
  pub end_point_id: Option<PortId>,
  pub date_start: Option<NaiveDateTime>,
  pub is_icebreaker: bool,
}

/// Longitude, latitude and dated severity snapshots, all of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RawIceGrid {
  pub lon: Array2<f64>,
  pub lat: Array2<f64>,
  pub snapshots: Map<String, Array2<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawScenario {
  pub config: ScenarioConfig,
  pub ports: Vec<RawPort>,
  pub edges: Vec<RawEdge>,
  pub vessels: Vec<RawVessel>,
  /// Falls back to the built-in table when absent.
  pub speed_rules: Option<Vec<SpeedDecreaseRule>>,
  pub ice_grid: Option<RawIceGrid>,
}
