use std::path::Path;
use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use json::JsonValue;
use ndarray::Array2;
use crate::{Error, Map, Result};
use crate::config::ScenarioConfig;
use crate::raw::nsr::*;
use crate::rules::{RuleKey, SpeedBase, SpeedDecreaseRule};
use super::ParseInstance;

/// A scenario stored as a single JSON document.
#[derive(Debug, Copy, Clone)]
pub struct JsonFmt<P>(pub P);

impl<P: AsRef<Path>> ParseInstance<JsonFmt<P>> for RawScenario {
  fn parse(path: JsonFmt<P>) -> Result<RawScenario> {
    let path = path.0.as_ref();
    let contents = std::fs::read_to_string(path)
      .with_context(|| format!("read scenario {:?}", path))?;
    parse_scenario(&contents).with_context(|| format!("parse scenario {:?}", path))
  }
}

pub fn parse_scenario(contents: &str) -> Result<RawScenario> {
  let doc = json::parse(contents)?;
  let config = config(&doc["config"])?;

  let ports = doc["ports"].members().map(port).collect::<Result<Vec<_>>>()?;
  let edges = doc["edges"].members().map(edge).collect::<Result<Vec<_>>>()?;

  let mut vessels = doc["vessels"].members()
    .map(|v| vessel(v, false))
    .collect::<Result<Vec<_>>>()?;
  for v in doc["icebreakers"].members() {
    vessels.push(vessel(v, true)?);
  }

  let speed_rules = if doc["speed_rules"].is_null() {
    None
  } else {
    Some(doc["speed_rules"].members().map(speed_rule).collect::<Result<Vec<_>>>()?)
  };

  let ice_grid = if doc["ice_grid"].is_null() {
    None
  } else {
    Some(ice_grid(&doc["ice_grid"])?)
  };

  Ok(RawScenario { config, ports, edges, vessels, speed_rules, ice_grid })
}

fn f64_field(v: &JsonValue, name: &'static str) -> Result<f64> {
  v[name].as_f64().ok_or_else(|| Error::MissingField(name).into())
}

fn i64_field(v: &JsonValue, name: &'static str) -> Result<i64> {
  v[name].as_i64().ok_or_else(|| Error::MissingField(name).into())
}

fn u32_field(v: &JsonValue, name: &'static str) -> Result<u32> {
  v[name].as_u32().ok_or_else(|| Error::MissingField(name).into())
}

fn str_field<'a>(v: &'a JsonValue, name: &'static str) -> Result<&'a str> {
  v[name].as_str().ok_or_else(|| Error::MissingField(name).into())
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
    .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_hms(0, 0, 0)))
    .with_context(|| format!("bad date-time {:?}", s))
}

fn config(v: &JsonValue) -> Result<ScenarioConfig> {
  let start_date = NaiveDate::parse_from_str(str_field(v, "start_date")?, "%Y-%m-%d")
    .context("bad start_date")?;
  let mut c = ScenarioConfig::new(
    u32_field(v, "hours_in_interval")?,
    u32_field(v, "hours_in_horizon")?,
    v["hours_in_cross"].as_u32().unwrap_or(0),
    start_date,
  );
  if let Some(x) = v["timelimit"].as_u64() { c.timelimit = x; }
  if let Some(x) = v["mip_gap"].as_f64() { c.mip_gap = x; }
  if let Some(x) = v["k_bests"].as_usize() { c.k_bests = x; }
  if let Some(x) = v["convoy_ratio"].as_f64() { c.convoy_ratio = x; }
  if let Some(x) = v["arrival_bonus"].as_f64() { c.arrival_bonus = x; }
  if let Some(x) = v["distance_penalty"].as_f64() { c.distance_penalty = x; }
  if let Some(x) = v["icebreaker_move_cost"].as_f64() { c.icebreaker_move_cost = x; }
  if let Some(x) = v["require_escort"].as_bool() { c.require_escort = x; }
  Ok(c)
}

fn port(v: &JsonValue) -> Result<RawPort> {
  Ok(RawPort {
    id: i64_field(v, "id")?,
    name: v["name"].as_str().unwrap_or_default().to_string(),
    longitude: f64_field(v, "longitude")?,
    latitude: f64_field(v, "latitude")?,
  })
}

fn edge(v: &JsonValue) -> Result<RawEdge> {
  Ok(RawEdge {
    start_point_id: i64_field(v, "start_point_id")?,
    end_point_id: i64_field(v, "end_point_id")?,
    length: f64_field(v, "length")?,
    avg_norm: f64_field(v, "avg_norm")?,
  })
}

fn vessel(v: &JsonValue, icebreaker: bool) -> Result<RawVessel> {
  let date_start = match v["date_start"].as_str() {
    Some(s) => Some(parse_datetime(s)?),
    None => None,
  };
  let is_icebreaker = icebreaker || v["is_icebreaker"].as_bool().unwrap_or(false);
  Ok(RawVessel {
    vessel_id: i64_field(v, "vessel_id")?,
    vessel_name: str_field(v, "vessel_name")?.to_string(),
    class_type: v["class_type"].as_str().unwrap_or_default().to_string(),
    max_speed: f64_field(v, "max_speed")?,
    start_point_id: i64_field(v, "start_point_id")?,
    end_point_id: if is_icebreaker { None } else { v["end_point_id"].as_i64() },
    date_start,
    is_icebreaker,
  })
}

fn speed_rule(v: &JsonValue) -> Result<SpeedDecreaseRule> {
  let key = match (v["vessel_name"].as_str(), v["ice_class"].as_str()) {
    (Some(n), _) => RuleKey::VesselName(n.to_string()),
    (None, Some(c)) => RuleKey::IceClass(c.to_string()),
    (None, None) => return Err(Error::MissingField("ice_class").into()),
  };
  let base = match str_field(v, "base")? {
    "max_speed" => SpeedBase::MaxSpeed,
    "severity" => SpeedBase::Severity,
    other => anyhow::bail!("unknown speed base {:?}", other),
  };
  Ok(SpeedDecreaseRule {
    key,
    severity: v["severity"].as_i32().ok_or(Error::MissingField("severity"))?,
    escort: v["escort"].as_bool().ok_or(Error::MissingField("escort"))?,
    feasible: v["feasible"].as_bool().unwrap_or(true),
    decrease_pct: f64_field(v, "decrease_pct")?,
    base,
  })
}

fn matrix(v: &JsonValue, name: &'static str) -> Result<Array2<f64>> {
  let rows: Vec<Vec<f64>> = v.members()
    .map(|r| r.members().map(|x| x.as_f64().unwrap_or(f64::NAN)).collect())
    .collect();
  let ncols = rows.first().map(Vec::len).unwrap_or(0);
  if rows.iter().any(|r| r.len() != ncols) {
    anyhow::bail!("ragged matrix `{}`", name);
  }
  let flat: Vec<f64> = rows.iter().flatten().copied().collect();
  Ok(Array2::from_shape_vec((rows.len(), ncols), flat)?)
}

fn ice_grid(v: &JsonValue) -> Result<RawIceGrid> {
  let lon = matrix(&v["lon"], "lon")?;
  let lat = matrix(&v["lat"], "lat")?;
  let mut snapshots = Map::default();
  for (label, values) in v["snapshots"].entries() {
    snapshots.insert(label.to_string(), matrix(values, "snapshots")?);
  }
  let grid = RawIceGrid { lon, lat, snapshots };
  grid.check_shape()?;
  Ok(grid)
}
