use lazy_static::lazy_static;
use crate::Map;

pub const MIN_RULE_SEVERITY: i32 = 10;
pub const MAX_RULE_SEVERITY: i32 = 19;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKey {
  IceClass(String),
  VesselName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedBase {
  MaxSpeed,
  Severity,
}

/// One row of the speed-decrease table: what a vessel can do on an edge with the given rounded
/// severity when moving with (or without) an escort.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedDecreaseRule {
  pub key: RuleKey,
  pub severity: i32,
  pub escort: bool,
  pub feasible: bool,
  /// Percentage taken off the base speed.
  pub decrease_pct: f64,
  pub base: SpeedBase,
}

impl SpeedDecreaseRule {
  pub fn speed(&self, max_speed: f64) -> f64 {
    let base = match self.base {
      SpeedBase::MaxSpeed => max_speed,
      SpeedBase::Severity => self.severity as f64,
    };
    base * (100.0 - self.decrease_pct) / 100.0
  }
}

/// Exact-match index over a rule list. Rows keyed by vessel name shadow rows keyed by ice class at
/// the same severity.
#[derive(Debug, Clone, Default)]
pub struct SpeedTable {
  by_name: Map<(String, i32), Vec<SpeedDecreaseRule>>,
  by_class: Map<(String, i32), Vec<SpeedDecreaseRule>>,
}

impl SpeedTable {
  pub fn new(rules: impl IntoIterator<Item=SpeedDecreaseRule>) -> Self {
    let mut table = SpeedTable::default();
    for r in rules {
      let (map, key) = match &r.key {
        RuleKey::VesselName(n) => (&mut table.by_name, n.clone()),
        RuleKey::IceClass(c) => (&mut table.by_class, c.clone()),
      };
      let rows = map.entry((key, r.severity)).or_insert_with(Vec::new);
      // a later row for the same (key, severity, escort) replaces the earlier one
      match rows.iter_mut().find(|x| x.escort == r.escort) {
        Some(x) => *x = r,
        None => rows.push(r),
      }
    }
    for rows in table.by_name.values_mut().chain(table.by_class.values_mut()) {
      rows.sort_by_key(|r| !r.escort);
    }
    table
  }

  /// Rows applying to a vessel at `severity`, escorted rows first.
  pub fn lookup(&self, vessel_name: &str, ice_class: &str, severity: i32) -> &[SpeedDecreaseRule] {
    if let Some(rows) = self.by_name.get(&(vessel_name.to_string(), severity)) {
      return rows;
    }
    self.by_class.get(&(ice_class.to_string(), severity)).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn len(&self) -> usize {
    self.by_name.values().chain(self.by_class.values()).map(Vec::len).sum()
  }
}

fn band(key: RuleKey, lo: i32, hi: i32, escort: bool, feasible: bool, decrease_pct: f64, base: SpeedBase) -> impl Iterator<Item=SpeedDecreaseRule> {
  (lo..=hi).map(move |severity| SpeedDecreaseRule {
    key: key.clone(),
    severity,
    escort,
    feasible,
    decrease_pct,
    base,
  })
}

fn default_rules() -> Vec<SpeedDecreaseRule> {
  use SpeedBase::*;
  let mut rules = Vec::new();

  for name in &["50 лет Победы", "Ямал"] {
    rules.extend(band(RuleKey::VesselName(name.to_string()), 10, 19, false, true, 0.0, Severity));
  }

  for name in &["Вайгач", "Таймыр"] {
    let key = RuleKey::VesselName(name.to_string());
    rules.extend(band(key.clone(), 10, 14, false, true, 25.0, Severity));
    rules.extend(band(key, 15, 19, false, true, 10.0, Severity));
  }

  for class in &["Arc 4", "Arc 5", "Arc 6"] {
    let key = RuleKey::IceClass(class.to_string());
    rules.extend(band(key.clone(), 10, 14, true, true, 30.0, MaxSpeed));
    rules.extend(band(key.clone(), 15, 19, true, true, 20.0, MaxSpeed));
    rules.extend(band(key, 10, 19, false, false, 100.0, MaxSpeed));
  }

  let arc7 = RuleKey::IceClass("Arc 7".to_string());
  rules.extend(band(arc7.clone(), 10, 14, true, true, 20.0, Severity));
  rules.extend(band(arc7.clone(), 15, 19, true, true, 0.0, Severity));
  rules.extend(band(arc7.clone(), 10, 14, false, true, 85.0, MaxSpeed));
  rules.extend(band(arc7, 15, 19, false, true, 40.0, MaxSpeed));

  rules
}

lazy_static! {
  pub static ref DEFAULT_SPEED_RULES: Vec<SpeedDecreaseRule> = default_rules();
  pub static ref DEFAULT_SPEED_TABLE: SpeedTable = SpeedTable::new(DEFAULT_SPEED_RULES.iter().cloned());
}
