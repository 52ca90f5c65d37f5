use std::fmt;
use chrono::{NaiveDate, NaiveDateTime, Duration};

pub type Tick = u32;

/// Scenario-wide settings shared by network construction, formulation and solving.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
  /// Length of one discrete time step in hours.
  pub hours_in_interval: u32,
  /// Hours covered by the planning horizon proper.
  pub hours_in_horizon: u32,
  /// Extra hours after the horizon in which movements begun inside the horizon may finish.
  pub hours_in_cross: u32,
  pub start_date: NaiveDate,
  /// Wall-clock solver time limit in seconds.
  pub timelimit: u64,
  /// Relative MIP gap accepted by the solver.
  pub mip_gap: f64,
  /// Number of shortest routes per vessel whose edges the vessel may use.
  pub k_bests: usize,
  /// Maximum number of escorted vessels per icebreaker movement.
  pub convoy_ratio: f64,
  pub arrival_bonus: f64,
  pub distance_penalty: f64,
  pub icebreaker_move_cost: f64,
  /// Forbid escorted departures without a matching icebreaker departure.
  pub require_escort: bool,
}

pub const DEFAULT_TIMELIMIT: u64 = 900;
pub const DEFAULT_MIP_GAP: f64 = 0.02;
pub const DEFAULT_K_BESTS: usize = 5;
pub const DEFAULT_CONVOY_RATIO: f64 = 3.0;
pub const DEFAULT_ARRIVAL_BONUS: f64 = 300.0;
pub const DEFAULT_DISTANCE_PENALTY: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
  NonPositiveInterval,
  NonPositiveHorizon,
  NonPositiveTimelimit,
  ZeroKBests,
  MipGapOutOfRange(f64),
  NegativeWeight(&'static str, f64),
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NonPositiveInterval => write!(f, "hours_in_interval must be positive"),
      ConfigError::NonPositiveHorizon => write!(f, "hours_in_horizon must be positive"),
      ConfigError::NonPositiveTimelimit => write!(f, "timelimit must be positive"),
      ConfigError::ZeroKBests => write!(f, "k_bests must be at least 1"),
      ConfigError::MipGapOutOfRange(g) => write!(f, "mip_gap must lie in [0, 1), got {}", g),
      ConfigError::NegativeWeight(name, w) => write!(f, "{} must be non-negative, got {}", name, w),
    }
  }
}

impl std::error::Error for ConfigError {}

impl ScenarioConfig {
  pub fn new(hours_in_interval: u32, hours_in_horizon: u32, hours_in_cross: u32, start_date: NaiveDate) -> Self {
    ScenarioConfig {
      hours_in_interval,
      hours_in_horizon,
      hours_in_cross,
      start_date,
      timelimit: DEFAULT_TIMELIMIT,
      mip_gap: DEFAULT_MIP_GAP,
      k_bests: DEFAULT_K_BESTS,
      convoy_ratio: DEFAULT_CONVOY_RATIO,
      arrival_bonus: DEFAULT_ARRIVAL_BONUS,
      distance_penalty: DEFAULT_DISTANCE_PENALTY,
      icebreaker_move_cost: 0.0,
      require_escort: false,
    }
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.hours_in_interval == 0 { return Err(ConfigError::NonPositiveInterval) }
    if self.hours_in_horizon == 0 { return Err(ConfigError::NonPositiveHorizon) }
    if self.timelimit == 0 { return Err(ConfigError::NonPositiveTimelimit) }
    if self.k_bests == 0 { return Err(ConfigError::ZeroKBests) }
    if !(0.0..1.0).contains(&self.mip_gap) { return Err(ConfigError::MipGapOutOfRange(self.mip_gap)) }
    for &(name, w) in &[
      ("convoy_ratio", self.convoy_ratio),
      ("arrival_bonus", self.arrival_bonus),
      ("distance_penalty", self.distance_penalty),
      ("icebreaker_move_cost", self.icebreaker_move_cost),
    ] {
      if !(w >= 0.0) { return Err(ConfigError::NegativeWeight(name, w)) }
    }
    Ok(())
  }

  #[inline]
  pub fn planning_hours(&self) -> u32 {
    self.hours_in_horizon + self.hours_in_cross
  }

  /// Number of ticks at which a departure may start.
  #[inline]
  pub fn horizon_ticks(&self) -> Tick {
    ceil_div(self.hours_in_horizon, self.hours_in_interval)
  }

  /// Number of ticks in the whole planning window, cross window included.
  #[inline]
  pub fn planning_ticks(&self) -> Tick {
    ceil_div(self.planning_hours(), self.hours_in_interval)
  }

  pub fn start_datetime(&self) -> NaiveDateTime {
    self.start_date.and_hms(0, 0, 0)
  }

  pub fn end_datetime(&self) -> NaiveDateTime {
    self.start_datetime() + Duration::hours(self.hours_in_horizon as i64)
  }

  /// Converts a wall-clock instant to the first tick not earlier than it. Instants before the
  /// start of planning map to tick 0.
  pub fn date_to_tick(&self, date: NaiveDateTime) -> Tick {
    let minutes = (date - self.start_datetime()).num_minutes();
    if minutes <= 0 {
      return 0;
    }
    let per_tick = self.hours_in_interval as i64 * 60;
    ((minutes + per_tick - 1) / per_tick) as Tick
  }

  pub fn tick_to_date(&self, t: Tick) -> NaiveDateTime {
    self.start_datetime() + Duration::hours(t as i64 * self.hours_in_interval as i64)
  }
}

#[inline]
fn ceil_div(a: u32, b: u32) -> u32 {
  (a + b - 1) / b
}
