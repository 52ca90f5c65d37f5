pub use instances::dataset::nsr::{
  NsrInstance,
  Port,
  Edge,
  Vessel,
  IceSnapshot,
  PortIdx,
  EdgeIdx,
  VesselIdx,
};
pub use instances::{ScenarioConfig, Tick};

pub trait NsrInstanceExt {
  fn horizon_ticks(&self) -> Tick;
  fn planning_ticks(&self) -> Tick;
  fn hours_per_tick(&self) -> f64;
}

impl NsrInstanceExt for NsrInstance {
  #[inline]
  fn horizon_ticks(&self) -> Tick {
    self.config.horizon_ticks()
  }

  #[inline]
  fn planning_ticks(&self) -> Tick {
    self.config.planning_ticks()
  }

  #[inline]
  fn hours_per_tick(&self) -> f64 {
    self.config.hours_in_interval as f64
  }
}
