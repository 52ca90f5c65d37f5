use std::collections::HashMap;
use std::ops::Range;
use bit_set::BitSet;
use crate::*;
use crate::data::*;

mod prune;
mod build;
pub use prune::{VesselRoutes, prune_vessels};

define_u32_idx_type!(DepartureIdx);
define_u32_idx_type!(LocationIdx);

/// A vessel leaving along an edge at a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Departure {
  pub vessel: VesselIdx,
  pub edge: EdgeIdx,
  pub time: Tick,
  pub duration: Tick,
  /// Knots
  pub speed: f64,
  pub escort: bool,
  /// Icebreaker departures on the same edge at the same tick.
  pub companions: Vec<DepartureIdx>,
}

impl Departure {
  #[inline]
  pub fn arrival(&self) -> Tick { self.time + self.duration }
}

/// A vessel being at a port at a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
  pub vessel: VesselIdx,
  pub port: PortIdx,
  pub time: Tick,
  /// Ticks needed to reach the vessel's destination from here at full speed. Zero for
  /// icebreakers.
  pub min_time_to_end_port: f64,
  pub inputs: Vec<DepartureIdx>,
  pub outputs: Vec<DepartureIdx>,
}

/// All departures along one edge at one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeTimeSlot {
  pub edge: EdgeIdx,
  pub time: Tick,
  /// Sorted, without repeats.
  pub vessels: Vec<VesselIdx>,
  pub departures: Vec<DepartureIdx>,
}

/// Things found while building that will leave some vessel without a way to its destination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
  /// Non-icebreakers with no route between their start and end ports.
  pub vessels_without_route: Vec<VesselIdx>,
  /// Ports without any connection to another port.
  pub isolated_ports: Vec<PortIdx>,
  /// Vessels that enter after the planning window and are left out.
  pub vessels_outside_horizon: Vec<VesselIdx>,
}

impl BuildReport {
  pub fn is_clean(&self) -> bool {
    self.vessels_without_route.is_empty() && self.isolated_ports.is_empty() && self.vessels_outside_horizon.is_empty()
  }
}

/// The time-expanded network of a scenario.
#[derive(Debug, Clone)]
pub struct Network<'a> {
  pub data: &'a NsrInstance,
  /// `None` for icebreakers.
  pub routes: Vec<Option<VesselRoutes>>,
  pub departures: Vec<Departure>,
  pub locations: Vec<Location>,
  pub slots: Vec<EdgeTimeSlot>,
  pub size_info: HashMap<String, isize>,
  pub report: BuildReport,
  vessel_locations: Vec<Range<usize>>,
  location_index: Map<(VesselIdx, PortIdx, Tick), LocationIdx>,
  departure_index: Map<(VesselIdx, EdgeIdx, Tick, bool), DepartureIdx>,
}

impl<'a> Network<'a> {
  #[inline]
  pub fn departure(&self, d: DepartureIdx) -> &Departure { &self.departures[d.index()] }

  #[inline]
  pub fn location(&self, l: LocationIdx) -> &Location { &self.locations[l.index()] }

  pub fn find_location(&self, vessel: VesselIdx, port: PortIdx, time: Tick) -> Option<LocationIdx> {
    self.location_index.get(&(vessel, port, time)).copied()
  }

  pub fn find_departure(&self, vessel: VesselIdx, edge: EdgeIdx, time: Tick, escort: bool) -> Option<DepartureIdx> {
    self.departure_index.get(&(vessel, edge, time, escort)).copied()
  }

  /// Where the vessel enters the network: its start port at its start tick.
  pub fn start_location(&self, vessel: VesselIdx) -> Option<LocationIdx> {
    let v = &self.data.vessels[vessel];
    self.find_location(vessel, v.start_port, v.time_start)
  }

  /// Every location of one vessel. Empty for vessels outside the planning window.
  pub fn vessel_locations(&self, vessel: VesselIdx) -> impl Iterator<Item=LocationIdx> + Clone {
    self.vessel_locations[vessel].clone().map(LocationIdx::new)
  }

  pub fn departure_indices(&self) -> impl Iterator<Item=DepartureIdx> + Clone {
    crate::idx::range(self.departures.len())
  }

  pub fn location_indices(&self) -> impl Iterator<Item=LocationIdx> + Clone {
    crate::idx::range(self.locations.len())
  }

  /// Edges a non-icebreaker may use; `None` for icebreakers, which may use any.
  pub fn possible_edges(&self, vessel: VesselIdx) -> Option<&BitSet> {
    self.routes[vessel].as_ref().map(|r| &r.possible_edges)
  }
}

#[cfg(test)]
mod tests;
