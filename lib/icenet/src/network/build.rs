use std::collections::HashMap;
use rayon::prelude::*;
use tracing::*;
use instances::ConfigError;
use super::*;
use crate::graph::route::{RouteGraph, PortDistances};
use crate::speed::{SpeedModel, duration};

#[inline]
fn may_use(routes: Option<&VesselRoutes>, edge: &Edge, e: EdgeIdx) -> bool {
  match routes {
    None => true,
    Some(r) => r.possible_edges.contains(e) || (edge.is_fict() && r.possible_ports.contains(edge.from)),
  }
}

/// Every departure along edge `e`, ordered by tick, then vessel, then escorted first.
fn edge_departures(data: &NsrInstance, routes: &[Option<VesselRoutes>], speeds: SpeedModel, e: EdgeIdx) -> Vec<Departure> {
  let edge = &data.edges[e];
  let horizon = data.horizon_ticks();
  let planning = data.planning_ticks();
  let hours = data.hours_per_tick();

  let options: Vec<Vec<(f64, bool, Tick)>> = data.vessels.iter().enumerate()
    .map(|(v, vessel)| {
      if !may_use(routes[v].as_ref(), edge, e) {
        return Vec::new();
      }
      speeds.evaluate(vessel, edge).into_iter()
        .map(|o| (o.speed, o.escort, duration(edge, o.speed, hours)))
        .filter(|&(_, _, d)| {
          if d == 0 { trace!(vessel=v, edge=e, "crossing rounds to zero ticks, skipped"); }
          d > 0
        })
        .collect()
    })
    .collect();

  let mut departures = Vec::new();
  for time in 0..horizon {
    for (vessel, opts) in options.iter().enumerate() {
      if time < data.vessels[vessel].time_start { continue }
      for &(speed, escort, duration) in opts {
        match time.checked_add(duration) {
          Some(arrival) if arrival < planning => {}
          _ => continue,
        }
        departures.push(Departure { vessel, edge: e, time, duration, speed, escort, companions: Vec::new() });
      }
    }
  }
  departures
}

fn min_time_to_end(data: &NsrInstance, distances: &PortDistances, vessel: &Vessel, port: PortIdx) -> f64 {
  if vessel.is_icebreaker || vessel.max_speed <= 0.0 {
    return 0.0;
  }
  match vessel.end_port {
    Some(end) => distances.get_or_sentinel(port, end) / (vessel.max_speed * data.hours_per_tick()),
    None => 0.0,
  }
}

fn vessel_locations(data: &NsrInstance, distances: &PortDistances, v: VesselIdx) -> Vec<Location> {
  let vessel = &data.vessels[v];
  let planning = data.planning_ticks();
  let mut locations = Vec::with_capacity(data.ports.len() * planning.saturating_sub(vessel.time_start) as usize);
  for port in 0..data.ports.len() {
    let min_time_to_end_port = min_time_to_end(data, distances, vessel, port);
    for time in vessel.time_start..planning {
      locations.push(Location { vessel: v, port, time, min_time_to_end_port, inputs: Vec::new(), outputs: Vec::new() });
    }
  }
  locations
}

impl<'a> Network<'a> {
  /// Expands the scenario over the planning window. Fails only on an invalid configuration;
  /// vessels or ports that cannot be served end up in [`Network::report`].
  #[instrument(name="build_network", level="info", skip(data), fields(id=%data.id))]
  pub fn build(data: &'a NsrInstance) -> Result<Network<'a>, ConfigError> {
    data.config.validate()?;
    let rg = RouteGraph::new(data);
    let routes = prune_vessels(data, &rg, data.config.k_bests);
    let distances = rg.port_distances();

    let mut report = BuildReport::default();
    for (v, r) in routes.iter().enumerate() {
      if matches!(r, Some(r) if !r.has_route()) {
        report.vessels_without_route.push(v);
      }
    }
    for p in 0..data.ports.len() {
      if rg.graph.neighbours(p).is_empty() {
        warn!(port=p, name=%data.ports[p].name, "port has no connections");
        report.isolated_ports.push(p);
      }
    }

    let mut network = Network {
      data,
      routes,
      departures: Vec::new(),
      locations: Vec::new(),
      slots: Vec::new(),
      size_info: HashMap::new(),
      report,
      vessel_locations: Vec::with_capacity(data.vessels.len()),
      location_index: Map::default(),
      departure_index: Map::default(),
    };
    network.generate_locations(&distances);
    network.generate_departures();
    network.link();
    network.fill_size_info();
    info!(departures=network.departures.len(), locations=network.locations.len(), slots=network.slots.len(), "built network");
    Ok(network)
  }

  fn generate_locations(&mut self, distances: &PortDistances) {
    let data = self.data;
    let planning = data.planning_ticks();
    let per_vessel: Vec<Vec<Location>> = (0..data.vessels.len()).into_par_iter()
      .map(|v| vessel_locations(data, distances, v))
      .collect();

    for (v, locations) in per_vessel.into_iter().enumerate() {
      if data.vessels[v].time_start >= planning {
        warn!(vessel=v, name=%data.vessels[v].name, time_start=data.vessels[v].time_start, "vessel enters after the planning window");
        self.report.vessels_outside_horizon.push(v);
      }
      let start = self.locations.len();
      for l in locations {
        self.location_index.insert((l.vessel, l.port, l.time), LocationIdx::new(self.locations.len()));
        self.locations.push(l);
      }
      self.vessel_locations.push(start..self.locations.len());
    }
  }

  #[instrument(level="info", skip(self))]
  fn generate_departures(&mut self) {
    let data = self.data;
    let speeds = SpeedModel::new(&data.speed_table);
    let routes = &self.routes;
    let per_edge: Vec<Vec<Departure>> = (0..data.edges.len()).into_par_iter()
      .map(|e| edge_departures(data, routes, speeds, e))
      .collect();

    let mut slot_index: Map<(EdgeIdx, Tick), usize> = Map::default();
    for d in per_edge.into_iter().flatten() {
      let key = (d.vessel, d.edge, d.time, d.escort);
      if self.departure_index.contains_key(&key) { continue }
      let idx = DepartureIdx::new(self.departures.len());
      self.departure_index.insert(key, idx);

      let slots = &mut self.slots;
      let s = *slot_index.entry((d.edge, d.time)).or_insert_with(|| {
        slots.push(EdgeTimeSlot { edge: d.edge, time: d.time, vessels: Vec::new(), departures: Vec::new() });
        slots.len() - 1
      });
      let slot = &mut self.slots[s];
      if let Err(pos) = slot.vessels.binary_search(&d.vessel) {
        slot.vessels.insert(pos, d.vessel);
      }
      slot.departures.push(idx);
      self.departures.push(d);
    }
    debug!(departures=self.departures.len(), slots=self.slots.len());
  }

  fn link(&mut self) {
    let data = self.data;
    for i in 0..self.departures.len() {
      let d = DepartureIdx::new(i);
      let (vessel, edge, time, arrival) = {
        let dep = &self.departures[i];
        (dep.vessel, &data.edges[dep.edge], dep.time, dep.arrival())
      };
      match (self.find_location(vessel, edge.from, time), self.find_location(vessel, edge.to, arrival)) {
        (Some(origin), Some(dest)) => {
          self.locations[origin.index()].outputs.push(d);
          self.locations[dest.index()].inputs.push(d);
        }
        _ => error!(vessel, from=edge.from, to=edge.to, time, arrival, "departure has no matching locations"),
      }
    }

    for slot in &self.slots {
      let companions: Vec<DepartureIdx> = slot.departures.iter().copied()
        .filter(|d| data.vessels[self.departures[d.index()].vessel].is_icebreaker)
        .collect();
      if companions.is_empty() { continue }
      for d in &slot.departures {
        let dep = &mut self.departures[d.index()];
        if dep.escort {
          dep.companions = companions.clone();
        }
      }
    }
  }

  fn fill_size_info(&mut self) {
    let data = self.data;
    let pruned_edges: usize = self.routes.iter().flatten()
      .map(|r| data.edges.len() - r.possible_edges.len())
      .sum();
    let fict = self.departures.iter().filter(|d| data.edges[d.edge].is_fict()).count();
    let escorted = self.departures.iter().filter(|d| d.escort).count();

    let info = &mut self.size_info;
    info.insert("vessels".to_string(), data.vessels.len() as isize);
    info.insert("icebreakers".to_string(), data.icebreakers().count() as isize);
    info.insert("ports".to_string(), data.ports.len() as isize);
    info.insert("edges".to_string(), data.edges.len() as isize);
    info.insert("horizon_ticks".to_string(), data.horizon_ticks() as isize);
    info.insert("planning_ticks".to_string(), data.planning_ticks() as isize);
    info.insert("departures".to_string(), self.departures.len() as isize);
    info.insert("fict_departures".to_string(), fict as isize);
    info.insert("escorted_departures".to_string(), escorted as isize);
    info.insert("locations".to_string(), self.locations.len() as isize);
    info.insert("slots".to_string(), self.slots.len() as isize);
    info.insert("pruned_edges".to_string(), pruned_edges as isize);
  }
}
