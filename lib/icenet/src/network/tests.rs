use super::*;
use proptest::prelude::*;
use crate::test_utils::*;
use crate::speed::duration;

fn real_departures<'a>(net: &'a Network) -> Vec<&'a Departure> {
  net.departures.iter().filter(|d| !net.data.edges[d.edge].is_fict()).collect()
}

#[test]
fn clear_water_crossing() {
  let _g = init_test_logging(None::<&str>);
  let data = scenario_a();
  let net = Network::build(&data).unwrap();
  let ab = data.edge_between(0, 1).unwrap();

  let real = real_departures(&net);
  assert_eq!(real.len(), 1);
  let d = real[0];
  assert_eq!((d.vessel, d.edge, d.time, d.duration, d.escort), (0, ab, 0, 10, false));
  assert_eq!(d.speed, 15.0);
  assert!(d.companions.is_empty());
  assert!(net.report.is_clean());

  // 2 ports x 11 ticks
  assert_eq!(net.locations.len(), 22);
  let start = net.start_location(0).unwrap();
  assert_eq!(net.location(start).port, 0);
  assert_eq!(net.location(start).min_time_to_end_port, 10.0);
  let idx = net.find_departure(0, ab, 0, false).unwrap();
  assert!(net.location(start).outputs.contains(&idx));
  let arrival = net.find_location(0, 1, 10).unwrap();
  assert!(net.location(arrival).inputs.contains(&idx));
  assert_eq!(net.location(arrival).min_time_to_end_port, 0.0);
}

#[test]
fn light_ice_needs_escort() {
  let data = scenario_b(true);
  let net = Network::build(&data).unwrap();
  let real = real_departures(&net);
  // starts at ticks 0..=5, arriving before tick 20
  assert_eq!(real.len(), 6);
  for d in real {
    assert!(d.escort);
    assert!((d.speed - 10.5).abs() < 1e-9);
    assert_eq!(d.duration, 14);
    assert!(d.companions.is_empty());
  }
}

#[test]
fn crossing_longer_than_horizon() {
  let data = scenario_c();
  let net = Network::build(&data).unwrap();
  assert!(real_departures(&net).is_empty());
  // waiting is still possible at the start port
  assert!(net.find_departure(0, data.edge_between(0, 0).unwrap(), 0, false).is_some());
}

#[test]
fn icebreakers_are_companions() {
  let data = convoy_scenario(3);
  let net = Network::build(&data).unwrap();
  let ab = data.edge_between(0, 1).unwrap();

  let ib = net.find_departure(0, ab, 2, false).unwrap();
  assert_eq!(net.departure(ib).duration, 13);
  for v in 1..=3 {
    let d = net.find_departure(v, ab, 2, true).unwrap();
    assert_eq!(net.departure(d).companions, vec![ib]);
  }
  assert!(net.departure(ib).companions.is_empty());

  let slot = net.slots.iter().find(|s| s.edge == ab && s.time == 2).unwrap();
  assert_eq!(slot.vessels, vec![0, 1, 2, 3]);
  assert_eq!(slot.departures.len(), 4);

  // the icebreaker may head back, the others may not
  let ba = data.edge_between(1, 0).unwrap();
  assert!(net.departures.iter().any(|d| d.edge == ba && d.vessel == 0));
  assert!(!net.departures.iter().any(|d| d.edge == ba && d.vessel != 0));
  assert!(net.possible_edges(0).is_none());
}

#[test]
fn escorted_and_unescorted_options_both_kept() {
  let data = two_ports(15.0, 30, vec![
    icebreaker("Ямал", "Arc 9", 22.0, 0),
    vessel("Сибирь", "Arc 7", 15.0, 0, Some(1)),
  ]);
  let net = Network::build(&data).unwrap();
  let ab = data.edge_between(0, 1).unwrap();

  let ib = net.find_departure(0, ab, 0, false).unwrap();
  let escorted = net.find_departure(1, ab, 0, true).unwrap();
  let alone = net.find_departure(1, ab, 0, false).unwrap();
  assert_ne!(escorted, alone);

  // escorted at the severity itself, alone at 60% of max speed
  let d = net.departure(escorted);
  assert_eq!((d.speed, d.duration), (15.0, 10));
  assert_eq!(d.companions, vec![ib]);
  let d = net.departure(alone);
  assert!((d.speed - 9.0).abs() < 1e-9);
  assert_eq!(d.duration, 17);
  assert!(d.companions.is_empty());

  let slot = net.slots.iter().find(|s| s.edge == ab && s.time == 0).unwrap();
  assert_eq!(slot.vessels, vec![0, 1]);
  assert_eq!(slot.departures.len(), 3);
}

#[test]
fn stalled_vessel_only_waits() {
  let mut data = scenario_a();
  data.vessels[0].max_speed = 0.0;
  let net = Network::build(&data).unwrap();
  assert!(real_departures(&net).is_empty());
  let wait = data.edge_between(0, 0).unwrap();
  assert!(net.find_departure(0, wait, 0, false).is_some());
  assert!(net.departures.iter().all(|d| d.arrival() < data.planning_ticks()));
  assert_eq!(net.location(net.start_location(0).unwrap()).min_time_to_end_port, 0.0);
}

#[test]
fn unreachable_destination_is_reported() {
  let mut data = line_scenario(&[100.0], 25.0);
  data.ports.push(port("island", 80.0, 75.0));
  data.vessels = vec![vessel("Штурман", "Arc 4", 15.0, 0, Some(2))];
  let net = Network::build(&data).unwrap();
  assert_eq!(net.report.vessels_without_route, vec![0]);
  assert_eq!(net.report.isolated_ports, vec![2]);
  assert!(real_departures(&net).is_empty());
  assert!(net.locations.iter().all(|l| l.port != 2 || l.min_time_to_end_port == 0.0));
  assert_eq!(net.location(net.start_location(0).unwrap()).min_time_to_end_port, 1000.0 / 15.0);
}

#[test]
fn late_vessel() {
  let mut data = scenario_a();
  data.vessels[0].time_start = 20;
  let net = Network::build(&data).unwrap();
  assert_eq!(net.report.vessels_outside_horizon, vec![0]);
  assert_eq!(net.vessel_locations(0).count(), 0);
  assert!(net.departures.is_empty());
}

#[test]
fn invalid_config_rejected() {
  let mut data = scenario_a();
  data.config.k_bests = 0;
  assert!(Network::build(&data).is_err());
}

#[test]
fn size_info() {
  let data = scenario_a();
  let net = Network::build(&data).unwrap();
  assert_eq!(net.size_info["locations"], 22);
  assert_eq!(net.size_info["departures"], net.departures.len() as isize);
  assert_eq!(net.size_info["escorted_departures"], 0);
  // only A -> B survives pruning
  assert_eq!(net.size_info["pruned_edges"], data.edges.len() as isize - 1);
}

fn scenario(lengths: &[f64], severities: &[f64], horizon: u32, interval: u32, classes: &[usize], starts: &[Tick]) -> NsrInstance {
  const CLASSES: [&str; 4] = ["Arc 4", "Arc 5", "Arc 7", "Arc 9"];
  let mut data = line_scenario(lengths, 25.0);
  for (i, &s) in severities.iter().enumerate().take(lengths.len()) {
    data.set_edge_conditions(i, i + 1, lengths[i], s);
  }
  data.config = config(interval, horizon);
  let n = data.ports.len();
  data.vessels = classes.iter().zip(starts).enumerate()
    .map(|(i, (&c, &t))| {
      let mut v = vessel(&format!("v{}", i), CLASSES[c % 4], 8.0 + c as f64, i % n, Some((i + 1 + c) % n));
      v.time_start = t;
      v
    })
    .collect();
  data.vessels.push(icebreaker("Ямал", "Arc 9", 20.0, n - 1));
  data
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(60))]

  #[test]
  fn departures_respect_window_and_routes(
    lengths in proptest::collection::vec(20.0f64..300.0, 1..4),
    severities in proptest::collection::vec(5.0f64..25.0, 4),
    horizon in 4u32..40,
    interval in 1u32..4,
    classes in proptest::collection::vec(0usize..4, 1..4),
    starts in proptest::collection::vec(0u32..6, 4),
  ) {
    let data = scenario(&lengths, &severities, horizon, interval, &classes, &starts);
    let net = Network::build(&data).unwrap();
    let planning = data.planning_ticks();
    for d in &net.departures {
      let edge = &data.edges[d.edge];
      let v = &data.vessels[d.vessel];
      prop_assert!(d.time >= v.time_start);
      prop_assert!(d.time < data.horizon_ticks());
      prop_assert!(d.arrival() < planning);
      prop_assert!(d.duration > 0);
      prop_assert_eq!(d.duration, duration(edge, d.speed, data.hours_per_tick()));
      if !v.is_icebreaker {
        let r = net.routes[d.vessel].as_ref().unwrap();
        prop_assert!(r.possible_edges.contains(d.edge) || (edge.is_fict() && r.possible_ports.contains(edge.from)));
      } else {
        prop_assert!(!d.escort);
      }
      prop_assert!(d.companions.iter().all(|c| data.vessels[net.departure(*c).vessel].is_icebreaker));
    }
    for (i, l) in net.locations.iter().enumerate() {
      prop_assert_eq!(net.find_location(l.vessel, l.port, l.time), Some(LocationIdx::new(i)));
      for d in &l.outputs {
        let d = net.departure(*d);
        prop_assert_eq!((d.vessel, data.edges[d.edge].from, d.time), (l.vessel, l.port, l.time));
      }
      for d in &l.inputs {
        let d = net.departure(*d);
        prop_assert_eq!((d.vessel, data.edges[d.edge].to, d.arrival()), (l.vessel, l.port, l.time));
      }
    }
  }

  #[test]
  fn build_is_deterministic(
    lengths in proptest::collection::vec(20.0f64..300.0, 1..4),
    severities in proptest::collection::vec(5.0f64..25.0, 4),
    horizon in 4u32..30,
    classes in proptest::collection::vec(0usize..4, 1..4),
  ) {
    let data = scenario(&lengths, &severities, horizon, 1, &classes, &[0, 1, 2, 3]);
    let a = Network::build(&data).unwrap();
    let b = Network::build(&data).unwrap();
    prop_assert_eq!(&a.departures, &b.departures);
    prop_assert_eq!(&a.locations, &b.locations);
    prop_assert_eq!(&a.slots, &b.slots);
  }
}
