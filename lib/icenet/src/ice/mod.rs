use ndarray::Array2;
use instances::raw::metrics::{Metric, Spherical};
use crate::data::IceSnapshot;

pub mod port_graph;
pub use port_graph::{PortGraph, PortGraphReport, EdgeConditions, derive_edge_conditions};

/// Cells with a severity at or below this value cannot be entered.
pub const AV_INTEGRAL_ICE: f64 = 9.5;
/// Largest square radius searched when attaching a port to the grid. The search gives up once
/// the radius has gone past 12, so 13 is still tried.
pub const MAX_NEIGHBOUR_RADIUS: usize = 13;

pub type Cell = (usize, usize);

/// Great-circle distance in kilometres between two `(latitude, longitude)` points.
#[inline]
pub fn spherical_distance(p1: (f64, f64), p2: (f64, f64)) -> f64 {
  Spherical::compute(p1, p2)
}

/// Ice severity samples on a raster, with coordinates for every cell.
#[derive(Debug, Clone)]
pub struct IceGrid {
  lat: Array2<f64>,
  lon: Array2<f64>,
  severity: Array2<f64>,
}

impl IceGrid {
  /// All three arrays must have the same shape.
  pub fn new(lat: Array2<f64>, lon: Array2<f64>, severity: Array2<f64>) -> Self {
    assert_eq!(lat.dim(), lon.dim());
    assert_eq!(lat.dim(), severity.dim());
    IceGrid { lat, lon, severity }
  }

  pub fn from_snapshot(snapshot: &IceSnapshot) -> Self {
    IceGrid::new(snapshot.lat.clone(), snapshot.lon.clone(), snapshot.severity.clone())
  }

  #[inline]
  pub fn dim(&self) -> (usize, usize) { self.severity.dim() }

  #[inline]
  pub fn num_cells(&self) -> usize {
    let (r, c) = self.dim();
    r * c
  }

  #[inline]
  pub fn severity(&self, (r, c): Cell) -> f64 { self.severity[[r, c]] }

  #[inline]
  pub fn coords(&self, (r, c): Cell) -> (f64, f64) { (self.lat[[r, c]], self.lon[[r, c]]) }

  #[inline]
  pub fn is_passable(&self, cell: Cell) -> bool {
    self.severity(cell) > AV_INTEGRAL_ICE
  }

  /// Passable cells within Chebyshev distance `radius` of `(row, col)`, in row-major order.
  /// The cell itself and anything outside the grid are left out.
  pub fn neighbors(&self, radius: usize, row: usize, col: usize) -> Vec<Cell> {
    let (nrows, ncols) = self.dim();
    let r0 = row.saturating_sub(radius);
    let r1 = (row + radius).min(nrows.saturating_sub(1));
    let c0 = col.saturating_sub(radius);
    let c1 = (col + radius).min(ncols.saturating_sub(1));
    let mut cells = Vec::new();
    if nrows == 0 || ncols == 0 {
      return cells;
    }
    for r in r0..=r1 {
      for c in c0..=c1 {
        if (r, c) != (row, col) && self.is_passable((r, c)) {
          cells.push((r, c));
        }
      }
    }
    cells
  }

  /// The cell whose centre lies closest to `(lat, lon)`, passable or not.
  pub fn nearest_cell(&self, lat: f64, lon: f64) -> Option<Cell> {
    let mut best: Option<(f64, Cell)> = None;
    for ((r, c), &cell_lat) in self.lat.indexed_iter() {
      let d = spherical_distance((lat, lon), (cell_lat, self.lon[[r, c]]));
      if best.map_or(true, |(bd, _)| d < bd) {
        best = Some((d, (r, c)));
      }
    }
    best.map(|(_, cell)| cell)
  }

  /// Grows the radius around `cell` until some passable neighbour turns up, giving up beyond
  /// [`MAX_NEIGHBOUR_RADIUS`].
  pub fn neighbors_within_cap(&self, cell: Cell) -> Option<(usize, Vec<Cell>)> {
    (1..=MAX_NEIGHBOUR_RADIUS)
      .map(|radius| (radius, self.neighbors(radius, cell.0, cell.1)))
      .find(|(_, cells)| !cells.is_empty())
  }
}
