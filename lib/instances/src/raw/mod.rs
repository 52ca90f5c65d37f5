pub mod nsr;
use std::borrow::Cow;

pub trait FromRaw<T> where Self: Sized {
  fn from_raw(raw: T, id: Cow<str>) -> crate::Result<Self>;
}


pub mod metrics {
  use num_traits::{AsPrimitive, Num};

  pub trait Metric {
    const SYM: bool = false;

    /// Distance between two points given as `(latitude, longitude)` in degrees.
    fn compute<T: Num + AsPrimitive<f64>>(p1: (T, T), p2: (T, T)) -> f64;
  }

  /// Great-circle distance in kilometres on a sphere whose meridian is 20 000 km long.
  pub struct Spherical();

  impl Metric for Spherical {
    const SYM: bool = true;

    fn compute<T: Num + AsPrimitive<f64>>(p1: (T, T), p2: (T, T)) -> f64 {
      let (lat1, lon1) = (p1.0.as_().to_radians(), p1.1.as_().to_radians());
      let (lat2, lon2) = (p2.0.as_().to_radians(), p2.1.as_().to_radians());
      let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon2 - lon1).cos();
      // rounding can push the cosine slightly outside [-1, 1] for (nearly) identical points
      cos_angle.max(-1.0).min(1.0).acos() * 20_000.0 / std::f64::consts::PI
    }
  }

}
