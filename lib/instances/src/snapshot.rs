use chrono::NaiveDate;
use ndarray::Array2;
use tracing::{debug, warn};
use crate::Error;
use crate::parsers::parse_snapshot_label;
use crate::raw::nsr::RawIceGrid;

/// Picks the label whose date equals `date`, else the latest one dated before it, else the
/// earliest one. Labels which do not parse as dates are skipped.
pub fn choose_snapshot<'a>(labels: impl IntoIterator<Item=&'a str>, date: NaiveDate) -> Option<&'a str> {
  let mut dated: Vec<(NaiveDate, &str)> = labels.into_iter()
    .filter_map(|l| match parse_snapshot_label(l) {
      Some(d) => Some((d, l)),
      None => {
        debug!(label=l, "skip unparseable snapshot label");
        None
      }
    })
    .collect();
  dated.sort();

  let prior = dated.iter().rev().find(|(d, _)| *d <= date);
  match prior.or_else(|| dated.first()) {
    Some(&(d, l)) => {
      if d > date {
        warn!(label=l, %date, "no ice snapshot on or before planning start, using the earliest one");
      }
      Some(l)
    }
    None => None,
  }
}

impl RawIceGrid {
  pub fn snapshot_for(&self, date: NaiveDate) -> Result<(&str, &Array2<f64>), Error> {
    let label = choose_snapshot(self.snapshots.keys().map(String::as_str), date)
      .ok_or(Error::NoIceSnapshot)?;
    Ok((label, &self.snapshots[label]))
  }

  pub fn check_shape(&self) -> Result<(), Error> {
    let shape = |a: &Array2<f64>| a.dim();
    for severity in self.snapshots.values() {
      if shape(severity) != shape(&self.lon) || shape(&self.lat) != shape(&self.lon) {
        return Err(Error::GridShape {
          lon: shape(&self.lon),
          lat: shape(&self.lat),
          severity: shape(severity),
        });
      }
    }
    Ok(())
  }
}
