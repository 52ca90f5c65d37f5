use std::path::Path;
use anyhow::Result;
use instances::dataset::{Dataset, StdLayout, nsr::{NsrJson, load_scenario_file}};

pub mod nsr;
pub use nsr::*;

pub fn get_instance_from_file(path: impl AsRef<Path>) -> Result<NsrInstance> {
  load_scenario_file(path)
}

/// Loads scenario `name` from a directory holding `INDEX.txt` and `NAME.json` files.
pub fn get_instance_by_name(dir: impl AsRef<Path>, name: &str) -> Result<NsrInstance> {
  StdLayout::<NsrJson>::open(dir)?.load_by_name(name)
}
