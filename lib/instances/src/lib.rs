pub use anyhow::Result;

use std::fmt;
use fnv::{FnvHashMap as Map, FnvHashSet as Set};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    UnkownInstanceName,
    IndexOutOfRange,
    UnknownPort(i64),
    DuplicateId(&'static str, i64),
    GridShape { lon: (usize, usize), lat: (usize, usize), severity: (usize, usize) },
    NoIceSnapshot,
    MissingField(&'static str),
}


impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for Error {}


pub mod config;
pub mod dataset;
pub mod raw;
pub mod rules;
pub mod snapshot;

mod parsers;

pub use config::{ScenarioConfig, ConfigError, Tick};
pub use parsers::{parse_scenario, ParseInstance, JsonFmt};
