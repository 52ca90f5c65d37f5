mod json_fmt;
pub use json_fmt::{JsonFmt, parse_scenario};

mod snapshot_label;
pub use snapshot_label::parse_snapshot_label;


mod nom_prelude {
  pub use nom::{
    IResult,
    error::{
      self,
      ParseError,
      FromExternalError,
    },
    sequence::*,
    branch::alt,
    combinator::*,
    character::complete::*,
    bytes::complete::tag,
    Finish,
  };
  pub use std::str::FromStr;
  pub use std::num::ParseIntError;
}

mod common;

pub trait ParseInstance<Fmt>: Sized {
  fn parse(inputs: Fmt) -> crate::Result<Self>;
}
