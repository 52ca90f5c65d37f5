use chrono::NaiveDate;
use super::{nom_prelude::*, common::*};

fn label<'a, E>(input: &'a str) -> IResult<&'a str, (u32, u32, i32), E>
  where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
  map(
    tuple((
      u32_,
      char('-'),
      alt((month_abbrev, u32_)),
      char('-'),
      i32_,
    )),
    |(day, _, month, _, year)| (day, month, year)
  )(input)
}

/// Parses a snapshot label of the form `DD-Mon-YYYY` (e.g. `03-Mar-2020`) or `DD-MM-YYYY`.
/// Returns `None` for anything else, including impossible calendar dates.
pub fn parse_snapshot_label(s: &str) -> Option<NaiveDate> {
  let (_, (d, m, y)) = all_consuming(label::<error::Error<&str>>)(s.trim()).finish().ok()?;
  NaiveDate::from_ymd_opt(y, m, d)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn both_label_styles() {
    assert_eq!(parse_snapshot_label("03-Mar-2020"), Some(NaiveDate::from_ymd(2020, 3, 3)));
    assert_eq!(parse_snapshot_label("27-feb-2022"), Some(NaiveDate::from_ymd(2022, 2, 27)));
    assert_eq!(parse_snapshot_label("10-06-2021"), Some(NaiveDate::from_ymd(2021, 6, 10)));
    assert_eq!(parse_snapshot_label(" 01-Sep-2020 "), Some(NaiveDate::from_ymd(2020, 9, 1)));
  }

  #[test]
  fn rejects_garbage() {
    assert_eq!(parse_snapshot_label("lon"), None);
    assert_eq!(parse_snapshot_label("31-Feb-2020"), None);
    assert_eq!(parse_snapshot_label("03-Mrz-2020"), None);
    assert_eq!(parse_snapshot_label("03-Mar-2020x"), None);
    assert_eq!(parse_snapshot_label("2020-03-03"), None);
  }
}
