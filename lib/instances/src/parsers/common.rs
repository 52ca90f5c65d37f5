use super::nom_prelude::*;

pub fn u32_<'a, E>(input: &'a str) -> IResult<&'a str, u32, E>
  where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
  map_res(digit1, u32::from_str)(input)
}

pub fn i32_<'a, E>(input: &'a str) -> IResult<&'a str, i32, E>
  where
    E: ParseError<&'a str> + FromExternalError<&'a str, ParseIntError>
{
  map_res(
    recognize(
      pair(
        opt(char('-')),
        digit1
      )
    ), i32::from_str)(input)
}

/// English three-letter month abbreviation, case-insensitive.
pub fn month_abbrev<'a, E>(input: &'a str) -> IResult<&'a str, u32, E>
  where
    E: ParseError<&'a str>
{
  const MONTHS: [&str; 12] = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"];
  let (rest, word) = alpha1::<&str, E>(input)?;
  let lower = word.to_ascii_lowercase();
  match MONTHS.iter().position(|&m| m == lower) {
    Some(i) => Ok((rest, i as u32 + 1)),
    None => Err(nom::Err::Error(E::from_error_kind(input, error::ErrorKind::Tag))),
  }
}
