use std::fmt::Display;
use std::str::FromStr;
use std::path::PathBuf;
use std::io;
use anyhow::{Context, Result};
use structopt::StructOpt;

#[derive(Clone, Debug, StructOpt)]
pub struct OutputOptions {
  /// `json` writes the full schedule, `json-summ` only counts
  #[structopt(long="format", short="f", parse(try_from_str), default_value="json-summ", possible_values=&OUTPUT_FORMAT_STRINGS)]
  pub fmt: OutputFormat,
  /// Write to this file instead of stdout
  #[structopt(long="output", short="o")]
  pub file: Option<PathBuf>,
  /// Also log to this file, as JSON lines
  #[structopt(long)]
  pub log: Option<PathBuf>,
}

pub fn clap_range_validator<T>(minval: Option<T>, maxval: Option<T>) -> impl Fn(String) -> Result<(), String>
    where
        T: FromStr + PartialOrd + Display + Copy,
        T::Err: Display
{
    return move |val| {
        let x: T = val.parse().map_err(|e: T::Err| e.to_string())?;
        if let Some(y) = minval {
            if x < y { return Err(format!("must be at least {}", y)); }
        }
        if let Some(y) = maxval {
            if x > y { return Err(format!("must be at most {}", y)); }
        }
        return Ok(());
    };
}

pub const OUTPUT_FORMAT_STRINGS: [&str; 2] = ["json", "json-summ"];

#[derive(Debug, Copy, Clone)]
pub enum OutputFormat {
    Json,
    JsonSummary,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "json" => Ok(Self::Json),
            "json-summ" => Ok(Self::JsonSummary),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}

impl Default for OutputFormat {
  fn default() -> Self { OutputFormat::JsonSummary }
}

pub trait RunOutput {
    fn write_json(&self, buf: impl io::Write) -> Result<()>;
    fn write_json_summary(&self, buf: impl io::Write) -> Result<()>;

    fn write(&self, buf: impl io::Write, output: OutputFormat) -> Result<()> {
        match output {
            OutputFormat::JsonSummary => self.write_json_summary(buf)?,
            OutputFormat::Json => self.write_json(buf)?,
        };
        Ok(())
    }
}

pub fn write_output(options: &OutputOptions, run: &impl RunOutput) -> Result<()> {
    match options.file.as_ref() {
        Some(path) => {
            let file = std::fs::File::create(path).with_context(|| format!("create output file {:?}", path))?;
            let mut writer = io::BufWriter::new(file);
            run.write(&mut writer, options.fmt)?;
            io::Write::flush(&mut writer)?;
        }
        None => {
            run.write(io::stdout(), options.fmt)?;
        }
    }
    Ok(())
}
