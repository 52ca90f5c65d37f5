//! Writes a [`MipModel`] in CPLEX LP format, which Gurobi, CPLEX, HiGHS and CBC all read.
use std::io::{self, Write};
use std::path::Path;
use anyhow::Context;
use super::*;

const TERMS_PER_LINE: usize = 8;

fn write_terms(mut w: impl Write, terms: impl Iterator<Item=(String, f64)>) -> io::Result<bool> {
  let mut written = 0usize;
  for (name, coef) in terms {
    if coef == 0.0 { continue }
    if written > 0 && written % TERMS_PER_LINE == 0 {
      write!(w, "\n   ")?;
    }
    let sign = if coef < 0.0 { '-' } else { '+' };
    write!(w, " {} {} {}", sign, coef.abs(), name)?;
    written += 1;
  }
  Ok(written > 0)
}

pub fn write_lp(model: &MipModel, mut w: impl Write) -> io::Result<()> {
  writeln!(w, "\\ icenet: {} variables, {} constraints", model.vars.len(), model.constraints.len())?;
  writeln!(w, "Minimize")?;
  write!(w, " obj:")?;
  let any = write_terms(&mut w, model.vars.iter().map(|v| (v.name.clone(), v.cost)))?;
  if !any {
    if let Some(v) = model.vars.first() {
      write!(w, " 0 {}", v.name)?;
    }
  }
  writeln!(w)?;

  writeln!(w, "Subject To")?;
  for c in &model.constraints {
    write!(w, " {}:", c.name)?;
    let any = write_terms(&mut w, c.expr.iter().map(|&(v, coef)| (model.vars[v.index()].name.clone(), coef)))?;
    if !any {
      if let Some(v) = model.vars.first() {
        write!(w, " 0 {}", v.name)?;
      }
    }
    writeln!(w, " {} {}", c.sense, c.rhs)?;
  }

  writeln!(w, "Binaries")?;
  for chunk in model.vars.chunks(TERMS_PER_LINE * 2) {
    let names: Vec<&str> = chunk.iter().map(|v| v.name.as_str()).collect();
    writeln!(w, " {}", names.join(" "))?;
  }
  writeln!(w, "End")?;
  Ok(())
}

pub fn write_lp_file(model: &MipModel, path: impl AsRef<Path>) -> anyhow::Result<()> {
  let path = path.as_ref();
  let file = std::fs::File::create(path).with_context(|| format!("create LP file {:?}", path))?;
  let mut w = io::BufWriter::new(file);
  write_lp(model, &mut w).with_context(|| format!("write LP file {:?}", path))?;
  w.flush()?;
  Ok(())
}
