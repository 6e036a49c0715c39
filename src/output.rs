use crate::command::Outcome;
use crate::store::Database;
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Yaml,
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
    #[error("yaml encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Serialize)]
struct Removed {
    removed: usize,
}

pub fn render<W: Write>(
    outcome: &Outcome,
    db: &Database,
    format: Format,
    out: &mut W,
) -> Result<(), OutputError> {
    match format {
        Format::Text => render_text(outcome, db, out),
        Format::Yaml => render_yaml(outcome, db, out),
    }
}

fn render_text<W: Write>(outcome: &Outcome, db: &Database, out: &mut W) -> Result<(), OutputError> {
    match outcome {
        Outcome::Added => {}
        Outcome::Removed(count) => writeln!(out, "Removed {} entries", count)?,
        Outcome::Found(entries) => {
            for entry in entries {
                writeln!(out, "{}", entry)?;
            }
            writeln!(out, "Found {} entries", entries.len())?;
        }
        Outcome::Last(Some(entry)) => writeln!(out, "{}", entry)?,
        Outcome::Last(None) => writeln!(out, "No entries")?,
        Outcome::Print => db.print(out)?,
    }
    Ok(())
}

fn render_yaml<W: Write>(outcome: &Outcome, db: &Database, out: &mut W) -> Result<(), OutputError> {
    let doc = match outcome {
        Outcome::Added => return Ok(()),
        Outcome::Removed(count) => serde_yaml::to_string(&Removed { removed: *count })?,
        Outcome::Found(entries) => serde_yaml::to_string(entries)?,
        Outcome::Last(entry) => serde_yaml::to_string(entry)?,
        Outcome::Print => serde_yaml::to_string(&db.find_if(|_, _| true))?,
    };
    write!(out, "---\n{}", doc)?;
    Ok(())
}
