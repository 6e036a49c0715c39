use crate::date::{Date, DateError};
use crate::query::{self, evaluate, Node, ParseError};
use crate::store::{Database, Entry};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add { date: Date, event: String },
    Del(Node),
    Find(Node),
    Last(Date),
    Print,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Added,
    Removed(usize),
    Found(Vec<Entry>),
    Last(Option<Entry>),
    Print,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{command}: unexpected argument '{text}'")]
    UnexpectedArgument { command: &'static str, text: String },
    #[error(transparent)]
    Date(#[from] DateError),
    #[error(transparent)]
    Condition(#[from] ParseError),
}

/// Parses one command line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let (name, rest) = split_word(line.trim_start());

    let command = match name {
        "" => return Ok(None),
        "Add" => {
            let date = parse_date_arg("Add", rest)?;
            let (_, rest) = split_word(rest.trim_start());
            let event = parse_event(rest);
            if event.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "Add",
                    argument: "event",
                });
            }
            Command::Add {
                date,
                event: event.to_string(),
            }
        }
        "Del" => Command::Del(query::parse(rest)?),
        "Find" => Command::Find(query::parse(rest)?),
        "Last" => {
            let date = parse_date_arg("Last", rest)?;
            let (_, rest) = split_word(rest.trim_start());
            expect_no_arguments("Last", rest)?;
            Command::Last(date)
        }
        "Print" => {
            expect_no_arguments("Print", rest)?;
            Command::Print
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

/// Event text is the rest of the line: leading whitespace dropped, trailing kept.
pub fn parse_event(rest: &str) -> &str {
    rest.trim_start()
}

fn parse_date_arg(command: &'static str, rest: &str) -> Result<Date, CommandError> {
    let (text, _) = split_word(rest.trim_start());
    if text.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "date",
        });
    }
    Ok(text.parse()?)
}

fn expect_no_arguments(command: &'static str, rest: &str) -> Result<(), CommandError> {
    let extra = rest.trim();
    if extra.is_empty() {
        Ok(())
    } else {
        Err(CommandError::UnexpectedArgument {
            command,
            text: extra.to_string(),
        })
    }
}

fn split_word(s: &str) -> (&str, &str) {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    s.split_at(end)
}

impl Command {
    pub fn execute(self, db: &mut Database) -> Outcome {
        match self {
            Command::Add { date, event } => {
                db.add(date, &event);
                Outcome::Added
            }
            Command::Del(node) => Outcome::Removed(db.remove_if(|date, event| evaluate(&node, date, event))),
            Command::Find(node) => Outcome::Found(db.find_if(|date, event| evaluate(&node, date, event))),
            Command::Last(date) => match db.last(date) {
                Ok(entry) => Outcome::Last(Some(entry)),
                Err(e) => {
                    log::debug!("{}", e);
                    Outcome::Last(None)
                }
            },
            Command::Print => Outcome::Print,
        }
    }
}
