mod command;
mod date;
mod output;
mod query;
mod store;

use clap::Parser;
use output::Format;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use store::Database;

#[derive(Parser)]
#[command(
    name = "diaryq",
    version,
    about = "Keep a date-keyed event diary and query it with conditions"
)]
struct Cli {
    #[arg(long, env = "DIARYQ_INPUT", help = "Read commands from a file instead of stdin")]
    input: Option<PathBuf>,

    #[arg(
        long,
        value_enum,
        env = "DIARYQ_FORMAT",
        default_value_t = Format::Text,
        help = "Output format for command results"
    )]
    format: Format,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv, -vvv)")]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let reader: Box<dyn BufRead> = match &cli.input {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error: cannot open {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    ExitCode::from(run_session(reader, cli.format, &mut out))
}

/// Runs every command line against a fresh diary.
///
/// Returns 0 on success, 1 when any line failed, 2 on I/O errors.
fn run_session(reader: impl BufRead, format: Format, out: &mut impl Write) -> u8 {
    let mut db = Database::new();
    let mut failed = false;

    for (index, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error: failed to read input: {}", e);
                return 2;
            }
        };

        let command = match command::parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("line {}: {}", index + 1, e);
                failed = true;
                continue;
            }
        };

        log::debug!("line {}: {:?}", index + 1, command);
        let outcome = command.execute(&mut db);

        if let Err(e) = output::render(&outcome, &db, format, out) {
            eprintln!("Error: {}", e);
            return 2;
        }
    }

    if db.is_empty() {
        log::info!("session finished, diary is empty");
    } else {
        log::info!("session finished with {} entries", db.len());
    }

    if failed {
        1
    } else {
        0
    }
}

fn init_logging(verbose: u8) {
    use log::LevelFilter;

    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args()))
        .init();
}
