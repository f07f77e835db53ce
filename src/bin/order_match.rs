// ============================================================================
// order-match
// Reads orders from stdin, one per line, and prints every match to stdout
// ============================================================================

use clap::{Parser, ValueEnum};
use std::io::{self, BufRead, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;

use order_match::engine::{OrderBook, OrderBookBuilder};
use order_match::interfaces::{format_match, parse_order, LoggingEventHandler};
use order_match::numeric::Price;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Instrument traded by the book
    #[arg(short, long, default_value = "DEFAULT")]
    instrument: String,

    /// Price grid for limit prices and stop triggers, e.g. 0.05
    #[arg(long)]
    tick_size: Option<Price>,

    /// Volume grid
    #[arg(long)]
    lot_size: Option<u64>,

    /// Print matches as JSON objects instead of text lines
    #[arg(long)]
    json: bool,

    /// Diagnostics written to stderr
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(args.log_level))
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("order-match: {err}");
            ExitCode::FAILURE
        },
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder =
        OrderBookBuilder::new(args.instrument.clone()).event_handler(Arc::new(LoggingEventHandler));
    if let Some(tick) = args.tick_size {
        builder = builder.with_tick_size(tick);
    }
    if let Some(lot) = args.lot_size {
        builder = builder.with_lot_size(lot);
    }
    let mut book = builder.build()?;

    let mut out = BufWriter::new(io::stdout().lock());
    process(
        &mut book,
        io::stdin().lock(),
        &mut out,
        &mut io::stderr(),
        args.json,
    )?;
    out.flush()?;
    Ok(())
}

/// Feed every line of `input` to the book and write its matches to `out`.
///
/// Lines that are not UTF-8, do not parse, or are rejected by the book are
/// reported on `diag` and skipped. Read and write failures and engine
/// faults end the run.
fn process(
    book: &mut OrderBook,
    mut input: impl BufRead,
    out: &mut impl Write,
    diag: &mut impl Write,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut buf = Vec::new();
    let mut number = 0usize;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        number += 1;

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(err) => {
                writeln!(diag, "line {number}: {err}")?;
                continue;
            },
        };
        if line.is_empty() {
            continue;
        }

        let order = match parse_order(line) {
            Ok(order) => order,
            Err(err) => {
                writeln!(diag, "line {number}: {err}: {line:?}")?;
                continue;
            },
        };

        let matches = match book.add(order) {
            Ok(matches) => matches,
            Err(err) if err.is_fault() => return Err(err.into()),
            Err(err) => {
                writeln!(diag, "line {number}: {err}")?;
                continue;
            },
        };

        for matched in &matches {
            if json {
                serde_json::to_writer(&mut *out, matched)?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", format_match(matched))?;
            }
        }
    }

    Ok(())
}
