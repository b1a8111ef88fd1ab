#![forbid(unsafe_code)]

//! termapi-probe binary entry point.

use std::io;
use std::process;

use termapi::{MessageKind, MessagePrinter};
use termapi_probe::cli::{self, Command, Opts};
use tracing_subscriber::EnvFilter;

fn init_logging(opts: &Opts) {
    let filter = match (&opts.log_filter, opts.verbose) {
        (Some(spec), _) => EnvFilter::new(spec),
        (None, true) => EnvFilter::new("debug"),
        (None, false) => return,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() {
    let opts = match Opts::parse() {
        Ok(Command::Run(opts)) => opts,
        Ok(Command::Help) => {
            println!("{}", cli::HELP_TEXT);
            return;
        }
        Ok(Command::Version) => {
            println!("termapi-probe {}", cli::VERSION);
            return;
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Run with --help for usage information.");
            process::exit(1);
        }
    };

    init_logging(&opts);
    let printer = MessagePrinter::new().with_color(opts.color);

    match run(&opts, &printer) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            let _ = printer.write_line(&mut io::stderr(), MessageKind::Error, &e);
            process::exit(1);
        }
    }
}

#[cfg(unix)]
fn run(opts: &Opts, printer: &MessagePrinter) -> termapi::Result<bool> {
    let mut terminal = termapi::TerminalQuery::open(opts.config)?;
    let mut report = io::stdout();
    Ok(termapi_probe::probe(
        terminal.query_mut(),
        opts.attributes,
        printer,
        &mut report,
    )?)
}

#[cfg(not(unix))]
fn run(_opts: &Opts, _printer: &MessagePrinter) -> termapi::Result<bool> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "no terminal input channel is available on this platform",
    )
    .into())
}
