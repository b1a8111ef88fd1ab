#![forbid(unsafe_code)]

//! Command-line argument parsing for the probe.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! `TERMAPI_*` environment variables set defaults; flags override them.

use std::env;
use std::fmt;
use std::time::Duration;

use termapi::core::query::QueryEnv;
use termapi::{OriginMode, QueryConfig};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
termapi-probe: ask the terminal where the cursor is

USAGE:
    termapi-probe [OPTIONS]

OPTIONS:
    --zero-origin          Report (0, 0) for the top-left cell (default: (1, 1))
    --timeout-cycles=N     Empty polls before giving up (default: 256)
    --poll-ms=N            Sleep between empty polls, in ms (default: 1)
    --attributes           Query primary device attributes instead
    --no-color             Print message tags without color
    --verbose, -v          Log the exchange to stderr
    --help, -h             Show this help message
    --version, -V          Show version

ENVIRONMENT VARIABLES:
    TERMAPI_QUERY_TIMEOUT_CYCLES   Default for --timeout-cycles
    TERMAPI_QUERY_POLL_MS          Default for --poll-ms
    TERMAPI_CURSOR_ORIGIN          0|zero or 1|one
    TERMAPI_LOG                    Log filter (e.g. debug); implies logging
    NO_COLOR                       Disable colored tags";

/// What the probe should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

/// Parsed options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub config: QueryConfig,
    /// Query device attributes instead of the cursor position.
    pub attributes: bool,
    pub color: bool,
    pub verbose: bool,
    /// Log filter from `TERMAPI_LOG`.
    pub log_filter: Option<String>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            config: QueryConfig::default(),
            attributes: false,
            color: true,
            verbose: false,
            log_filter: None,
        }
    }
}

/// Environment consulted for defaults.
#[derive(Debug, Clone, Default)]
pub struct ProbeEnv {
    pub query: QueryEnv,
    pub log: Option<String>,
    pub no_color: bool,
}

impl ProbeEnv {
    pub fn from_env() -> Self {
        Self {
            query: QueryEnv::from_env(),
            log: env::var("TERMAPI_LOG").ok().filter(|v| !v.is_empty()),
            no_color: env::var("NO_COLOR").is_ok(),
        }
    }
}

/// Rejected command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse process arguments and environment.
    pub fn parse() -> Result<Command, CliError> {
        parse_from(env::args().skip(1), &ProbeEnv::from_env())
    }
}

fn parse_number(flag: &'static str, value: &str) -> Result<u32, CliError> {
    value.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}

/// Parse `args` (without the program name) over defaults taken from `env`.
pub fn parse_from<I, S>(args: I, env: &ProbeEnv) -> Result<Command, CliError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut opts = Opts {
        config: QueryConfig::from_inputs(&env.query),
        color: !env.no_color,
        log_filter: env.log.clone(),
        ..Opts::default()
    };

    for arg in args {
        match arg.as_ref() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--zero-origin" => opts.config.set_origin_mode(OriginMode::ZeroBased),
            "--attributes" => opts.attributes = true,
            "--no-color" => opts.color = false,
            "--verbose" | "-v" => opts.verbose = true,
            other => {
                if let Some(val) = other.strip_prefix("--timeout-cycles=") {
                    let n = parse_number("--timeout-cycles", val)?;
                    opts.config = opts.config.with_timeout_cycles(n);
                } else if let Some(val) = other.strip_prefix("--poll-ms=") {
                    let ms = parse_number("--poll-ms", val)?;
                    opts.config = opts
                        .config
                        .with_poll_interval(Duration::from_millis(u64::from(ms)));
                } else {
                    return Err(CliError::UnknownArgument(other.to_string()));
                }
            }
        }
    }

    Ok(Command::Run(opts))
}
