//! CLI argument parsing
//!
//! Multiplexer configs call the tool Go-style (`-addr`, `-dir`), so single
//! dash long flags are rewritten to their `--` form before clap sees them.

use std::ffi::OsString;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::nav::{Action, Direction};

/// Long flags that may be spelled with a single dash
const LONG_FLAGS: &[&str] = &["addr", "dir", "action", "timeout", "check-addr", "help", "version"];

/// Ask a running neovim whether a pane move or resize stays inside it
///
/// Exits 0 when neovim has a window in that direction, 1 when focus is
/// already at the edge, and 2 on any error.
#[derive(Parser, Debug)]
#[command(name = "nvedge")]
#[command(version)]
pub struct Cli {
    /// Address neovim is listening on (socket path, unix://path, host:port
    /// or tcp://host:port)
    #[arg(long, env = "NVEDGE_ADDR")]
    pub addr: String,

    /// h, j, k, or l: direction to move in neovim
    #[arg(long, value_parser = parse_direction)]
    pub dir: Direction,

    /// move or resize
    #[arg(long, value_parser = parse_action)]
    pub action: Action,

    /// Deadline for the whole query, with a unit (25ms, 1.5s, 2m, 1h); 0
    /// means no bound
    #[arg(long, value_parser = parse_timeout, default_value = "0")]
    pub timeout: Duration,

    /// Fail fast if the socket path does not exist
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub check_addr: bool,
}

/// Rewrite `-flag` and `-flag=value` to `--flag` forms
///
/// Arguments after a bare `--` and unknown single-dash words are left as is.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;

    for (i, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();
        if i == 0 || passthrough {
            out.push(arg);
            continue;
        }

        let rewritten = arg.to_str().and_then(|s| {
            if s == "--" {
                return None;
            }
            let rest = s.strip_prefix('-')?;
            if rest.starts_with('-') {
                return None;
            }
            let name = rest.split('=').next().unwrap_or(rest);
            LONG_FLAGS.contains(&name).then(|| format!("-{}", s))
        });

        if arg == "--" {
            passthrough = true;
        }
        out.push(rewritten.map(OsString::from).unwrap_or(arg));
    }

    out
}

fn parse_direction(raw: &str) -> Result<Direction, String> {
    raw.parse()
}

fn parse_action(raw: &str) -> Result<Action, String> {
    raw.parse()
}

/// Longest accepted timeout, the range of a Go `time.Duration`
const MAX_TIMEOUT: Duration = Duration::from_nanos(i64::MAX as u64);

/// Parse a duration such as `25ms`, `1.5s`, `2m` or `1h`
///
/// A unit is required for anything but `0`.
pub fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("empty duration".into());
    }
    if value.starts_with('-') {
        return Err(format!("timeout must be >= 0, got {:?}", raw));
    }

    let (number, millis_per_unit) = if let Some(stripped) = value.strip_suffix("ms") {
        (stripped, 1.0)
    } else if let Some(stripped) = value.strip_suffix('s') {
        (stripped, 1_000.0)
    } else if let Some(stripped) = value.strip_suffix('m') {
        (stripped, 60_000.0)
    } else if let Some(stripped) = value.strip_suffix('h') {
        (stripped, 3_600_000.0)
    } else if value == "0" {
        return Ok(Duration::ZERO);
    } else {
        return Err(format!("missing unit in duration {:?}", raw));
    };

    let number: f64 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration {:?}", raw))?;
    if !number.is_finite() || number < 0.0 {
        return Err(format!("invalid duration {:?}", raw));
    }

    let timeout = Duration::try_from_secs_f64(number * millis_per_unit / 1_000.0)
        .map_err(|_| format!("duration out of range {:?}", raw))?;
    if timeout > MAX_TIMEOUT {
        return Err(format!("duration out of range {:?}", raw));
    }
    Ok(timeout)
}
