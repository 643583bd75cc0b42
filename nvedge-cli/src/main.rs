//! nvedge: pane-edge oracle for terminal multiplexers
//!
//! A multiplexer keybinding runs this against the neovim in the focused
//! pane to learn whether a directional move or resize has somewhere to go
//! inside neovim. Exit status 0 means forward the key to neovim, 1 means
//! neovim is already at the edge, 2 means something went wrong.

mod cli;
mod client;
mod config;
mod dispatch;
mod edge;
mod nav;
mod supervisor;
#[cfg(test)]
mod testing;

use clap::{CommandFactory, Parser};
use tracing::debug;

use nvedge_utils::{init_logging_with_config, ErrorKind, LogConfig, NavError, Result};

use cli::Cli;
use client::{ConnectOptions, Session};
use config::Config;
use nav::Outcome;
use supervisor::{CancelSignal, Deadline};

/// Exit status when focus would stay in the same window
const BLOCKED_EXIT_CODE: i32 = 1;

#[tokio::main]
async fn main() {
    if let Err(e) = init_logging_with_config(LogConfig::client()) {
        eprintln!("nvedge: logging disabled: {}", e);
    }

    let cli = match Cli::try_parse_from(cli::normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            // Usage text for errors, help and version output otherwise
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 2 } else { 0 });
        }
    };

    let result = match Config::from_cli(cli) {
        Ok(config) => run(&config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = &result {
        eprintln!("{}", report(e));
    }
    std::process::exit(exit_code(&result));
}

/// Connect, run one navigation query, and report the outcome
async fn run(config: &Config) -> Result<Outcome> {
    let deadline = config.timeout.map(Deadline::after).transpose()?;
    let options = ConnectOptions {
        deadline,
        check_exists: config.check_addr,
    };

    let mut session = Session::connect(&config.endpoint, options).await?;
    debug!("connected to {}", session.endpoint());

    let (action, direction) = (config.action, config.direction);
    let task = async move { dispatch::dispatch(&mut session, action, direction).await };

    supervisor::supervise(task, CancelSignal::new(deadline).fired()).await
}

/// Text for stderr; usage errors carry the usage line as clap's do
fn report(err: &NavError) -> String {
    match err.kind() {
        ErrorKind::Usage => format!("{}\n\n{}", err, Cli::command().render_usage()),
        _ => err.to_string(),
    }
}

fn exit_code(result: &Result<Outcome>) -> i32 {
    match result {
        Ok(Outcome::Possible) => 0,
        Ok(Outcome::Blocked) => BLOCKED_EXIT_CODE,
        Err(e) => e.exit_code(),
    }
}
