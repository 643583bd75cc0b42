//! Run configuration
//!
//! Built once from the parsed command line and passed by reference.

use std::time::Duration;

use nvedge_utils::Result;

use crate::cli::Cli;
use crate::client::Endpoint;
use crate::nav::{Action, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Endpoint,
    pub direction: Direction,
    pub action: Action,
    /// Bound on dial plus query; `None` when unset or zero
    pub timeout: Option<Duration>,
    /// Stat the socket before dialing
    pub check_addr: bool,
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        Ok(Self {
            endpoint: cli.addr.parse()?,
            direction: cli.dir,
            action: cli.action,
            timeout: Some(cli.timeout).filter(|t| !t.is_zero()),
            check_addr: cli.check_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cli(addr: &str, timeout: Duration) -> Cli {
        Cli {
            addr: addr.into(),
            dir: Direction::Left,
            action: Action::Resize,
            timeout,
            check_addr: true,
        }
    }

    #[test]
    fn test_from_cli() {
        let config = Config::from_cli(cli("/tmp/nvim.sock", Duration::from_millis(25))).unwrap();
        assert_eq!(
            config,
            Config {
                endpoint: Endpoint::Unix(PathBuf::from("/tmp/nvim.sock")),
                direction: Direction::Left,
                action: Action::Resize,
                timeout: Some(Duration::from_millis(25)),
                check_addr: true,
            }
        );
    }

    #[test]
    fn test_zero_timeout_means_unbounded() {
        let config = Config::from_cli(cli("127.0.0.1:6666", Duration::ZERO)).unwrap();
        assert_eq!(config.timeout, None);
        assert_eq!(config.endpoint, Endpoint::Tcp("127.0.0.1:6666".into()));
    }

    #[test]
    fn test_bad_address_is_rejected() {
        assert!(Config::from_cli(cli("tcp://host-without-port", Duration::ZERO)).is_err());
        assert!(Config::from_cli(cli("", Duration::ZERO)).is_err());
    }
}
