//! Deadline and cancellation handling
//!
//! The editor RPC has no way to abort a call in flight. The supervisor runs
//! the navigation task on its own tokio task and races it against the
//! cancel signal; if the signal wins, the task is left running and its
//! result is discarded. Process exit tears down the connection under it.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use nvedge_utils::{NavError, Result};

/// A point in time the whole run must finish by
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Deadline `budget` from now
    pub fn after(budget: Duration) -> Result<Self> {
        let at = Instant::now()
            .checked_add(budget)
            .ok_or_else(|| NavError::usage(format!("timeout {:?} is too large", budget)))?;
        Ok(Self { at, budget })
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    /// The budget this deadline was created with, for error reports
    pub fn millis(&self) -> u64 {
        u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Fires on the deadline or on Ctrl-C, whichever comes first
#[derive(Debug, Clone, Copy)]
pub struct CancelSignal {
    deadline: Option<Deadline>,
}

impl CancelSignal {
    pub fn new(deadline: Option<Deadline>) -> Self {
        Self { deadline }
    }

    /// Resolves with the error to report once the signal fires
    pub async fn fired(self) -> NavError {
        let deadline = async move {
            match self.deadline {
                Some(deadline) => {
                    sleep_until(deadline.at()).await;
                    NavError::DeadlineExceeded {
                        millis: deadline.millis(),
                    }
                }
                None => std::future::pending().await,
            }
        };

        let interrupt = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => NavError::Cancelled,
                Err(e) => {
                    warn!("cannot listen for interrupts: {}", e);
                    std::future::pending().await
                }
            }
        };

        tokio::select! {
            err = deadline => err,
            err = interrupt => err,
        }
    }
}

/// Run `task` on its own tokio task until it finishes or `cancel` fires
///
/// A task that has already finished wins a tie with the signal.
pub async fn supervise<T, F, C>(task: F, cancel: C) -> Result<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T>> + Send + 'static,
    C: Future<Output = NavError>,
{
    let mut handle = tokio::spawn(task);

    tokio::select! {
        biased;

        joined = &mut handle => match joined {
            Ok(result) => result,
            Err(e) => Err(NavError::internal(format!("navigation task failed: {}", e))),
        },
        err = cancel => {
            debug!("abandoning in-flight navigation task: {}", err);
            Err(err)
        }
    }
}
