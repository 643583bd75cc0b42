//! Action dispatch
//!
//! Turns an action and direction into one atomic batch of window-number
//! queries and hands the snapshot to the edge detector.

use rmpv::Value;
use tracing::debug;

use nvedge_protocol::Call;
use nvedge_utils::{NavError, Result};

use crate::client::Session;
use crate::edge;
use crate::nav::{Action, Direction, Outcome, WindowNumber};

/// A window-number question for the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Number of the focused window
    CurrentWindow,
    /// Number of the window `winnr()` reports in a direction
    WindowInDirection(Direction),
}

impl Query {
    pub fn to_call(self) -> Call {
        match self {
            Self::CurrentWindow => Call::new("nvim_win_get_number", vec![Value::from(0)]),
            Self::WindowInDirection(dir) => Call::new(
                "nvim_eval",
                vec![Value::from(format!("winnr('{}')", dir.key()))],
            ),
        }
    }
}

/// Queries needed to decide `action` towards `direction`
///
/// The current window always comes first.
pub fn queries(action: Action, direction: Direction) -> Vec<Query> {
    match action {
        Action::Move => vec![Query::CurrentWindow, Query::WindowInDirection(direction)],
        Action::Resize => {
            let [a, b] = direction.axis().directions();
            vec![
                Query::CurrentWindow,
                Query::WindowInDirection(a),
                Query::WindowInDirection(b),
            ]
        }
    }
}

/// Decide whether `action` towards `direction` stays inside the editor
pub async fn dispatch(session: &mut Session, action: Action, direction: Direction) -> Result<Outcome> {
    let calls: Vec<Call> = queries(action, direction)
        .into_iter()
        .map(Query::to_call)
        .collect();

    let values = session.call_atomic(&calls).await?;
    let windows = values
        .iter()
        .enumerate()
        .map(|(index, value)| WindowNumber::from_value(index, value))
        .collect::<Result<Vec<_>>>()?;

    let outcome = match (action, windows.as_slice()) {
        (Action::Move, &[current, candidate]) => edge::move_outcome(current, candidate),
        (Action::Resize, &[current, a, b]) => edge::resize_outcome(current, [a, b]),
        _ => {
            return Err(NavError::internal(format!(
                "{} produced {} window numbers",
                action,
                windows.len()
            )))
        }
    };

    debug!(%action, %direction, ?windows, ?outcome, "navigation decided");
    Ok(outcome)
}
