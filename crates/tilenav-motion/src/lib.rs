//! **tilenav-motion** — timed, interruptible movement along planned paths.
//!
//! [`PathExecutor`] turns a [`Path`](tilenav_paths::Path) into a per-segment
//! animation plan: the agent's continuous position advances from each
//! waypoint to the next over a fixed step duration, driven by cooperative
//! [`tick`](PathExecutor::tick) calls. Runs can be cancelled mid-segment,
//! and a new `begin` always supersedes the active run.

mod executor;

pub use executor::{AgentState, MoveEvent, MoveState, PathExecutor, Position, RunHandle};
