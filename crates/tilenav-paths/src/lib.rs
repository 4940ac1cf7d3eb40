//! Cost-aware path planning over traversal grids.
//!
//! This crate turns a [`TraversalGrid`](tilenav_core::TraversalGrid) plus a
//! [`CostModel`] into walkable routes:
//!
//! - **Costs** — [`CostModel`] holds per-class overrides and a
//!   [`CostMode`] toggle between uniform and weighted traversal.
//! - **Search** — [`SearchField`] runs A* over any [`Pather`], with a
//!   reusable node arena so repeated queries incur no allocations after
//!   warm-up, and deterministic FIFO tie-breaking among equal-cost
//!   frontier nodes.
//! - **Planning** — [`Planner::plan`] validates a request synchronously,
//!   then resolves it asynchronously through a [`PlanTicket`]: exactly one
//!   [`PlanOutcome`] per request, with [`PlanOutcome::NotFound`] as a
//!   valid negative result rather than an error.
//!
//! Every planning call operates on its own grid/cost snapshot, so any
//! number of requests may be in flight concurrently.

mod cost;
mod distance;
mod path;
mod pather;
mod planner;
mod search;

pub use cost::{CostError, CostMode, CostModel, CostSnapshot, DEFAULT_COST};
pub use distance::{chebyshev, manhattan};
pub use path::Path;
pub use pather::{GridPather, MoveRule, Pather};
pub use planner::{CancelToken, PlanError, PlanOutcome, PlanRequest, PlanTicket, Planner};
pub use search::SearchField;
