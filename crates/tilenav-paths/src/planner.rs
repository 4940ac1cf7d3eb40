//! The asynchronous planning surface: [`Planner`] and [`PlanTicket`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, warn};
use tilenav_core::{Point, TraversalGrid};

use crate::cost::CostModel;
use crate::path::Path;
use crate::pather::{GridPather, MoveRule};
use crate::search::SearchField;

// ---------------------------------------------------------------------------
// Request / outcome / error
// ---------------------------------------------------------------------------

/// A planning request: where the agent is and where it should go.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanRequest {
    pub start: Point,
    pub goal: Point,
}

impl PlanRequest {
    /// Create a request from start and goal coordinates.
    pub fn new(start: Point, goal: Point) -> Self {
        Self { start, goal }
    }
}

/// The resolution of a planning request.
///
/// `NotFound` is a fully-searched negative result — the frontier emptied
/// before reaching the goal. It is an expected steady-state outcome, not a
/// fault, and callers must branch on it explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanOutcome {
    /// A cost-minimal route, start and goal inclusive.
    Found(Path),
    /// No route connects start to goal under the current blocking state.
    NotFound,
}

/// Rejected planning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Start or goal is out of bounds or blocked. Raised synchronously,
    /// before any search begins; no partial result is produced.
    #[error("invalid endpoint {0}: out of bounds or blocked")]
    InvalidEndpoint(Point),
}

// ---------------------------------------------------------------------------
// CancelToken
// ---------------------------------------------------------------------------

/// A cooperative-cancellation token shared with a running search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// PlanTicket
// ---------------------------------------------------------------------------

/// The caller's handle on one in-flight planning request.
///
/// The ticket resolves exactly once, after the search has fully completed;
/// a successful `Path` and a `NotFound` arrive through the same channel.
#[derive(Debug)]
pub struct PlanTicket {
    rx: Receiver<PlanOutcome>,
    cancel: CancelToken,
    spent: bool,
}

impl PlanTicket {
    /// Non-blocking check for the outcome.
    ///
    /// Returns `None` while the search is still running, and also once the
    /// ticket is spent — after the outcome has been taken, or after a
    /// cancelled search discarded its result.
    pub fn poll(&mut self) -> Option<PlanOutcome> {
        if self.spent {
            return None;
        }
        match self.rx.try_recv() {
            Ok(outcome) => {
                self.spent = true;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.spent = true;
                if self.cancel.is_cancelled() {
                    // The worker honoured the cancellation and discarded.
                    None
                } else {
                    // The worker vanished without reporting; surface the
                    // miss rather than hanging the caller.
                    warn!("planning worker dropped its ticket before resolving");
                    Some(PlanOutcome::NotFound)
                }
            }
        }
    }

    /// Whether the ticket can still produce an outcome.
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    /// Block until the outcome arrives.
    ///
    /// A cancelled request whose result was discarded waits out as
    /// [`PlanOutcome::NotFound`].
    pub fn wait(mut self) -> PlanOutcome {
        if let Some(outcome) = self.poll() {
            return outcome;
        }
        if self.spent {
            return PlanOutcome::NotFound;
        }
        match self.rx.recv() {
            Ok(outcome) => outcome,
            Err(_) => {
                if !self.cancel.is_cancelled() {
                    warn!("planning worker dropped its ticket before resolving");
                }
                PlanOutcome::NotFound
            }
        }
    }

    /// Ask the search to stop early and discard its result.
    ///
    /// Best-effort: the search checks the token between frontier pops, and
    /// a search that has already resolved is unaffected.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Submits planning requests and hands back tickets.
///
/// The planner itself holds only the movement rule. Every request runs on
/// its own thread over its own frozen inputs — the shared grid snapshot
/// behind an `Arc`, a copied cost snapshot, and a private [`SearchField`] —
/// so any number of requests may be in flight concurrently without shared
/// mutable state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planner {
    rule: MoveRule,
}

impl Planner {
    /// A planner using the given movement rule.
    pub fn new(rule: MoveRule) -> Self {
        Self { rule }
    }

    /// The movement rule requests are searched under.
    pub fn rule(&self) -> MoveRule {
        self.rule
    }

    /// Submit a request against the given grid and cost model.
    ///
    /// Endpoint validation happens here, synchronously: an out-of-bounds or
    /// blocked start or goal fails with [`PlanError::InvalidEndpoint`]
    /// before any search is attempted. The cost snapshot is captured here
    /// too, so later model mutation cannot reach the search.
    ///
    /// A request whose start equals its goal resolves immediately with the
    /// single-waypoint path; no search runs and no thread is spawned.
    pub fn plan(
        &self,
        grid: Arc<TraversalGrid>,
        costs: &CostModel,
        request: PlanRequest,
    ) -> Result<PlanTicket, PlanError> {
        for endpoint in [request.start, request.goal] {
            if !grid.is_walkable(endpoint) {
                return Err(PlanError::InvalidEndpoint(endpoint));
            }
        }

        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();
        let ticket = PlanTicket {
            rx,
            cancel: cancel.clone(),
            spent: false,
        };

        if request.start == request.goal {
            debug!("plan {} -> {}: trivial", request.start, request.goal);
            let _ = tx.send(PlanOutcome::Found(Path::from_steps(vec![request.start])));
            return Ok(ticket);
        }

        let snapshot = costs.snapshot();
        let rule = self.rule;
        debug!("plan {} -> {}: searching", request.start, request.goal);

        let spawned = thread::Builder::new()
            .name("tilenav-plan".into())
            .spawn(move || {
                let pather = GridPather::new(&grid, &snapshot, rule);
                let mut field = SearchField::new(grid.width(), grid.height());
                let found =
                    field.find_while(&pather, request.start, request.goal, || !cancel.is_cancelled());

                if cancel.is_cancelled() {
                    debug!(
                        "plan {} -> {}: cancelled, result discarded",
                        request.start, request.goal
                    );
                    return;
                }

                let outcome = match found {
                    Some(path) => {
                        debug!(
                            "plan {} -> {}: found {} waypoints",
                            request.start,
                            request.goal,
                            path.len()
                        );
                        PlanOutcome::Found(path)
                    }
                    None => {
                        warn!("plan {} -> {}: no path", request.start, request.goal);
                        PlanOutcome::NotFound
                    }
                };
                // The caller may have dropped the ticket; that is fine.
                let _ = tx.send(outcome);
            });

        if let Err(err) = spawned {
            // The closure (and its sender) was dropped, so the ticket will
            // resolve as a miss; record why.
            warn!("failed to spawn planning thread: {err}");
        }

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{CostMode, CostModel};
    use tilenav_core::{GridBuilder, MapLayer, TileClass};

    const GRASS: TileClass = TileClass::new(1);
    const TREE: TileClass = TileClass::new(16);

    fn open_grid(width: i32, height: i32) -> Arc<TraversalGrid> {
        Arc::new(TraversalGrid::open(width, height))
    }

    #[test]
    fn resolves_through_the_ticket() {
        let planner = Planner::new(MoveRule::FourWay);
        let grid = open_grid(5, 5);
        let costs = CostModel::new();

        let ticket = planner
            .plan(grid.clone(), &costs, PlanRequest::new(Point::new(0, 0), Point::new(4, 4)))
            .unwrap();
        match ticket.wait() {
            PlanOutcome::Found(path) => {
                assert_eq!(path.len(), 9);
                assert_eq!(path.total_cost(&grid, &costs.snapshot()), 8);
            }
            PlanOutcome::NotFound => panic!("expected a path"),
        }
    }

    #[test]
    fn trivial_request_resolves_without_searching() {
        let planner = Planner::new(MoveRule::FourWay);
        let costs = CostModel::new();

        let mut ticket = planner
            .plan(open_grid(5, 5), &costs, PlanRequest::new(Point::new(2, 2), Point::new(2, 2)))
            .unwrap();
        // Resolved synchronously: the first poll already has the outcome.
        let outcome = ticket.poll().expect("trivial plan resolves immediately");
        assert_eq!(
            outcome,
            PlanOutcome::Found(Path::from_steps(vec![Point::new(2, 2)]))
        );
        assert_eq!(ticket.poll(), None);
    }

    #[test]
    fn out_of_bounds_endpoint_fails_fast() {
        let planner = Planner::new(MoveRule::FourWay);
        let costs = CostModel::new();

        let err = planner
            .plan(open_grid(5, 5), &costs, PlanRequest::new(Point::new(0, 0), Point::new(5, 0)))
            .unwrap_err();
        assert_eq!(err, PlanError::InvalidEndpoint(Point::new(5, 0)));
    }

    #[test]
    fn blocked_start_equals_goal_is_invalid_not_notfound() {
        let mut base = MapLayer::new(3, 3);
        base.fill(GRASS);
        let mut trees = MapLayer::new(3, 3);
        trees.set(Point::new(0, 0), Some(TREE));
        let grid = Arc::new(GridBuilder::new().build(&[&base, &trees]).unwrap());

        let planner = Planner::new(MoveRule::FourWay);
        let costs = CostModel::new();
        let err = planner
            .plan(grid, &costs, PlanRequest::new(Point::new(0, 0), Point::new(0, 0)))
            .unwrap_err();
        assert_eq!(err, PlanError::InvalidEndpoint(Point::new(0, 0)));
    }

    #[test]
    fn unreachable_goal_reports_notfound() {
        let mut base = MapLayer::new(5, 5);
        base.fill(GRASS);
        let mut walls = MapLayer::new(5, 5);
        for y in 0..5 {
            walls.set(Point::new(2, y), Some(TREE));
        }
        let grid = Arc::new(GridBuilder::new().build(&[&base, &walls]).unwrap());

        let planner = Planner::new(MoveRule::FourWay);
        let costs = CostModel::new();
        let ticket = planner
            .plan(grid, &costs, PlanRequest::new(Point::new(0, 2), Point::new(4, 2)))
            .unwrap();
        assert_eq!(ticket.wait(), PlanOutcome::NotFound);
    }

    #[test]
    fn snapshot_shields_the_search_from_later_toggles() {
        // Middle row is mud except at its ends; the bottom row is grass.
        // Weighted, the optimal route dips through the grass row; with
        // default costs it would run straight across the mud.
        const MUD: TileClass = TileClass::new(2);
        let mut base = MapLayer::new(5, 3);
        for x in 0..5 {
            base.set(Point::new(x, 0), Some(MUD));
            base.set(Point::new(x, 1), Some(MUD));
            base.set(Point::new(x, 2), Some(GRASS));
        }
        base.set(Point::new(0, 1), Some(GRASS));
        base.set(Point::new(4, 1), Some(GRASS));
        let grid = Arc::new(GridBuilder::new().build(&[&base]).unwrap());

        let planner = Planner::new(MoveRule::FourWay);
        let mut costs = CostModel::new();
        costs.set_mode(CostMode::Weighted);
        costs.set_override(MUD, 5).unwrap();

        let ticket = planner
            .plan(grid.clone(), &costs, PlanRequest::new(Point::new(0, 1), Point::new(4, 1)))
            .unwrap();

        // Toggle the live model while the request is (possibly) in flight;
        // the captured snapshot must still price mud at 5, whichever side
        // of the toggle the search lands on.
        costs.set_mode(CostMode::Default);
        costs.clear_overrides();

        match ticket.wait() {
            PlanOutcome::Found(path) => {
                assert_eq!(path.len(), 7);
                assert!(path.steps().contains(&Point::new(2, 2)));
            }
            PlanOutcome::NotFound => panic!("expected a path"),
        }
    }

    #[test]
    fn clearing_and_restoring_overrides_preserves_output() {
        const MUD: TileClass = TileClass::new(2);
        let mut base = MapLayer::new(5, 3);
        base.fill(GRASS);
        for x in 1..4 {
            base.set(Point::new(x, 1), Some(MUD));
        }
        let grid = Arc::new(GridBuilder::new().build(&[&base]).unwrap());

        let planner = Planner::new(MoveRule::FourWay);
        let request = PlanRequest::new(Point::new(0, 1), Point::new(4, 1));

        let mut costs = CostModel::new();
        costs.set_mode(CostMode::Weighted);
        costs.set_override(MUD, 4).unwrap();
        let before = planner.plan(grid.clone(), &costs, request).unwrap().wait();

        costs.clear_overrides();
        costs.set_override(MUD, 4).unwrap();
        let after = planner.plan(grid.clone(), &costs, request).unwrap().wait();

        assert_eq!(before, after);
    }

    #[test]
    fn identical_requests_yield_identical_paths() {
        let planner = Planner::new(MoveRule::FourWay);
        let grid = open_grid(8, 8);
        let costs = CostModel::new();
        let request = PlanRequest::new(Point::new(0, 0), Point::new(7, 7));

        let a = planner.plan(grid.clone(), &costs, request).unwrap().wait();
        let b = planner.plan(grid.clone(), &costs, request).unwrap().wait();
        assert_eq!(a, b);
    }

    #[test]
    fn concurrent_requests_do_not_interfere() {
        let planner = Planner::new(MoveRule::FourWay);
        let grid = open_grid(16, 16);
        let costs = CostModel::new();

        let tickets: Vec<PlanTicket> = (0..8)
            .map(|i| {
                planner
                    .plan(
                        grid.clone(),
                        &costs,
                        PlanRequest::new(Point::new(i, 0), Point::new(15 - i, 15)),
                    )
                    .unwrap()
            })
            .collect();

        for (i, ticket) in tickets.into_iter().enumerate() {
            let i = i as i32;
            match ticket.wait() {
                PlanOutcome::Found(path) => {
                    assert_eq!(path.start(), Point::new(i, 0));
                    assert_eq!(path.goal(), Point::new(15 - i, 15));
                }
                PlanOutcome::NotFound => panic!("expected a path"),
            }
        }
    }

    #[test]
    fn cancelled_ticket_terminates() {
        let planner = Planner::new(MoveRule::FourWay);
        let grid = open_grid(64, 64);
        let costs = CostModel::new();

        let mut ticket = planner
            .plan(grid, &costs, PlanRequest::new(Point::new(0, 0), Point::new(63, 63)))
            .unwrap();
        ticket.cancel();

        // Either the worker sees the token in time and discards its result
        // (the channel closes without a message, spending the ticket), or
        // it already resolved and the outcome comes through; cancellation
        // never leaves the caller spinning.
        while ticket.poll().is_none() && !ticket.is_spent() {
            std::thread::yield_now();
        }
    }
}
