//! The step state machine that drives an agent along a path.

use std::collections::VecDeque;
use std::time::Duration;

use log::debug;
use tilenav_core::Point;
use tilenav_paths::Path;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A continuous position in tile units.
///
/// Waypoints are integer tile coordinates; between them the agent occupies
/// fractional positions. The rendering collaborator converts to pixels with
/// [`to_world`](Self::to_world).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    /// Create a position from continuous coordinates.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The exact position of a tile coordinate.
    pub fn from_point(p: Point) -> Self {
        Self {
            x: p.x as f32,
            y: p.y as f32,
        }
    }

    /// Scale into world (pixel) units given the tile edge length.
    pub fn to_world(self, tile_size: f32) -> Self {
        Self {
            x: self.x * tile_size,
            y: self.y * tile_size,
        }
    }

    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
        }
    }
}

// ---------------------------------------------------------------------------
// AgentState
// ---------------------------------------------------------------------------

/// The movable state of one agent: continuous position, the path it is on
/// (if any), and how far along it has progressed.
///
/// Owned exclusively by the entity being moved; the executor mutates it
/// through `&mut` during [`begin`](PathExecutor::begin) and
/// [`tick`](PathExecutor::tick).
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    pos: Position,
    path: Option<Path>,
    index: usize,
}

impl AgentState {
    /// An idle agent standing at the given tile.
    pub fn at(p: Point) -> Self {
        Self {
            pos: Position::from_point(p),
            path: None,
            index: 0,
        }
    }

    /// Current continuous position.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// The path currently installed, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Index of the waypoint most recently reached.
    pub fn waypoint_index(&self) -> usize {
        self.index
    }
}

// ---------------------------------------------------------------------------
// Handles, events, state
// ---------------------------------------------------------------------------

/// Identifies one `begin` call, for targeted cancellation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RunHandle(u64);

/// A lifecycle notification for a run. Completion and cancellation are
/// distinct: a completed agent stands exactly on the final waypoint, a
/// cancelled one stays wherever it was.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveEvent {
    /// The run reached its final waypoint.
    Completed(RunHandle),
    /// The run was halted, by `cancel` or by a superseding `begin`.
    Cancelled(RunHandle),
}

/// Where the executor's state machine currently stands.
///
/// Transitions are `Idle → Moving(segment) → Completed | Cancelled`, with
/// the segment index only ever increasing; no transition skips a segment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MoveState {
    /// No run has been started.
    #[default]
    Idle,
    /// Traversing the segment that starts at the given waypoint index.
    Moving(usize),
    /// The last run reached its final waypoint.
    Completed,
    /// The last run was halted early.
    Cancelled,
}

// ---------------------------------------------------------------------------
// PathExecutor
// ---------------------------------------------------------------------------

struct ActiveRun {
    handle: RunHandle,
    step: Duration,
    /// Time accumulated inside the current segment.
    elapsed: Duration,
    segment: usize,
}

/// Drives one agent along one path at a time.
///
/// The executor is tick-driven and never blocks: each
/// [`tick`](Self::tick) advances segment timing by the elapsed `dt`,
/// interpolating the agent between waypoints and snapping it exactly onto
/// each waypoint at segment boundaries. A large `dt` carries its remainder
/// across several segments rather than losing time.
#[derive(Default)]
pub struct PathExecutor {
    run: Option<ActiveRun>,
    done: MoveState,
    events: VecDeque<MoveEvent>,
    next_handle: u64,
}

impl PathExecutor {
    /// A fresh, idle executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start moving `agent` along `path`, spending `step_duration` per
    /// segment.
    ///
    /// The agent snaps to the path's first waypoint. If a run is already
    /// active it is implicitly cancelled first — one active path per agent,
    /// and a new command always supersedes an old one.
    pub fn begin(
        &mut self,
        agent: &mut AgentState,
        path: Path,
        step_duration: Duration,
    ) -> RunHandle {
        if let Some(prior) = self.run.take() {
            debug!("run {:?} superseded", prior.handle);
            self.events.push_back(MoveEvent::Cancelled(prior.handle));
        }

        let handle = RunHandle(self.next_handle);
        self.next_handle += 1;

        agent.pos = Position::from_point(path.start());
        agent.index = 0;
        debug!(
            "run {:?}: {} waypoints, {:?} per step",
            handle,
            path.len(),
            step_duration
        );
        agent.path = Some(path);

        self.run = Some(ActiveRun {
            handle,
            step: step_duration,
            elapsed: Duration::ZERO,
            segment: 0,
        });
        handle
    }

    /// Halt the identified run immediately.
    ///
    /// The agent stops at its current interpolated position — no snapping
    /// to a waypoint. Returns false for a stale handle (already completed,
    /// cancelled, or superseded), in which case nothing changes.
    pub fn cancel(&mut self, handle: RunHandle) -> bool {
        match &self.run {
            Some(run) if run.handle == handle => {
                debug!("run {:?} cancelled on segment {}", handle, run.segment);
                self.run = None;
                self.done = MoveState::Cancelled;
                self.events.push_back(MoveEvent::Cancelled(handle));
                true
            }
            _ => false,
        }
    }

    /// Advance the active run by `dt` and deliver at most one queued
    /// lifecycle event.
    ///
    /// Waypoint progression is monotonic; the final waypoint produces a
    /// single [`MoveEvent::Completed`].
    pub fn tick(&mut self, agent: &mut AgentState, dt: Duration) -> Option<MoveEvent> {
        self.advance(agent, dt);
        self.events.pop_front()
    }

    /// The state machine's current position.
    pub fn state(&self) -> MoveState {
        match &self.run {
            Some(run) => MoveState::Moving(run.segment),
            None => self.done,
        }
    }

    fn advance(&mut self, agent: &mut AgentState, dt: Duration) {
        let Some(run) = &mut self.run else {
            return;
        };
        let Some(path) = &agent.path else {
            return;
        };
        let steps = path.steps();
        let last = steps.len() - 1;

        if run.step.is_zero() {
            // Degenerate duration: arrive instantly.
            agent.index = last;
        } else {
            run.elapsed += dt;
            while agent.index < last && run.elapsed >= run.step {
                run.elapsed -= run.step;
                agent.index += 1;
                run.segment = agent.index;
            }
        }

        if agent.index >= last {
            agent.pos = Position::from_point(steps[last]);
            let handle = run.handle;
            debug!("run {:?} completed at {}", handle, steps[last]);
            self.run = None;
            self.done = MoveState::Completed;
            self.events.push_back(MoveEvent::Completed(handle));
            return;
        }

        let from = Position::from_point(steps[agent.index]);
        let to = Position::from_point(steps[agent.index + 1]);
        let t = run.elapsed.as_secs_f32() / run.step.as_secs_f32();
        agent.pos = Position::lerp(from, to, t);
    }
}
