//! The search seam: [`Pather`], [`MoveRule`], and the grid adapter.

use tilenav_core::{Point, TraversalGrid};

use crate::cost::CostSnapshot;
use crate::distance::{chebyshev, manhattan};

// ---------------------------------------------------------------------------
// MoveRule
// ---------------------------------------------------------------------------

/// Movement adjacency on the grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveRule {
    /// Cardinal moves only.
    #[default]
    FourWay,
    /// Cardinal and diagonal moves.
    EightWay,
}

impl MoveRule {
    /// Minimum number of steps between two points under this rule.
    #[inline]
    pub fn steps_between(self, a: Point, b: Point) -> u32 {
        match self {
            MoveRule::FourWay => manhattan(a, b),
            MoveRule::EightWay => chebyshev(a, b),
        }
    }
}

// ---------------------------------------------------------------------------
// Pather
// ---------------------------------------------------------------------------

/// What the A* search needs to know about the world.
///
/// Implementations must keep `step_cost` strictly positive and `estimate`
/// admissible (never an overestimate of the true remaining cost), or the
/// search loses its optimality guarantee.
pub trait Pather {
    /// Append the reachable neighbors of `p` into `buf`, in a fixed order.
    /// The caller clears `buf` before calling.
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>);

    /// Cost of moving from `from` to adjacent `to`. Must be > 0.
    fn step_cost(&self, from: Point, to: Point) -> u32;

    /// Admissible estimate of the remaining cost from `from` to `to`.
    fn estimate(&self, from: Point, to: Point) -> u32;
}

// ---------------------------------------------------------------------------
// GridPather
// ---------------------------------------------------------------------------

/// Adapts a grid snapshot plus a cost snapshot to the [`Pather`] seam.
///
/// Edges exist only between in-bounds, unblocked cells; the weight of an
/// edge `u → v` is the snapshot cost of `v`'s class. The heuristic is the
/// rule's step metric scaled by the minimum per-step cost
/// ([`DEFAULT_COST`](crate::DEFAULT_COST)), which never overestimates
/// because every stored cost is at least that much.
#[derive(Debug, Clone, Copy)]
pub struct GridPather<'a> {
    grid: &'a TraversalGrid,
    costs: &'a CostSnapshot,
    rule: MoveRule,
}

impl<'a> GridPather<'a> {
    /// Bind a pather to frozen grid and cost snapshots.
    pub fn new(grid: &'a TraversalGrid, costs: &'a CostSnapshot, rule: MoveRule) -> Self {
        Self { grid, costs, rule }
    }
}

impl Pather for GridPather<'_> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        match self.rule {
            MoveRule::FourWay => {
                buf.extend(p.neighbors_4().into_iter().filter(|&n| self.grid.is_walkable(n)));
            }
            MoveRule::EightWay => {
                buf.extend(p.neighbors_8().into_iter().filter(|&n| self.grid.is_walkable(n)));
            }
        }
    }

    fn step_cost(&self, _from: Point, to: Point) -> u32 {
        self.costs.cost_of(self.grid.class_at(to))
    }

    fn estimate(&self, from: Point, to: Point) -> u32 {
        self.rule.steps_between(from, to) * crate::DEFAULT_COST
    }
}
