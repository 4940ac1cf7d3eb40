//! The walkable route produced by a successful planning call.

use tilenav_core::{Point, TraversalGrid};

use crate::cost::CostSnapshot;

/// An ordered, non-empty waypoint sequence from start to goal inclusive.
///
/// Consecutive waypoints are adjacent under the rule the planner searched
/// with. A path is immutable once produced; the executor consumes it and
/// the caller discards it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    steps: Vec<Point>,
}

impl Path {
    pub(crate) fn from_steps(steps: Vec<Point>) -> Self {
        debug_assert!(!steps.is_empty());
        Self { steps }
    }

    /// The waypoints, start first.
    pub fn steps(&self) -> &[Point] {
        &self.steps
    }

    /// The starting waypoint.
    pub fn start(&self) -> Point {
        self.steps[0]
    }

    /// The final waypoint.
    pub fn goal(&self) -> Point {
        self.steps[self.steps.len() - 1]
    }

    /// Number of waypoints, endpoints included.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; a path has at least its start.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Total traversal cost under the given snapshots: the sum of the cost
    /// of each step's destination cell. A single-waypoint path costs 0.
    ///
    /// Recomputing this over a returned path yields exactly the value the
    /// search minimised.
    pub fn total_cost(&self, grid: &TraversalGrid, costs: &CostSnapshot) -> u32 {
        self.steps[1..]
            .iter()
            .map(|&p| costs.cost_of(grid.class_at(p)))
            .sum()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
