//! Reusable A* search arena: [`SearchField`].

use std::collections::BinaryHeap;

use tilenav_core::Point;

use crate::path::Path;
use crate::pather::Pather;

/// Sentinel for a cost no reachable node ever accumulates.
const UNREACHED: u32 = u32::MAX;

#[derive(Clone)]
struct Node {
    g: u32,
    parent: usize,
    generation: u32,
    open: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: UNREACHED,
            parent: usize::MAX,
            generation: 0,
            open: false,
        }
    }
}

/// Frontier entry, ordered for a min-heap pop by `f`, then by discovery
/// order. The sequence number makes equal-`f` pops FIFO, so identical
/// inputs always produce the identical path.
#[derive(Clone, Copy, PartialEq, Eq)]
struct FrontierRef {
    idx: usize,
    f: u32,
    seq: u64,
}

impl Ord for FrontierRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed so BinaryHeap (a max-heap) pops the smallest f first,
        // and among equal f the earliest-discovered entry.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// SearchField
// ---------------------------------------------------------------------------

/// Owns the node arena for A* searches over a `width × height` grid.
///
/// The arena is reused across queries: a generation counter is bumped per
/// search and stale nodes are lazily ignored, so repeated queries allocate
/// nothing once warm. Each planning thread owns its own field; nothing here
/// is shared.
pub struct SearchField {
    width: usize,
    height: usize,
    nodes: Vec<Node>,
    generation: u32,
    nbuf: Vec<Point>,
}

impl SearchField {
    /// Create a field for a grid of the given dimensions.
    pub fn new(width: i32, height: i32) -> Self {
        let w = width.max(0) as usize;
        let h = height.max(0) as usize;
        Self {
            width: w,
            height: h,
            nodes: vec![Node::default(); w * h],
            generation: 0,
            nbuf: Vec::with_capacity(8),
        }
    }

    /// Adapt the field to new grid dimensions.
    ///
    /// If the new cell count fits the existing arena, nodes are kept and
    /// only the generation counter is bumped; otherwise the arena grows.
    pub fn resize(&mut self, width: i32, height: i32) {
        let w = width.max(0) as usize;
        let h = height.max(0) as usize;
        self.width = w;
        self.height = h;
        if w * h <= self.nodes.len() {
            self.generation = self.generation.wrapping_add(1);
        } else {
            self.nodes.clear();
            self.nodes.resize(w * h, Node::default());
            self.generation = 0;
        }
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || (p.x as usize) >= self.width || (p.y as usize) >= self.height {
            return None;
        }
        Some(p.y as usize * self.width + p.x as usize)
    }

    #[inline]
    fn point(&self, idx: usize) -> Point {
        Point::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    /// Shortest path from `from` to `to`, or `None` when the frontier
    /// empties first (no connecting route exists).
    pub fn find<P: Pather>(&mut self, pather: &P, from: Point, to: Point) -> Option<Path> {
        self.find_while(pather, from, to, || true)
    }

    /// [`find`](Self::find) with a cooperative interruption check.
    ///
    /// `keep_searching` is consulted once per frontier pop; when it turns
    /// false the search stops early and reports `None`. The caller is
    /// responsible for distinguishing interruption from exhaustion.
    pub fn find_while<P, K>(&mut self, pather: &P, from: Point, to: Point, mut keep_searching: K) -> Option<Path>
    where
        P: Pather,
        K: FnMut() -> bool,
    {
        let start = self.idx(from)?;
        let goal = self.idx(to)?;

        if start == goal {
            return Some(Path::from_steps(vec![from]));
        }

        // Bump the generation to lazily invalidate the previous search.
        self.generation = self.generation.wrapping_add(1);
        let cur_gen = self.generation;
        let mut next_seq: u64 = 0;

        {
            let node = &mut self.nodes[start];
            node.g = 0;
            node.parent = usize::MAX;
            node.generation = cur_gen;
            node.open = true;
        }

        let mut open: BinaryHeap<FrontierRef> = BinaryHeap::new();
        open.push(FrontierRef {
            idx: start,
            f: pather.estimate(from, to),
            seq: next_seq,
        });
        next_seq += 1;

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut found = false;

        while let Some(current) = open.pop() {
            if !keep_searching() {
                break;
            }

            let ci = current.idx;

            // Stale heap entries: superseded by a cheaper rediscovery, or
            // left over from an earlier generation.
            if self.nodes[ci].generation != cur_gen || !self.nodes[ci].open {
                continue;
            }

            if ci == goal {
                found = true;
                break;
            }

            self.nodes[ci].open = false;
            let current_g = self.nodes[ci].g;
            let current_point = self.point(ci);

            nbuf.clear();
            pather.neighbors(current_point, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                let tentative = current_g.saturating_add(pather.step_cost(current_point, np));

                let node = &mut self.nodes[ni];
                if node.generation == cur_gen {
                    if tentative >= node.g {
                        continue;
                    }
                } else {
                    node.generation = cur_gen;
                    node.g = UNREACHED;
                }

                node.g = tentative;
                node.parent = ci;
                node.open = true;

                open.push(FrontierRef {
                    idx: ni,
                    f: tentative.saturating_add(pather.estimate(np, to)),
                    seq: next_seq,
                });
                next_seq += 1;
            }
        }

        self.nbuf = nbuf;

        if !found {
            return None;
        }

        let mut steps = Vec::new();
        let mut ci = goal;
        while ci != usize::MAX {
            steps.push(self.point(ci));
            ci = self.nodes[ci].parent;
        }
        steps.reverse();
        Some(Path::from_steps(steps))
    }
}
