//! The immutable traversal grid produced by layer compositing.

use crate::geom::Point;
use crate::tiles::{TileCell, TileClass};

/// A rectangular `height × width` table of [`TileCell`] values.
///
/// A grid is a snapshot: it is built once from the current layer stack (see
/// [`GridBuilder`](crate::GridBuilder)) and never mutated afterwards. When
/// the underlying map changes, the collaborator rebuilds and replaces the
/// whole grid. Planning calls share a snapshot across threads behind an
/// `Arc`; the plain `Vec` backing keeps it `Send + Sync`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TraversalGrid {
    width: i32,
    height: i32,
    /// Row-major, `width * height` cells.
    cells: Vec<TileCell>,
}

impl TraversalGrid {
    /// A grid where every cell is open and classless.
    ///
    /// Mainly useful for tests and synthetic maps; real grids come out of
    /// [`GridBuilder::build`](crate::GridBuilder::build).
    pub fn open(width: i32, height: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width: width.max(0),
            height: height.max(0),
            cells: vec![TileCell::OPEN; len],
        }
    }

    pub(crate) fn from_cells(width: i32, height: i32, cells: Vec<TileCell>) -> Self {
        debug_assert_eq!(cells.len(), (width * height) as usize);
        Self {
            width,
            height,
            cells,
        }
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `p` addresses a cell of this grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    /// The cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<TileCell> {
        if !self.contains(p) {
            return None;
        }
        Some(self.cells[(p.y * self.width + p.x) as usize])
    }

    /// The class recorded at `p`, if the cell exists and has one.
    #[inline]
    pub fn class_at(&self, p: Point) -> Option<TileClass> {
        self.at(p).and_then(|c| c.class)
    }

    /// Whether `p` is in bounds and not blocked.
    #[inline]
    pub fn is_walkable(&self, p: Point) -> bool {
        matches!(self.at(p), Some(cell) if !cell.blocked)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over `(Point, TileCell)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, TileCell)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().map(move |(i, &cell)| {
            let i = i as i32;
            (Point::new(i % width, i / width), cell)
        })
    }
}
