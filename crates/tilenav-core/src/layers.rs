//! Layer compositing: deriving a [`TraversalGrid`] from a layered tile map.

use std::collections::HashSet;

use crate::geom::Point;
use crate::grid::TraversalGrid;
use crate::tiles::{TileCell, TileClass};

// ---------------------------------------------------------------------------
// TileLayer
// ---------------------------------------------------------------------------

/// One layer of a layered tile map, as delivered by the map collaborator.
///
/// The first layer handed to [`GridBuilder::build`] is the base (ground)
/// layer; every later layer sits above it. A layer only needs to answer
/// point lookups — how it stores or decodes its tiles is its own business.
pub trait TileLayer {
    /// Layer dimensions as (width, height).
    fn size(&self) -> Point;

    /// The tile at `p`, or `None` if the layer is empty there.
    fn tile_at(&self, p: Point) -> Option<TileClass>;
}

// ---------------------------------------------------------------------------
// MapLayer
// ---------------------------------------------------------------------------

/// A plain row-major in-memory [`TileLayer`].
#[derive(Debug, Clone)]
pub struct MapLayer {
    width: i32,
    height: i32,
    tiles: Vec<Option<TileClass>>,
}

impl MapLayer {
    /// Create an empty layer of the given size.
    pub fn new(width: i32, height: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width: width.max(0),
            height: height.max(0),
            tiles: vec![None; len],
        }
    }

    /// Place (or clear) a tile. Out-of-bounds writes are ignored.
    pub fn set(&mut self, p: Point, class: Option<TileClass>) {
        if p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height {
            self.tiles[(p.y * self.width + p.x) as usize] = class;
        }
    }

    /// Fill every cell with the given class.
    pub fn fill(&mut self, class: TileClass) {
        self.tiles.fill(Some(class));
    }
}

impl TileLayer for MapLayer {
    fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    fn tile_at(&self, p: Point) -> Option<TileClass> {
        if p.x < 0 || p.x >= self.width || p.y < 0 || p.y >= self.height {
            return None;
        }
        self.tiles[(p.y * self.width + p.x) as usize]
    }
}

// ---------------------------------------------------------------------------
// GridError
// ---------------------------------------------------------------------------

/// Failure to derive a traversal grid from a layer stack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// No layers were supplied.
    #[error("no tile layers supplied")]
    NoLayers,
    /// Layers disagree on dimensions; the grid would be silently truncated
    /// or padded, so construction fails instead.
    #[error("malformed grid: layer {layer} is {found}, expected {expected}")]
    MalformedGrid {
        /// Index of the offending layer in the supplied stack.
        layer: usize,
        /// Size of the base layer.
        expected: Point,
        /// Size of the offending layer.
        found: Point,
    },
}

// ---------------------------------------------------------------------------
// GridBuilder
// ---------------------------------------------------------------------------

/// Composites an ordered layer stack into a [`TraversalGrid`].
///
/// Precedence is fixed: if any layer above the base reports a tile at a
/// coordinate, that cell is blocked no matter what the base layer holds (a
/// tree or building occludes the ground beneath it for walking purposes).
/// If the base layer is empty at a coordinate, the cell is open with no
/// class rather than an error.
///
/// An optional walkable-class filter narrows the base layer further: when
/// set, a base cell whose class is not in the set is blocked even without
/// occlusion. Classless cells are not filtered.
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    walkable: Option<HashSet<TileClass>>,
}

impl GridBuilder {
    /// A builder with no walkable filter: every non-occluded cell is open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict walkability to the given base-layer classes.
    pub fn walkable(mut self, classes: impl IntoIterator<Item = TileClass>) -> Self {
        self.walkable = Some(classes.into_iter().collect());
        self
    }

    /// Composite `layers` (base first) into a grid.
    ///
    /// Pure and deterministic for a given layer snapshot; runs in
    /// `O(width × height × layers)`.
    pub fn build(&self, layers: &[&dyn TileLayer]) -> Result<TraversalGrid, GridError> {
        let Some(base) = layers.first() else {
            return Err(GridError::NoLayers);
        };
        let size = base.size();

        for (i, layer) in layers.iter().enumerate().skip(1) {
            let found = layer.size();
            if found != size {
                return Err(GridError::MalformedGrid {
                    layer: i,
                    expected: size,
                    found,
                });
            }
        }

        let mut cells = Vec::with_capacity((size.x * size.y) as usize);
        for y in 0..size.y {
            for x in 0..size.x {
                cells.push(self.composite(layers, Point::new(x, y)));
            }
        }
        Ok(TraversalGrid::from_cells(size.x, size.y, cells))
    }

    fn composite(&self, layers: &[&dyn TileLayer], p: Point) -> TileCell {
        // Top-down: the topmost overlay tile wins and occludes the ground.
        for layer in layers.iter().skip(1).rev() {
            if let Some(class) = layer.tile_at(p) {
                return TileCell::blocked(class);
            }
        }
        match layers[0].tile_at(p) {
            Some(class) => {
                let blocked = match &self.walkable {
                    Some(set) => !set.contains(&class),
                    None => false,
                };
                TileCell { class: Some(class), blocked }
            }
            None => TileCell::OPEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRASS: TileClass = TileClass::new(1);
    const ROAD: TileClass = TileClass::new(2);
    const TREE: TileClass = TileClass::new(16);
    const HOUSE: TileClass = TileClass::new(49);

    fn ground(width: i32, height: i32) -> MapLayer {
        let mut layer = MapLayer::new(width, height);
        layer.fill(GRASS);
        layer
    }

    #[test]
    fn overlay_tile_blocks_ground() {
        let base = ground(4, 4);
        let mut trees = MapLayer::new(4, 4);
        trees.set(Point::new(1, 2), Some(TREE));

        let grid = GridBuilder::new()
            .build(&[&base, &trees])
            .unwrap();

        assert!(!grid.is_walkable(Point::new(1, 2)));
        assert_eq!(grid.class_at(Point::new(1, 2)), Some(TREE));
        assert!(grid.is_walkable(Point::new(0, 0)));
        assert_eq!(grid.class_at(Point::new(0, 0)), Some(GRASS));
    }

    #[test]
    fn topmost_overlay_wins() {
        let base = ground(2, 1);
        let mut trees = MapLayer::new(2, 1);
        trees.set(Point::new(0, 0), Some(TREE));
        let mut houses = MapLayer::new(2, 1);
        houses.set(Point::new(0, 0), Some(HOUSE));

        let grid = GridBuilder::new()
            .build(&[&base, &trees, &houses])
            .unwrap();

        assert_eq!(grid.class_at(Point::new(0, 0)), Some(HOUSE));
        assert!(!grid.is_walkable(Point::new(0, 0)));
    }

    #[test]
    fn empty_base_cell_is_open_and_classless() {
        let mut base = MapLayer::new(3, 1);
        base.set(Point::new(0, 0), Some(GRASS));
        // (1, 0) and (2, 0) left empty.

        let grid = GridBuilder::new().build(&[&base]).unwrap();

        assert!(grid.is_walkable(Point::new(1, 0)));
        assert_eq!(grid.class_at(Point::new(1, 0)), None);
    }

    #[test]
    fn walkable_filter_blocks_unlisted_classes() {
        let mut base = MapLayer::new(3, 1);
        base.set(Point::new(0, 0), Some(GRASS));
        base.set(Point::new(1, 0), Some(ROAD));
        base.set(Point::new(2, 0), Some(HOUSE));

        let grid = GridBuilder::new()
            .walkable([GRASS, ROAD])
            .build(&[&base])
            .unwrap();

        assert!(grid.is_walkable(Point::new(0, 0)));
        assert!(grid.is_walkable(Point::new(1, 0)));
        assert!(!grid.is_walkable(Point::new(2, 0)));
    }

    #[test]
    fn walkable_filter_leaves_classless_cells_open() {
        let base = MapLayer::new(2, 1);

        let grid = GridBuilder::new()
            .walkable([GRASS])
            .build(&[&base])
            .unwrap();

        assert!(grid.is_walkable(Point::new(0, 0)));
    }

    #[test]
    fn mismatched_layer_sizes_are_rejected() {
        let base = ground(4, 4);
        let trees = MapLayer::new(4, 5);

        let err = GridBuilder::new().build(&[&base, &trees]).unwrap_err();
        assert_eq!(
            err,
            GridError::MalformedGrid {
                layer: 1,
                expected: Point::new(4, 4),
                found: Point::new(4, 5),
            }
        );
    }

    #[test]
    fn empty_stack_is_rejected() {
        assert_eq!(GridBuilder::new().build(&[]).unwrap_err(), GridError::NoLayers);
    }

    #[test]
    fn build_is_deterministic() {
        let base = ground(5, 5);
        let mut trees = MapLayer::new(5, 5);
        trees.set(Point::new(2, 2), Some(TREE));

        let builder = GridBuilder::new().walkable([GRASS]);
        let a = builder.build(&[&base, &trees]).unwrap();
        let b = builder.build(&[&base, &trees]).unwrap();
        assert_eq!(a, b);
    }
}
